pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use std::sync::Arc;

use crate::{domain::signature::SignatureVerifier, services::activation_pipeline::ActivationPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ActivationPipeline>,
    pub verifier: Arc<SignatureVerifier>,
}
