use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Gateway-assigned payment identifier (`pay_xxx`). Never minted locally —
/// its uniqueness is what the idempotency ledger keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Result<Self, EngineError> {
        let id = id.into();
        if !id.starts_with("pay_") {
            return Err(EngineError::Validation(format!(
                "PaymentId must start with pay_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
