use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("signature: {0}")]
    Signature(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("identity provider: {0}")]
    Identity(String),

    #[error("claims propagation: {0}")]
    Claims(String),
}

impl EngineError {
    /// Whether the gateway should redeliver the event. Only infrastructure
    /// faults qualify — a retry cannot fix a bad signature or malformed payload.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Identity(_))
    }
}
