use {
    super::error::EngineError,
    super::id::PaymentId,
    chrono::{DateTime, Utc},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Captured,
    CapturedNoAccount,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::CapturedNoAccount => "captured_no_account",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for RecordStatus {
    type Error = EngineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "captured" => Ok(Self::Captured),
            "captured_no_account" => Ok(Self::CapturedNoAccount),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::Validation(format!(
                "unknown record status: {other}"
            ))),
        }
    }
}

/// Ledger entry for INSERT. One per payment id, ever; written only as the
/// final step of a successful transition, never speculatively.
#[derive(Debug, Clone)]
pub struct NewPaymentRecord {
    pub payment_id: PaymentId,
    pub account_id: Option<Uuid>,
    pub status: RecordStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub raw_event: serde_json::Value,
}

/// Ledger entry as read back from the store.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub account_id: Option<Uuid>,
    pub status: RecordStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Gateway-reported payment failure, appended for support/reconciliation.
/// Never read by the activation path.
#[derive(Debug, Clone)]
pub struct NewFailureRecord {
    pub payment_id: PaymentId,
    pub payer_email: String,
    pub raw_event: serde_json::Value,
}
