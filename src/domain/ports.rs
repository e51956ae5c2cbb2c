use {
    super::error::EngineError,
    super::id::PaymentId,
    super::record::{NewFailureRecord, NewPaymentRecord, PaymentRecord},
    super::subscription::{AccountEntitlement, PlanTier},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    uuid::Uuid,
};

/// Result of a creation-only commit. The ledger insert is the distributed
/// mutual-exclusion point: the loser of a concurrent race for the same
/// payment id observes the conflict and must treat it as already processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    AlreadyProcessed,
}

/// Durable store for the idempotency ledger, entitlements, the denormalized
/// profile projection, and failure records.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Idempotency ledger lookup. Presence of a record is the sole proof
    /// that a payment was processed.
    async fn find_payment_record(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<PaymentRecord>, EngineError>;

    /// Atomic multi-record commit: entitlement upsert, profile plan
    /// projection, and the creation-only ledger insert — all or nothing.
    /// A ledger conflict means another delivery already won.
    async fn commit_activation(
        &self,
        entitlement: &AccountEntitlement,
        record: &NewPaymentRecord,
    ) -> Result<CommitOutcome, EngineError>;

    /// Creation-only write of a `captured_no_account` record. No entitlement
    /// is touched.
    async fn record_unmatched(
        &self,
        record: &NewPaymentRecord,
    ) -> Result<CommitOutcome, EngineError>;

    /// Append a gateway-reported failure. Duplicate deliveries are dropped
    /// on the payment-id key.
    async fn append_failure(&self, failure: &NewFailureRecord) -> Result<(), EngineError>;
}

/// Lookup of the internal account for an external payer identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn account_id_for_email(&self, email: &str) -> Result<Option<Uuid>, EngineError>;
}

/// Pushes plan/expiry into the account's externally verifiable identity
/// token after a successful commit. Best-effort: the durable state is
/// already authoritative when this runs.
#[async_trait]
pub trait ClaimsPropagator: Send + Sync {
    async fn push_claims(
        &self,
        account_id: Uuid,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
    ) -> Result<(), EngineError>;
}
