use {
    crate::domain::{
        clock::Clock,
        error::EngineError,
        event::{ActivationRequest, EventRoute},
        ports::{ClaimsPropagator, CommitOutcome, EntitlementStore, IdentityProvider},
        subscription::{ActivationOutcome, plan_activation},
    },
    std::sync::Arc,
    uuid::Uuid,
};

#[derive(Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Entitlement committed and claims pushed (or push failure swallowed).
    Activated(Uuid),
    /// Payment id already in the ledger — no-op.
    Duplicate,
    /// No account for the payer; recorded for reconciliation.
    Unmatched,
    /// Gateway-reported failure appended.
    FailureLogged,
    /// Unknown event type, acknowledged and dropped.
    Acknowledged,
}

/// Request-scoped orchestrator over the injected collaborators. Holds no
/// mutable state of its own — everything durable lives behind the store.
pub struct ActivationPipeline {
    store: Arc<dyn EntitlementStore>,
    identity: Arc<dyn IdentityProvider>,
    claims: Arc<dyn ClaimsPropagator>,
    clock: Arc<dyn Clock>,
}

impl ActivationPipeline {
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        identity: Arc<dyn IdentityProvider>,
        claims: Arc<dyn ClaimsPropagator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            identity,
            claims,
            clock,
        }
    }

    pub async fn handle(&self, route: EventRoute) -> Result<PipelineOutcome, EngineError> {
        match route {
            EventRoute::Activation(request) => self.activate(request).await,
            EventRoute::Failure(failure) => {
                self.store.append_failure(&failure).await?;
                tracing::info!(payment_id = %failure.payment_id, "payment failure logged");
                Ok(PipelineOutcome::FailureLogged)
            }
            EventRoute::Acknowledge => Ok(PipelineOutcome::Acknowledged),
        }
    }

    async fn activate(&self, request: ActivationRequest) -> Result<PipelineOutcome, EngineError> {
        // Ledger pre-check: at-least-once delivery makes duplicates routine.
        if self
            .store
            .find_payment_record(&request.payment_id)
            .await?
            .is_some()
        {
            tracing::info!(payment_id = %request.payment_id, "already processed, skipping");
            return Ok(PipelineOutcome::Duplicate);
        }

        let account_id = self
            .identity
            .account_id_for_email(&request.payer_email)
            .await?;
        let now = self.clock.now();

        match plan_activation(account_id, &request, now) {
            ActivationOutcome::NoAccount { record } => {
                match self.store.record_unmatched(&record).await? {
                    CommitOutcome::AlreadyProcessed => Ok(PipelineOutcome::Duplicate),
                    CommitOutcome::Committed => {
                        tracing::warn!(
                            payment_id = %request.payment_id,
                            "no account for payer, recorded for reconciliation"
                        );
                        Ok(PipelineOutcome::Unmatched)
                    }
                }
            }
            ActivationOutcome::Activate { entitlement, record } => {
                match self.store.commit_activation(&entitlement, &record).await? {
                    CommitOutcome::AlreadyProcessed => {
                        tracing::info!(
                            payment_id = %request.payment_id,
                            "lost creation race, already processed"
                        );
                        Ok(PipelineOutcome::Duplicate)
                    }
                    CommitOutcome::Committed => {
                        // Best-effort: the committed state is authoritative;
                        // the client picks it up on next credential refresh.
                        if let Err(e) = self
                            .claims
                            .push_claims(
                                entitlement.account_id,
                                entitlement.plan,
                                entitlement.expires_at,
                            )
                            .await
                        {
                            tracing::warn!(
                                account_id = %entitlement.account_id,
                                error = %e,
                                "claims propagation failed after commit"
                            );
                        }

                        tracing::info!(
                            account_id = %entitlement.account_id,
                            payment_id = %request.payment_id,
                            billing = %entitlement.billing,
                            expires_at = %entitlement.expires_at,
                            "subscription activated"
                        );
                        Ok(PipelineOutcome::Activated(entitlement.account_id))
                    }
                }
            }
        }
    }
}
