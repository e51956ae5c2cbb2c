use {
    crate::domain::{error::EngineError, ports::ClaimsPropagator, subscription::PlanTier},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    sqlx::PgPool,
    uuid::Uuid,
};

/// Writes the claim set the token issuer embeds into freshly minted
/// credentials. Runs outside the activation transaction on its own
/// connection — a failure here never unwinds the committed state.
pub struct PgClaimsPropagator {
    pool: PgPool,
}

impl PgClaimsPropagator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimsPropagator for PgClaimsPropagator {
    async fn push_claims(
        &self,
        account_id: Uuid,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let claims = serde_json::json!({
            "plan": plan.as_str(),
            "plan_expires_at": expires_at,
        });

        sqlx::query(
            r#"
            INSERT INTO account_claims (account_id, claims, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (account_id) DO UPDATE SET
                claims = EXCLUDED.claims,
                updated_at = now()
            "#,
        )
        .bind(account_id)
        .bind(&claims)
        .execute(&self.pool)
        .await
        .map_err(|e| EngineError::Claims(e.to_string()))?;

        Ok(())
    }
}
