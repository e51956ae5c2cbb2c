use {
    crate::domain::{error::EngineError, ports::IdentityProvider},
    async_trait::async_trait,
    sqlx::PgPool,
    uuid::Uuid,
};

pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn account_id_for_email(&self, email: &str) -> Result<Option<Uuid>, EngineError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM accounts WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngineError::Identity(e.to_string()))?;

        Ok(id)
    }
}
