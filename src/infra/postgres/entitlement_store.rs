use {
    crate::domain::{
        error::EngineError,
        id::PaymentId,
        ports::{CommitOutcome, EntitlementStore},
        record::{NewFailureRecord, NewPaymentRecord, PaymentRecord, RecordStatus},
        subscription::AccountEntitlement,
    },
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    sqlx::{PgPool, Postgres, Transaction},
    uuid::Uuid,
};

pub struct PgEntitlementStore {
    pool: PgPool,
}

impl PgEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Creation-only ledger insert. `ON CONFLICT DO NOTHING RETURNING true`
/// yields no row when the key exists — that conflict is the per-payment-id
/// mutual-exclusion point, so it must be the first write in any transaction
/// that touches entitlements.
async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &NewPaymentRecord,
) -> Result<bool, EngineError> {
    let inserted: Option<bool> = sqlx::query_scalar(
        r#"
        INSERT INTO payment_records (payment_id, account_id, status, expires_at, raw_event)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (payment_id) DO NOTHING
        RETURNING true
        "#,
    )
    .bind(record.payment_id.as_str())
    .bind(record.account_id)
    .bind(record.status.as_str())
    .bind(record.expires_at)
    .bind(&record.raw_event)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(inserted.is_some())
}

#[async_trait]
impl EntitlementStore for PgEntitlementStore {
    async fn find_payment_record(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<PaymentRecord>, EngineError> {
        let row = sqlx::query_as::<_, (String, Option<Uuid>, String, Option<DateTime<Utc>>, DateTime<Utc>)>(
            "SELECT payment_id, account_id, status, expires_at, created_at
             FROM payment_records WHERE payment_id = $1",
        )
        .bind(payment_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some((payment_id, account_id, status, expires_at, created_at)) => {
                Ok(Some(PaymentRecord {
                    payment_id,
                    account_id,
                    status: RecordStatus::try_from(status.as_str())?,
                    expires_at,
                    created_at,
                }))
            }
        }
    }

    async fn commit_activation(
        &self,
        entitlement: &AccountEntitlement,
        record: &NewPaymentRecord,
    ) -> Result<CommitOutcome, EngineError> {
        let mut tx = self.pool.begin().await?;

        if !insert_record(&mut tx, record).await? {
            tx.rollback().await?;
            return Ok(CommitOutcome::AlreadyProcessed);
        }

        sqlx::query(
            r#"
            INSERT INTO account_entitlements
                (account_id, plan, activated_at, expires_at, billing_period, last_payment_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (account_id) DO UPDATE SET
                plan = EXCLUDED.plan,
                activated_at = EXCLUDED.activated_at,
                expires_at = EXCLUDED.expires_at,
                billing_period = EXCLUDED.billing_period,
                last_payment_id = EXCLUDED.last_payment_id,
                updated_at = now()
            "#,
        )
        .bind(entitlement.account_id)
        .bind(entitlement.plan.as_str())
        .bind(entitlement.activated_at)
        .bind(entitlement.expires_at)
        .bind(entitlement.billing.as_str())
        .bind(entitlement.last_payment_id.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE profiles SET plan = $1 WHERE account_id = $2")
            .bind(entitlement.plan.as_str())
            .bind(entitlement.account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CommitOutcome::Committed)
    }

    async fn record_unmatched(
        &self,
        record: &NewPaymentRecord,
    ) -> Result<CommitOutcome, EngineError> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_record(&mut tx, record).await?;
        tx.commit().await?;

        if inserted {
            Ok(CommitOutcome::Committed)
        } else {
            Ok(CommitOutcome::AlreadyProcessed)
        }
    }

    async fn append_failure(&self, failure: &NewFailureRecord) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO failure_records (payment_id, payer_email, raw_event)
            VALUES ($1, $2, $3)
            ON CONFLICT (payment_id) DO NOTHING
            "#,
        )
        .bind(failure.payment_id.as_str())
        .bind(&failure.payer_email)
        .bind(&failure.raw_event)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
