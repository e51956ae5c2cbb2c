#![allow(dead_code)]

use {
    async_trait::async_trait,
    chrono::{DateTime, TimeZone, Utc},
    hmac::{Hmac, Mac},
    plan_sync::domain::{
        clock::Clock,
        error::EngineError,
        id::PaymentId,
        ports::{ClaimsPropagator, CommitOutcome, EntitlementStore, IdentityProvider},
        record::{NewFailureRecord, NewPaymentRecord, PaymentRecord},
        subscription::{AccountEntitlement, PlanTier},
    },
    sha2::Sha256,
    std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicBool, AtomicU64, Ordering},
        },
    },
    uuid::Uuid,
};

pub const TEST_SECRET: &str = "whsec_test_secret";

/// Hex HMAC-SHA256 over the body, the way the gateway signs deliveries.
pub fn sign(secret: &str, body: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

// ── Event builders ─────────────────────────────────────────────────────────

pub fn captured_event(payment_id: &str, email: &str, billing: Option<&str>) -> serde_json::Value {
    let mut payment = serde_json::json!({
        "id": payment_id,
        "email": email,
        "amount": 49900,
        "currency": "INR",
    });
    if let Some(billing) = billing {
        payment["notes"] = serde_json::json!({"billing": billing});
    }
    serde_json::json!({"type": "payment.captured", "payload": {"payment": payment}})
}

pub fn renewal_event(payment_id: &str, email: &str, plan_id: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "subscription.charged",
        "payload": {
            "payment": {"id": payment_id, "email": email, "amount": 49900, "currency": "INR"},
            "subscription": {"plan_id": plan_id},
        }
    })
}

pub fn failed_event(payment_id: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "payment.failed",
        "payload": {
            "payment": {"id": payment_id, "email": email, "amount": 49900, "currency": "INR"},
        }
    })
}

// ── Fakes for the injected collaborators ───────────────────────────────────

#[derive(Default)]
struct StoreState {
    records: HashMap<String, PaymentRecord>,
    entitlements: HashMap<Uuid, AccountEntitlement>,
    profiles: HashMap<Uuid, PlanTier>,
    failures: HashMap<String, NewFailureRecord>,
}

/// In-memory store. Commits hold one lock for the whole multi-record write,
/// so atomicity and the creation-only race behave like the real store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    ops: AtomicU64,
    writes: AtomicU64,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    /// Simulate a store outage: every mutating call errors without applying
    /// anything.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Total store calls, reads included. Zero after a rejected request
    /// means the request never reached the store at all.
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn record(&self, payment_id: &str) -> Option<PaymentRecord> {
        self.state.lock().unwrap().records.get(payment_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn entitlement(&self, account_id: Uuid) -> Option<AccountEntitlement> {
        self.state
            .lock()
            .unwrap()
            .entitlements
            .get(&account_id)
            .cloned()
    }

    pub fn entitlement_count(&self) -> usize {
        self.state.lock().unwrap().entitlements.len()
    }

    pub fn profile_plan(&self, account_id: Uuid) -> Option<PlanTier> {
        self.state.lock().unwrap().profiles.get(&account_id).copied()
    }

    pub fn failure_count(&self) -> usize {
        self.state.lock().unwrap().failures.len()
    }

    fn outage() -> EngineError {
        EngineError::Database(sqlx::Error::PoolTimedOut)
    }

    fn check_outage(&self) -> Result<(), EngineError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            Err(Self::outage())
        } else {
            Ok(())
        }
    }
}

fn stored(record: &NewPaymentRecord) -> PaymentRecord {
    PaymentRecord {
        payment_id: record.payment_id.as_str().to_string(),
        account_id: record.account_id,
        status: record.status,
        expires_at: record.expires_at,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl EntitlementStore for MemoryStore {
    async fn find_payment_record(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<PaymentRecord>, EngineError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .lock()
            .unwrap()
            .records
            .get(payment_id.as_str())
            .cloned())
    }

    async fn commit_activation(
        &self,
        entitlement: &AccountEntitlement,
        record: &NewPaymentRecord,
    ) -> Result<CommitOutcome, EngineError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;

        let mut state = self.state.lock().unwrap();
        if state.records.contains_key(record.payment_id.as_str()) {
            return Ok(CommitOutcome::AlreadyProcessed);
        }

        state
            .records
            .insert(record.payment_id.as_str().to_string(), stored(record));
        state
            .entitlements
            .insert(entitlement.account_id, entitlement.clone());
        state.profiles.insert(entitlement.account_id, entitlement.plan);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(CommitOutcome::Committed)
    }

    async fn record_unmatched(
        &self,
        record: &NewPaymentRecord,
    ) -> Result<CommitOutcome, EngineError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;

        let mut state = self.state.lock().unwrap();
        if state.records.contains_key(record.payment_id.as_str()) {
            return Ok(CommitOutcome::AlreadyProcessed);
        }
        state
            .records
            .insert(record.payment_id.as_str().to_string(), stored(record));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(CommitOutcome::Committed)
    }

    async fn append_failure(&self, failure: &NewFailureRecord) -> Result<(), EngineError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;

        let mut state = self.state.lock().unwrap();
        state
            .failures
            .entry(failure.payment_id.as_str().to_string())
            .or_insert_with(|| failure.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, Uuid>>,
}

impl MemoryIdentity {
    pub fn add_account(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_lowercase(), id);
        id
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn account_id_for_email(&self, email: &str) -> Result<Option<Uuid>, EngineError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&email.to_lowercase())
            .copied())
    }
}

#[derive(Default)]
pub struct MemoryClaims {
    pushes: Mutex<Vec<(Uuid, PlanTier, DateTime<Utc>)>>,
    fail: AtomicBool,
}

impl MemoryClaims {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn pushes(&self) -> Vec<(Uuid, PlanTier, DateTime<Utc>)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClaimsPropagator for MemoryClaims {
    async fn push_claims(
        &self,
        account_id: Uuid,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::Claims("identity provider unavailable".into()));
        }
        self.pushes
            .lock()
            .unwrap()
            .push((account_id, plan, expires_at));
        Ok(())
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
