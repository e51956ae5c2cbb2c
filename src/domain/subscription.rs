use {
    super::error::EngineError,
    super::event::ActivationRequest,
    super::id::PaymentId,
    super::record::{NewPaymentRecord, RecordStatus},
    chrono::{DateTime, Duration, Utc},
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PlanTier {
    type Error = EngineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(EngineError::Validation(format!("unknown plan tier: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The gateway's `notes.billing` field is free-form; anything that isn't
    /// recognizably yearly falls back to monthly.
    pub fn parse_or_monthly(s: &str) -> Self {
        match s {
            "yearly" => Self::Yearly,
            _ => Self::Monthly,
        }
    }

    /// Renewal events carry no billing note — the period is inferred from the
    /// gateway plan identifier instead.
    pub fn from_plan_id(plan_id: &str) -> Self {
        if plan_id.contains("yearly") || plan_id.contains("annual") {
            Self::Yearly
        } else {
            Self::Monthly
        }
    }

    /// Fixed-offset billing policy: 30 days for monthly, 365 for yearly.
    /// Deliberately not calendar-aware (a yearly activation on Jan 1 of a
    /// leap year expires Dec 31) — period semantics are a product decision
    /// made upstream, not something this engine second-guesses.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Monthly => Duration::days(30),
            Self::Yearly => Duration::days(365),
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for BillingPeriod {
    type Error = EngineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::Validation(format!(
                "unknown billing period: {other}"
            ))),
        }
    }
}

/// Per-account subscription state. Written only by the atomic updater; the
/// rest of the application reads it as the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountEntitlement {
    pub account_id: Uuid,
    pub plan: PlanTier,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub billing: BillingPeriod,
    pub last_payment_id: PaymentId,
}

/// Target state computed by the state machine — everything the atomic
/// updater needs, nothing it has to look up itself.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// Matched account: upgrade to pro with a computed expiry.
    Activate {
        entitlement: AccountEntitlement,
        record: NewPaymentRecord,
    },
    /// No account for the payer. Terminal business outcome, not an error:
    /// record the payment for manual reconciliation and acknowledge.
    NoAccount { record: NewPaymentRecord },
}

/// Pure state machine: account-lookup result + billing period + "now" in,
/// full target state out. No side effects, no clock reads.
pub fn plan_activation(
    account_id: Option<Uuid>,
    request: &ActivationRequest,
    now: DateTime<Utc>,
) -> ActivationOutcome {
    match account_id {
        Some(account_id) => {
            let expires_at = now + request.billing.duration();
            let entitlement = AccountEntitlement {
                account_id,
                plan: PlanTier::Pro,
                activated_at: now,
                expires_at,
                billing: request.billing,
                last_payment_id: request.payment_id.clone(),
            };
            let record = NewPaymentRecord {
                payment_id: request.payment_id.clone(),
                account_id: Some(account_id),
                status: RecordStatus::Captured,
                expires_at: Some(expires_at),
                raw_event: request.raw_event.clone(),
            };
            ActivationOutcome::Activate { entitlement, record }
        }
        None => ActivationOutcome::NoAccount {
            record: NewPaymentRecord {
                payment_id: request.payment_id.clone(),
                account_id: None,
                status: RecordStatus::CapturedNoAccount,
                expires_at: None,
                raw_event: request.raw_event.clone(),
            },
        },
    }
}
