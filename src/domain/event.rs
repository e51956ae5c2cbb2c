use {
    super::error::EngineError,
    super::id::PaymentId,
    super::record::NewFailureRecord,
    super::subscription::BillingPeriod,
    serde::Deserialize,
};

/// Wire envelope from the gateway: a `type` discriminator plus a payload
/// whose shape depends on it. An absent `type` deserializes as `Unknown` —
/// the gateway must never see an unrecognized event look like a failure.
#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub payload: EventPayload,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventType {
    #[serde(rename = "payment.captured")]
    Captured,

    #[serde(rename = "subscription.charged")]
    SubscriptionCharged,

    #[serde(rename = "payment.failed")]
    Failed,

    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
    pub payment: Option<PaymentEntity>,
    pub subscription: Option<SubscriptionEntity>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub email: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub notes: PaymentNotes,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentNotes {
    pub billing: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionEntity {
    pub plan_id: String,
}

/// Captures and renewals normalize into this single shape so there is
/// exactly one activation code path downstream.
#[derive(Debug, Clone)]
pub struct ActivationRequest {
    pub payment_id: PaymentId,
    pub payer_email: String,
    pub amount: i64,
    pub currency: String,
    pub billing: BillingPeriod,
    pub raw_event: serde_json::Value,
}

#[derive(Debug)]
pub enum EventRoute {
    Activation(ActivationRequest),
    Failure(NewFailureRecord),
    /// Unknown or unsupported type — acknowledge and drop.
    Acknowledge,
}

impl EventEnvelope {
    /// Classifier/router: map the declared type to exactly one handler input.
    /// A recognized type with a missing or malformed entity is a validation
    /// fault; an unrecognized type is not.
    pub fn route(self, raw_event: serde_json::Value) -> Result<EventRoute, EngineError> {
        match self.event_type {
            EventType::Captured => {
                let payment = require_payment(self.payload.payment, "payment.captured")?;
                let billing = payment
                    .notes
                    .billing
                    .as_deref()
                    .map(BillingPeriod::parse_or_monthly)
                    .unwrap_or_default();
                Ok(EventRoute::Activation(activation(payment, billing, raw_event)?))
            }
            EventType::SubscriptionCharged => {
                let payment = require_payment(self.payload.payment, "subscription.charged")?;
                let subscription = self.payload.subscription.ok_or_else(|| {
                    EngineError::Validation(
                        "subscription.charged event without subscription entity".into(),
                    )
                })?;
                let billing = BillingPeriod::from_plan_id(&subscription.plan_id);
                Ok(EventRoute::Activation(activation(payment, billing, raw_event)?))
            }
            EventType::Failed => {
                let payment = require_payment(self.payload.payment, "payment.failed")?;
                Ok(EventRoute::Failure(NewFailureRecord {
                    payment_id: PaymentId::new(payment.id)?,
                    payer_email: payment.email,
                    raw_event,
                }))
            }
            EventType::Unknown => Ok(EventRoute::Acknowledge),
        }
    }
}

fn require_payment(
    payment: Option<PaymentEntity>,
    event_type: &str,
) -> Result<PaymentEntity, EngineError> {
    payment.ok_or_else(|| {
        EngineError::Validation(format!("{event_type} event without payment entity"))
    })
}

fn activation(
    payment: PaymentEntity,
    billing: BillingPeriod,
    raw_event: serde_json::Value,
) -> Result<ActivationRequest, EngineError> {
    if payment.amount < 0 {
        return Err(EngineError::Validation("negative amount".into()));
    }
    Ok(ActivationRequest {
        payment_id: PaymentId::new(payment.id)?,
        payer_email: payment.email,
        amount: payment.amount,
        currency: payment.currency,
        billing,
        raw_event,
    })
}
