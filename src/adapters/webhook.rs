use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::EngineError, event::EventEnvelope},
        services::activation_pipeline::PipelineOutcome,
    },
    axum::{Json, extract::State, http::HeaderMap},
};

const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

/// Gateway webhook endpoint. Signature check runs on the raw body before
/// anything is parsed or any store round-trip happens; every recognized
/// outcome acknowledges with `{"received": true}` so the gateway stops
/// redelivering.
#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_type = tracing::field::Empty, payment_id = tracing::field::Empty)
)]
pub async fn gateway_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Absent header verifies identically to a mismatched signature.
    let sig = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !state.verifier.verify(body.as_bytes(), sig) {
        return Err(EngineError::Signature("missing or invalid gateway signature".into()).into());
    }

    let raw_event: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| EngineError::Validation(format!("malformed event body: {e}")))?;
    let envelope: EventEnvelope = serde_json::from_value(raw_event.clone())
        .map_err(|e| EngineError::Validation(format!("malformed event envelope: {e}")))?;

    let event_type = raw_event
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let payment_id = raw_event
        .pointer("/payload/payment/id")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    tracing::Span::current()
        .record("event_type", tracing::field::display(event_type))
        .record("payment_id", tracing::field::display(payment_id));

    let route = envelope.route(raw_event)?;
    let outcome = state.pipeline.handle(route).await?;

    match outcome {
        PipelineOutcome::Activated(account_id) => {
            tracing::info!(account_id = %account_id, "activation committed");
        }
        PipelineOutcome::Duplicate => {
            tracing::info!("duplicate delivery, no-op");
        }
        PipelineOutcome::Unmatched => {
            tracing::info!("unmatched payer, reconciliation record written");
        }
        PipelineOutcome::FailureLogged => {
            tracing::info!("failure event logged");
        }
        PipelineOutcome::Acknowledged => {
            tracing::info!("unrecognized event type, acknowledged");
        }
    }

    Ok(Json(serde_json::json!({"received": true})))
}
