// Inbound webhook receivers for Stripe and eSignatures

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use subtle::ConstantTimeEq;
use tracing::{error, warn};

use crate::{
    app::AppState,
    services::{
        agreement::AgreementService, billing::BillingService, esignatures::EsignWebhookPayload,
    },
};

/// Stripe event delivery. The body must be consumed raw because the
/// signature covers the exact bytes sent.
/// POST /webhooks/stripe
#[utoipa::path(
    post,
    path = "/webhooks/stripe",
    tag = "Webhooks",
    operation_id = "stripeWebhook",
    responses(
        (status = 200, description = "Event processed"),
        (status = 400, description = "Signature verification failed"),
        (status = 500, description = "Event processing failed")
    )
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let signature = match headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(sig) => sig,
        None => {
            warn!("Stripe webhook without signature header");
            return (StatusCode::BAD_REQUEST, "Missing stripe-signature header").into_response();
        },
    };

    let event = match state.stripe.verify_webhook_signature(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            warn!("Stripe webhook verification failed: {}", e);
            return (StatusCode::BAD_REQUEST, "Webhook signature verification failed")
                .into_response();
        },
    };

    let parsed = match state.stripe.parse_webhook_event(&event) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Failed to parse Stripe event {}: {}", event.id, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Webhook processing failed")
                .into_response();
        },
    };

    let billing = BillingService::new(&state);
    match billing.apply_webhook_event(parsed).await {
        Ok(()) => (StatusCode::OK, "Webhook processed successfully").into_response(),
        Err(e) => {
            error!("Failed to process Stripe event {}: {}", event.id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Webhook processing failed").into_response()
        },
    }
}

/// eSignatures event delivery, authenticated by the shared API token in
/// the Secret-Token header.
/// POST /webhooks/esignatures
#[utoipa::path(
    post,
    path = "/webhooks/esignatures",
    tag = "Webhooks",
    operation_id = "esignaturesWebhook",
    responses(
        (status = 200, description = "Event processed"),
        (status = 401, description = "Invalid secret token"),
        (status = 500, description = "Event processing failed")
    )
)]
pub async fn esignatures_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EsignWebhookPayload>,
) -> impl IntoResponse {
    let token = headers
        .get("secret-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let expected = state.esignatures.webhook_token();
    if token.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
        warn!("eSignatures webhook with bad secret token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let agreements = AgreementService::new(&state);
    match agreements.apply_webhook(payload).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            error!("Failed to process eSignatures webhook: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        },
    }
}
