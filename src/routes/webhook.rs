use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::{
    dto::join::WebhookAck,
    error::AppError,
    payments::webhook::SIGNATURE_HEADER,
    services::reconcile_service,
    state::SharedState,
};

/// Route receiving asynchronous payment confirmations.
pub fn router() -> Router<SharedState> {
    Router::new().route("/webhook", post(stripe_webhook))
}

/// Receive a webhook delivery from the payment processor.
///
/// The handler takes the raw body: signature verification must run over the
/// exact bytes the processor signed, before any parsing.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "webhook",
    request_body = String,
    responses(
        (status = 200, description = "Delivery verified and reconciled", body = WebhookAck),
        (status = 400, description = "Invalid signature or malformed payload")
    )
)]
pub async fn stripe_webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    reconcile_service::process_webhook(&state, &body, signature).await?;
    Ok(Json(WebhookAck { received: true }))
}
