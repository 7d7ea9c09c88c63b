use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::join::{ConfirmRequest, ConfirmResponse, JoinRequest, JoinResponse},
    error::AppError,
    services::{checkout_service, reconcile_service},
    state::SharedState,
};

/// Routes handling the paid-join flow: checkout initiation and the
/// post-redirect confirmation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/join", post(join))
        .route("/confirm", post(confirm))
}

/// Start the paid-join flow and return the hosted checkout redirect.
#[utoipa::path(
    post,
    path = "/join",
    tag = "join",
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Checkout session created", body = JoinResponse),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Organiser not payment-enabled; body carries an onboarding URL when available")
    )
)]
pub async fn join(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    let response = checkout_service::initiate_join(&state, payload).await?;
    Ok(Json(response))
}

/// Confirm a session after the browser returns from checkout. Idempotent;
/// safe to call any number of times.
#[utoipa::path(
    post,
    path = "/confirm",
    tag = "join",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Confirmation processed", body = ConfirmResponse),
        (status = 404, description = "Session unknown to the payment processor")
    )
)]
pub async fn confirm(
    State(state): State<SharedState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let response = reconcile_service::confirm_return(&state, payload).await?;
    Ok(Json(response))
}
