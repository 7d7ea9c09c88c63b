use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::organiser::{AccountStatusResponse, ConnectRequest, ConnectResponse},
    error::AppError,
    services::organiser_service,
    state::SharedState,
};

/// Routes handling the organiser payout-account connect flow.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/organisers/connect", post(connect))
        .route("/organisers/{email}/status", get(status))
}

/// Connect (or reconnect) an organiser to a payout account and return an
/// onboarding continuation link.
#[utoipa::path(
    post,
    path = "/organisers/connect",
    tag = "organisers",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Account connected", body = ConnectResponse),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn connect(
    State(state): State<SharedState>,
    Json(payload): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, AppError> {
    let response = organiser_service::connect_organiser(&state, payload).await?;
    Ok(Json(response))
}

/// Report the enablement status of an organiser's payout account.
#[utoipa::path(
    get,
    path = "/organisers/{email}/status",
    tag = "organisers",
    params(("email" = String, Path, description = "Organiser email")),
    responses(
        (status = 200, description = "Account status", body = AccountStatusResponse),
        (status = 404, description = "Organiser or payout account not found")
    )
)]
pub async fn status(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<AccountStatusResponse>, AppError> {
    let response = organiser_service::account_status(&state, &email).await?;
    Ok(Json(response))
}
