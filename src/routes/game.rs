use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        game::{CreateGameRequest, GameCreatedResponse, GameDetails},
        occupancy::{OccupancyResponse, RosterResponse},
    },
    error::AppError,
    services::{game_service, occupancy_service},
    state::SharedState,
};

/// Routes handling game creation and game-scoped reads.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/occupancy", get(get_occupancy))
        .route("/games/{id}/roster", get(get_roster))
}

/// Create a game and return its public join link.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameCreatedResponse),
        (status = 400, description = "Invalid terms or organiser not onboarded")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameCreatedResponse>, AppError> {
    let response = game_service::create_game(&state, payload).await?;
    Ok(Json(response))
}

/// Return a game's fixed terms.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game terms", body = GameDetails),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDetails>, AppError> {
    let details = game_service::get_game(&state, id).await?;
    Ok(Json(details))
}

/// Return the live reserved/capacity snapshot for a game.
#[utoipa::path(
    get,
    path = "/games/{id}/occupancy",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Current occupancy", body = OccupancyResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_occupancy(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OccupancyResponse>, AppError> {
    let occupancy = occupancy_service::live_occupancy(&state, id).await?;
    Ok(Json(occupancy))
}

/// Return the committed roster for a game, ordered by join time.
#[utoipa::path(
    get,
    path = "/games/{id}/roster",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Committed roster", body = RosterResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_roster(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterResponse>, AppError> {
    let roster = occupancy_service::roster(&state, id).await?;
    Ok(Json(roster))
}
