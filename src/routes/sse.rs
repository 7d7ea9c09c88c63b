use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppError,
    services::{occupancy_service, sse_service},
    state::SharedState,
};

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/games/{id}", get(game_stream))
}

/// Stream a game's live occupancy and roster events.
#[utoipa::path(
    get,
    path = "/sse/games/{id}",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game event stream", content_type = "text/event-stream", body = String),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_stream(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    // Resolving occupancy up front both rejects unknown games and gives the
    // new subscriber (and everyone else on the hub) a fresh snapshot.
    let occupancy = occupancy_service::live_occupancy(&state, id).await?;
    let receiver = sse_service::subscribe(&state, id);
    info!(game_id = %id, "new game SSE connection");
    sse_service::broadcast_occupancy(&state.game_events(id), id, occupancy);
    Ok(sse_service::to_sse_stream(receiver, id))
}
