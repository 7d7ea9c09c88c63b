use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::GameEntity,
    dto::{
        game::{CreateGameRequest, GameCreatedResponse, GameDetails},
        parse_rfc3339,
    },
    error::ServiceError,
    state::SharedState,
};

/// Create a game from an organiser's terms.
///
/// The organiser's payout account is resolved once, here, and snapshotted
/// onto the game record; later changes to the organiser's account do not
/// retroactively alter where a live game's funds are routed.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameCreatedResponse, ServiceError> {
    request.validate()?;

    let price = request.price.to_price()?;
    if price.is_zero() {
        return Err(ServiceError::InvalidInput(
            "price must be greater than zero".into(),
        ));
    }

    let scheduled_at = request
        .date
        .as_deref()
        .map(|raw| {
            parse_rfc3339(raw)
                .map_err(|err| ServiceError::InvalidInput(format!("date is not RFC3339: {err}")))
        })
        .transpose()?;

    let store = state.require_game_store().await?;
    let email = request.organiser_email.trim().to_lowercase();
    let organiser = store.find_organiser(email.clone()).await?.ok_or_else(|| {
        ServiceError::InvalidInput(format!("organiser `{email}` is not onboarded"))
    })?;
    let Some(payout_account_id) = organiser.payout_account_id else {
        return Err(ServiceError::InvalidInput(format!(
            "organiser `{email}` has no connected payout account"
        )));
    };

    let game = GameEntity {
        id: Uuid::new_v4(),
        title: request.title.trim().to_owned(),
        scheduled_at,
        location: request.location.filter(|value| !value.trim().is_empty()),
        price,
        currency: state.config().currency.clone(),
        capacity: request.capacity,
        organiser_email: email,
        payout_account_id,
        created_at: SystemTime::now(),
    };

    store.save_game(game.clone()).await?;
    info!(game_id = %game.id, title = %game.title, capacity = game.capacity, "game created");

    Ok(GameCreatedResponse {
        game_id: game.id,
        share_url: state.config().play_url(game.id),
    })
}

/// Fetch a game's fixed terms.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameDetails, ServiceError> {
    let store = state.require_game_store().await?;
    let game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;
    Ok(game.into())
}
