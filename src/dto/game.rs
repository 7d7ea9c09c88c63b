use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::GameEntity,
    dto::format_system_time,
    money::{MoneyError, Price},
};

/// Payload used to create a new game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Display title shown on the join page.
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    /// Optional RFC3339 kick-off date/time.
    #[serde(default)]
    pub date: Option<String>,
    /// Optional pitch/venue description.
    #[serde(default)]
    pub location: Option<String>,
    /// Per-spot price in major currency units, as a number or string.
    #[schema(value_type = f64)]
    pub price: PriceInput,
    /// Maximum number of spots to sell.
    #[validate(range(min = 1, message = "capacity must be a positive integer"))]
    pub capacity: u32,
    /// Email identifying the organiser whose payout account receives the
    /// funds.
    #[serde(rename = "organiserRef", alias = "organiserEmail")]
    #[validate(email(message = "organiser reference must be an email address"))]
    pub organiser_email: String,
}

/// A decimal major-unit amount, accepted either as a JSON number or as a
/// string so callers never lose precision to binary floats.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// JSON number form, e.g. `4.995`.
    Number(serde_json::Number),
    /// String form, e.g. `"4.995"`.
    Text(String),
}

impl PriceInput {
    /// Convert to minor units, rounding half-up at the minor-unit boundary.
    ///
    /// Numbers are routed through their decimal rendering so `4.995` parses
    /// from the three digits the caller wrote, not from a binary float.
    pub fn to_price(&self) -> Result<Price, MoneyError> {
        match self {
            PriceInput::Number(number) => Price::parse_major(&number.to_string()),
            PriceInput::Text(text) => Price::parse_major(text),
        }
    }
}

/// Response returned once a game has been created.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameCreatedResponse {
    /// Identifier of the new game.
    pub game_id: Uuid,
    /// Public join link the organiser can share.
    pub share_url: String,
}

/// Public projection of a game's fixed terms.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    /// Game identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// RFC3339 kick-off date/time, when set.
    pub date: Option<String>,
    /// Pitch/venue description, when set.
    pub location: Option<String>,
    /// Per-spot price in major units, e.g. `"5.00"`.
    pub price: String,
    /// ISO currency code.
    pub currency: String,
    /// Maximum number of spots.
    pub capacity: u32,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

impl From<GameEntity> for GameDetails {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            title: game.title,
            date: game.scheduled_at.map(format_system_time),
            location: game.location,
            price: game.price.to_string(),
            currency: game.currency,
            capacity: game.capacity,
            created_at: format_system_time(game.created_at),
        }
    }
}
