use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::occupancy::OccupancyResponse;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data
    /// field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast whenever a game's occupancy is (re)computed: on subscription
/// and after every committed reconciliation.
pub struct OccupancyEvent {
    /// Game the snapshot belongs to.
    pub game_id: Uuid,
    /// Fresh reserved/capacity snapshot.
    #[serde(flatten)]
    pub occupancy: OccupancyResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a paid session is committed onto the roster.
pub struct EntryCommittedEvent {
    /// Game the entry belongs to.
    pub game_id: Uuid,
    /// Display name of the player who joined.
    pub name: String,
    /// Spots the new entry reserves.
    pub spots: u32,
}
