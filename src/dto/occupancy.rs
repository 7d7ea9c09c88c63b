use serde::Serialize;
use utoipa::ToSchema;

use crate::{dao::models::RosterEntryEntity, dto::format_system_time};

/// Live occupancy of a game: reserved spots vs. capacity.
///
/// `reserved` is recomputed from the roster on every read; under the
/// accepted join race it can exceed `capacity`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct OccupancyResponse {
    /// Sum of spots across all committed roster entries.
    pub reserved: u32,
    /// Maximum number of spots the organiser wanted to sell.
    pub capacity: u32,
}

/// Roster listing shown on the organiser dashboard and join page.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Committed entries ordered by join time.
    pub entries: Vec<RosterEntrySummary>,
}

/// Public projection of one roster entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntrySummary {
    /// Display name of the player.
    pub name: String,
    /// Spots this entry reserves.
    pub spots: u32,
    /// RFC3339 join timestamp.
    pub joined_at: String,
    /// RFC3339 payment timestamp.
    pub paid_at: String,
}

impl From<RosterEntryEntity> for RosterEntrySummary {
    fn from(entry: RosterEntryEntity) -> Self {
        Self {
            name: entry.name,
            spots: entry.spots,
            joined_at: format_system_time(entry.joined_at),
            paid_at: format_system_time(entry.paid_at),
        }
    }
}
