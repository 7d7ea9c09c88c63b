use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::money::Price;

/// A game as persisted by the storage layer.
///
/// Everything here is fixed when the organiser creates the game: players
/// never mutate it, and the payout destination is snapshotted so that later
/// changes to the organiser's account do not retroactively reroute a live
/// game's funds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display title shown on the join page.
    pub title: String,
    /// Kick-off date/time, when the organiser provided one.
    pub scheduled_at: Option<SystemTime>,
    /// Free-form pitch/venue description.
    pub location: Option<String>,
    /// Per-spot price in minor currency units.
    pub price: Price,
    /// ISO currency code the price is denominated in.
    pub currency: String,
    /// Maximum number of spots the organiser wants to sell.
    pub capacity: u32,
    /// Lowercased email of the organiser who created the game.
    pub organiser_email: String,
    /// Payout account the organiser had connected at creation time.
    pub payout_account_id: String,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}

/// A committed, paid reservation against a game.
///
/// The checkout session id doubles as the primary key, which is what makes
/// reconciliation idempotent: re-delivering the same payment confirmation
/// maps onto the same row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntryEntity {
    /// Checkout session that paid for this entry.
    pub session_id: String,
    /// Game the entry belongs to.
    pub game_id: Uuid,
    /// Display name the player gave when joining.
    pub name: String,
    /// Number of spots this entry reserves (>= 1).
    pub spots: u32,
    /// When the entry was committed to the roster.
    pub joined_at: SystemTime,
    /// When the payment was confirmed. Set once, never moved by replays.
    pub paid_at: SystemTime,
}

/// An organiser record, keyed by lowercased email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganiserEntity {
    /// Lowercased email address, the natural key of the record.
    pub email: String,
    /// Connected payout account, present once the connect flow has run.
    pub payout_account_id: Option<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
}
