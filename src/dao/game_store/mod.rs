#[cfg(test)]
pub mod memory;
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{GameEntity, OrganiserEntity, RosterEntryEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for games, roster entries, and
/// organiser records.
///
/// Roster writes are merge-upserts keyed by the checkout session id; the
/// backend guarantees each upsert is atomic per document, which is the only
/// property reconciliation relies on for correctness under concurrent and
/// re-delivered confirmations.
pub trait GameStore: Send + Sync {
    /// Persist a freshly created game.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Create or replace an organiser record.
    fn save_organiser(&self, organiser: OrganiserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up an organiser by lowercased email.
    fn find_organiser(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<OrganiserEntity>>>;
    /// Insert a roster entry if no entry with its session id exists yet.
    ///
    /// Returns `true` when the entry was newly inserted and `false` when an
    /// entry for the session id was already present (in which case nothing
    /// is modified, so replays never move `paid_at` or duplicate spots).
    fn upsert_roster_entry(
        &self,
        entry: RosterEntryEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// All roster entries for a game, ordered by join time.
    fn list_roster_entries(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RosterEntryEntity>>>;
    /// Cheap liveness probe against the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a dropped backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
