//! In-memory [`GameStore`] used as a test double for the service layer.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, OrganiserEntity, RosterEntryEntity},
    storage::StorageResult,
};

/// Hash-map backed store with the same merge-upsert semantics as the MongoDB
/// backend: roster inserts are keyed by session id and replays are no-ops.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    games: HashMap<Uuid, GameEntity>,
    organisers: HashMap<String, OrganiserEntity>,
    roster: HashMap<String, RosterEntryEntity>,
}

impl MemoryGameStore {
    /// Fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of roster entries across all games.
    pub fn roster_len(&self) -> usize {
        self.inner.lock().unwrap().roster.len()
    }
}

impl GameStore for MemoryGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.lock().unwrap().games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.lock().unwrap().games.get(&id).cloned()) })
    }

    fn save_organiser(&self, organiser: OrganiserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .lock()
                .unwrap()
                .organisers
                .insert(organiser.email.clone(), organiser);
            Ok(())
        })
    }

    fn find_organiser(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<OrganiserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.lock().unwrap().organisers.get(&email).cloned()) })
    }

    fn upsert_roster_entry(
        &self,
        entry: RosterEntryEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut state = store.inner.lock().unwrap();
            if state.roster.contains_key(&entry.session_id) {
                return Ok(false);
            }
            state.roster.insert(entry.session_id.clone(), entry);
            Ok(true)
        })
    }

    fn list_roster_entries(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RosterEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let state = store.inner.lock().unwrap();
            let mut entries: Vec<RosterEntryEntity> = state
                .roster
                .values()
                .filter(|entry| entry.game_id == game_id)
                .cloned()
                .collect();
            entries.sort_by(|a, b| {
                a.joined_at
                    .cmp(&b.joined_at)
                    .then_with(|| a.session_id.cmp(&b.session_id))
            });
            Ok(entries)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
