use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::sse::ServerEvent;

/// SSE-specific sub-state carved out from [`super::AppState`]: one broadcast
/// hub per game, created lazily when the first subscriber or publisher
/// touches it.
pub struct SseState {
    games: DashMap<Uuid, SseHub>,
    capacity: usize,
}

impl SseState {
    /// Build the SSE sub-tree with the per-hub channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            games: DashMap::new(),
            capacity,
        }
    }

    /// Hub for one game's stream, creating it on first use.
    pub fn hub(&self, game_id: Uuid) -> SseHub {
        self.games
            .entry(game_id)
            .or_insert_with(|| SseHub::new(self.capacity))
            .clone()
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
#[derive(Clone)]
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the
    /// given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
