mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::game_store::GameStore, error::ServiceError, payments::PaymentProvider,
};

pub use self::sse::SseHub;
use self::sse::SseState;

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding the injected external-service handles
/// and the per-game event hubs.
///
/// Both client handles are constructed once at process start and passed by
/// reference to the components that need them; nothing in the crate caches
/// a service client in module-level state.
pub struct AppState {
    config: AppConfig,
    payments: Arc<dyn PaymentProvider>,
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    sse: SseState,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed by the supervisor.
    pub fn new(config: AppConfig, payments: Arc<dyn PaymentProvider>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            payments,
            game_store: RwLock::new(None),
            sse: SseState::new(16),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the payment processor.
    pub fn payments(&self) -> &Arc<dyn PaymentProvider> {
        &self.payments
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// The current game store, or [`ServiceError::Degraded`] when storage is
    /// not available yet.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Broadcast hub for one game's live event stream, created on first use.
    pub fn game_events(&self, game_id: uuid::Uuid) -> SseHub {
        self.sse.hub(game_id)
    }
}
