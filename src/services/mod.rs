/// Checkout session initiation for paid joins.
pub mod checkout_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game creation and lookup.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Live occupancy projection over the roster.
pub mod occupancy_service;
/// Organiser payout-account connect flow.
pub mod organiser_service;
/// Payment-to-roster reconciliation (webhook and post-redirect paths).
pub mod reconcile_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor and degraded-mode handling.
pub mod storage_supervisor;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::SystemTime;

    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dao::{
            game_store::memory::MemoryGameStore,
            models::{GameEntity, OrganiserEntity},
        },
        money::Price,
        payments::fake::FakePaymentProvider,
        state::{AppState, SharedState},
    };

    pub(crate) struct TestHarness {
        pub state: SharedState,
        pub store: MemoryGameStore,
        pub payments: FakePaymentProvider,
    }

    pub(crate) fn test_config() -> AppConfig {
        AppConfig {
            site_url: "https://kickabout.test".to_owned(),
            currency: "gbp".to_owned(),
            port: 0,
            mongo_uri: "mongodb://unused".to_owned(),
            mongo_db: "unused".to_owned(),
            stripe_secret_key: "sk_test_123".to_owned(),
            stripe_webhook_secret: "whsec_test_123".to_owned(),
        }
    }

    /// State wired to an in-memory store and a fake payment provider, with
    /// storage already installed (not degraded).
    pub(crate) async fn harness() -> TestHarness {
        let payments = FakePaymentProvider::new();
        let store = MemoryGameStore::new();
        let state = AppState::new(test_config(), Arc::new(payments.clone()));
        state.set_game_store(Arc::new(store.clone())).await;
        TestHarness {
            state,
            store,
            payments,
        }
    }

    pub(crate) fn sample_game(price_minor: i64, capacity: u32) -> GameEntity {
        GameEntity {
            id: Uuid::new_v4(),
            title: "Thursday sixes".to_owned(),
            scheduled_at: None,
            location: Some("Powerleague Shoreditch".to_owned()),
            price: Price::from_minor_units(price_minor),
            currency: "gbp".to_owned(),
            capacity,
            organiser_email: "org@example.com".to_owned(),
            payout_account_id: "acct_org".to_owned(),
            created_at: SystemTime::now(),
        }
    }

    pub(crate) fn sample_organiser(email: &str, account: Option<&str>) -> OrganiserEntity {
        OrganiserEntity {
            email: email.to_owned(),
            payout_account_id: account.map(str::to_owned),
            created_at: SystemTime::now(),
        }
    }
}
