//! Kickabout backend binary entrypoint wiring REST, SSE, MongoDB, and the
//! payment-processor layers.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kickabout_back::{
    config::AppConfig,
    dao::{
        game_store::{
            GameStore,
            mongodb::{MongoGameStore, config::MongoConfig},
        },
        storage::StorageError,
    },
    payments::StripeClient,
    routes,
    services::storage_supervisor,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    let payments =
        StripeClient::new(config.stripe_secret_key.clone()).context("building payment client")?;
    let state = AppState::new(config.clone(), Arc::new(payments));

    // Storage is supervised in the background; the server starts in
    // degraded mode and begins accepting work once the store is installed.
    let mongo_uri = config.mongo_uri.clone();
    let mongo_db = config.mongo_db.clone();
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let uri = mongo_uri.clone();
        let db = mongo_db.clone();
        async move { connect_store(&uri, &db).await }
    }));

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Connect the MongoDB backend and hand it back as a store trait object.
async fn connect_store(uri: &str, db: &str) -> Result<Arc<dyn GameStore>, StorageError> {
    let config = MongoConfig::from_uri(uri, db).await?;
    let store = MongoGameStore::connect(config).await?;
    Ok(Arc::new(store))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: kickabout_back::state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
