//! Application-level configuration, loaded once from the environment at
//! process start and injected through the shared state.

use std::env;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_CURRENCY: &str = "gbp";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGO_DB: &str = "kickabout";

/// Failures while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Public base URL used when building share and redirect links.
    pub site_url: String,
    /// ISO currency code every game is priced in.
    pub currency: String,
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// MongoDB connection URI.
    pub mongo_uri: String,
    /// MongoDB database name.
    pub mongo_db: String,
    /// API key for the payment processor.
    pub stripe_secret_key: String,
    /// Shared secret for webhook signature verification.
    pub stripe_webhook_secret: String,
}

impl AppConfig {
    /// Load the configuration, failing fast when a required secret is
    /// missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            site_url: optional("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_owned()),
            currency: optional("CURRENCY")
                .map(|value| value.to_lowercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            port: optional("PORT")
                .or_else(|| optional("SERVER_PORT"))
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            mongo_uri: optional("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.to_owned()),
            mongo_db: optional("MONGO_DB").unwrap_or_else(|| DEFAULT_MONGO_DB.to_owned()),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        };

        info!(
            site_url = %config.site_url,
            currency = %config.currency,
            port = config.port,
            "configuration loaded"
        );
        Ok(config)
    }

    fn base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    /// Public join page for a game, shared by the organiser.
    pub fn play_url(&self, game_id: Uuid) -> String {
        format!("{}/play/{game_id}", self.base())
    }

    /// Where the processor redirects a player after paying. The
    /// `{CHECKOUT_SESSION_ID}` placeholder is substituted processor-side.
    pub fn join_success_url(&self, game_id: Uuid) -> String {
        format!(
            "{}/play/{game_id}?success=1&session_id={{CHECKOUT_SESSION_ID}}",
            self.base()
        )
    }

    /// Where the processor redirects a player who abandoned checkout.
    pub fn join_cancel_url(&self, game_id: Uuid) -> String {
        format!("{}/play/{game_id}?canceled=1", self.base())
    }

    /// Where an interrupted onboarding flow restarts.
    pub fn onboarding_refresh_url(&self) -> String {
        format!("{}/create", self.base())
    }

    /// Where a completed onboarding flow lands.
    pub fn onboarding_return_url(&self, account_id: &str) -> String {
        format!("{}/create?accountId={account_id}", self.base())
    }
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::MissingEnvVar { var })
}
