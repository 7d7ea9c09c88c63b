//! Payment-processor integration: checkout sessions, connected payout
//! accounts, and webhook authenticity checks.

mod error;
#[cfg(test)]
pub mod fake;
pub mod stripe;
pub mod types;
pub mod webhook;

pub use error::{PaymentError, PaymentResult};
pub use stripe::StripeClient;

use futures::future::BoxFuture;

use self::types::{CheckoutSession, ConnectedAccount, CreateSessionParams};

/// Abstraction over the hosted payment processor.
///
/// The process constructs exactly one provider at startup and injects it
/// into the shared state; components never reach for a global client. The
/// trait seam also lets the service tests run against an in-memory fake.
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session scoped to one game/player pair.
    fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> BoxFuture<'static, PaymentResult<CheckoutSession>>;
    /// Fetch a session by id; `None` when the processor does not know it.
    fn retrieve_session(
        &self,
        session_id: String,
    ) -> BoxFuture<'static, PaymentResult<Option<CheckoutSession>>>;
    /// Fetch a connected payout account and its enablement flags.
    fn retrieve_account(
        &self,
        account_id: String,
    ) -> BoxFuture<'static, PaymentResult<ConnectedAccount>>;
    /// Create a fresh express payout account for an organiser.
    fn create_account(&self, email: String)
    -> BoxFuture<'static, PaymentResult<ConnectedAccount>>;
    /// Mint an onboarding continuation link for a payout account.
    fn create_onboarding_link(
        &self,
        account_id: String,
        refresh_url: String,
        return_url: String,
    ) -> BoxFuture<'static, PaymentResult<String>>;
}
