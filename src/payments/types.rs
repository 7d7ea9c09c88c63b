use serde::Deserialize;
use uuid::Uuid;

use crate::money::Price;

/// Everything needed to create a checkout session for one join attempt.
///
/// The metadata fields are the only channel through which reconciliation
/// later learns who paid; nothing about the player is re-read from the
/// confirming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionParams {
    /// Game being joined.
    pub game_id: Uuid,
    /// Display name the player gave.
    pub display_name: String,
    /// Number of spots being claimed.
    pub spots: u32,
    /// Per-spot charge amount.
    pub amount: Price,
    /// ISO currency code for the charge.
    pub currency: String,
    /// Line-item label shown on the hosted checkout page.
    pub product_name: String,
    /// Connected account the funds are routed to.
    pub destination_account: String,
    /// Stable key deduplicating repeated initiation requests.
    pub idempotency_key: String,
    /// Where the processor sends the player after paying.
    pub success_url: String,
    /// Where the processor sends the player after cancelling.
    pub cancel_url: String,
}

/// Payment state of a checkout session as reported by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds captured; the session may be reconciled onto the roster.
    Paid,
    /// Checkout started but not completed.
    Unpaid,
    /// Zero-amount session; never produced by this application.
    NoPaymentRequired,
    /// Any status this version does not know about.
    #[serde(other)]
    Unknown,
}

/// Join details attached to a session at creation time.
///
/// The processor stores metadata values as strings, so numeric fields come
/// back as strings and every field may be absent on sessions this
/// application did not create. Validation happens in the reconciler, which
/// rejects rather than defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionMetadata {
    /// Game the session pays for.
    #[serde(rename = "gameId")]
    pub game_id: Option<String>,
    /// Display name supplied at join time.
    pub name: Option<String>,
    /// Decimal spot count supplied at join time.
    pub spots: Option<String>,
}

/// Customer block the processor fills in during checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    /// Name the customer entered on the hosted page.
    pub name: Option<String>,
    /// Email the customer entered on the hosted page.
    pub email: Option<String>,
}

/// A checkout session as returned by the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Processor-assigned session id; the roster idempotency key.
    pub id: String,
    /// Hosted checkout URL, present while the session is open.
    #[serde(default)]
    pub url: Option<String>,
    /// Current payment state.
    pub payment_status: PaymentStatus,
    /// Join details attached at creation time.
    #[serde(default)]
    pub metadata: Option<SessionMetadata>,
    /// Customer details captured during checkout.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

/// A connected payout account and its enablement flags.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectedAccount {
    /// Processor-assigned account id.
    pub id: String,
    /// Whether the account may accept charges.
    #[serde(default)]
    pub charges_enabled: bool,
    /// Whether the account may receive payouts.
    #[serde(default)]
    pub payouts_enabled: bool,
}

impl ConnectedAccount {
    /// An account can be the destination of a join charge only when both
    /// charges and payouts are enabled.
    pub fn payment_enabled(&self) -> bool {
        self.charges_enabled && self.payouts_enabled
    }
}

/// Body of an account-link creation response.
#[derive(Debug, Deserialize)]
pub struct AccountLink {
    /// Single-use onboarding continuation URL.
    pub url: String,
}
