use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Payload used to connect an organiser to a payout account.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConnectRequest {
    /// Organiser email; the natural key of the organiser record.
    #[validate(email(message = "organiser email is not valid"))]
    pub email: String,
}

/// Result of the connect flow: account handle, remediation link, and the
/// current enablement flags.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    /// Connected payout account id.
    pub account_id: String,
    /// Onboarding continuation URL for completing any remaining
    /// requirements.
    pub url: String,
    /// Whether the account may accept charges.
    pub charges_enabled: bool,
    /// Whether the account may receive payouts.
    pub payouts_enabled: bool,
}

/// Enablement status of an organiser's payout account.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusResponse {
    /// Connected payout account id.
    pub account_id: String,
    /// Whether the account may accept charges.
    pub charges_enabled: bool,
    /// Whether the account may receive payouts.
    pub payouts_enabled: bool,
}
