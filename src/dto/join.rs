use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_display_name;

/// Payload used to start the paid-join flow for a game.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Game being joined.
    pub game_id: Uuid,
    /// Display name to put on the roster once payment completes.
    pub name: String,
    /// Number of spots to claim; defaults to one.
    #[serde(default)]
    pub spots: Option<u32>,
}

impl Validate for JoinRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Redirect target for completing payment on the hosted checkout page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    /// URL the caller must follow to pay.
    pub redirect_url: String,
}

/// Payload sent by the browser returning from checkout.
///
/// Everything in here is advisory: the session is re-verified against the
/// payment processor before any roster change.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    /// Checkout session the redirect carried back.
    pub session_id: String,
    /// Game the caller believes it paid for; ignored in favour of the
    /// session's own metadata.
    pub game_id: Uuid,
}

/// Outcome of a confirmation attempt; safe to receive repeatedly.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmResponse {
    /// Always true when the request was processed without a hard error.
    pub ok: bool,
    /// Whether the session is (now) committed on the roster. False for
    /// sessions the processor does not consider paid.
    pub reconciled: bool,
}

/// Acknowledgement body returned to the webhook sender.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    /// Always true; the delivery has been fully reconciled.
    pub received: bool,
}
