//! Webhook event payloads and signature verification.
//!
//! The processor signs every webhook delivery with a shared secret: the
//! header carries a unix timestamp `t` and one or more hex HMAC-SHA256
//! signatures `v1` computed over `"{t}.{raw body}"`. Verification must
//! happen on the raw bytes before the payload is parsed or acted upon; a
//! failed check produces no side effect anywhere downstream.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
/// Event type emitted when a checkout session finishes.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
/// Maximum accepted age of a signed delivery, limiting replay of captured
/// payloads.
const SIGNATURE_TOLERANCE: Duration = Duration::from_secs(300);

/// Reasons a webhook delivery fails authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No `t=` element in the header.
    #[error("signature header has no timestamp")]
    MissingTimestamp,
    /// No `v1=` element in the header.
    #[error("signature header has no v1 signature")]
    MissingSignature,
    /// The `t=` element is not an integer.
    #[error("signature header timestamp is malformed")]
    MalformedTimestamp,
    /// The delivery is older than the tolerance window.
    #[error("signed payload is outside the tolerance window")]
    Expired,
    /// No candidate signature matches the payload.
    #[error("no signature matches the payload")]
    Mismatch,
}

/// Verify a raw webhook body against its signature header.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: SystemTime,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for element in header.split(',') {
        let Some((key, value)) = element.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = Some(value),
            "v1" => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if candidates.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    let issued: u64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MalformedTimestamp)?;
    let now_secs = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    if now_secs.saturating_sub(issued) > SIGNATURE_TOLERANCE.as_secs() {
        return Err(SignatureError::Expired);
    }

    for candidate in candidates {
        let Ok(bytes) = hex::decode(candidate) else {
            continue;
        };
        // Mac::verify_slice compares in constant time.
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&bytes).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

/// Envelope of a webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Processor-assigned event id.
    pub id: String,
    /// Event type, e.g. [`CHECKOUT_SESSION_COMPLETED`].
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload wrapper.
    pub data: WebhookEventData,
}

/// Payload wrapper inside a webhook envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    /// The embedded API object; its shape depends on the event type.
    pub object: serde_json::Value,
}

/// Build a valid signature header for a payload (test support).
#[cfg(test)]
pub fn sign_for_tests(payload: &[u8], secret: &str, issued: u64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(issued.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={issued},v1={signature}")
}
