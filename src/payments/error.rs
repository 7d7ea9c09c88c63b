//! Error types shared by the payment-processor client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`PaymentError`] failures.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Failures that can occur while talking to the payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build payment-processor client")]
    ClientBuilder {
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },
    /// The request never produced a response (timeout, connection refused).
    /// Safe to retry; no state was observed to change.
    #[error("failed to send payment-processor request to `{path}`")]
    RequestSend {
        /// Request path relative to the API base.
        path: String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },
    /// The processor answered with a non-success status.
    #[error("payment processor returned {status} for `{path}`: {message}")]
    Api {
        /// Request path relative to the API base.
        path: String,
        /// HTTP status of the response.
        status: StatusCode,
        /// Message extracted from the error body, when present.
        message: String,
    },
    /// Response payload could not be parsed into the expected model.
    #[error("failed to decode payment-processor response for `{path}`")]
    DecodeResponse {
        /// Request path relative to the API base.
        path: String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },
    /// A freshly created session came back without a redirect URL.
    #[error("checkout session `{id}` has no redirect URL")]
    MissingRedirectUrl {
        /// Session id returned by the processor.
        id: String,
    },
}

impl PaymentError {
    /// Whether the failure was a plain 404 from the processor.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PaymentError::Api {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }
}
