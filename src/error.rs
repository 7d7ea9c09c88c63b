use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, money::MoneyError, payments::PaymentError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed mid-operation.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The organiser's payout destination is not payment-enabled yet.
    ///
    /// Carries an onboarding continuation URL when one could be minted, so
    /// callers can recover without manual support.
    #[error("organiser is not payment-enabled")]
    NotOnboarded {
        /// Remediation link for completing onboarding.
        onboarding_url: Option<String>,
    },
    /// A webhook delivery failed authentication; nothing was applied.
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),
    /// The payment processor failed transiently; safe to retry.
    #[error("payment processor unavailable")]
    Upstream(#[source] PaymentError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<PaymentError> for ServiceError {
    fn from(err: PaymentError) -> Self {
        ServiceError::Upstream(err)
    }
}

impl From<MoneyError> for ServiceError {
    fn from(err: MoneyError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Precondition failure the caller can act on.
    #[error("conflict: {message}")]
    Conflict {
        /// Human-readable description of the failed precondition.
        message: String,
        /// Onboarding continuation URL, when the conflict is a
        /// not-yet-onboarded organiser and a link could be minted.
        onboarding_url: Option<String>,
    },
    /// Service unavailable or degraded; the caller should retry.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::NotOnboarded { onboarding_url } => AppError::Conflict {
                message: "organiser is not payment-enabled yet".into(),
                onboarding_url,
            },
            ServiceError::InvalidSignature(message) => {
                AppError::BadRequest(format!("invalid webhook signature: {message}"))
            }
            ServiceError::Upstream(source) => AppError::ServiceUnavailable(source.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "onboardingUrl", skip_serializing_if = "Option::is_none")]
    onboarding_url: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let onboarding_url = match &self {
            AppError::Conflict { onboarding_url, .. } => onboarding_url.clone(),
            _ => None,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            onboarding_url,
        });

        (status, payload).into_response()
    }
}
