//! Mapping of request failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::cooldown::ValidationError;
use crate::evaluator::EvaluationError;

/// Failures of `POST /check`.
///
/// `Display` is the message sent to the caller; detail in the variant fields
/// is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body was not a JSON check request.
    #[error("invalid request body")]
    InvalidBody {
        /// Decoder error.
        message: String,
    },

    /// A required field was missing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The bearer token was missing or rejected.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// A dependency failed or the check timed out.
    #[error("internal server error")]
    Internal {
        /// Failure detail for the server log.
        message: String,
    },
}

impl From<EvaluationError> for ApiError {
    fn from(error: EvaluationError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}

impl ApiError {
    /// HTTP status for the failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal { message } => tracing::error!(%message, "check failed"),
            Self::Unauthorized(AuthError::Rejected { source }) => {
                tracing::warn!(%source, "rejected bearer token");
            }
            Self::InvalidBody { message } => tracing::debug!(%message, "undecodable body"),
            Self::Validation(_) | Self::Unauthorized(AuthError::MissingCredential) => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
