// crates/scoreboard-server/src/error.rs
// ============================================================================
// Module: Scoreboard API Errors
// Description: Request-level error taxonomy and HTTP status mapping.
// Purpose: Map every handler failure to a status and JSON body in one place.
// Dependencies: scoreboard-core, axum, serde, thiserror
// ============================================================================

//! ## Overview
//! Handlers return [`ApiError`] and never build failure responses by hand.
//! Each variant maps to exactly one HTTP status, and the response body is the
//! uniform `{success, message}` envelope. Rate-limit rejections carry a
//! `Retry-After` header and credential failures carry a `WWW-Authenticate`
//! challenge so well-behaved clients can recover without guessing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use scoreboard_core::StoreError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Challenge returned with credential failures on admin routes.
const BASIC_CHALLENGE: &str = "Basic realm=\"scoreboard-admin\"";

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Request-level API errors.
///
/// # Invariants
/// - Each variant maps to exactly one HTTP status via [`ApiError::status`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid request data.
    #[error("{0}")]
    Validation(String),
    /// Player name collides with a stored record.
    #[error("name already taken: {0}")]
    DuplicateName(String),
    /// Submissions are locked by an operator.
    #[error("submissions are currently locked")]
    Locked,
    /// Request body exceeds the configured size limit.
    #[error("request body exceeds size limit")]
    PayloadTooLarge,
    /// Source exceeded the submission rate limit.
    #[error("rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Whole seconds until the source may retry.
        retry_after_seconds: u64,
    },
    /// Missing or invalid admin credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Operation is refused by policy.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation conflicts with current service state.
    #[error("{0}")]
    Conflict(String),
    /// Storage-layer failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateName(_) => StatusCode::BAD_REQUEST,
            Self::Locked => StatusCode::LOCKED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(message) => Self::Validation(message),
            StoreError::DuplicateName(name) => Self::DuplicateName(name),
            StoreError::Forbidden(message) => Self::Forbidden(message),
            StoreError::SnapshotMissing(message) => Self::NotFound(message),
            StoreError::Io(_) | StoreError::Db(_) | StoreError::Corrupt(_) => {
                Self::Storage(err.to_string())
            }
            StoreError::VersionMismatch(_) => Self::Storage(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Response Mapping
// ============================================================================

/// Uniform failure envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Always `false` for failures.
    success: bool,
    /// Human-readable failure description.
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            Self::RateLimited {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        };
        let challenge = matches!(&self, Self::Unauthorized(_));
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after
            && let Ok(value) = HeaderValue::from_str(&seconds.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
        }
        response
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use super::*;

    /// Verifies the status mapping is stable across the taxonomy.
    #[test]
    fn status_mapping_is_stable() {
        assert_eq!(ApiError::Validation("bad".to_string()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateName("a".to_string()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Locked.status(), StatusCode::LOCKED);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::RateLimited {
                retry_after_seconds: 3
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Unauthorized("missing".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden("no".to_string()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("gone".to_string()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("busy".to_string()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Storage("broken".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    /// Verifies store errors convert onto the intended variants.
    #[test]
    fn store_errors_convert_to_api_errors() {
        assert!(matches!(
            ApiError::from(StoreError::DuplicateName("Alice".to_string())),
            ApiError::DuplicateName(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Invalid("count".to_string())),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Forbidden("protected".to_string())),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::SnapshotMissing("backup".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Db("locked".to_string())),
            ApiError::Storage(_)
        ));
    }

    /// Verifies the rate-limit response carries a retry hint header.
    #[test]
    fn rate_limited_response_has_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_seconds: 7,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).and_then(|value| value.to_str().ok()),
            Some("7")
        );
    }

    /// Verifies credential failures carry the Basic challenge.
    #[test]
    fn unauthorized_response_has_challenge() {
        let response = ApiError::Unauthorized("missing credential".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok()),
            Some(BASIC_CHALLENGE)
        );
    }
}
