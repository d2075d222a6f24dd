// crates/scoreboard-server/src/auth.rs
// ============================================================================
// Module: Scoreboard Admin Authentication
// Description: HTTP Basic credential parsing and constant-time verification.
// Purpose: Guard maintenance routes behind the shared admin credential.
// Dependencies: scoreboard-core, axum, base64, subtle
// ============================================================================

//! ## Overview
//! Admin routes authenticate with HTTP Basic against a single shared
//! credential. The username portion is ignored; only the password is
//! compared, in constant time, against the configured value. Every denial
//! is reported through the audit sink with the action that was attempted.
//!
//! Security posture: minimize timing side-channels when comparing secret
//! inputs; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::HeaderMap;
use axum::http::header;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use scoreboard_core::AdminAuditEvent;
use scoreboard_core::AuditSink;
use subtle::ConstantTimeEq;

use crate::error::ApiError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted Authorization header size in bytes.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Constant-Time Comparisons
// ============================================================================

/// Compares two byte slices in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

// ============================================================================
// SECTION: Credential Parsing
// ============================================================================

/// Extracts the password portion of a Basic credential from headers.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the header is missing, oversized,
/// malformed, uses a different scheme, or decodes to a non-`user:password`
/// value.
pub fn parse_basic_password(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;
    if value.as_bytes().len() > MAX_AUTH_HEADER_BYTES {
        return Err(ApiError::Unauthorized("authorization header exceeds size limit".to_string()));
    }
    let text = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("authorization header is not valid utf-8".to_string()))?;
    let (scheme, payload) = text
        .split_once(' ')
        .ok_or_else(|| ApiError::Unauthorized("malformed authorization header".to_string()))?;
    if !scheme.eq_ignore_ascii_case("basic") || payload.trim().is_empty() {
        return Err(ApiError::Unauthorized("unsupported authorization scheme".to_string()));
    }
    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::Unauthorized("credential is not valid base64".to_string()))?;
    let credential = String::from_utf8(decoded)
        .map_err(|_| ApiError::Unauthorized("credential is not valid utf-8".to_string()))?;
    let (_user, password) = credential
        .split_once(':')
        .ok_or_else(|| ApiError::Unauthorized("credential must be user:password".to_string()))?;
    Ok(password.to_string())
}

// ============================================================================
// SECTION: Authorization
// ============================================================================

/// Authorizes an admin request against the shared credential.
///
/// Denials are recorded through the audit sink under `action` before the
/// error is returned.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the credential is missing,
/// malformed, or does not match.
pub fn require_admin(
    headers: &HeaderMap,
    expected: &str,
    sink: &dyn AuditSink,
    action: &'static str,
) -> Result<(), ApiError> {
    let password = match parse_basic_password(headers) {
        Ok(password) => password,
        Err(err) => {
            sink.record_admin(&AdminAuditEvent::new(action, "unauthorized", None));
            return Err(err);
        }
    };
    if !constant_time_eq_str(&password, expected) {
        sink.record_admin(&AdminAuditEvent::new(action, "unauthorized", None));
        return Err(ApiError::Unauthorized("invalid admin credential".to_string()));
    }
    Ok(())
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

    use axum::http::HeaderValue;
    use scoreboard_core::NoopAuditSink;

    use super::*;

    fn basic_headers(user: &str, password: &str) -> HeaderMap {
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        headers
    }

    /// Verifies a matching credential authorizes regardless of username.
    #[test]
    fn matching_credential_is_authorized() {
        let headers = basic_headers("operator", "hunter2hunter2");
        let result = require_admin(&headers, "hunter2hunter2", &NoopAuditSink, "rename");
        assert!(result.is_ok());
    }

    /// Verifies a wrong password is rejected.
    #[test]
    fn wrong_password_is_rejected() {
        let headers = basic_headers("operator", "wrong-password");
        let result = require_admin(&headers, "hunter2hunter2", &NoopAuditSink, "rename");
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    /// Verifies a missing header is rejected.
    #[test]
    fn missing_header_is_rejected() {
        let headers = HeaderMap::new();
        let result = require_admin(&headers, "hunter2hunter2", &NoopAuditSink, "rename");
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    /// Verifies the scheme comparison ignores case.
    #[test]
    fn scheme_comparison_ignores_case() {
        let encoded = STANDARD.encode("operator:hunter2hunter2");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("BASIC {encoded}")).unwrap(),
        );
        let result = require_admin(&headers, "hunter2hunter2", &NoopAuditSink, "rename");
        assert!(result.is_ok());
    }

    /// Verifies a non-Basic scheme is rejected.
    #[test]
    fn bearer_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        let result = require_admin(&headers, "hunter2hunter2", &NoopAuditSink, "rename");
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    /// Verifies a credential without a separator is rejected.
    #[test]
    fn credential_without_separator_is_rejected() {
        let encoded = STANDARD.encode("just-a-password");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        let result = parse_basic_password(&headers);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
