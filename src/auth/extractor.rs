// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Axum extractor guarding the admin routes.
//!
//! ```rust,ignore
//! async fn my_handler(_admin: AdminOnly) -> impl IntoResponse {
//!     // only reached with `Authorization: Bearer {ADMIN_API_KEY}`
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::AuthError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Domain separator for admin key comparison.
const KEY_CHECK_CONTEXT: &[u8] = b"furballs-admin-key";

/// Extractor that admits only requests carrying the admin key.
///
/// Rejects with 403 when no admin key is configured and with 401 when the
/// bearer token is missing or wrong.
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state.admin_api_key.as_deref().ok_or(AuthError::AdminDisabled)?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        if keys_match(expected, token.trim()) {
            Ok(AdminOnly)
        } else {
            tracing::warn!("rejected admin request with wrong key");
            Err(AuthError::InvalidToken)
        }
    }
}

/// Compare keys in constant time by comparing their MACs.
fn keys_match(expected: &str, provided: &str) -> bool {
    let digest = |key: &str| -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(KEY_CHECK_CONTEXT).ok()?;
        mac.update(key.as_bytes());
        Some(mac)
    };
    match (digest(expected), digest(provided)) {
        (Some(expected), Some(provided)) => expected
            .verify_slice(&provided.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AdminOnly, AuthError> {
        let mut builder = Request::builder().uri("/v1/admin/gallery");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AdminOnly::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn key_comparison() {
        assert!(keys_match("s3cret", "s3cret"));
        assert!(!keys_match("s3cret", "s3cre"));
        assert!(!keys_match("s3cret", ""));
    }

    #[tokio::test]
    async fn admin_routes_closed_without_key() {
        let state = AppState::in_memory();
        let err = extract(&state, Some("Bearer anything")).await.unwrap_err();
        assert!(matches!(err, AuthError::AdminDisabled));
    }

    #[tokio::test]
    async fn bearer_key_is_checked() {
        let state = AppState::in_memory().with_admin_key("s3cret");

        assert!(extract(&state, Some("Bearer s3cret")).await.is_ok());
        assert!(matches!(
            extract(&state, Some("Bearer wrong")).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            extract(&state, Some("Basic s3cret")).await,
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract(&state, None).await,
            Err(AuthError::MissingAuthHeader)
        ));
    }
}
