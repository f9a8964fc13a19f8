// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// The variants are precise so the reason can be logged, but every token or
/// header failure renders the same external 401 body: callers probing forged
/// tokens cannot tell a bad signature from an expired token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    InvalidAuthHeader,
    /// Token is malformed or its claims do not decode
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token is not yet valid (`nbf` or `iat` in the future)
    TokenNotYetValid,
    /// Token audience is invalid
    InvalidAudience,
    /// Token uses a non-HMAC signing algorithm
    DisallowedAlgorithm(String),
    /// No signing secret is configured
    NotConfigured,
    /// Handler asked for an identity the request does not carry
    Unauthenticated,
    /// Authenticated, but not allowed to perform this operation
    InsufficientPermissions,
    /// The caller's role could not be determined
    RoleLookupFailed(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Error code exposed to clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::RoleLookupFailed(_) => "permission_check_failed",
            _ => "unauthorized",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::RoleLookupFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable message rendered to clients.
    fn public_message(&self) -> &'static str {
        match self {
            AuthError::InsufficientPermissions => "insufficient permissions for this operation",
            AuthError::RoleLookupFailed(_) => "unable to verify permissions",
            _ => "unauthorized",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenNotYetValid => write!(f, "Token is not yet valid"),
            AuthError::InvalidAudience => write!(f, "Token audience is invalid"),
            AuthError::DisallowedAlgorithm(alg) => {
                write!(f, "Token signing algorithm {alg} is not allowed")
            }
            AuthError::NotConfigured => write!(f, "Token signing secret is not configured"),
            AuthError::Unauthenticated => write!(f, "Request carries no authenticated identity"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::RoleLookupFailed(msg) => write!(f, "Role lookup failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message().to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AuthError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn token_failures_share_one_generic_body() {
        let expected = body_of(AuthError::TokenExpired).await;
        for error in [
            AuthError::MissingAuthHeader,
            AuthError::InvalidAuthHeader,
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::DisallowedAlgorithm("RS256".to_string()),
            AuthError::NotConfigured,
            AuthError::Unauthenticated,
        ] {
            assert_eq!(body_of(error).await, expected);
        }
        assert_eq!(expected.0, StatusCode::UNAUTHORIZED);
        assert_eq!(expected.1["error"], "unauthorized");
    }

    #[tokio::test]
    async fn algorithm_name_is_not_leaked() {
        let (_, body) = body_of(AuthError::DisallowedAlgorithm("RS256".to_string())).await;
        assert!(!body.to_string().contains("RS256"));
    }

    #[tokio::test]
    async fn insufficient_permissions_returns_403() {
        let (status, body) = body_of(AuthError::InsufficientPermissions).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_code"], "insufficient_permissions");
    }

    #[tokio::test]
    async fn role_lookup_failure_returns_503() {
        let (status, body) = body_of(AuthError::RoleLookupFailed("timeout".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.to_string().contains("timeout"));
    }
}
