// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the request-scoped identity built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Claims carried by a Supabase access token.
///
/// Supabase tokens carry standard registered claims plus `email` and the
/// token `role` (`anon` or `authenticated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID) - the Supabase auth user UUID
    pub sub: String,

    /// User email (empty for tokens without one)
    #[serde(default)]
    pub email: String,

    /// Token role (`anon` or `authenticated`)
    #[serde(default)]
    pub role: String,

    /// Audience (validated only when an expected audience is configured)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// The raw bearer token a request was authenticated with.
///
/// Kept so the token can be re-forwarded to Supabase, letting row-level
/// security evaluate the caller's own identity. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Authenticated caller of the current request.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers through the `Auth` / `OptionalAuth` extractors. Exists either
/// fully populated from a validated token or not at all.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    /// Email address from the token
    pub email: String,

    /// Token role (`authenticated` for signed-in users)
    pub token_role: String,

    /// Original token, re-forwarded on user-scoped calls
    pub token: BearerToken,
}

impl AuthenticatedUser {
    /// Build the identity from validated claims and the token they came from.
    pub fn from_claims(claims: TokenClaims, token: impl Into<String>) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            token_role: claims.role,
            token: BearerToken::new(token),
        }
    }
}

/// Subject attached to a response so the access log can name the caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject(pub String);
