// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification of Supabase-issued access tokens.
//!
//! ## Security
//!
//! - Only HMAC algorithms (HS256/HS384/HS512) are accepted. The algorithm is
//!   checked before any key material is used, so a token announcing `RS256`
//!   or `none` fails closed even when no secret is configured.
//! - Expiry is enforced without leeway.
//! - The secret may be configured raw or base64-encoded.

use base64ct::{Base64, Encoding};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use super::{claims::TokenClaims, AuthError};

/// Algorithms a token may be signed with.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Tolerated clock difference for `iat` only.
const IAT_SKEW_SECS: i64 = 30;

/// Validates bearer tokens against the configured signing secret.
///
/// Pure: holds only key material and performs no I/O.
#[derive(Clone)]
pub struct TokenValidator {
    key: Option<DecodingKey>,
    audience: Option<String>,
}

impl TokenValidator {
    /// Create a validator from the configured secret.
    ///
    /// An empty secret yields a validator that rejects every token with
    /// [`AuthError::NotConfigured`].
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret();
        let key = if secret.is_empty() {
            None
        } else {
            Some(DecodingKey::from_secret(&decode_secret(secret)))
        };

        Self {
            key,
            audience: None,
        }
    }

    /// Require the `aud` claim to match.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Validate a compact JWT and return its claims.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::DisallowedAlgorithm(format!("{:?}", header.alg)));
        }

        let key = self.key.as_ref().ok_or(AuthError::NotConfigured)?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let claims = decode::<TokenClaims>(token, key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                ErrorKind::InvalidAlgorithm => {
                    AuthError::DisallowedAlgorithm(format!("{:?}", header.alg))
                }
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if let Some(iat) = claims.iat {
            if iat > chrono::Utc::now().timestamp() + IAT_SKEW_SECS {
                return Err(AuthError::TokenNotYetValid);
            }
        }

        Ok(claims)
    }
}

/// Base64 first, raw bytes when the value is not valid base64.
fn decode_secret(secret: &str) -> Vec<u8> {
    Base64::decode_vec(secret).unwrap_or_else(|_| secret.as_bytes().to_vec())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;

    /// Raw secret shared by tests. Contains `-`, so it is not valid base64.
    pub(crate) const TEST_SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    /// Sign an HS256 token for `sub` expiring `exp_offset_secs` from now.
    pub(crate) fn mint_token(secret: &[u8], sub: &str, exp_offset_secs: i64) -> String {
        mint_with(Algorithm::HS256, secret, sub, exp_offset_secs)
    }

    pub(crate) fn mint_with(alg: Algorithm, secret: &[u8], sub: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = json!({
            "sub": sub,
            "email": format!("{sub}@example.com"),
            "role": "authenticated",
            "aud": "authenticated",
            "iat": now - 10,
            "exp": now + exp_offset_secs,
            "iss": "https://project.supabase.co/auth/v1",
        });
        encode(&Header::new(alg), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }
}
