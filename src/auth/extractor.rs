// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the request identity.
//!
//! The auth middleware validates the token and stores the identity in the
//! request extensions; these extractors only read it back:
//!
//! ```rust,ignore
//! async fn create_song(Auth(user): Auth, ...) -> Result<..., ApiError> {
//!     // user.user_id is the validated `sub` claim
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser};
use crate::{state::AppState, supabase::ServiceRoleClient};

/// Extractor for authenticated users.
///
/// Rejects with 401 when the request carries no identity, which only happens
/// if a handler is mounted without `require_auth`.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Optional authentication extractor.
///
/// `None` when the request is anonymous or its token failed validation under
/// `optional_auth`.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Extractor that requires the `admin` platform role.
///
/// On success it carries the service-role client; this is the only way
/// handler code can obtain one.
pub struct AdminOnly {
    pub user: AuthenticatedUser,
    pub service_role: ServiceRoleClient,
}

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        let service_role = state.admin_gate.authorize(&user, &state.supabase).await?;
        Ok(AdminOnly { user, service_role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::BearerToken;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/test").body(()).unwrap().into_parts().0
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "user_from_middleware".to_string(),
            email: "a@example.com".to_string(),
            token_role: "authenticated".to_string(),
            token: BearerToken::new("t"),
        }
    }

    #[tokio::test]
    async fn auth_rejects_without_identity() {
        let mut parts = parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_reads_identity_from_extensions() {
        let mut parts = parts();
        parts.extensions.insert(user());
        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.user_id, "user_from_middleware");
    }

    #[tokio::test]
    async fn optional_auth_never_rejects() {
        let mut anonymous = parts();
        let OptionalAuth(none) = OptionalAuth::from_request_parts(&mut anonymous, &()).await.unwrap();
        assert!(none.is_none());

        let mut signed_in = parts();
        signed_in.extensions.insert(user());
        let OptionalAuth(some) = OptionalAuth::from_request_parts(&mut signed_in, &()).await.unwrap();
        assert_eq!(some.unwrap().user_id, "user_from_middleware");
    }
}
