// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied per route with `from_fn_with_state`:
//!
//! ```rust,ignore
//! let songs = Router::new()
//!     .route("/songs", post(create_song))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! Both variants attach an [`AuthenticatedSubject`] to the response so the
//! access log can record who made the request.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{claims::AuthenticatedSubject, AuthError, AuthenticatedUser, TokenValidator};
use crate::state::AppState;

/// Reject the request unless it carries a valid bearer token.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = match authenticate(&state.validator, request.headers()) {
        Ok(user) => user,
        Err(e) => {
            debug!(
                path = %request.uri().path(),
                reason = %e,
                "Rejecting unauthenticated request"
            );
            return e.into_response();
        }
    };

    let subject = AuthenticatedSubject(user.user_id.clone());
    request.extensions_mut().insert(user);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(subject);
    response
}

/// Attach an identity when a valid token is present; otherwise continue
/// anonymously.
pub async fn optional_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let subject = match authenticate(&state.validator, request.headers()) {
        Ok(user) => {
            let subject = AuthenticatedSubject(user.user_id.clone());
            request.extensions_mut().insert(user);
            Some(subject)
        }
        Err(AuthError::MissingAuthHeader) => None,
        Err(e) => {
            debug!(
                path = %request.uri().path(),
                reason = %e,
                "Ignoring invalid credentials on optional-auth route"
            );
            None
        }
    };

    let mut response = next.run(request).await;
    if let Some(subject) = subject {
        response.extensions_mut().insert(subject);
    }
    response
}

/// Validate the `Authorization` header and build the request identity.
pub fn authenticate(validator: &TokenValidator, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validator.validate(token)?;
    Ok(AuthenticatedUser::from_claims(claims, token))
}

/// Exactly `Bearer <token>`: two space-separated parts, the scheme literal.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}
