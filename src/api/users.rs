// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints backed by Supabase Auth.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::{debug, info};

use super::extract::{first_record, ValidJson};
use crate::{
    auth::Auth,
    error::{ApiError, UpstreamResultExt},
    models::{AuthSession, LoginRequest, MessageResponse, Record, SignupRequest},
    state::AppState,
    supabase::{eq, HEAVY_TIMEOUT},
};

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthSession),
        (status = 400, description = "Invalid email or password"),
        (status = 502, description = "Supabase unavailable"),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    let response = state
        .supabase
        .post("/auth/v1/signup")
        .json(json!({
            "email": request.email,
            "password": request.password,
            "data": { "display_name": request.display_name },
        }))
        .send()
        .await
        .or_api_error("signup failed")?;

    let session: AuthSession = response
        .json()
        .map_err(|e| ApiError::forward(&e, "failed to parse response"))?;

    info!("Account created");
    Ok((StatusCode::CREATED, Json(session)))
}

/// Exchange email and password for a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = AuthSession),
        (status = 400, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<AuthSession>, ApiError> {
    let response = state
        .supabase
        .post("/auth/v1/token?grant_type=password")
        .json(json!({
            "email": request.email,
            "password": request.password,
        }))
        .send()
        .await
        .or_api_error("invalid credentials")?;

    let session: AuthSession = response
        .json()
        .map_err(|e| ApiError::forward(&e, "failed to parse response"))?;
    Ok(Json(session))
}

/// Get the Supabase Auth user behind the current token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Auth user", body = Record),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn me(State(state): State<AppState>, Auth(user): Auth) -> Result<Json<Record>, ApiError> {
    let response = state
        .supabase
        .get("/auth/v1/user")
        .as_user(Some(&user))
        .send()
        .await
        .or_api_error("failed to fetch user")?;

    let auth_user: Record = response
        .json()
        .map_err(|e| ApiError::forward(&e, "failed to parse user"))?;
    Ok(Json(auth_user))
}

/// Revoke the current session.
///
/// Succeeds even if Supabase reports the session as already gone.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = state
        .supabase
        .post("/auth/v1/logout")
        .as_user(Some(&user))
        .send()
        .await
        .map_err(|e| ApiError::forward(&e, "logout failed"))?;

    if !response.is_success() {
        debug!(status = %response.status, "Supabase logout returned non-success");
    }

    Ok(Json(MessageResponse::new("logged out successfully")))
}

/// Get the caller's row from the `profiles` table.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = Record),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "No profile for this user"),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Record>, ApiError> {
    let path = format!("/rest/v1/profiles?id={}&select=*", eq(&user.user_id));
    let response = state
        .supabase
        .get(path)
        .as_user(Some(&user))
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error("failed to fetch profile")?;

    let profile = first_record(
        &response,
        "failed to parse profile",
        ApiError::not_found("profile not found"),
    )?;
    Ok(Json(profile))
}
