// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only moderation and user management.
//!
//! Every handler takes [`AdminOnly`], which checks the caller's platform role
//! and yields the service-role client. Calls made with it bypass row-level
//! security, so nothing else in the crate can reach it.

use axum::{extract::Path, Json};
use serde_json::json;
use tracing::info;

use super::extract::{records, ValidJson};
use crate::{
    auth::{AdminOnly, Role},
    error::{ApiError, UpstreamResultExt},
    models::{
        ModerationResponse, Record, RoleUpdatedResponse, SongActionResponse, UpdateRoleRequest,
    },
    supabase::{eq, HEAVY_TIMEOUT},
};

#[utoipa::path(
    post,
    path = "/api/v1/admin/songs/{id}/takedown",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song taken down", body = SongActionResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn takedown_song(
    admin: AdminOnly,
    Path(song_id): Path<String>,
) -> Result<Json<SongActionResponse>, ApiError> {
    admin
        .service_role
        .post("/rest/v1/rpc/admin_takedown_song")
        .json(json!({ "song_id": song_id }))
        .send()
        .await
        .or_api_error("failed to takedown song")?;

    info!(admin_id = %admin.user.user_id, song_id = %song_id, "Song taken down");
    Ok(Json(SongActionResponse {
        message: "song taken down successfully".to_string(),
        song_id,
        is_published: None,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/comments/{id}",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = ModerationResponse),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn delete_comment(
    admin: AdminOnly,
    Path(comment_id): Path<String>,
) -> Result<Json<ModerationResponse>, ApiError> {
    admin
        .service_role
        .post("/rest/v1/rpc/admin_delete_comment")
        .json(json!({ "comment_id": comment_id }))
        .send()
        .await
        .or_api_error("failed to delete comment")?;

    info!(admin_id = %admin.user.user_id, comment_id = %comment_id, "Comment removed");
    Ok(Json(ModerationResponse {
        message: "comment deleted successfully".to_string(),
        comment_id: Some(comment_id),
        ..Default::default()
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/reviews/{id}",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = ModerationResponse),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn delete_review(
    admin: AdminOnly,
    Path(review_id): Path<String>,
) -> Result<Json<ModerationResponse>, ApiError> {
    admin
        .service_role
        .delete(format!("/rest/v1/reviews?id={}", eq(&review_id)))
        .send()
        .await
        .or_api_error("failed to delete review")?;

    info!(admin_id = %admin.user.user_id, review_id = %review_id, "Review removed");
    Ok(Json(ModerationResponse {
        message: "review deleted successfully".to_string(),
        review_id: Some(review_id),
        ..Default::default()
    }))
}

/// List every profile, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All profiles", body = Vec<Record>),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn list_users(admin: AdminOnly) -> Result<Json<Vec<Record>>, ApiError> {
    let response = admin
        .service_role
        .get("/rest/v1/profiles?select=*&order=created_at.desc")
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error("failed to fetch users")?;

    Ok(Json(records(&response, "failed to parse users")?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}/role",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleUpdatedResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn update_user_role(
    admin: AdminOnly,
    Path(user_id): Path<String>,
    ValidJson(request): ValidJson<UpdateRoleRequest>,
) -> Result<Json<RoleUpdatedResponse>, ApiError> {
    let role: Role = request
        .parsed_role()
        .ok_or_else(|| ApiError::bad_request("invalid request body"))?;

    admin
        .service_role
        .patch(format!("/rest/v1/profiles?id={}", eq(&user_id)))
        .json(json!({ "role": role.as_str() }))
        .send()
        .await
        .or_api_error("failed to update user role")?;

    info!(admin_id = %admin.user.user_id, user_id = %user_id, role = %role, "User role changed");
    Ok(Json(RoleUpdatedResponse {
        message: "user role updated successfully".to_string(),
        user_id,
        role,
    }))
}
