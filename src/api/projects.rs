// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Collaborative projects, invitations and stems.
//!
//! Every route here requires authentication. Row visibility is left to the
//! database policies evaluated against the caller's token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;

use super::extract::{first_record, records, ValidJson};
use crate::{
    auth::Auth,
    error::{ApiError, UpstreamResultExt},
    models::{CreateProjectRequest, CreateStemRequest, InviteRequest, Record},
    state::AppState,
    supabase::{eq, HEAVY_TIMEOUT},
};

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Projects owned by the caller", body = Vec<Record>),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<Record>>, ApiError> {
    let path = format!(
        "/rest/v1/projects?owner_id={}&select=*&order=created_at.desc",
        eq(&user.user_id)
    );
    let response = state
        .supabase
        .get(path)
        .as_user(Some(&user))
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error("failed to fetch projects")?;

    Ok(Json(records(&response, "failed to parse projects")?))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    security(("bearer" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Record),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(request): ValidJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let response = state
        .supabase
        .post("/rest/v1/projects")
        .json(json!({
            "owner_id": user.user_id,
            "title": request.title,
        }))
        .as_user(Some(&user))
        .return_representation()
        .send()
        .await
        .or_api_error("failed to create project")?;

    let project = first_record(
        &response,
        "failed to parse response",
        ApiError::bad_gateway("no project returned from database"),
    )?;

    info!(user_id = %user.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = Record),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Project not found or not visible"),
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(project_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let path = format!("/rest/v1/projects?id={}&select=*", eq(&project_id));
    let response = state
        .supabase
        .get(path)
        .as_user(Some(&user))
        .send()
        .await
        .or_api_error("failed to fetch project")?;

    let project = first_record(
        &response,
        "failed to parse project",
        ApiError::not_found("project not found"),
    )?;
    Ok(Json(project))
}

/// Invite a collaborator to a project.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/invite",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project ID")),
    request_body = InviteRequest,
    responses(
        (status = 201, description = "Invitation created", body = Record),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn invite_to_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(project_id): Path<String>,
    ValidJson(request): ValidJson<InviteRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let response = state
        .supabase
        .post("/rest/v1/project_invitations")
        .json(json!({
            "project_id": project_id,
            "invitee_id": request.invitee_id,
        }))
        .as_user(Some(&user))
        .return_representation()
        .send()
        .await
        .or_api_error("failed to create invitation")?;

    let invitation = first_record(
        &response,
        "failed to parse response",
        ApiError::bad_gateway("no invitation returned from database"),
    )?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Register stem metadata for a project. The caller is recorded as uploader.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/stems",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project ID")),
    request_body = CreateStemRequest,
    responses(
        (status = 201, description = "Stem created", body = Record),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_stem(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(project_id): Path<String>,
    ValidJson(request): ValidJson<CreateStemRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let response = state
        .supabase
        .post("/rest/v1/stems")
        .json(json!({
            "project_id": project_id,
            "uploader_id": user.user_id,
            "name": request.name,
            "file_url": request.file_url,
        }))
        .as_user(Some(&user))
        .return_representation()
        .send()
        .await
        .or_api_error("failed to create stem")?;

    let stem = first_record(
        &response,
        "failed to parse response",
        ApiError::bad_gateway("no stem returned from database"),
    )?;
    Ok((StatusCode::CREATED, Json(stem)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/stems",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Stems, newest first", body = Vec<Record>),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn list_stems(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let path = format!(
        "/rest/v1/stems?project_id={}&select=*&order=created_at.desc",
        eq(&project_id)
    );
    let response = state
        .supabase
        .get(path)
        .as_user(Some(&user))
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error("failed to fetch stems")?;

    Ok(Json(records(&response, "failed to parse stems")?))
}
