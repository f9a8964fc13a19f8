// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::extract::{first_record, records, ValidJson};
use crate::{
    auth::{Auth, AuthenticatedUser, OptionalAuth},
    error::{ApiError, UpstreamResultExt},
    models::{
        CreateCommentRequest, CreateEventRequest, CreateReviewRequest, CreateTipRequest,
        MessageResponse, Record,
    },
    state::AppState,
    supabase::{eq, HEAVY_TIMEOUT},
};

/// Insert one row into `table` as the caller and return it.
async fn insert_row(
    state: &AppState,
    user: &AuthenticatedUser,
    table: &str,
    row: serde_json::Value,
    noun: &str,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let response = state
        .supabase
        .post(format!("/rest/v1/{table}"))
        .json(row)
        .as_user(Some(user))
        .return_representation()
        .send()
        .await
        .or_api_error(&format!("failed to create {noun}"))?;

    let created = first_record(
        &response,
        "failed to parse response",
        ApiError::bad_gateway(format!("no {noun} returned from database")),
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Newest-first rows of `table` attached to a song.
async fn list_for_song(
    state: &AppState,
    user: Option<&AuthenticatedUser>,
    table: &str,
    song_id: &str,
) -> Result<Json<Vec<Record>>, ApiError> {
    let path = format!(
        "/rest/v1/{table}?song_id={}&select=*&order=created_at.desc",
        eq(song_id)
    );
    let response = state
        .supabase
        .get(path)
        .as_user(user)
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error(&format!("failed to fetch {table}"))?;

    Ok(Json(records(&response, &format!("failed to parse {table}"))?))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "Engagement",
    security(("bearer" = [])),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Record),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(request): ValidJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let row = json!({
        "song_id": request.song_id,
        "author_id": user.user_id,
        "body": request.body,
    });
    insert_row(&state, &user, "comments", row, "comment").await
}

#[utoipa::path(
    get,
    path = "/api/v1/songs/{id}/comments",
    tag = "Engagement",
    params(("id" = String, Path, description = "Song ID")),
    responses((status = 200, description = "Comments, newest first", body = Vec<Record>))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(song_id): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    list_for_song(&state, user.as_ref(), "comments", &song_id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Engagement",
    security(("bearer" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Record),
        (status = 400, description = "Invalid request body or rating out of range"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(request): ValidJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let row = json!({
        "song_id": request.song_id,
        "reviewer_id": user.user_id,
        "rating": request.rating,
        "body": request.body,
    });
    insert_row(&state, &user, "reviews", row, "review").await
}

#[utoipa::path(
    get,
    path = "/api/v1/songs/{id}/reviews",
    tag = "Engagement",
    params(("id" = String, Path, description = "Song ID")),
    responses((status = 200, description = "Reviews, newest first", body = Vec<Record>))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(song_id): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    list_for_song(&state, user.as_ref(), "reviews", &song_id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/tips",
    tag = "Engagement",
    security(("bearer" = [])),
    request_body = CreateTipRequest,
    responses(
        (status = 201, description = "Tip recorded", body = Record),
        (status = 400, description = "Invalid request body or amount"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_tip(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(request): ValidJson<CreateTipRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let row = json!({
        "song_id": request.song_id,
        "tipper_id": user.user_id,
        "amount_cents": request.amount_cents,
    });
    insert_row(&state, &user, "tips", row, "tip").await
}

/// Log a play or view. Anonymous events are recorded with a null `user_id`.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Engagement",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event logged", body = MessageResponse),
        (status = 400, description = "Invalid request body"),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ValidJson(request): ValidJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .supabase
        .post("/rest/v1/events")
        .json(json!({
            "song_id": request.song_id,
            "event_type": request.event_type,
            "user_id": user.as_ref().map(|u| u.user_id.as_str()),
        }))
        .as_user(user.as_ref())
        .send()
        .await
        .or_api_error("failed to create event")?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("event logged successfully")),
    ))
}

/// Dashboard aggregates for an artist, computed by the `artist_dashboard`
/// database function.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/artist/{id}",
    tag = "Engagement",
    params(("id" = String, Path, description = "Artist user ID")),
    responses((status = 200, description = "Dashboard data", body = Record))
)]
pub async fn artist_analytics(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(artist_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let response = state
        .supabase
        .post("/rest/v1/rpc/artist_dashboard")
        .json(json!({ "artist_id": artist_id }))
        .as_user(user.as_ref())
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error("failed to fetch analytics")?;

    let dashboard: Record = response
        .json()
        .map_err(|e| ApiError::forward(&e, "failed to parse analytics"))?;
    Ok(Json(dashboard))
}
