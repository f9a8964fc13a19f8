// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;

use super::extract::{first_record, records, ValidJson};
use crate::{
    auth::{Auth, OptionalAuth},
    error::{ApiError, UpstreamResultExt},
    models::{
        CreateSongRequest, MessageResponse, PublishSongRequest, Record, SongActionResponse,
        UpdateSongRequest,
    },
    state::AppState,
    supabase::{eq, HEAVY_TIMEOUT},
};

/// List songs.
///
/// Anonymous callers see published songs; authenticated callers see their own.
#[utoipa::path(
    get,
    path = "/api/v1/songs",
    tag = "Songs",
    responses(
        (status = 200, description = "Songs, newest first", body = Vec<Record>),
    )
)]
pub async fn list_songs(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Vec<Record>>, ApiError> {
    let path = match &user {
        Some(user) => format!(
            "/rest/v1/songs?artist_id={}&select=*&order=created_at.desc",
            eq(&user.user_id)
        ),
        None => "/rest/v1/songs?is_published=eq.true&select=*&order=created_at.desc".to_string(),
    };

    let response = state
        .supabase
        .get(path)
        .as_user(user.as_ref())
        .timeout(HEAVY_TIMEOUT)
        .send()
        .await
        .or_api_error("failed to fetch songs")?;

    Ok(Json(records(&response, "failed to parse songs")?))
}

#[utoipa::path(
    get,
    path = "/api/v1/songs/{id}",
    tag = "Songs",
    params(("id" = String, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song", body = Record),
        (status = 404, description = "Song not found or not visible"),
    )
)]
pub async fn get_song(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(song_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let path = format!("/rest/v1/songs?id={}&select=*", eq(&song_id));
    let response = state
        .supabase
        .get(path)
        .as_user(user.as_ref())
        .send()
        .await
        .or_api_error("failed to fetch song")?;

    let song = first_record(
        &response,
        "failed to parse song",
        ApiError::not_found("song not found"),
    )?;
    Ok(Json(song))
}

/// Create an unpublished song owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/songs",
    tag = "Songs",
    security(("bearer" = [])),
    request_body = CreateSongRequest,
    responses(
        (status = 201, description = "Song created", body = Record),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_song(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(request): ValidJson<CreateSongRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let response = state
        .supabase
        .post("/rest/v1/songs")
        .json(json!({
            "artist_id": user.user_id,
            "title": request.title,
            "audio_url": request.audio_url,
            "artwork_url": request.artwork_url,
            "is_published": false,
        }))
        .as_user(Some(&user))
        .return_representation()
        .send()
        .await
        .or_api_error("failed to create song")?;

    let song = first_record(
        &response,
        "failed to parse response",
        ApiError::bad_gateway("no song returned from database"),
    )?;

    info!(user_id = %user.user_id, "Song created");
    Ok((StatusCode::CREATED, Json(song)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/songs/{id}",
    tag = "Songs",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Song ID")),
    request_body = UpdateSongRequest,
    responses(
        (status = 200, description = "Song updated", body = MessageResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn update_song(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(song_id): Path<String>,
    ValidJson(request): ValidJson<UpdateSongRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let updates = serde_json::to_value(&request)
        .map_err(|e| ApiError::bad_request("invalid request body").with_details(e.to_string()))?;

    state
        .supabase
        .patch(format!("/rest/v1/songs?id={}", eq(&song_id)))
        .json(updates)
        .as_user(Some(&user))
        .send()
        .await
        .or_api_error("failed to update song")?;

    Ok(Json(MessageResponse::new("song updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/songs/{id}",
    tag = "Songs",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn delete_song(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(song_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .supabase
        .delete(format!("/rest/v1/songs?id={}", eq(&song_id)))
        .as_user(Some(&user))
        .send()
        .await
        .or_api_error("failed to delete song")?;

    info!(user_id = %user.user_id, song_id = %song_id, "Song deleted");
    Ok(Json(MessageResponse::new("song deleted successfully")))
}

/// Publish or unpublish a song.
///
/// The body is optional; without a readable `is_published` the song is
/// published.
#[utoipa::path(
    post,
    path = "/api/v1/songs/{id}/publish",
    tag = "Songs",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Song ID")),
    request_body(content = PublishSongRequest, description = "Optional"),
    responses(
        (status = 200, description = "Visibility changed", body = SongActionResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn publish_song(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(song_id): Path<String>,
    body: Bytes,
) -> Result<Json<SongActionResponse>, ApiError> {
    let request: PublishSongRequest = serde_json::from_slice(&body).unwrap_or_default();

    let (rpc, message, failure) = if request.is_published {
        ("publish_song", "song published successfully", "failed to publish song")
    } else {
        ("unpublish_song", "song unpublished successfully", "failed to unpublish song")
    };

    state
        .supabase
        .post(format!("/rest/v1/rpc/{rpc}"))
        .json(json!({ "song_id": song_id }))
        .as_user(Some(&user))
        .send()
        .await
        .or_api_error(failure)?;

    info!(
        user_id = %user.user_id,
        song_id = %song_id,
        published = request.is_published,
        "Song visibility changed"
    );
    Ok(Json(SongActionResponse {
        message: message.to_string(),
        song_id,
        is_published: Some(request.is_published),
    }))
}
