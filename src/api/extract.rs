// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request body extraction and PostgREST row unwrapping shared by handlers.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    error::ApiError,
    models::{Record, Validate},
    supabase::UpstreamResponse,
};

/// JSON body that has passed [`Validate`].
///
/// Malformed JSON and failed validation both render as
/// `{"error":"invalid request body","details":...}` with status 400.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::bad_request("invalid request body").with_details(rejection.body_text())
        })?;

        value
            .validate()
            .map_err(|reason| ApiError::bad_request("invalid request body").with_details(reason))?;

        Ok(ValidJson(value))
    }
}

/// Decode a PostgREST array response.
pub fn records(response: &UpstreamResponse, message: &str) -> Result<Vec<Record>, ApiError> {
    response.json().map_err(|e| ApiError::forward(&e, message))
}

/// First row of a PostgREST array response, or `missing` when it is empty.
pub fn first_record(
    response: &UpstreamResponse,
    message: &str,
    missing: ApiError,
) -> Result<Record, ApiError> {
    records(response, message)?.into_iter().next().ok_or(missing)
}
