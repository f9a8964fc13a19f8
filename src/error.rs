// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::supabase::{ForwardError, UpstreamResponse};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Relay a non-2xx upstream response: upstream status, our message, the
    /// upstream body as details.
    pub fn upstream(response: &UpstreamResponse, message: impl Into<String>) -> Self {
        Self::new(response.status, message).with_details(response.text())
    }

    /// Map a failed upstream exchange. Timeouts are 504, everything else 502.
    pub fn forward(error: &ForwardError, message: impl Into<String>) -> Self {
        let status = match error {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Transport(_) | ForwardError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

/// Turn the outcome of a forwarded call into a successful response or an
/// [`ApiError`] carrying `message`.
pub trait UpstreamResultExt {
    fn or_api_error(self, message: &str) -> Result<UpstreamResponse, ApiError>;
}

impl UpstreamResultExt for Result<UpstreamResponse, ForwardError> {
    fn or_api_error(self, message: &str) -> Result<UpstreamResponse, ApiError> {
        match self {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(ApiError::upstream(&response, message)),
            Err(e) => {
                warn!(error = %e, "{message}");
                Err(ApiError::forward(&e, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};
    use std::time::Duration;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let gw = ApiError::bad_gateway("no row");
        assert_eq!(gw.status, StatusCode::BAD_GATEWAY);
        assert!(gw.details.is_none());
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn upstream_failure_is_relayed_with_details() {
        let upstream = UpstreamResponse {
            status: StatusCode::CONFLICT,
            body: Bytes::from_static(br#"{"code":"23505"}"#),
        };
        let response = ApiError::upstream(&upstream, "failed to create song").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "failed to create song");
        assert_eq!(body["details"], r#"{"code":"23505"}"#);
    }

    #[test]
    fn forward_errors_map_to_gateway_statuses() {
        let timeout = ApiError::forward(&ForwardError::Timeout(Duration::from_secs(5)), "slow");
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);

        let transport = ApiError::forward(&ForwardError::Transport("refused".into()), "down");
        assert_eq!(transport.status, StatusCode::BAD_GATEWAY);

        let decode = ApiError::forward(&ForwardError::Decode("eof".into()), "garbled");
        assert_eq!(decode.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn or_api_error_passes_success_through() {
        let ok: Result<UpstreamResponse, ForwardError> = Ok(UpstreamResponse {
            status: StatusCode::OK,
            body: Bytes::from_static(b"[]"),
        });
        assert!(ok.or_api_error("failed").is_ok());

        let denied: Result<UpstreamResponse, ForwardError> = Ok(UpstreamResponse {
            status: StatusCode::FORBIDDEN,
            body: Bytes::from_static(b"denied"),
        });
        let err = denied.or_api_error("failed to update song").unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.details.as_deref(), Some("denied"));
    }
}
