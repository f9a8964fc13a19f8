// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request access log.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

use crate::auth::AuthenticatedSubject;

/// Header carrying the request id set by `SetRequestIdLayer`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Emit one structured line per request once the response is ready.
///
/// The subject is read from the response, where the auth middleware leaves
/// it, because this layer wraps the whole stack.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    let latency_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    let user_id = response
        .extensions()
        .get::<AuthenticatedSubject>()
        .map(|s| s.0.as_str())
        .unwrap_or("-");

    if response.status().is_server_error() {
        warn!(
            target: "leep_gateway::access",
            %method,
            %path,
            status,
            latency_ms,
            %request_id,
            %user_id,
            "request failed"
        );
    } else {
        info!(
            target: "leep_gateway::access",
            %method,
            %path,
            status,
            latency_ms,
            %request_id,
            %user_id,
            "request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn tagged() -> Response {
        let mut response = (StatusCode::CREATED, "done").into_response();
        response
            .extensions_mut()
            .insert(AuthenticatedSubject("u1".to_string()));
        response
    }

    #[tokio::test]
    async fn passes_response_through_unchanged() {
        let app = Router::new()
            .route("/songs", get(tagged))
            .layer(from_fn(log_requests));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/songs")
                    .header(REQUEST_ID_HEADER, "req-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.extensions().get::<AuthenticatedSubject>().unwrap().0,
            "u1"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"done");
    }
}
