// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-client fixed-window rate limiting.
//!
//! Each client key gets `limit` requests per window. The window starts at the
//! client's first request and resets once a full window has elapsed, so a
//! client can be admitted up to twice the limit across a window boundary.
//!
//! ## Sweeping
//!
//! Stale entries are removed by [`RateLimiter::run_sweeper`], spawned at
//! startup and stopped through a `CancellationToken`.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Key used when the peer address is unavailable.
const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected { retry_after: Duration },
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// In-memory fixed-window counters keyed by client.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request for `key` at the current time.
    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    /// Count a request for `key` at `now`.
    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        let mut entries = self.lock();

        let Some(entry) = entries.get_mut(key) else {
            entries.insert(
                key.to_string(),
                WindowEntry {
                    count: 1,
                    window_start: now,
                },
            );
            return Admission::Admitted;
        };

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed >= self.window {
            entry.count = 1;
            entry.window_start = now;
            return Admission::Admitted;
        }

        if entry.count < self.limit {
            entry.count += 1;
            return Admission::Admitted;
        }

        Admission::Rejected {
            retry_after: self.window - elapsed,
        }
    }

    /// Drop entries whose window started at least one window before `now`.
    /// Returns the number removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.window_start) < self.window);
        before - entries.len()
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    /// Sweep once per window until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(Arc::clone(&limiter).run_sweeper(shutdown.clone()));
    /// ```
    pub async fn run_sweeper(self: Arc<Self>, shutdown: CancellationToken) {
        info!(
            interval_secs = self.window.as_secs(),
            "Rate limit sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.window) => {
                    let removed = self.sweep_at(Instant::now());
                    if removed > 0 {
                        debug!(removed, "Rate limit sweeper removed stale entries");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Rate limit sweeper shutting down");
                    return;
                }
            }
        }
    }

    // A panic while holding the lock cannot leave an entry half-updated, so
    // a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, WindowEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Serialize)]
struct RateLimitBody {
    error: &'static str,
    retry_after: u64,
}

/// Middleware rejecting clients over their limit with 429.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, state.trust_proxy_headers);

    match state.rate_limiter.admit(&key) {
        Admission::Admitted => next.run(request).await,
        Admission::Rejected { retry_after } => {
            warn!(
                client = %key,
                path = %request.uri().path(),
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            too_many_requests(retry_after)
        }
    }
}

/// 429 response with the wait rounded up to whole seconds.
fn too_many_requests(retry_after: Duration) -> Response {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    let body = Json(RateLimitBody {
        error: "rate limit exceeded",
        retry_after: secs,
    });
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(RETRY_AFTER, HeaderValue::from(secs))],
        body,
    )
        .into_response()
}

/// Rate limit key for a request.
///
/// Forwarding headers are only honoured when the gateway sits behind a
/// trusted proxy; otherwise any client could pick its own key.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded.or(real_ip) {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
