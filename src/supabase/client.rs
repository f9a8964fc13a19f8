// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request forwarder shared by the user-scoped and service-role clients.

use std::{fmt, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, Method, StatusCode},
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthenticatedUser;

/// Deadline for single-row reads and auth lookups.
pub const LIGHT_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for writes, RPCs and list queries.
pub const HEAVY_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to complete an upstream exchange.
///
/// Upstream non-2xx responses are not errors; they come back as an
/// [`UpstreamResponse`] for the handler to relay.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream transport failure: {0}")]
    Transport(String),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

/// Status and raw body of an upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ForwardError> {
        serde_json::from_slice(&self.body).map_err(|e| ForwardError::Decode(e.to_string()))
    }

    /// Body as text, for relaying upstream error details.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Connection details shared by both clients.
struct Upstream {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// User-scoped Supabase client.
///
/// Forwards the caller's bearer token when an identity is supplied and no
/// `Authorization` header otherwise.
#[derive(Clone)]
pub struct SupabaseClient {
    upstream: Arc<Upstream>,
}

impl fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.upstream.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            upstream: Arc::new(Upstream {
                http,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                anon_key: anon_key.into(),
            }),
        })
    }

    /// Start a request. GETs default to [`LIGHT_TIMEOUT`], everything else
    /// to [`HEAVY_TIMEOUT`].
    pub fn request(&self, method: Method, path: impl Into<String>) -> ForwardRequest<'_> {
        ForwardRequest::new(&self.upstream, None, method, path.into())
    }

    pub fn get(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::DELETE, path)
    }
}

/// Privileged Supabase client that bypasses row-level security.
///
/// Every request it issues carries the service-role key as bearer, whatever
/// identity is attached to it.
#[derive(Clone)]
pub struct ServiceRoleClient {
    upstream: Arc<Upstream>,
    service_key: Arc<SecretString>,
}

impl fmt::Debug for ServiceRoleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRoleClient")
            .field("base_url", &self.upstream.base_url)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl ServiceRoleClient {
    /// Derive a privileged client sharing `client`'s connection pool.
    pub(crate) fn new(client: &SupabaseClient, service_key: SecretString) -> Self {
        Self {
            upstream: Arc::clone(&client.upstream),
            service_key: Arc::new(service_key),
        }
    }

    pub fn request(&self, method: Method, path: impl Into<String>) -> ForwardRequest<'_> {
        ForwardRequest::new(&self.upstream, Some(&self.service_key), method, path.into())
    }

    pub fn get(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> ForwardRequest<'_> {
        self.request(Method::DELETE, path)
    }
}

/// A single outbound call being assembled.
#[must_use = "a forward request does nothing until `send` is awaited"]
pub struct ForwardRequest<'a> {
    upstream: &'a Upstream,
    service_key: Option<&'a SecretString>,
    method: Method,
    path: String,
    body: Option<Value>,
    user_token: Option<&'a str>,
    prefer: Option<&'static str>,
    timeout: Duration,
}

impl<'a> ForwardRequest<'a> {
    fn new(
        upstream: &'a Upstream,
        service_key: Option<&'a SecretString>,
        method: Method,
        path: String,
    ) -> Self {
        let timeout = if method == Method::GET {
            LIGHT_TIMEOUT
        } else {
            HEAVY_TIMEOUT
        };
        Self {
            upstream,
            service_key,
            method,
            path,
            body: None,
            user_token: None,
            prefer: None,
            timeout,
        }
    }

    /// JSON request body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the caller's identity. Ignored by the service-role client.
    pub fn as_user(mut self, user: Option<&'a AuthenticatedUser>) -> Self {
        self.user_token = user.map(|u| u.token.as_str());
        self
    }

    /// Ask PostgREST to return the affected rows.
    pub fn return_representation(mut self) -> Self {
        self.prefer = Some("return=representation");
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send the request and buffer the response body.
    pub async fn send(self) -> Result<UpstreamResponse, ForwardError> {
        let url = format!("{}{}", self.upstream.base_url, self.path);

        let mut builder = self
            .upstream
            .http
            .request(self.method.clone(), &url)
            .timeout(self.timeout)
            .header("apikey", &self.upstream.anon_key)
            .header(CONTENT_TYPE, "application/json");

        let bearer = match self.service_key {
            Some(key) => Some(key.expose_secret()),
            None => self.user_token,
        };
        if let Some(bearer) = bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(prefer) = self.prefer {
            builder = builder.header("Prefer", prefer);
        }
        if let Some(body) = &self.body {
            builder = builder.json(body);
        }

        let timeout = self.timeout;
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                ForwardError::Timeout(timeout)
            } else {
                ForwardError::Transport(e.without_url().to_string())
            }
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;

        debug!(
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            privileged = self.service_key.is_some(),
            "Supabase call completed"
        );

        Ok(UpstreamResponse { status, body })
    }
}

/// PostgREST equality filter with the value percent-encoded.
pub fn eq(value: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("eq.{encoded}")
}
