// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup. A missing or
//! malformed required value is fatal: the gateway never starts serving
//! traffic with a partial configuration.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUPABASE_URL` | Base URL of the Supabase project | Required |
//! | `SUPABASE_ANON_KEY` | Public anon key, sent as `apikey` on every call | Required |
//! | `SUPABASE_SERVICE_ROLE_KEY` | Service-role key for admin forwarding | Required |
//! | `SUPABASE_JWT_SECRET` | HMAC secret for user tokens (raw or base64) | Required |
//! | `SUPABASE_JWT_AUDIENCE` | Expected `aud` claim | Not checked |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `RATE_LIMIT_REQUESTS` | Requests admitted per window per client | `100` |
//! | `RATE_LIMIT_WINDOW_SECS` | Rate limit window length | `60` |
//! | `CORS_ALLOWED_ORIGIN` | Single allowed frontend origin | Any origin |
//! | `TRUST_PROXY_HEADERS` | Key rate limits on `X-Forwarded-For` | `false` |
//! | `SHUTDOWN_GRACE_SECS` | Drain period for in-flight requests | `5` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `leep_gateway=info,tower_http=info` |

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const SUPABASE_SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const SUPABASE_JWT_SECRET_ENV: &str = "SUPABASE_JWT_SECRET";
pub const SUPABASE_JWT_AUDIENCE_ENV: &str = "SUPABASE_JWT_AUDIENCE";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "leep_gateway=info,tower_http=info";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Default rate limit: 100 requests per 60 second window per client IP.
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Default drain period after SIGINT/SIGTERM.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Failed to build upstream HTTP client: {0}")]
    HttpClient(String),
}

/// Gateway configuration.
///
/// Secrets are held as [`SecretString`] and redacted in `Debug` output.
#[derive(Clone)]
pub struct Config {
    /// Supabase project URL, without trailing slash.
    pub supabase_url: String,
    /// Public anon key.
    pub supabase_anon_key: String,
    /// Service-role key. Only ever handed to the admin forwarding path.
    pub supabase_service_role_key: SecretString,
    /// HMAC secret used to verify user tokens.
    pub jwt_secret: SecretString,
    /// Expected `aud` claim, if any.
    pub jwt_audience: Option<String>,
    pub host: String,
    pub port: u16,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    /// Restricts CORS to a single origin when set.
    pub cors_allowed_origin: Option<HeaderValue>,
    /// Use `X-Forwarded-For` / `X-Real-IP` as the rate limit key.
    pub trust_proxy_headers: bool,
    pub shutdown_grace: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .field("supabase_service_role_key", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_audience", &self.jwt_audience)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (used by tests).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let raw_url = required(vars, SUPABASE_URL_ENV)?;
        Url::parse(&raw_url).map_err(|e| ConfigError::InvalidValue {
            name: SUPABASE_URL_ENV.to_string(),
            reason: e.to_string(),
        })?;
        let supabase_url = raw_url.trim_end_matches('/').to_string();

        let supabase_anon_key = required(vars, SUPABASE_ANON_KEY_ENV)?;
        let supabase_service_role_key =
            SecretString::from(required(vars, SUPABASE_SERVICE_ROLE_KEY_ENV)?);
        let jwt_secret = SecretString::from(required(vars, SUPABASE_JWT_SECRET_ENV)?);
        let jwt_audience = optional(vars, SUPABASE_JWT_AUDIENCE_ENV);

        let host = optional(vars, "HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parsed(vars, "PORT", DEFAULT_PORT)?;

        let rate_limit_requests = parsed(vars, "RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS)?;
        if rate_limit_requests == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RATE_LIMIT_REQUESTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let window_secs = parsed(vars, "RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS)?;
        if window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RATE_LIMIT_WINDOW_SECS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let cors_allowed_origin = optional(vars, "CORS_ALLOWED_ORIGIN")
            .map(|origin| {
                HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|e| {
                    ConfigError::InvalidValue {
                        name: "CORS_ALLOWED_ORIGIN".to_string(),
                        reason: e.to_string(),
                    }
                })
            })
            .transpose()?;
        let trust_proxy_headers = parsed(vars, "TRUST_PROXY_HEADERS", false)?;
        let grace_secs = parsed(vars, "SHUTDOWN_GRACE_SECS", DEFAULT_SHUTDOWN_GRACE_SECS)?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key,
            jwt_secret,
            jwt_audience,
            host,
            port,
            rate_limit_requests,
            rate_limit_window: Duration::from_secs(window_secs),
            cors_allowed_origin,
            trust_proxy_headers,
            shutdown_grace: Duration::from_secs(grace_secs),
        })
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    optional(vars, name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Empty values count as unset.
fn optional(vars: &HashMap<String, String>, name: &str) -> Option<String> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parsed<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match optional(vars, name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    pub(crate) fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (SUPABASE_URL_ENV.to_string(), "https://project.supabase.co/".to_string()),
            (SUPABASE_ANON_KEY_ENV.to_string(), "anon-key".to_string()),
            (SUPABASE_SERVICE_ROLE_KEY_ENV.to_string(), "service-key".to_string()),
            (SUPABASE_JWT_SECRET_ENV.to_string(), "jwt-secret".to_string()),
        ])
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let config = Config::from_vars(&base_vars()).unwrap();

        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon-key");
        assert_eq!(config.supabase_service_role_key.expose_secret(), "service-key");
        assert_eq!(config.jwt_secret.expose_secret(), "jwt-secret");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.rate_limit_requests, 100);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
        assert!(!config.trust_proxy_headers);
        assert!(config.cors_allowed_origin.is_none());
    }

    #[test]
    fn each_required_value_is_fatal_when_missing() {
        for name in [
            SUPABASE_URL_ENV,
            SUPABASE_ANON_KEY_ENV,
            SUPABASE_SERVICE_ROLE_KEY_ENV,
            SUPABASE_JWT_SECRET_ENV,
        ] {
            let mut vars = base_vars();
            vars.remove(name);
            match Config::from_vars(&vars) {
                Err(ConfigError::MissingEnvVar(missing)) => assert_eq!(missing, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let mut vars = base_vars();
        vars.insert(SUPABASE_JWT_SECRET_ENV.to_string(), "   ".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn rejects_unparseable_url_and_numbers() {
        let mut vars = base_vars();
        vars.insert(SUPABASE_URL_ENV.to_string(), "not a url".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut vars = base_vars();
        vars.insert("PORT".to_string(), "eighty".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut vars = base_vars();
        vars.insert("RATE_LIMIT_WINDOW_SECS".to_string(), "0".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn cors_origin_is_parsed_as_header_value() {
        let mut vars = base_vars();
        vars.insert("CORS_ALLOWED_ORIGIN".to_string(), "https://leep.app/".to_string());
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.cors_allowed_origin.unwrap(), "https://leep.app");

        vars.insert("CORS_ALLOWED_ORIGIN".to_string(), "https://leep.app\u{7f}".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn trust_proxy_headers_parses_bool() {
        let mut vars = base_vars();
        vars.insert("TRUST_PROXY_HEADERS".to_string(), "true".to_string());
        assert!(Config::from_vars(&vars).unwrap().trust_proxy_headers);

        vars.insert("TRUST_PROXY_HEADERS".to_string(), "yes".to_string());
        assert!(Config::from_vars(&vars).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config::from_vars(&base_vars()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("service-key"));
        assert!(!debug.contains("jwt-secret"));
        assert!(!debug.contains("anon-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
