// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    auth::{AdminGate, TokenValidator},
    config::{Config, ConfigError},
    middleware::RateLimiter,
    supabase::{ServiceRoleClient, SupabaseClient},
};

/// Shared application state.
///
/// Everything here is immutable after startup except the rate limiter's
/// counters, which are guarded by its own mutex.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    /// User-scoped Supabase client. Holds no service-role key.
    pub supabase: SupabaseClient,
    /// Sole holder of the service-role client.
    pub admin_gate: Arc<AdminGate>,
    pub rate_limiter: Arc<RateLimiter>,
    pub trust_proxy_headers: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut validator = TokenValidator::new(&config.jwt_secret);
        if let Some(audience) = &config.jwt_audience {
            validator = validator.with_audience(audience.clone());
        }

        let supabase = SupabaseClient::new(&config.supabase_url, &config.supabase_anon_key)
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let service_role =
            ServiceRoleClient::new(&supabase, config.supabase_service_role_key.clone());

        Ok(Self {
            validator: Arc::new(validator),
            supabase,
            admin_gate: Arc::new(AdminGate::new(service_role)),
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit_requests,
                config.rate_limit_window,
            )),
            trust_proxy_headers: config.trust_proxy_headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::base_vars;

    #[test]
    fn builds_from_config() {
        let config = Config::from_vars(&base_vars()).unwrap();
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.rate_limiter.window(), config.rate_limit_window);
        assert!(!state.trust_proxy_headers);
        assert!(!format!("{:?}", state.supabase).contains("service-key"));
    }
}
