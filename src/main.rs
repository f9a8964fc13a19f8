// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{future::IntoFuture, net::SocketAddr};

use leep_gateway::{
    api::router,
    config::{Config, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    shutdown::shutdown_signal,
    state::AppState,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only present in development.
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting Leep gateway");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        supabase_url = %config.supabase_url,
        bind_address = %config.bind_address(),
        rate_limit_requests = config.rate_limit_requests,
        rate_limit_window_secs = config.rate_limit_window.as_secs(),
        trust_proxy_headers = config.trust_proxy_headers,
        jwt_audience = config.jwt_audience.as_deref().unwrap_or("<any>"),
        "Configuration loaded successfully"
    );

    let state = AppState::from_config(&config)?;
    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(state.rate_limiter.clone().run_sweeper(shutdown.clone()));

    let app = router(state, &config);

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let listener = TcpListener::bind(addr).await?;
    info!("Leep gateway listening on http://{} (docs at /docs)", addr);

    let mut server = tokio::spawn(
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future(),
    );

    tokio::select! {
        result = &mut server => {
            shutdown.cancel();
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    shutdown.cancel();
    match tokio::time::timeout(config.shutdown_grace, server).await {
        Ok(Ok(Ok(()))) => info!("In-flight requests drained"),
        Ok(Ok(Err(e))) => error!("Server error during shutdown: {}", e),
        Ok(Err(e)) => error!("Server task failed: {}", e),
        Err(_) => warn!(
            grace_secs = config.shutdown_grace.as_secs(),
            "Shutdown grace period elapsed with requests still in flight"
        ),
    }

    if let Err(e) = sweeper.await {
        warn!("Rate limit sweeper did not stop cleanly: {}", e);
    }

    info!("Leep gateway shutdown complete");
    Ok(())
}

/// `RUST_LOG` filtering, JSON output when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();
}
