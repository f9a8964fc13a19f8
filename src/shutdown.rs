// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process signal handling for graceful shutdown.

use std::{future::Future, io};

use tokio::signal;
use tracing::{error, info};

/// Resolves on SIGINT or SIGTERM.
///
/// A signal whose handler cannot be installed never triggers shutdown; the
/// other one still can.
pub async fn shutdown_signal() {
    let ctrl_c = on_signal("SIGINT", signal::ctrl_c());

    #[cfg(unix)]
    let terminate = on_signal("SIGTERM", async {
        let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        stream.recv().await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn on_signal<F>(name: &str, received: F)
where
    F: Future<Output = io::Result<()>>,
{
    match received.await {
        Ok(()) => info!("Received {}, starting graceful shutdown...", name),
        Err(e) => {
            error!("Failed to listen for {}: {}", name, e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn delivered_signal_resolves() {
        let result = timeout(
            Duration::from_secs(1),
            on_signal("SIGINT", async { Ok(()) }),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failed_registration_never_resolves() {
        let result = timeout(
            Duration::from_millis(50),
            on_signal("SIGINT", async { Err(io::Error::other("no handler")) }),
        )
        .await;
        assert!(result.is_err());
    }
}
