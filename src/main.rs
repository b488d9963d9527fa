//! Disk Cache sweeper daemon
//!
//! Starts the engine against a shared cache directory so its cleaner reclaims
//! stale entries, then waits for a shutdown signal.

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use disk_cache::{Config, DiskCache};

/// Main entry point for the sweeper daemon.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the engine, which arms the background cleaner
/// 4. Wait for SIGINT/SIGTERM, then stop the engine
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "disk_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: cache_path={}, clean_every={}ms",
        config.cache_path.display(),
        config.clean_every
    );
    if config.clean_every == 0 {
        info!("CLEAN_EVERY is 0, the cleaner is disabled");
    }

    let cache = DiskCache::new(config)?;
    cache
        .start()
        .await
        .context("Failed to start disk cache")?;

    shutdown_signal().await?;

    cache.stop().await;
    info!("Sweeper shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

        tokio::select! {
            res = signal::ctrl_c() => {
                res.context("Failed to install Ctrl+C handler")?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .context("Failed to install Ctrl+C handler")?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
