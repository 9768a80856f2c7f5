//! Nexus audio peer (nexus-peer) - Main entry point
//!
//! Loads bootstrap config, wires the session collaborators, spawns the engine
//! tick loop and serves the HTTP transport adapter until a shutdown signal.

use anyhow::{Context, Result};
use clap::Parser;
use nexus_common::config::resolve_config_path;
use nexus_peer::config::PeerConfig;
use nexus_peer::PeerComponents;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "nexus-peer")]
#[command(about = "Nexus audio peer - authority-driven spatial audio playback")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "NEXUS_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "NEXUS_PEER_PORT")]
    port: Option<u16>,

    /// Sender id trusted to issue audio commands (overrides config)
    #[arg(short, long, env = "NEXUS_AUTHORITY_ID")]
    authority: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before logging so its level can seed the filter
    let config_path = resolve_config_path(args.config.as_deref(), "NEXUS_CONFIG", "peer.toml");
    let mut config = PeerConfig::load(config_path.as_deref())
        .context("Failed to load peer configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(authority) = args.authority {
        config.authority_id = Some(authority);
    }

    let default_filter = format!("nexus_peer={0},nexus_common={0},tower_http=info", config.logging.level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting nexus-peer v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (built-in defaults)"),
    }

    let components =
        PeerComponents::from_config(&config).context("Failed to initialize peer components")?;
    let peer = components.start(&config);
    info!(
        "Playback engine started (limits: {} audio, {} streams)",
        config.limits.max_concurrent_audio, config.limits.max_concurrent_streams
    );

    nexus_peer::api::run(peer.app_context(), shutdown_signal())
        .await
        .context("Server error")?;

    // Dispose every resource before exiting
    if let Err(e) = peer.engine.shutdown().await {
        warn!("Engine already stopped: {}", e);
    }
    peer.task.await.context("Engine task panicked")?;

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
