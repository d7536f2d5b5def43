//! casebookd — Casebook daemon.
//!
//! Serves the [`CaseGateway`](casebook::CaseGateway) over HTTP so the game
//! frontend shares one process-wide cache.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use casebook::CasebookError;
use casebook::server::config::{Config, Secrets};
use casebook::server::{AppState, build_casebook, router};

/// Casebook daemon — cached CO-STAR puzzle generation.
#[derive(Parser)]
#[command(name = "casebookd")]
#[command(version)]
#[command(about = "Casebook puzzle generation daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config file.
    #[arg(long, env = "CASEBOOK_ADDRESS")]
    address: Option<String>,

    /// Force mock generation.
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("casebook=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());
    if args.mock {
        config.generation.mock = true;
    }
    if let Some(address) = args.address {
        config.server.address = address;
    }

    let api_key = if config.generation.mock {
        None
    } else {
        Secrets::load()?.gemini_api_key(|name| std::env::var(name).ok())
    };
    let casebook = build_casebook(&config, api_key)?;

    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| CasebookError::Configuration(format!("Invalid address: {e}")))?;

    let state = AppState::new(Arc::new(casebook))
        .request_timeout(config.server.request_timeout())
        .debug_endpoints(config.server.debug_endpoints);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        debug_endpoints = config.server.debug_endpoints,
        "casebookd starting"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("casebookd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
