//! CallGuard server binary
//!
//! Starts the consultation HTTP service.

use anyhow::Context;
use callguard_server::config::ServerConfig;
use callguard_server::{build_state, serve};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CallGuard - abusive-caller consultation service for call-center operators
#[derive(Debug, Parser)]
#[command(name = "callguard-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CALLGUARD_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            warn!("No config file specified, using development defaults");
            ServerConfig::development()
        }
    };

    info!("Starting CallGuard");
    info!("Bind address: {}", config.bind_addr());
    info!("Retrieval backend: {:?}", config.retrieval.backend);

    // Blocking clients must be built before the runtime starts
    let state = build_state(&config).context("building services")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(serve(&config, state))?;

    Ok(())
}
