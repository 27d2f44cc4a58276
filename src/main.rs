use std::path::PathBuf;

use anyhow::Context;
use assistant_bridge::{shutdown_signal, BridgeConfig, Supervisor};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "assistant-bridge", version, about)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "assistant-bridge starting");

    let config = BridgeConfig::load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let supervisor = Supervisor::new(config).context("building bridge")?;
    supervisor
        .run(shutdown_signal())
        .await
        .context("bridge failed to start")?;

    info!("assistant-bridge stopped");
    Ok(())
}
