//! staking-dropd
//!
//! Watches finalized blocks for liquidity bond-and-swap events and sends a
//! one-time drop to new accounts that bonded enough.

mod client;
mod config;
mod shutdown;

use clap::Parser;
use client::HttpChainClient;
use config::ConfigLoader;
use sdrop_core::progress::FileProgressStore;
use sdrop_core::service::DropService;
use shutdown::shutdown_signal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// staking-dropd - drop native tokens to new liquidity bonders
#[derive(Parser, Debug)]
#[command(name = "staking-dropd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./config.toml")]
    config: PathBuf,

    /// Override the configured start block
    #[arg(long)]
    start_block: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, env = "SDROP_LOG_JSON", default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_json);

    tracing::info!("Starting staking-dropd v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let loaded = ConfigLoader::new(&args.config, args.start_block)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!(
        account = %loaded.chain.account,
        endpoint = %loaded.chain.endpoint,
        symbols = ?loaded.drops.symbols().collect::<Vec<_>>(),
        "Configuration loaded from {:?}",
        args.config
    );

    let client = HttpChainClient::new(&loaded.chain).map_err(|e| {
        tracing::error!("Failed to build HTTP client: {}", e);
        e
    })?;
    let store = FileProgressStore::new(&loaded.progress_dir, &loaded.chain.account.to_string());

    let mut service = DropService::initialize(&loaded.listener, loaded.drops, client, store)
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialize: {}", e);
            e
        })?;
    let fatal_rx = service.start().await.map_err(|e| {
        tracing::error!("Failed to start: {}", e);
        e
    })?;

    let exit_code = tokio::select! {
        fatal = fatal_rx => match fatal {
            Ok(e) => {
                tracing::error!(error = %e, "FATAL ERROR. Shutting down.");
                ExitCode::FAILURE
            }
            Err(_) => {
                tracing::error!("Polling loop exited unexpectedly, shutting down");
                ExitCode::FAILURE
            }
        },
        signal = shutdown_signal() => {
            signal?;
            tracing::warn!("Interrupt received, shutting down now.");
            ExitCode::SUCCESS
        }
    };

    service.stop();
    service.join().await;
    tracing::info!("staking-dropd shutdown complete");

    Ok(exit_code)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
