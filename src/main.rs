//! gateway-shim
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!   invocation       │                GATEWAY SHIM                  │
//!   ─────────────────┼─▶ http server ──▶ pipeline ──▶ rules (S3)    │
//!                    │                      │                       │
//!                    │                      ▼                       │
//!   response         │                  forwarder ──────────────────┼──▶ target_uri
//!   ◀────────────────┼──────────────────────┘                       │
//!                    │                                              │
//!   token event ─────┼─▶ authorizer ──▶ policy document             │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gateway_shim::config::load_config;
use gateway_shim::lifecycle::{signals, Shutdown};
use gateway_shim::observability::{logging, metrics};
use gateway_shim::HttpServer;

#[derive(Parser)]
#[command(name = "gateway-shim")]
#[command(about = "Rule-driven API gateway shim", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener address, overriding configuration.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("gateway-shim v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules_bucket = %config.rules.bucket,
        rules_key = %config.rules.key,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::from_config(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
