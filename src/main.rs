//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request         ┌──────────────────────────────────────────────┐
//!     ───────────────────────┼─▶ net listener ──▶ http server (axum)        │
//!                            │                        │                     │
//!                            │                        ▼                     │
//!                            │                   dispatcher                 │
//!                            │                        │                     │
//!                            │                        ▼                     │
//!                            │        round-robin selector ──▶ probe ───────┼──▶ Backend
//!                            │                        │                     │
//!                            │                        ▼                     │
//!     Client Response        │                    forwarder ────────────────┼──▶ Backend
//!     ◀──────────────────────┼────────────────────────┘                     │
//!                            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use roundrobin_proxy::config::{self, ConfigError, ConfigOverrides, LogFormat, ProxyConfig};
use roundrobin_proxy::lifecycle::{self, signals, Shutdown};
use roundrobin_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "roundrobin-proxy")]
#[command(about = "Round-robin HTTP load balancer with liveness probing", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides the file).
    #[arg(short, long)]
    port: Option<String>,

    /// Backend base URI; repeat for each backend (replaces the file's list).
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// Log format: pretty or json.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let overrides = ConfigOverrides {
            port: self.port,
            backends: self.backends,
            log_format: self.log_format,
        };
        config::load_config(self.config.as_deref(), overrides)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.logging);

    tracing::info!(
        port = %config.listener.port,
        backends = config.backends.len(),
        "roundrobin-proxy v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    if let Err(e) = lifecycle::run(config, shutdown).await {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
