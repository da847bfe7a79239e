use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use roundrobin_proxy::config::{load_config, ConfigOverrides};
use roundrobin_proxy::health::{check_all, exit_status, report::EXIT_ERROR};
use roundrobin_proxy::load_balancer::pool::build_prober;

#[derive(Parser)]
#[command(name = "upstream-probe")]
#[command(about = "Probe every configured backend once and report liveness", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URI; repeat for each backend (replaces the file's list).
    #[arg(short, long = "backend")]
    backends: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        backends: cli.backends,
        ..Default::default()
    };

    let config = match load_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let prober = match build_prober(&config) {
        Ok(prober) => prober,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let reports = check_all(&prober, config.backend_addresses()).await;

    match serde_json::to_string_pretty(&reports) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    ExitCode::from(exit_status(&reports))
}
