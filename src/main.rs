use std::process;

use colored::Colorize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kind_multizone::cli::{self, Cli};
use kind_multizone::KindMultizoneError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        // clap renders help, version and usage errors itself
        Err(KindMultizoneError::Flag(e)) => e.exit(),
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            process::exit(1);
        }
    };

    // Initialize logging
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    info!("Starting kind-multizone");

    if let Err(e) = cli::run(cli).await {
        error!(stage = e.stage(), "{}", e);
        eprintln!("{} {}", "✗".red(), e.to_string().red());
        process::exit(1);
    }
}
