//! kubeaudit - Audit Kubernetes clusters and manifests for common security controls
//!
//! This is the main entry point for the CLI application.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kubeaudit::cli::{self, exit_codes, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    match cli::commands::audit::execute(cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_codes::FATAL);
        }
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
