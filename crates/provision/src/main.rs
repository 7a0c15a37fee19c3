//! Edgebind - main entry point
//!
//! Provisions a TLS-secured custom domain for an AWS API Gateway. Behavior
//! is driven entirely by environment variables so the binary runs with no
//! arguments; see `edgebind_config` for the variable set.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use edgebind_common::SystemRunner;
use edgebind_config::{Config, Workspace};
use edgebind_provision::{preflight, Provisioner};

/// Edgebind - TLS custom-domain provisioning for AWS API Gateway
#[derive(Parser, Debug)]
#[command(name = "edgebind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if let Err(e) = run() {
        error!(error = %e, "Provisioning failed");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    info!("Validating required executables");
    preflight::check_executables()?;

    info!("Validating required environment variables");
    let config = Config::from_env().context("loading configuration from environment")?;

    let workspace = Workspace::current();
    workspace
        .ensure_dirs()
        .context("creating working directories")?;

    let runner = SystemRunner;
    Provisioner::new(&config, &workspace, &runner).run()?;

    Ok(())
}
