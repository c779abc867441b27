#![warn(clippy::pedantic)]

//! # hashi
//!
//! Browses and installs release builds published on
//! `https://releases.hashicorp.com/`.
//!
//! ## Subcommands
//!
//! - `list` - List products, versions of a product, or builds of a version
//! - `install` - Download, verify and install one build
//!
//! ## Examples
//!
//! ```bash
//! hashi list
//! hashi list consul
//! hashi list consul 1.4.0
//! hashi install consul 1.4.0 ./bin/consul
//! hashi install terraform 1.9.0 ./terraform --os linux --arch arm64
//! ```

mod commands;
mod progress;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{install, list};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "HASHI_LOG";

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("HASHI_GIT_COMMIT"),
    ")"
);

/// Browse and install HashiCorp release builds.
#[derive(Parser)]
#[command(
    name = "hashi",
    author,
    version = VERSION,
    about = "Browse and install HashiCorp release builds",
    after_help = "\
ENVIRONMENT VARIABLES:
    HASHI_RELEASES_URL      Release server URL (default: https://releases.hashicorp.com/)
    HASHI_LOG               Log filter, e.g. debug or hashi_releases=info (default: warn)"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the hashi CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// List products, versions or builds.
    ///
    /// Without arguments lists every product. With a product lists its
    /// versions. With a product and a version lists the platform builds,
    /// marking the build for the current platform with `*`.
    List(list::ListArgs),

    /// Install a release build.
    ///
    /// Downloads the build archive, verifies it against the published
    /// SHA256SUMS and extracts the product binary to the given path.
    Install(install::InstallArgs),
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Prints the error chain and returns the exit code.
fn handle_error(e: &anyhow::Error) -> i32 {
    eprintln!("Error: {e:?}");
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List(args) => list::execute(&args).await,
        Commands::Install(args) => install::execute(&args).await,
    }
}
