//! Install command for the hashi CLI.
//!
//! ## Usage
//!
//! ```bash
//! hashi install consul 1.4.0 ./consul
//! hashi install consul 1.4.0 ./consul --os darwin --arch arm64
//! ```
//!
//! Progress goes to stderr; the final status line goes to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use hashi_releases::{Config, HttpFetcher, Installer};

use crate::progress;

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Product to install (e.g., "consul").
    pub product: String,

    /// Version to install (e.g., "1.4.0").
    pub version: String,

    /// Path to write the binary to.
    pub path: PathBuf,

    /// Operating system of the build. Defaults to the current one.
    #[clap(long, short = 'o')]
    pub os: Option<String>,

    /// Architecture of the build. Defaults to the current one.
    #[clap(long, short = 'a')]
    pub arch: Option<String>,
}

/// Executes the install command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any stage of the
/// installation fails.
pub async fn execute(args: &InstallArgs) -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    let target = config
        .target
        .clone()
        .with_overrides(args.os.clone(), args.arch.clone());
    let config = config.with_target(target);
    tracing::debug!(?config, "resolved configuration");

    let fetcher = HttpFetcher::new()?;
    let installer = Installer::new(&fetcher, &config).with_progress(progress::stderr_reporter());

    let installation = installer
        .install(&args.product, &args.version, &args.path)
        .await
        .with_context(|| {
            format!(
                "Failed to install {} {} for {}",
                args.product,
                args.version,
                installer.target()
            )
        })?;

    println!(
        "Installed {} successfully to {}",
        installation.product,
        installation.destination.display()
    );
    Ok(())
}
