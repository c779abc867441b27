//! List command for the hashi CLI.
//!
//! ## Usage
//!
//! ```bash
//! hashi list                  # Products
//! hashi list consul           # Versions of consul
//! hashi list consul 1.4.0     # Builds of consul 1.4.0
//! hashi list consul --json    # Versions as JSON
//! ```
//!
//! ## Output Format
//!
//! Builds are printed one per line as `<os> <arch>`; the build matching
//! the current platform is suffixed with ` *`:
//!
//! ```text
//! darwin amd64
//! linux amd64 *
//! linux arm64
//! ```

use anyhow::{Context, Result};
use clap::Args;
use hashi_releases::{Catalog, Config, HttpFetcher, ProductBuildEntry, Target};
use serde::Serialize;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Product whose versions to list.
    pub product: Option<String>,

    /// Version whose builds to list.
    pub version: Option<String>,

    /// Print the entries as JSON.
    #[clap(long, short = 'j')]
    pub json: bool,
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listing
/// cannot be retrieved.
pub async fn execute(args: &ListArgs) -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    tracing::debug!(?config, "resolved configuration");
    let fetcher = HttpFetcher::new()?;
    let catalog = Catalog::new(&fetcher, &config);

    match (&args.product, &args.version) {
        (None, _) => {
            let products = catalog.products().await.context("Failed to list products")?;
            output(&products, args.json, |p| p.name.clone())
        }
        (Some(product), None) => {
            let versions = catalog
                .versions(product)
                .await
                .with_context(|| format!("Failed to list versions of {product}"))?;
            output(&versions, args.json, |v| v.version.clone())
        }
        (Some(product), Some(version)) => {
            let builds = catalog
                .builds(product, version)
                .await
                .with_context(|| format!("Failed to list builds of {product} {version}"))?;
            output(&builds, args.json, |b| build_line(b, &config.target))
        }
    }
}

fn output<T: Serialize>(entries: &[T], json: bool, line: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        for entry in entries {
            println!("{}", line(entry));
        }
    }
    Ok(())
}

/// Formats a build as `<os> <arch>`, marking the target build.
fn build_line(build: &ProductBuildEntry, target: &Target) -> String {
    let marker = if build.is_for(&target.os, &target.arch) {
        " *"
    } else {
        ""
    };
    format!("{} {}{marker}", build.os, build.arch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(os: &str, arch: &str) -> ProductBuildEntry {
        ProductBuildEntry {
            product: "consul".to_string(),
            version: "1.4.0".to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
            url: format!("https://releases.hashicorp.com/consul/1.4.0/consul_1.4.0_{os}_{arch}.zip"),
        }
    }

    #[test]
    fn target_build_is_marked() {
        let target = Target::new("linux", "amd64");
        assert_eq!(build_line(&build("linux", "amd64"), &target), "linux amd64 *");
    }

    #[test]
    fn other_builds_are_plain() {
        let target = Target::new("linux", "amd64");
        assert_eq!(build_line(&build("linux", "arm64"), &target), "linux arm64");
        assert_eq!(build_line(&build("darwin", "amd64"), &target), "darwin amd64");
    }
}
