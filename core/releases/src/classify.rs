//! Classification of listing entries into typed release entities.
//!
//! The server's listing carries no machine-readable metadata; the URL path
//! is the schema. Classification is a filter: entries whose path does not
//! match the expected shape are dropped, and an empty result is a valid
//! outcome.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::links::LinkEntry;

/// `/{product}/{version}/`
static VERSION_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?P<product>[^/]+)/(?P<version>[^/]+)/$").expect("valid version pattern")
});

/// `/{product}/{version}/{anything}_{os}_{arch}.zip`
static BUILD_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/(?P<product>[^/]+)/(?P<version>[^/]+)/[^/]+_(?P<os>[^_/]+)_(?P<arch>[^_/]+)\.zip$",
    )
    .expect("valid build pattern")
});

/// A link to one version of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductVersionEntry {
    /// Product name.
    pub product: String,
    /// Version string, e.g. `1.4.0` or `1.4.0-rc1`.
    pub version: String,
    /// Absolute URL of the version directory.
    pub url: String,
}

/// A link to one platform build of a product version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductBuildEntry {
    /// Product name.
    pub product: String,
    /// Version string.
    pub version: String,
    /// Operating system, e.g. `linux` or `darwin`.
    pub os: String,
    /// Architecture, e.g. `amd64` or `arm64`.
    pub arch: String,
    /// Absolute URL of the zip archive.
    pub url: String,
}

impl ProductBuildEntry {
    /// Returns `true` if this build targets the given platform.
    #[must_use]
    pub fn is_for(&self, os: &str, arch: &str) -> bool {
        self.os == os && self.arch == arch
    }
}

/// Keeps the entries that point at a version directory.
#[must_use]
pub fn classify_versions(links: &[LinkEntry]) -> Vec<ProductVersionEntry> {
    classify_versions_under("/", links)
}

/// Like [`classify_versions`] for a server mounted below `root`, e.g.
/// `/hashicorp/` on a mirror. Entries outside `root` are dropped.
#[must_use]
pub fn classify_versions_under(root: &str, links: &[LinkEntry]) -> Vec<ProductVersionEntry> {
    links
        .iter()
        .filter_map(|link| {
            let path = relative_path(root, &link.url)?;
            let caps = VERSION_PATH.captures(&path)?;
            Some(ProductVersionEntry {
                product: caps["product"].to_string(),
                version: caps["version"].to_string(),
                url: link.url.clone(),
            })
        })
        .collect()
}

/// Keeps the entries that point at a platform build archive.
#[must_use]
pub fn classify_builds(links: &[LinkEntry]) -> Vec<ProductBuildEntry> {
    classify_builds_under("/", links)
}

/// Like [`classify_builds`] for a server mounted below `root`.
#[must_use]
pub fn classify_builds_under(root: &str, links: &[LinkEntry]) -> Vec<ProductBuildEntry> {
    links
        .iter()
        .filter_map(|link| {
            let path = relative_path(root, &link.url)?;
            let caps = BUILD_PATH.captures(&path)?;
            Some(ProductBuildEntry {
                product: caps["product"].to_string(),
                version: caps["version"].to_string(),
                os: caps["os"].to_string(),
                arch: caps["arch"].to_string(),
                url: link.url.clone(),
            })
        })
        .collect()
}

/// Path of `raw` with the `root` prefix removed, keeping the leading `/`.
fn relative_path(root: &str, raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let rest = url.path().strip_prefix(root.trim_end_matches('/'))?;
    rest.starts_with('/').then(|| rest.to_string())
}
