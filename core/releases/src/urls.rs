//! URL shapes exposed by the distribution server.
//!
//! The server lays releases out as:
//!
//! ```text
//! https://releases.hashicorp.com/
//! https://releases.hashicorp.com/consul/
//! https://releases.hashicorp.com/consul/1.4.0/
//! https://releases.hashicorp.com/consul/1.4.0/consul_1.4.0_SHA256SUMS
//! https://releases.hashicorp.com/consul/1.4.0/consul_1.4.0_linux_amd64.zip
//! ```
//!
//! Inputs are used verbatim as path segments. These templates must match the
//! server exactly.

use url::Url;

/// Default distribution server.
pub const DEFAULT_RELEASES_URL: &str = "https://releases.hashicorp.com/";

/// Builds the well-known URLs of a release server rooted at a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseUrls {
    base: String,
}

impl ReleaseUrls {
    /// Creates a builder for the given base URL.
    ///
    /// A trailing `/` is appended when missing.
    #[must_use]
    pub fn new(base: &Url) -> Self {
        let mut base = base.as_str().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    /// URL of the product listing (the server root).
    #[must_use]
    pub fn product_list(&self) -> String {
        self.base.clone()
    }

    /// URL listing the versions of `product`.
    #[must_use]
    pub fn version_list(&self, product: &str) -> String {
        format!("{}{product}/", self.base)
    }

    /// URL listing the platform builds of `product` at `version`.
    #[must_use]
    pub fn build_list(&self, product: &str, version: &str) -> String {
        format!("{}{product}/{version}/", self.base)
    }

    /// URL of the `SHA256SUMS` manifest of `product` at `version`.
    #[must_use]
    pub fn checksum_manifest(&self, product: &str, version: &str) -> String {
        format!(
            "{}{product}/{version}/{product}_{version}_SHA256SUMS",
            self.base
        )
    }

    /// URL of the zip archive of one platform build.
    #[must_use]
    pub fn build_archive(&self, product: &str, version: &str, os: &str, arch: &str) -> String {
        format!(
            "{}{product}/{version}/{product}_{version}_{os}_{arch}.zip",
            self.base
        )
    }
}

impl Default for ReleaseUrls {
    fn default() -> Self {
        Self {
            base: DEFAULT_RELEASES_URL.to_string(),
        }
    }
}
