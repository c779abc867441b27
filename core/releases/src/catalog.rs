//! Release discovery: products, versions and platform builds.

use url::Url;

use crate::classify::{
    ProductBuildEntry, ProductVersionEntry, classify_builds_under, classify_versions_under,
};
use crate::config::Config;
use crate::errors::{ReleaseError, Result};
use crate::fetch::Fetch;
use crate::links::{LinkEntry, parse_links};
use crate::urls::ReleaseUrls;

/// Browses the directory listings of a release server.
pub struct Catalog<F> {
    fetcher: F,
    urls: ReleaseUrls,
    root: String,
}

impl<F: Fetch> Catalog<F> {
    /// Creates a catalog reading from the configured server.
    pub fn new(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            urls: config.urls(),
            root: config.releases_url.path().to_string(),
        }
    }

    /// Lists every entry of the server root.
    ///
    /// # Errors
    ///
    /// Returns the retrieval error if the listing cannot be fetched.
    pub async fn products(&self) -> Result<Vec<LinkEntry>> {
        self.links(&self.urls.product_list()).await
    }

    /// Lists the versions of `product`.
    ///
    /// # Errors
    ///
    /// Returns the retrieval error if the listing cannot be fetched.
    pub async fn versions(&self, product: &str) -> Result<Vec<ProductVersionEntry>> {
        let links = self.links(&self.urls.version_list(product)).await?;
        Ok(classify_versions_under(&self.root, &links))
    }

    /// Lists the platform builds of `product` at `version`.
    ///
    /// # Errors
    ///
    /// Returns the retrieval error if the listing cannot be fetched.
    pub async fn builds(&self, product: &str, version: &str) -> Result<Vec<ProductBuildEntry>> {
        let links = self.links(&self.urls.build_list(product, version)).await?;
        Ok(classify_builds_under(&self.root, &links))
    }

    async fn links(&self, url: &str) -> Result<Vec<LinkEntry>> {
        let base =
            Url::parse(url).map_err(|e| ReleaseError::parse(format!("invalid URL {url}: {e}")))?;

        let body = self.fetcher.get(url).await?;
        let bytes = body.bytes().await?;
        let document = String::from_utf8_lossy(&bytes);

        let links = parse_links(&base, &document);
        tracing::debug!(url, count = links.len(), "parsed listing");
        Ok(links)
    }
}
