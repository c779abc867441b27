//! Verified installation of a single release binary.
//!
//! # Pipeline
//!
//! 1. Resolve the archive and checksum manifest URLs
//! 2. Download the archive into a staging file, hashing it on the way
//! 3. Fetch the manifest and find the digest of this exact build
//! 4. Compare digests; a mismatch stops the pipeline
//! 5. Extract the binary named after the product to the destination
//!
//! Each stage runs only after the previous one finished. Any failure ends
//! the installation; nothing is retried and the staging file is always
//! removed. There is no way to skip verification.

use std::path::{Path, PathBuf};

use crate::archive::extract_binary;
use crate::checksum::{Checksum, find_checksum, parse_checksum_list};
use crate::config::Config;
use crate::download::download_to_temp;
use crate::errors::{ReleaseError, Result};
use crate::fetch::Fetch;
use crate::platform::Target;
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::urls::ReleaseUrls;

/// Outcome of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Installed product.
    pub product: String,
    /// Installed version.
    pub version: String,
    /// Platform of the installed build.
    pub target: Target,
    /// Path of the installed binary.
    pub destination: PathBuf,
    /// Verified digest of the build archive.
    pub checksum: Checksum,
    /// Size of the installed binary in bytes.
    pub size: u64,
}

/// Downloads, verifies and unpacks release builds.
pub struct Installer<F> {
    fetcher: F,
    urls: ReleaseUrls,
    target: Target,
    staging_dir: Option<PathBuf>,
    progress: Option<ProgressCallback>,
}

impl<F: Fetch> Installer<F> {
    /// Creates an installer for the configured server and target.
    pub fn new(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            urls: config.urls(),
            target: config.target.clone(),
            staging_dir: None,
            progress: None,
        }
    }

    /// Reports progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Stages downloads in `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Platform whose builds are installed.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// URL of the build archive for `product` at `version`.
    #[must_use]
    pub fn archive_url(&self, product: &str, version: &str) -> String {
        self.urls
            .build_archive(product, version, &self.target.os, &self.target.arch)
    }

    /// Installs `product` at `version` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails. The destination is
    /// only touched once the checksum has been verified.
    pub async fn install(
        &self,
        product: &str,
        version: &str,
        destination: &Path,
    ) -> Result<Installation> {
        let archive_url = self.archive_url(product, version);
        tracing::info!(product, version, target = %self.target, url = %archive_url, "retrieving build");
        self.emit(ProgressEvent::Retrieving {
            url: archive_url.clone(),
        });

        let staged = download_to_temp(
            &self.fetcher,
            &archive_url,
            self.staging_dir.as_deref(),
            self.progress.clone(),
        )
        .await?;
        tracing::info!(size = staged.size(), checksum = %staged.checksum(), "download complete");

        let expected = self.expected_checksum(product, version).await?;
        verify_checksum(&expected, &staged.checksum())?;
        tracing::info!(checksum = %expected, "checksum passed");
        self.emit(ProgressEvent::Verified { checksum: expected });

        let size = extract_binary(staged.path(), product, destination, self.progress.clone())?;
        tracing::info!(destination = %destination.display(), size, "installed");

        Ok(Installation {
            product: product.to_string(),
            version: version.to_string(),
            target: self.target.clone(),
            destination: destination.to_path_buf(),
            checksum: expected,
            size,
        })
    }

    /// Looks up the published digest of the target build.
    ///
    /// # Errors
    ///
    /// Returns the retrieval error if the manifest cannot be fetched, a
    /// `Parse` error if it contains no checksum lines, or
    /// `ChecksumNotFound` if the target build is not listed.
    pub async fn expected_checksum(&self, product: &str, version: &str) -> Result<Checksum> {
        let url = self.urls.checksum_manifest(product, version);
        tracing::debug!(url, "fetching checksum manifest");

        let manifest = self.fetcher.get(&url).await?.text().await?;
        let entries = parse_checksum_list(&manifest);
        if entries.is_empty() {
            return Err(ReleaseError::parse(format!(
                "checksum manifest {url} contains no entries"
            )));
        }

        let Target { os, arch } = &self.target;
        find_checksum(&entries, product, version, os, arch)
            .map(|entry| entry.digest)
            .ok_or_else(|| ReleaseError::checksum_not_found(product, version, os, arch))
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(event);
        }
    }
}

/// Compares the published digest with the digest of the downloaded bytes.
///
/// # Errors
///
/// Returns `ChecksumMismatch` if the digests differ.
pub fn verify_checksum(expected: &Checksum, actual: &Checksum) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ReleaseError::checksum_mismatch(
            expected.to_string(),
            actual.to_string(),
        ))
    }
}
