//! Error types for release discovery and installation.
//!
//! Every stage of the pipeline returns its failure to the immediate caller
//! as a [`ReleaseError`]. Nothing in this crate retries; turning an error
//! into a message and an exit code is the caller's job.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Consolidated error type for release operations.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// DNS, connection, TLS or malformed-URL failure while talking to the server.
    #[error("failed to get {url}: {source}")]
    Transport {
        /// The URL being requested.
        url: String,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },

    /// The server reported that the object does not exist.
    ///
    /// The distribution server answers `403` for missing objects.
    #[error("{url} not found")]
    NotFound {
        /// The URL that does not exist.
        url: String,
    },

    /// The server answered with an unexpected status code.
    #[error("failed to get {url} (status: {status})")]
    Upstream {
        /// The requested URL.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// A URL, document or manifest could not be interpreted.
    #[error("parse error: {message}")]
    Parse {
        /// Description of what could not be parsed.
        message: String,
    },

    /// The checksum manifest has no entry for the requested build.
    #[error("checksum not found for {product} {version} ({os}/{arch})")]
    ChecksumNotFound {
        /// Product name.
        product: String,
        /// Product version.
        version: String,
        /// Target operating system.
        os: String,
        /// Target architecture.
        arch: String,
    },

    /// The downloaded archive does not hash to the published digest.
    #[error("checksum failed: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest published in the manifest.
        expected: String,
        /// Digest of the downloaded bytes.
        actual: String,
    },

    /// The archive does not contain the expected binary.
    #[error("{name} not found in zip")]
    ArchiveEntryNotFound {
        /// Entry name that was looked up.
        name: String,
    },

    /// The staged file is not a readable zip archive.
    #[error("invalid archive {}: {source}", path.display())]
    InvalidArchive {
        /// Path of the staged archive.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// Creating, writing or reading a local file failed.
    #[error("{message}: {source}")]
    Filesystem {
        /// Description of the file operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseError {
    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Creates a new `Upstream` error.
    #[must_use]
    pub fn upstream(url: impl Into<String>, status: u16) -> Self {
        Self::Upstream {
            url: url.into(),
            status,
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a new `ChecksumNotFound` error.
    #[must_use]
    pub fn checksum_not_found(
        product: impl Into<String>,
        version: impl Into<String>,
        os: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self::ChecksumNotFound {
            product: product.into(),
            version: version.into(),
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `ArchiveEntryNotFound` error.
    #[must_use]
    pub fn archive_entry_not_found(name: impl Into<String>) -> Self {
        Self::ArchiveEntryNotFound { name: name.into() }
    }

    /// Creates a new `InvalidArchive` error.
    #[must_use]
    pub fn invalid_archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::InvalidArchive {
            path: path.into(),
            source,
        }
    }

    /// Creates a new `Filesystem` error from an I/O error with context.
    #[must_use]
    pub fn filesystem(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Filesystem {
            message: message.into(),
            source,
        }
    }

    /// Returns `true` when the remote object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
