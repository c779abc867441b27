//! Runtime configuration.
//!
//! Configuration is an explicit value handed to [`crate::Catalog`] and
//! [`crate::Installer`]. The release server can be overridden through the
//! `HASHI_RELEASES_URL` environment variable, e.g. to use a mirror.

use url::Url;

use crate::errors::{ReleaseError, Result};
use crate::platform::Target;
use crate::urls::{DEFAULT_RELEASES_URL, ReleaseUrls};

/// Environment variable to override the release server URL.
pub const RELEASES_URL_ENV: &str = "HASHI_RELEASES_URL";

/// Where releases come from and which platform builds to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the release server.
    pub releases_url: Url,
    /// Platform whose builds are installed and highlighted.
    pub target: Target,
}

impl Config {
    /// Creates a configuration for an explicit server and target.
    #[must_use]
    pub fn new(releases_url: Url, target: Target) -> Self {
        Self {
            releases_url,
            target,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// Empty or whitespace-only values of `HASHI_RELEASES_URL` are treated as
    /// unset. The target defaults to the host platform.
    ///
    /// # Errors
    ///
    /// Returns a `Parse` error if the override is not a valid URL.
    pub fn from_env() -> Result<Self> {
        let server = std::env::var(RELEASES_URL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty());
        Self::from_server(server.as_deref())
    }

    /// Builds a configuration from an optional server override.
    ///
    /// # Errors
    ///
    /// Returns a `Parse` error if `server` is not a valid URL.
    pub fn from_server(server: Option<&str>) -> Result<Self> {
        let raw = server.map_or(DEFAULT_RELEASES_URL, str::trim);
        let releases_url = Url::parse(raw)
            .map_err(|e| ReleaseError::parse(format!("invalid release server {raw}: {e}")))?;
        Ok(Self::new(releases_url, Target::host()))
    }

    /// Returns a copy targeting a different platform.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// URL builder rooted at the configured server.
    #[must_use]
    pub fn urls(&self) -> ReleaseUrls {
        ReleaseUrls::new(&self.releases_url)
    }
}
