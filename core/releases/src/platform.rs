//! Target platform naming.
//!
//! The distribution server names builds with Go-style identifiers
//! (`darwin`, `amd64`, `386`, ...). [`Target::host`] translates the
//! platform this binary was compiled for into those names.

use std::fmt;

use serde::Serialize;

/// An operating system and architecture pair as named by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    /// Operating system, e.g. `linux`.
    pub os: String,
    /// Architecture, e.g. `amd64`.
    pub arch: String,
}

impl Target {
    /// Creates a target from explicit names.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for.
    #[must_use]
    pub fn host() -> Self {
        Self::new(
            server_os(std::env::consts::OS),
            server_arch(std::env::consts::ARCH),
        )
    }

    /// Replaces the OS and/or architecture when overrides are given.
    #[must_use]
    pub fn with_overrides(self, os: Option<String>, arch: Option<String>) -> Self {
        Self {
            os: os.unwrap_or(self.os),
            arch: arch.unwrap_or(self.arch),
        }
    }

    /// Returns `true` if this target is the given OS and architecture.
    #[must_use]
    pub fn is(&self, os: &str, arch: &str) -> bool {
        self.os == os && self.arch == arch
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn server_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn server_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        other => other,
    }
}
