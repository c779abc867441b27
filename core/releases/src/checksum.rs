//! `SHA256SUMS` manifest parsing.
//!
//! A manifest is plain text, one build per line:
//!
//! ```text
//! 7a0d9bd4d3b8ea5e6c7a4b5d2ca3b5e8b1f8f5a0f3f6c2d1b4e9a8c7d6e5f4a3  consul_1.4.0_linux_amd64.zip
//! ```
//!
//! Lines that do not match (blank lines, signatures, non-zip files) are
//! skipped.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::{ReleaseError, Result};

static MANIFEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<digest>[0-9a-f]{64})\s+(?P<product>.+)_(?P<version>[^_]+)_(?P<os>[^_]+)_(?P<arch>[^_]+)\.zip$",
    )
    .expect("valid manifest pattern")
});

/// A SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Wraps raw digest bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decodes a 64-character hex string.
    ///
    /// # Errors
    ///
    /// Returns a `Parse` error unless the input decodes to exactly 32 bytes.
    pub fn from_hex(hex_digest: &str) -> Result<Self> {
        let bytes = hex::decode(hex_digest)
            .map_err(|e| ReleaseError::parse(format!("invalid digest {hex_digest}: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ReleaseError::parse(format!(
                "digest {hex_digest} is {} bytes, expected 32",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl FromStr for Checksum {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({self})")
    }
}

impl Serialize for Checksum {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The published digest of one platform build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChecksumEntry {
    /// Product name.
    pub product: String,
    /// Version string.
    pub version: String,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
    /// SHA-256 of the zip archive.
    pub digest: Checksum,
}

impl ChecksumEntry {
    /// Returns `true` if this entry describes exactly the given build.
    #[must_use]
    pub fn matches(&self, product: &str, version: &str, os: &str, arch: &str) -> bool {
        self.product == product && self.version == version && self.os == os && self.arch == arch
    }
}

/// Parses manifest text into checksum entries in line order.
#[must_use]
pub fn parse_checksum_list(manifest: &str) -> Vec<ChecksumEntry> {
    manifest
        .lines()
        .filter_map(|line| {
            let caps = MANIFEST_LINE.captures(line)?;
            let digest = match Checksum::from_hex(&caps["digest"]) {
                Ok(digest) => digest,
                Err(e) => {
                    tracing::warn!(line, error = %e, "dropping manifest line");
                    return None;
                }
            };
            Some(ChecksumEntry {
                product: caps["product"].to_string(),
                version: caps["version"].to_string(),
                os: caps["os"].to_string(),
                arch: caps["arch"].to_string(),
                digest,
            })
        })
        .collect()
}

/// Finds the entry for one build.
#[must_use]
pub fn find_checksum<'a>(
    entries: &'a [ChecksumEntry],
    product: &str,
    version: &str,
    os: &str,
    arch: &str,
) -> Option<&'a ChecksumEntry> {
    entries
        .iter()
        .find(|entry| entry.matches(product, version, os, arch))
}
