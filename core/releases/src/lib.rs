#![warn(clippy::pedantic)]

//! # Release resolution and installation
//!
//! Discovers and installs published release builds from a directory-listing
//! distribution server such as `https://releases.hashicorp.com/`.
//!
//! ## Discovery
//!
//! The server renders one HTML listing per directory level. [`Catalog`]
//! fetches a listing, extracts its entries with [`parse_links`] and
//! reinterprets them as products, [`ProductVersionEntry`]s or
//! [`ProductBuildEntry`]s from the URL path alone.
//!
//! ## Installation
//!
//! [`Installer`] downloads a build archive while hashing it, checks the
//! digest against the `SHA256SUMS` manifest published next to it, and only
//! then extracts the product binary to the requested path.
//!
//! ## Module Structure
//!
//! - [`links`] - Directory-listing link extraction
//! - [`classify`] - Version and build classification
//! - [`checksum`] - `SHA256SUMS` manifest parsing
//! - [`urls`] - Server URL shapes
//! - [`fetch`] - HTTP retrieval and status contract
//! - [`download`] - Staged download with streaming digest
//! - [`archive`] - Binary extraction from zip archives
//! - [`install`] - The installation pipeline
//! - [`catalog`] - Release discovery
//! - [`config`] - Server and target configuration
//! - [`platform`] - Target platform naming
//! - [`progress`] - Progress events

pub mod archive;
pub mod catalog;
pub mod checksum;
pub mod classify;
pub mod config;
pub mod download;
pub mod errors;
pub mod fetch;
pub mod install;
pub mod links;
pub mod platform;
pub mod progress;
pub mod urls;

pub use catalog::Catalog;
pub use checksum::{Checksum, ChecksumEntry, parse_checksum_list};
pub use classify::{
    ProductBuildEntry, ProductVersionEntry, classify_builds, classify_builds_under, classify_versions,
    classify_versions_under,
};
pub use config::Config;
pub use errors::{ReleaseError, Result};
pub use fetch::{Body, Fetch, HttpFetcher};
pub use install::{Installation, Installer};
pub use links::{LinkEntry, parse_link_list, parse_links};
pub use platform::Target;
pub use progress::{ProgressCallback, ProgressEvent, Stage};
pub use urls::ReleaseUrls;
