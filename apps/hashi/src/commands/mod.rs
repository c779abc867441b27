//! Command modules for the hashi CLI.
//!
//! - [`list`] - Discover products, versions and builds
//! - [`install`] - Install a verified build

pub mod install;
pub mod list;
