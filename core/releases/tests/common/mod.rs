//! Shared fixtures for the release integration tests.
//!
//! [`StaticServer`] stands in for the distribution server: it serves fixed
//! bodies by URL and answers every other URL the way the real server does
//! for missing objects.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use hashi_releases::{Body, Config, Fetch, ReleaseError, Result, Target};
use sha2::{Digest, Sha256};

pub const BASE: &str = "https://releases.example.com/";

/// In-memory [`Fetch`] implementation.
#[derive(Default)]
pub struct StaticServer {
    bodies: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
    interrupted: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StaticServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn fail(mut self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }

    /// Serves `partial` for `url`, then fails the body stream.
    pub fn interrupt(mut self, url: impl Into<String>, partial: impl Into<Vec<u8>>) -> Self {
        self.interrupted.insert(url.into(), partial.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Fetch for StaticServer {
    async fn get(&self, url: &str) -> Result<Body> {
        self.requests.lock().expect("lock").push(url.to_string());

        if let Some(status) = self.statuses.get(url) {
            hashi_releases::fetch::check_status(url, *status)?;
        }
        if let Some(partial) = self.interrupted.get(url) {
            let chunks: Vec<Result<Bytes>> = vec![
                Ok(Bytes::from(partial.clone())),
                Err(ReleaseError::transport(url, "connection reset by peer")),
            ];
            let total = partial.len() as u64 * 2;
            return Ok(Body::new(Some(total), Box::pin(futures_util::stream::iter(chunks))));
        }
        match self.bodies.get(url) {
            Some(body) => Ok(Body::from_bytes(body.clone())),
            None => Err(ReleaseError::not_found(url)),
        }
    }
}

pub fn config(os: &str, arch: &str) -> Config {
    config_at(BASE, os, arch)
}

pub fn config_at(base: &str, os: &str, arch: &str) -> Config {
    Config::from_server(Some(base))
        .expect("valid base")
        .with_target(Target::new(os, arch))
}

/// Builds an in-memory zip with the given entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).expect("Should start file");
        zip.write_all(content).expect("Should write content");
    }
    zip.finish().expect("Should finish zip").into_inner()
}

/// Number of download staging files in `dir`.
pub fn staging_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("Should read staging dir")
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with(hashi_releases::download::STAGING_PREFIX)
        })
        .count()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Renders a `SHA256SUMS` manifest.
pub fn manifest(lines: &[(&str, &str)]) -> String {
    lines
        .iter()
        .map(|(digest, file)| format!("{digest}  {file}\n"))
        .collect()
}

/// Renders a directory listing page in the server's layout.
pub fn listing(title: &str, hrefs: &[(&str, &str)]) -> String {
    let items: String = hrefs
        .iter()
        .map(|(href, label)| format!("    <li>\n      <a href=\"{href}\">{label}</a>\n    </li>\n"))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n  <ul>\n{items}  </ul>\n  <footer><a href=\"https://example.com/\">Example</a></footer>\n</body>\n</html>\n"
    )
}
