//! Download into a private staging file while hashing the bytes written.
//!
//! The digest is computed from the same byte stream that lands on disk by
//! routing every write through [`HashingWriter`]; the file is never re-read
//! to compute it.
//!
//! The staging file is a [`tempfile::NamedTempFile`] and is removed when the
//! returned [`StagedArchive`] (or, on failure, the partially written file) is
//! dropped.

use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::checksum::Checksum;
use crate::errors::{ReleaseError, Result};
use crate::fetch::Fetch;
use crate::progress::{ProgressCallback, Reporter, Stage};

/// Prefix of staging file names.
pub const STAGING_PREFIX: &str = "hashi-";

/// Writer adapter that feeds every byte accepted by the inner writer into a
/// running SHA-256.
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Returns the inner writer and the digest of everything written.
    pub fn finalize(self) -> (W, Checksum) {
        let digest: [u8; 32] = self.hasher.finalize().into();
        (self.inner, Checksum::new(digest))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// A fully downloaded archive waiting for verification.
#[derive(Debug)]
pub struct StagedArchive {
    file: NamedTempFile,
    checksum: Checksum,
    size: u64,
}

impl StagedArchive {
    /// Location of the staging file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Digest of the downloaded bytes.
    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// Number of bytes downloaded.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Downloads `url` into a new staging file.
///
/// The file is created in `staging_dir`, or in the system temp directory
/// when `None`.
///
/// # Errors
///
/// Returns the fetcher's error, a `Transport` error if the body stream
/// fails, or a `Filesystem` error if the staging file cannot be written.
/// The staging file is removed before returning an error.
pub async fn download_to_temp<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    staging_dir: Option<&Path>,
    progress: Option<ProgressCallback>,
) -> Result<StagedArchive> {
    let mut body = fetcher.get(url).await?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);
    let staging = match staging_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| ReleaseError::filesystem("Failed to create staging file", e))?;
    tracing::debug!(url, path = %staging.path().display(), "staging download");

    let mut writer = HashingWriter::new(staging);
    let mut reporter = Reporter::start(progress, Stage::Download, body.content_length());

    while let Some(chunk) = body.chunk().await? {
        writer
            .write_all(&chunk)
            .map_err(|e| ReleaseError::filesystem("Failed to write staging file", e))?;
        reporter.advance(chunk.len());
    }

    writer
        .flush()
        .map_err(|e| ReleaseError::filesystem("Failed to flush staging file", e))?;
    let size = reporter.finish();
    let (file, checksum) = writer.finalize();
    file.as_file()
        .sync_all()
        .map_err(|e| ReleaseError::filesystem("Failed to sync staging file", e))?;

    tracing::debug!(url, size, %checksum, "download complete");

    Ok(StagedArchive {
        file,
        checksum,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Body;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct Chunks(Vec<&'static [u8]>);

    #[async_trait]
    impl Fetch for Chunks {
        async fn get(&self, _url: &str) -> Result<Body> {
            let chunks: Vec<Result<Bytes>> =
                self.0.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
            Ok(Body::new(None, Box::pin(futures_util::stream::iter(chunks))))
        }
    }

    struct Broken;

    #[async_trait]
    impl Fetch for Broken {
        async fn get(&self, url: &str) -> Result<Body> {
            let chunks: Vec<Result<Bytes>> = vec![
                Ok(Bytes::from_static(b"partial")),
                Err(ReleaseError::transport(url, "connection reset")),
            ];
            Ok(Body::new(Some(100), Box::pin(futures_util::stream::iter(chunks))))
        }
    }

    struct Missing;

    #[async_trait]
    impl Fetch for Missing {
        async fn get(&self, url: &str) -> Result<Body> {
            Err(ReleaseError::not_found(url))
        }
    }

    #[test]
    fn hashing_writer_matches_direct_hash() {
        let mut writer = HashingWriter::new(Vec::new());
        writer.write_all(b"Hel").expect("write");
        writer.write_all(b"lo").expect("write");
        let (inner, checksum) = writer.finalize();

        assert_eq!(inner, b"Hello");
        assert_eq!(
            checksum.to_string(),
            "185f8db32271fe25f561a6fc938b2e264306ec304eda518007d1764826381969"
        );
    }

    #[test]
    fn hashing_writer_hashes_only_accepted_bytes() {
        let mut buf = [0u8; 3];
        let mut writer = HashingWriter::new(&mut buf[..]);
        let written = writer.write(b"Hello").expect("write");
        assert_eq!(written, 3);
        let (_, checksum) = writer.finalize();

        let expected: [u8; 32] = Sha256::digest(b"Hel").into();
        assert_eq!(checksum, Checksum::new(expected));
    }

    #[tokio::test]
    async fn streamed_digest_equals_digest_of_content() {
        let fetcher = Chunks(vec![&b"He"[..], &b"l"[..], &b"lo"[..]]);
        let staged = download_to_temp(&fetcher, "https://example.com/a.zip", None, None)
            .await
            .expect("download succeeds");

        let expected: [u8; 32] = Sha256::digest(b"Hello").into();
        assert_eq!(staged.checksum(), Checksum::new(expected));
        assert_eq!(staged.size(), 5);
        assert_eq!(std::fs::read(staged.path()).expect("staged file"), b"Hello");
    }

    #[tokio::test]
    async fn staging_file_is_removed_on_drop() {
        let fetcher = Chunks(vec![&b"data"[..]]);
        let staged = download_to_temp(&fetcher, "https://example.com/a.zip", None, None)
            .await
            .expect("download succeeds");
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn stream_failure_is_reported() {
        let err = download_to_temp(&Broken, "https://example.com/a.zip", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Transport { .. }));
    }

    #[tokio::test]
    async fn fetch_failure_is_passed_through() {
        let err = download_to_temp(&Missing, "https://example.com/a.zip", None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    fn staging_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .expect("Should read staging dir")
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .count()
    }

    #[tokio::test]
    async fn staging_file_is_created_in_the_given_dir() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let staged = download_to_temp(&Chunks(vec![&b"zip"[..]]), "u", Some(dir.path()), None)
            .await
            .expect("download succeeds");
        assert!(staged.path().starts_with(dir.path()));
        assert_eq!(staging_files(dir.path()), 1);
        drop(staged);
        assert_eq!(staging_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn staging_file_is_removed_after_stream_failure() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let err = download_to_temp(&Broken, "https://example.com/a.zip", Some(dir.path()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Transport { .. }));
        assert_eq!(staging_files(dir.path()), 0);
    }
}
