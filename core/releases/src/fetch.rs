//! HTTP retrieval with the distribution server's status contract.
//!
//! - `200` is success and the body is handed back as a stream
//! - `403` means the object does not exist ([`ReleaseError::NotFound`])
//! - any other status is [`ReleaseError::Upstream`]
//! - connection, DNS, TLS and URL failures are [`ReleaseError::Transport`]
//!
//! The server signals missing objects with `403`, not `404`. Keep it that way.
//!
//! Callers depend on the [`Fetch`] capability, not on a concrete client, so
//! tests can substitute an in-memory implementation.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};

use crate::errors::{ReleaseError, Result};

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("hashi/", env!("CARGO_PKG_VERSION"));

/// Stream of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A response body that has not been read yet.
pub struct Body {
    content_length: Option<u64>,
    stream: ByteStream,
}

impl Body {
    /// Wraps a chunk stream.
    #[must_use]
    pub fn new(content_length: Option<u64>, stream: ByteStream) -> Self {
        Self {
            content_length,
            stream,
        }
    }

    /// Creates a body that yields `bytes` as a single chunk.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self::new(
            Some(len),
            Box::pin(futures_util::stream::once(async move { Ok(bytes) })),
        )
    }

    /// Length announced by the server, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Returns the next chunk, or `None` at end of body.
    ///
    /// # Errors
    ///
    /// Returns the error produced by the underlying stream.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        self.stream.next().await.transpose()
    }

    /// Reads the remaining body into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn bytes(self) -> Result<Vec<u8>> {
        self.stream
            .try_fold(Vec::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await
    }

    /// Reads the remaining body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the body is not valid UTF-8.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes).map_err(|e| ReleaseError::parse(format!("body is not UTF-8: {e}")))
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Something that can perform a GET and return a body or a classified failure.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issues a GET for `url`.
    ///
    /// # Errors
    ///
    /// Returns `Transport`, `NotFound` or `Upstream` as described in the
    /// module documentation.
    async fn get(&self, url: &str) -> Result<Body>;
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for &F {
    async fn get(&self, url: &str) -> Result<Body> {
        (**self).get(url).await
    }
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for std::sync::Arc<F> {
    async fn get(&self, url: &str) -> Result<Body> {
        (**self).get(url).await
    }
}

/// Maps a response status to the retrieval contract.
///
/// # Errors
///
/// Returns `NotFound` for `403` and `Upstream` for anything but `200`.
pub fn check_status(url: &str, status: u16) -> Result<()> {
    match status {
        200 => Ok(()),
        403 => Err(ReleaseError::not_found(url)),
        code => Err(ReleaseError::upstream(url, code)),
    }
}

/// [`Fetch`] over the network.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default client configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Transport` error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ReleaseError::transport("<client>", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Body> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReleaseError::transport(url, e))?;

        let status = response.status().as_u16();
        tracing::debug!(url, status, "response");
        check_status(url, status)?;

        let content_length = response.content_length();
        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| ReleaseError::transport(owned_url.as_str(), e)));

        Ok(Body::new(content_length, Box::pin(stream)))
    }
}
