//! Progress reporting for installations.
//!
//! Progress is a best-effort side channel. Events are delivered to an
//! optional callback and `Advanced` events are throttled to a fixed
//! wall-clock interval. Nothing here can fail or influence the transfer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::checksum::Checksum;

/// Minimum interval between `Advanced` events.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Which transfer an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Downloading the build archive.
    Download,
    /// Extracting the binary from the archive.
    Extract,
}

/// Progress event emitted during an installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The build archive is about to be requested.
    Retrieving {
        /// URL of the build archive.
        url: String,
    },
    /// The downloaded archive matched its published digest.
    Verified {
        /// The verified digest.
        checksum: Checksum,
    },
    /// The transfer has started.
    Started {
        /// Stage of the transfer.
        stage: Stage,
        /// Total size in bytes, if known.
        total: Option<u64>,
    },
    /// Bytes transferred so far.
    Advanced {
        /// Stage of the transfer.
        stage: Stage,
        /// Bytes transferred so far.
        done: u64,
        /// Total size in bytes, if known.
        total: Option<u64>,
    },
    /// The transfer completed.
    Finished {
        /// Stage of the transfer.
        stage: Stage,
        /// Bytes transferred in total.
        done: u64,
    },
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Throttled event emitter for one transfer.
pub(crate) struct Reporter {
    callback: Option<ProgressCallback>,
    stage: Stage,
    total: Option<u64>,
    done: u64,
    last_emit: Instant,
}

impl Reporter {
    pub(crate) fn start(callback: Option<ProgressCallback>, stage: Stage, total: Option<u64>) -> Self {
        if let Some(cb) = &callback {
            cb(ProgressEvent::Started { stage, total });
        }
        Self {
            callback,
            stage,
            total,
            done: 0,
            last_emit: Instant::now(),
        }
    }

    pub(crate) fn advance(&mut self, bytes: usize) {
        self.done += bytes as u64;
        let Some(cb) = &self.callback else {
            return;
        };

        let now = Instant::now();
        if now.duration_since(self.last_emit) >= PROGRESS_INTERVAL {
            cb(ProgressEvent::Advanced {
                stage: self.stage,
                done: self.done,
                total: self.total,
            });
            self.last_emit = now;
        }
    }

    pub(crate) fn finish(self) -> u64 {
        if let Some(cb) = &self.callback {
            cb(ProgressEvent::Finished {
                stage: self.stage,
                done: self.done,
            });
        }
        self.done
    }
}
