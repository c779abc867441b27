//! Terminal rendering of installation progress.

use std::io::Write;
use std::sync::Arc;

use hashi_releases::{ProgressCallback, ProgressEvent, Stage};

/// Returns a callback that prints progress to stderr.
pub fn stderr_reporter() -> ProgressCallback {
    Arc::new(|event: ProgressEvent| render(&event))
}

fn render(event: &ProgressEvent) {
    match event {
        ProgressEvent::Retrieving { url } => eprintln!("Retrieve {url}"),
        ProgressEvent::Verified { .. } => eprintln!("Checksum Passed"),
        ProgressEvent::Started { stage, total } => redraw(*stage, 0, *total),
        ProgressEvent::Advanced { stage, done, total } => redraw(*stage, *done, *total),
        ProgressEvent::Finished { stage, done } => {
            redraw(*stage, *done, Some(*done));
            eprintln!();
        }
    }
}

fn redraw(stage: Stage, done: u64, total: Option<u64>) {
    eprint!("\r{}... {}     ", stage_label(stage), progress_text(done, total));
    let _ = std::io::stderr().flush();
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Download => "Downloading",
        Stage::Extract => "Extracting",
    }
}

fn progress_text(done: u64, total: Option<u64>) -> String {
    match total {
        Some(total) => format!("{}/{}", format_bytes(done), format_bytes(total)),
        None => format_bytes(done),
    }
}

/// Formats bytes into a human-readable string (KB, MB, GB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
