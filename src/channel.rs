// Update channel between worker threads and the polling consumer
// Thin wrapper over a crossbeam FIFO with non-blocking drain semantics

use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

/// One message streamed out of the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Update {
    /// Aggregate progress fraction in [0, 1]
    Progress(f64),
    /// Finished hash for one file
    Result {
        base: PathBuf,
        path: PathBuf,
        hash: String,
        algorithm: String,
    },
    /// Per-path failure; never aborts the run
    Error {
        base: PathBuf,
        path: PathBuf,
        message: String,
    },
    /// Advisory notice, e.g. "Nothing to hash"
    Toast(String),
}

/// Thread-safe FIFO connecting any number of producers to one polling
/// consumer. Cloned handles share the same queue.
#[derive(Debug, Clone)]
pub struct UpdateChannel {
    tx: Sender<Update>,
    rx: Receiver<Update>,
}

impl UpdateChannel {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn push(&self, update: Update) {
        // send only fails when every receiver is gone, at which point
        // nobody is listening anyway
        let _ = self.tx.send(update);
    }

    /// Queue the progress fraction for `bytes_read` of `total_bytes`,
    /// clamped to 1.0. A zero total counts as complete.
    pub fn progress(&self, bytes_read: u64, total_bytes: u64) {
        let fraction = if total_bytes == 0 {
            1.0
        } else {
            (bytes_read as f64 / total_bytes as f64).min(1.0)
        };
        self.push(Update::Progress(fraction));
    }

    pub fn result(&self, base: &Path, path: &Path, hash: String, algorithm: &str) {
        self.push(Update::Result {
            base: base.to_path_buf(),
            path: path.to_path_buf(),
            hash,
            algorithm: algorithm.to_string(),
        });
    }

    pub fn error(&self, base: &Path, path: &Path, message: impl Into<String>) {
        self.push(Update::Error {
            base: base.to_path_buf(),
            path: path.to_path_buf(),
            message: message.into(),
        });
    }

    pub fn toast(&self, message: impl Into<String>) {
        self.push(Update::Toast(message.into()));
    }

    /// Non-blocking pop; None when the queue is currently empty
    pub fn try_pop(&self) -> Option<Update> {
        self.rx.try_recv().ok()
    }

    /// Pop up to `max` pending messages, bounding per-poll consumer latency
    pub fn drain(&self, max: usize) -> Vec<Update> {
        let mut out = Vec::new();
        while out.len() < max {
            match self.try_pop() {
                Some(update) => out.push(update),
                None => break,
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Discard every pending message, used after a cancellation so stale
    /// partial results are never rendered
    pub fn reset(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

impl Default for UpdateChannel {
    fn default() -> Self {
        Self::new()
    }
}
