// Hashing engine
// Enumerates jobs under cancellation and executes them across a bounded
// worker pool, streaming progress/results/errors through the update channel

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::algo::{bytes_to_hex, HashRegistry};
use crate::channel::UpdateChannel;
use crate::error::EngineError;
use crate::ignore::IgnoreSet;

/// Name of the per-directory pattern file honored during enumeration
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Files above this size are read in larger chunks
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;
const LARGE_CHUNK_SIZE: usize = 4 * 1024 * 1024;
const SMALL_CHUNK_SIZE: usize = 1024 * 1024;

/// Emit a progress message every Nth chunk instead of flooding the channel
const PROGRESS_CHUNK_INTERVAL: u32 = 4;

const MAX_WORKERS_LIMIT: usize = 16;

/// Engine configuration, bound by the host to its preferences layer
#[derive(Debug, Clone, Serialize)]
pub struct HashOptions {
    /// Descend into subdirectories of directory roots
    pub recursive: bool,
    /// Honor per-directory ignore files during enumeration
    pub respect_ignore_file: bool,
    /// Skip zero-byte files silently instead of reporting them as errors
    pub ignore_empty_files: bool,
    /// Worker pool size, clamped to 1..=16
    pub max_workers: usize,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            respect_ignore_file: true,
            ignore_empty_files: false,
            max_workers: 4,
        }
    }
}

/// One unit of hashing work produced by enumeration
///
/// `size` is sampled once at enumeration time and is the source of truth
/// for progress accounting; `base` is the root the file was discovered
/// under, carried for the consumer's relativized display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub path: PathBuf,
    pub base: PathBuf,
    pub size: u64,
}

/// Algorithm choice for a run: one algorithm for every job, or one entry
/// per job (the "many algorithms for one file" workflow passes the same
/// root repeatedly with a per-job list)
#[derive(Debug, Clone, Serialize)]
pub enum AlgoSelection {
    Single(String),
    PerJob(Vec<String>),
}

impl AlgoSelection {
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single(name.into())
    }

    fn resolve(&self, jobs: usize) -> Result<Vec<String>, EngineError> {
        match self {
            Self::Single(name) => Ok(vec![name.clone(); jobs]),
            Self::PerJob(names) if names.len() == jobs => Ok(names.clone()),
            Self::PerJob(names) => Err(EngineError::AlgorithmCountMismatch {
                expected: jobs,
                got: names.len(),
            }),
        }
    }
}

/// Concurrent file-discovery and hashing engine
///
/// Plain instantiable object: the queue, cancellation flag and options are
/// passed in, and the byte counters live on the instance so concurrent
/// engines never cross-contaminate.
pub struct HashEngine {
    options: HashOptions,
    channel: UpdateChannel,
    cancel: Arc<AtomicBool>,
    total_bytes: AtomicU64,
    bytes_read: AtomicU64,
    // serializes counter reads against channel sends so queued Progress
    // fractions are non-decreasing in FIFO order
    progress_gate: Mutex<()>,
}

impl HashEngine {
    pub fn new(options: HashOptions, channel: UpdateChannel, cancel: Arc<AtomicBool>) -> Self {
        Self {
            options,
            channel,
            cancel,
            total_bytes: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            progress_gate: Mutex::new(()),
        }
    }

    pub fn options(&self) -> &HashOptions {
        &self.options
    }

    pub fn channel(&self) -> &UpdateChannel {
        &self.channel
    }

    /// Sum of all enumerated job sizes for the current run
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::SeqCst)
    }

    /// Cumulative bytes processed across all workers
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::SeqCst)
    }

    /// Zero both byte counters; must run between independent runs
    pub fn reset_counters(&self) {
        self.total_bytes.store(0, Ordering::SeqCst);
        self.bytes_read.store(0, Ordering::SeqCst);
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Full run: enumerate the roots, then hash every job
    ///
    /// Per-path failures become `Update::Error` messages and never abort
    /// the run; only configuration problems (a per-job algorithm list of
    /// the wrong length, worker pool construction) return `Err`.
    pub fn run(&self, roots: &[PathBuf], selection: &AlgoSelection) -> Result<(), EngineError> {
        self.reset_counters();
        let jobs = self.enumerate(roots);
        self.execute(&jobs, selection)
    }

    /// Walk each root and build the flat job list
    ///
    /// Explicitly named roots bypass ignore rules; children of directory
    /// roots inherit the root's ignore file, extended per subdirectory.
    pub fn enumerate(&self, roots: &[PathBuf]) -> Vec<Job> {
        let mut jobs = Vec::new();

        for root in roots {
            if self.cancelled() {
                break;
            }
            if root.is_dir() {
                let rules = self.load_root_rules(root);
                match fs::read_dir(root) {
                    Ok(entries) => {
                        for entry in entries {
                            match entry {
                                Ok(entry) => {
                                    let child = entry.path();
                                    if rules.is_ignored(&child, child.is_dir()) {
                                        debug!("skipped early: {}", child.display());
                                        continue;
                                    }
                                    self.visit(root, &child, &rules, &mut jobs);
                                }
                                Err(e) => self.channel.error(root, root, e.to_string()),
                            }
                        }
                    }
                    Err(e) => self.channel.error(root, root, e.to_string()),
                }
            } else {
                self.visit(root, root, &IgnoreSet::new(), &mut jobs);
            }
        }

        // degenerate run: nothing eligible was found
        if !self.cancelled() && self.total_bytes() == 0 {
            self.channel.progress(1, 1);
            self.channel.toast("Nothing to hash");
        }

        jobs
    }

    fn load_root_rules(&self, root: &Path) -> IgnoreSet {
        if !self.options.respect_ignore_file {
            return IgnoreSet::new();
        }
        let ignore_file = root.join(IGNORE_FILE_NAME);
        if !ignore_file.is_file() {
            return IgnoreSet::new();
        }
        match IgnoreSet::from_file(&ignore_file, None) {
            Ok(rules) => {
                debug!("loaded {} rules from {}", rules.len(), ignore_file.display());
                rules
            }
            Err(e) => {
                warn!("failed to load {}: {}", ignore_file.display(), e);
                IgnoreSet::new()
            }
        }
    }

    /// Copy-extend the inherited rules with a pattern file found directly
    /// inside `dir`, leaving the parent's set untouched
    fn extend_rules(&self, dir: &Path, inherited: &IgnoreSet) -> IgnoreSet {
        if !self.options.respect_ignore_file {
            return inherited.clone();
        }
        let ignore_file = dir.join(IGNORE_FILE_NAME);
        if !ignore_file.is_file() {
            return inherited.clone();
        }
        match IgnoreSet::from_file(&ignore_file, Some(inherited)) {
            Ok(rules) => {
                debug!("extended to {} rules from {}", rules.len(), ignore_file.display());
                rules
            }
            Err(e) => {
                warn!("failed to load {}: {}", ignore_file.display(), e);
                inherited.clone()
            }
        }
    }

    fn visit(&self, base: &Path, path: &Path, rules: &IgnoreSet, jobs: &mut Vec<Job>) {
        if self.cancelled() {
            return;
        }

        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.channel.error(base, path, e.to_string());
                return;
            }
        };

        if metadata.file_type().is_symlink() {
            debug!("skipped symbolic link: {}", path.display());
            self.channel.error(base, path, "Symbolic links are not supported");
        } else if rules.is_ignored(path, metadata.is_dir()) {
            debug!("skipped late: {}", path.display());
        } else if metadata.is_file() {
            let size = metadata.len();
            if size == 0 {
                if !self.options.ignore_empty_files {
                    self.channel.error(base, path, "File is empty");
                }
            } else {
                self.total_bytes.fetch_add(size, Ordering::SeqCst);
                jobs.push(Job {
                    path: path.to_path_buf(),
                    base: base.to_path_buf(),
                    size,
                });
            }
        } else if metadata.is_dir() && self.options.recursive {
            let local_rules = self.extend_rules(path, rules);
            match fs::read_dir(path) {
                Ok(entries) => {
                    for entry in entries {
                        match entry {
                            Ok(entry) => self.visit(base, &entry.path(), &local_rules, jobs),
                            Err(e) => self.channel.error(base, path, e.to_string()),
                        }
                    }
                }
                Err(e) => self.channel.error(base, path, e.to_string()),
            }
        }
        // non-recursive directories and special files: no job, no error
    }

    /// Hash every job across a pool of `max_workers` threads
    pub fn execute(&self, jobs: &[Job], selection: &AlgoSelection) -> Result<(), EngineError> {
        let algorithms = selection.resolve(jobs.len())?;
        let workers = self.options.max_workers.clamp(1, MAX_WORKERS_LIMIT);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EngineError::WorkerPool {
                reason: e.to_string(),
            })?;

        debug!("hashing {} jobs with {} workers", jobs.len(), workers);

        pool.install(|| {
            jobs.par_iter()
                .zip(algorithms.par_iter())
                .for_each(|(job, algorithm)| self.hash_task(job, algorithm));
        });

        Ok(())
    }

    /// Hash one file in chunks, streaming throttled progress
    ///
    /// Any failure credits the file's unread remainder to `bytes_read` so
    /// the aggregate fraction still reaches 1.0, then reports an error
    /// message in place of a result.
    fn hash_task(&self, job: &Job, algorithm: &str) {
        if self.cancelled() {
            return;
        }

        let mut hasher = match HashRegistry::get_hasher(algorithm) {
            Ok(hasher) => hasher,
            Err(e) => {
                self.fail_job(job, 0, e.to_string());
                return;
            }
        };

        let mut file = match File::open(&job.path) {
            Ok(file) => file,
            Err(e) => {
                self.fail_job(job, 0, e.to_string());
                return;
            }
        };

        let chunk_size = if job.size > LARGE_FILE_THRESHOLD {
            LARGE_CHUNK_SIZE
        } else {
            SMALL_CHUNK_SIZE
        };
        let mut buffer = vec![0u8; chunk_size];
        let mut processed: u64 = 0;
        let mut chunks: u32 = 0;

        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    self.fail_job(job, processed, e.to_string());
                    return;
                }
            };
            if self.cancelled() {
                return;
            }

            hasher.update(&buffer[..read]);
            processed += read as u64;
            self.bytes_read.fetch_add(read as u64, Ordering::SeqCst);

            chunks += 1;
            if chunks % PROGRESS_CHUNK_INTERVAL == 0 {
                self.emit_progress();
            }
        }

        // size was fixed at enumeration time; a file that changed in
        // between is an ordinary per-file error
        if processed != job.size {
            self.fail_job(
                job,
                processed,
                format!(
                    "File size changed during hashing (expected {} bytes, read {})",
                    job.size, processed
                ),
            );
            return;
        }

        self.emit_progress();
        let hash = bytes_to_hex(&hasher.finalize());
        self.channel.result(&job.base, &job.path, hash, algorithm);
    }

    /// Credit the unread remainder of a failed job and report the error
    fn fail_job(&self, job: &Job, processed: u64, message: String) {
        let remainder = job.size.saturating_sub(processed);
        if remainder > 0 {
            self.bytes_read.fetch_add(remainder, Ordering::SeqCst);
        }
        self.emit_progress();
        self.channel.error(&job.base, &job.path, message);
    }

    /// Publish the current aggregate fraction
    ///
    /// The gate keeps counter load and channel send atomic with respect to
    /// other emitters; without it a stale fraction could be queued after a
    /// newer one.
    fn emit_progress(&self) {
        let _gate = match self.progress_gate.lock() {
            Ok(gate) => gate,
            Err(poisoned) => poisoned.into_inner(),
        };
        let total = self.total_bytes.load(Ordering::SeqCst);
        let read = self.bytes_read.load(Ordering::SeqCst);
        self.channel.progress(read, total);
    }
}
