// Centralized error handling module
// Configuration and pattern errors surface here; per-path traversal and
// hashing failures become Update::Error messages instead (see engine.rs)

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for the hashing engine
#[derive(Debug)]
pub enum EngineError {
    /// Hash computation errors
    UnsupportedAlgorithm { algorithm: String },
    AlgorithmCountMismatch { expected: usize, got: usize },

    /// Ignore-pattern errors
    InvalidPattern { pattern: String, reason: String },

    /// Worker pool construction errors
    WorkerPool { reason: String },

    /// File system errors with context
    IoError { path: Option<PathBuf>, operation: String, source: io::Error },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::UnsupportedAlgorithm { algorithm } => {
                write!(f, "Unsupported hash algorithm: {}", algorithm)
            }
            EngineError::AlgorithmCountMismatch { expected, got } => {
                write!(
                    f,
                    "Per-job algorithm list has {} entries but {} jobs were enumerated",
                    got, expected
                )
            }
            EngineError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid ignore pattern '{}': {}", pattern, reason)
            }
            EngineError::WorkerPool { reason } => {
                write!(f, "Failed to build worker pool: {}", reason)
            }
            EngineError::IoError { path, operation, source } => {
                if let Some(p) = path {
                    write!(f, "I/O error while {} {}: {}", operation, p.display(), source)
                } else {
                    write!(f, "I/O error while {}: {}", operation, source)
                }
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl EngineError {
    /// Create an IoError with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        EngineError::IoError {
            path,
            operation: operation.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::from_io_error(err, "accessing the filesystem", None)
    }
}
