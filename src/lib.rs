// Quickhash core library
// Concurrent file-discovery and hashing engine: gitignore-style pattern
// matching, recursive job enumeration under cancellation, and a worker-pool
// chunked hasher streaming updates to a polling consumer

pub mod algo;
pub mod channel;
pub mod engine;
pub mod error;
pub mod ignore;

// Re-export commonly used types for convenience
pub use algo::{bytes_to_hex, supported_algorithms, HashRegistry, Hasher, XOF_OUTPUT_LEN};
pub use channel::{Update, UpdateChannel};
pub use engine::{AlgoSelection, HashEngine, HashOptions, Job, IGNORE_FILE_NAME};
pub use error::EngineError;
pub use ignore::{IgnoreRule, IgnoreSet};
