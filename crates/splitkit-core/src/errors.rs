//! Core error types.
//!
//! Every variant here is a configuration defect: the caller asked for a split
//! the registry does not know, or the split's weighting cannot place a bucket.
//! None of them are transient, so none of them are retryable.

use thiserror::Error;

use crate::split::Weighting;

/// Errors raised by the split registry and variant calculator.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The split name has no entry in a loaded registry.
    #[error("unknown split: {split_name}")]
    UnknownSplit {
        /// Split that was looked up.
        split_name: String,
    },

    /// The split's cumulative weights never exceed the assignment bucket.
    #[error(
        "assignment bucket out of range: split {split_name}, bucket {bucket}, weighting {weighting:?}"
    )]
    BucketOutOfRange {
        /// Split being assigned.
        split_name: String,
        /// Bucket in `0..100` derived from the digest.
        bucket: u32,
        /// Weighting that failed to cover the bucket.
        weighting: Weighting,
    },

    /// A split definition is malformed (e.g. no variants).
    #[error("invalid split {split_name}: {message}")]
    InvalidSplit {
        /// Offending split.
        split_name: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
