//! Deterministic variant calculator.
//!
//! The bucket for a visitor is derived from the MD5 digest of
//! `split_name + visitor_id`: the first 8 hex characters are read as a `u32`
//! and reduced modulo 100. The remote service computes the same bucket, so
//! the digest must stay MD5 for client and server to agree.
//!
//! Variants are walked in lexicographic order, accumulating weights; the
//! first variant whose running total exceeds the bucket wins.

use md5::{Digest, Md5};

use crate::errors::{CoreError, Result};
use crate::split::SplitRegistry;

/// Size of the bucket space.
pub const BUCKET_COUNT: u32 = 100;

/// Bucket in `0..100` for a visitor in a split.
pub fn assignment_bucket(split_name: &str, visitor_id: &str) -> u32 {
    let mut hasher = Md5::new();
    hasher.update(split_name.as_bytes());
    hasher.update(visitor_id.as_bytes());
    let digest = hasher.finalize();
    // First 8 hex characters == first 4 bytes, big-endian.
    let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    prefix % BUCKET_COUNT
}

/// Resolve the variant of `split_name` for `visitor_id`.
///
/// Returns `Ok(None)` when the registry is unloaded. Fails with
/// [`CoreError::UnknownSplit`] when a loaded registry lacks the split and
/// with [`CoreError::BucketOutOfRange`] when the weights do not cover the
/// visitor's bucket.
pub fn calculate_variant(
    visitor_id: &str,
    split_name: &str,
    registry: &SplitRegistry,
) -> Result<Option<String>> {
    if !registry.is_loaded() {
        return Ok(None);
    }
    let split = registry
        .get(split_name)
        .ok_or_else(|| CoreError::UnknownSplit {
            split_name: split_name.to_string(),
        })?;

    let bucket = assignment_bucket(split_name, visitor_id);
    let mut ceiling: u64 = 0;
    for (variant, weight) in split.weighting() {
        ceiling += u64::from(*weight);
        if ceiling > u64::from(bucket) {
            return Ok(Some(variant.clone()));
        }
    }

    Err(CoreError::BucketOutOfRange {
        split_name: split_name.to_string(),
        bucket,
        weighting: split.weighting().clone(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
