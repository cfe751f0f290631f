//! Unified hashing utilities using FxHash.
//!
//! Uses `rustc_hash::FxHasher` for:
//! - Fast, deterministic hashing (optimized for small data)
//! - No extra dependencies (rustc_hash already used for FxHashMap)
//!
//! Asset ids must be reproducible across runs of the same build, so
//! they are fingerprints of stable inputs (build id + relative output
//! path), never timestamps or random values.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// Compute hash and return as 16-char hex fingerprint.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    format!("{:016x}", compute(value))
}

/// Deterministic asset id for one artifact of one build.
pub fn asset_id(build_id: &str, relative_output: &str) -> String {
    format!("asset-{}", fingerprint(&format!("{build_id}:{relative_output}")))
}
