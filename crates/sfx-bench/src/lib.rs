//! Benchmark profiles for the sfx buffer allocator.
//!
//! - [`reference_profile`]: a four-level, four-way band split (341 stages)
//! - [`stress_profile`]: 2000 stages with random shape and weights

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sfx_core::StageDesc;
use sfx_test_utils::{band_split_stages, random_stages};

/// Stage count of [`stress_profile`].
pub const STRESS_STAGES: u32 = 2000;

/// A wavelet-packet style decomposition: depth 4, fan-out 4, 64 KiB root.
pub fn reference_profile() -> Vec<StageDesc> {
    band_split_stages(4, 4, 64 * 1024)
}

/// A large random tree, reproducible from `seed`.
///
/// Weights go up to 16 KiB so the worst-fit gap search has real choices
/// to make.
pub fn stress_profile(seed: u64) -> Vec<StageDesc> {
    random_stages(seed, STRESS_STAGES, 16 * 1024)
}
