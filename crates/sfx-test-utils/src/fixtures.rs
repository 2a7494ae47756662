//! Reusable stage-list fixtures.
//!
//! - [`reference_stages`]: the ten-node tree used across the test suite.
//! - [`chain_stages`] / [`star_stages`]: the two degenerate shapes.
//! - [`band_split_stages`]: a full wavelet-packet style tree.
//! - [`random_stages`]: seeded pseudo-random trees.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sfx_core::{PayloadRef, StageDesc};

/// The reference tree.
///
/// ```text
/// 0 (1)
/// ├── 1 (1)
/// └── 2 (2)
///     ├── 3 (3)
///     │   ├── 6 (1)
///     │   └── 7 (2)
///     ├── 4 (2)
///     │   └── 8 (1)
///     │       └── 9 (1)
///     └── 5 (4)
/// ```
///
/// Total weight 18, heaviest antichain 10 (`1, 3, 4, 2` or `1, 6+7, 4, 2`).
pub fn reference_stages() -> Vec<StageDesc> {
    vec![
        StageDesc::root(0, 1),
        StageDesc::child(1, 1, 0),
        StageDesc::child(2, 2, 0),
        StageDesc::child(3, 3, 2),
        StageDesc::child(4, 2, 2),
        StageDesc::child(5, 4, 2),
        StageDesc::child(6, 1, 3),
        StageDesc::child(7, 2, 3),
        StageDesc::child(8, 1, 4),
        StageDesc::child(9, 1, 8),
    ]
}

/// `n` stages, each derived from the previous one.
pub fn chain_stages(n: u32, weight: usize) -> Vec<StageDesc> {
    (0..n)
        .map(|i| match i {
            0 => StageDesc::root(0, weight),
            _ => StageDesc::child(i, weight, i - 1),
        })
        .collect()
}

/// A root with `n` leaf children.
pub fn star_stages(n: u32, weight: usize) -> Vec<StageDesc> {
    let mut stages = vec![StageDesc::root(0, weight)];
    stages.extend((1..=n).map(|i| StageDesc::child(i, weight, 0)));
    stages
}

/// A full tree of the given depth where every node splits into
/// `fan_out` children of `1 / fan_out` its size, like a wavelet packet
/// decomposition. Stages are listed breadth-first.
pub fn band_split_stages(depth: u32, fan_out: u32, root_weight: usize) -> Vec<StageDesc> {
    let mut stages = vec![StageDesc::root(0, root_weight)];
    let mut level: Vec<(u32, usize)> = vec![(0, root_weight)];
    let mut next_id = 1u32;
    for _ in 0..depth {
        let mut next_level = Vec::with_capacity(level.len() * fan_out as usize);
        for &(parent, weight) in &level {
            let child_weight = (weight / fan_out as usize).max(1);
            for _ in 0..fan_out {
                stages.push(StageDesc::child(next_id, child_weight, parent));
                next_level.push((next_id, child_weight));
                next_id += 1;
            }
        }
        level = next_level;
    }
    stages
}

/// A seeded pseudo-random tree of `n` stages with weights in
/// `1..=max_weight`. Each stage picks a uniformly random earlier stage
/// as its parent, so the list is always in execution order.
pub fn random_stages(seed: u64, n: u32, max_weight: usize) -> Vec<StageDesc> {
    assert!(n > 0 && max_weight > 0);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let weight = |rng: &mut ChaCha8Rng| 1 + (rng.next_u64() % max_weight as u64) as usize;

    let mut stages = Vec::with_capacity(n as usize);
    stages.push(StageDesc::root(0, weight(&mut rng)).with_payload(PayloadRef(0)));
    for i in 1..n {
        let parent = (rng.next_u64() % u64::from(i)) as u32;
        stages.push(
            StageDesc::child(i, weight(&mut rng), parent).with_payload(PayloadRef(u64::from(i))),
        );
    }
    stages
}
