//! Test fixtures for sfx development.
//!
//! Every fixture is a plain `Vec<StageDesc>` so that any crate in the
//! workspace can build its own tree from it without a dependency cycle.
//! See [`fixtures`] for the generators.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    band_split_stages, chain_stages, random_stages, reference_stages, star_stages,
};

use sfx_core::{StageDesc, StageId};

/// Heaviest antichain of a stage list, by brute force over all subsets.
///
/// Exponential; only for lists of up to ~16 stages. Used to cross-check
/// the tree's dynamic-programming bound.
pub fn brute_force_max_antichain(stages: &[StageDesc]) -> usize {
    assert!(stages.len() <= 20, "brute force is exponential");
    let n = stages.len();
    let related = |a: usize, b: usize| is_ancestor(stages, a, b) || is_ancestor(stages, b, a);
    let mut best = 0;
    for mask in 1u32..(1 << n) {
        let members: Vec<usize> = (0..n).filter(|i| mask & (1 << i) != 0).collect();
        let antichain = members
            .iter()
            .enumerate()
            .all(|(k, &a)| members[k + 1..].iter().all(|&b| !related(a, b)));
        if antichain {
            best = best.max(members.iter().map(|&i| stages[i].weight).sum());
        }
    }
    best
}

/// Whether stage at position `a` is a proper ancestor of stage at `b`.
pub fn is_ancestor(stages: &[StageDesc], a: usize, b: usize) -> bool {
    let target = stages[a].stage;
    let mut cursor = stages[b].parent;
    while let Some(parent) = cursor {
        if parent == target {
            return true;
        }
        cursor = find(stages, parent).and_then(|i| stages[i].parent);
    }
    false
}

fn find(stages: &[StageDesc], stage: StageId) -> Option<usize> {
    stages.iter().position(|s| s.stage == stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force_matches_hand_count() {
        assert_eq!(brute_force_max_antichain(&reference_stages()), 10);
        assert_eq!(brute_force_max_antichain(&chain_stages(5, 3)), 3);
        assert_eq!(brute_force_max_antichain(&star_stages(4, 2)), 8);
    }

    #[test]
    fn ancestry_on_reference() {
        let stages = reference_stages();
        assert!(is_ancestor(&stages, 0, 9));
        assert!(is_ancestor(&stages, 4, 9));
        assert!(!is_ancestor(&stages, 3, 9));
        assert!(!is_ancestor(&stages, 9, 0));
    }
}
