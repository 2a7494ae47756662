//! Integration test: layout invariants over many tree shapes.
//!
//! Every strategy, at every alignment, must produce a layout that the
//! independent validator accepts, whose arena size is the maximum
//! interval end, and that sits between the heaviest antichain and the
//! no-reuse total.

use proptest::prelude::*;
use sfx_alloc::{
    is_valid, validate, AllocationStrategy, Allocator, AllocatorConfig, ArenaLayout,
    LifetimeTree, Sequential, SolveError, StrategyKind, WorstFit,
};
use sfx_core::{StageDesc, StageId};
use sfx_test_utils::{
    band_split_stages, brute_force_max_antichain, chain_stages, random_stages, reference_stages,
    star_stages,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn solve_with(stages: &[StageDesc], strategy: StrategyKind, alignment: usize) -> LifetimeTree {
    let mut tree = LifetimeTree::build(stages).unwrap();
    let allocator = Allocator::new(AllocatorConfig {
        strategy,
        alignment,
        verify: true,
    });
    allocator.solve(&mut tree).unwrap();
    tree
}

fn max_end(tree: &LifetimeTree) -> usize {
    tree.nodes()
        .map(|(_, n)| n.offset().unwrap() + n.weight())
        .max()
        .unwrap()
}

/// Direct O(n²) check over all pairs, without the validator's sweep.
fn unrelated_pairs_disjoint(tree: &LifetimeTree) -> bool {
    let nodes: Vec<_> = tree.nodes().collect();
    for (i, &(a, na)) in nodes.iter().enumerate() {
        for &(b, nb) in &nodes[i + 1..] {
            if tree.related(a, b) {
                continue;
            }
            if na.range().unwrap().overlaps(&nb.range().unwrap()) {
                return false;
            }
        }
    }
    true
}

fn arb_stages() -> impl Strategy<Value = Vec<StageDesc>> {
    arb_stages_up_to(40)
}

/// A root plus up to `max_children` stages, each attached to a random
/// earlier stage.
fn arb_stages_up_to(max_children: usize) -> impl Strategy<Value = Vec<StageDesc>> {
    (
        1usize..64,
        prop::collection::vec((any::<prop::sample::Index>(), 1usize..64), 0..max_children),
    )
        .prop_map(|(root_weight, rest)| {
            let mut stages = vec![StageDesc::root(0, root_weight)];
            for (i, (parent, weight)) in rest.into_iter().enumerate() {
                let id = i as u32 + 1;
                let parent = parent.index(stages.len()) as u32;
                stages.push(StageDesc::child(id, weight, parent));
            }
            stages
        })
}

// ── Fixed shapes ────────────────────────────────────────────────────

#[test]
fn reference_scenario() {
    let stages = reference_stages();
    let tree = solve_with(&stages, StrategyKind::WorstFit, 1);
    assert!(is_valid(&tree));
    let arena = tree.arena_size().unwrap();
    for (_, node) in tree.nodes() {
        assert!(arena >= node.weight());
    }
    assert!(arena >= brute_force_max_antichain(&stages));
    assert_eq!(arena, max_end(&tree));
}

#[test]
fn single_node() {
    let tree = solve_with(&[StageDesc::root(3, 17)], StrategyKind::WorstFit, 1);
    assert_eq!(tree.node(tree.root()).offset(), Some(0));
    assert_eq!(tree.arena_size(), Some(17));
}

#[test]
fn chain_needs_only_its_largest_buffer() {
    let tree = solve_with(&chain_stages(32, 256), StrategyKind::WorstFit, 1);
    assert_eq!(tree.arena_size(), Some(256));
}

#[test]
fn star_needs_every_leaf() {
    let tree = solve_with(&star_stages(8, 100), StrategyKind::WorstFit, 1);
    assert_eq!(tree.arena_size(), Some(800));
}

#[test]
fn band_split_reaches_leaf_level_bound() {
    // Four levels of halving: every level totals 4096 bytes.
    let stages = band_split_stages(4, 2, 4096);
    let tree = solve_with(&stages, StrategyKind::WorstFit, 64);
    assert!(is_valid(&tree));
    assert_eq!(tree.max_antichain_weight(), 4096);
    assert!(tree.arena_size().unwrap() >= 4096);
    assert!(tree.arena_size().unwrap() < tree.total_weight());
}

#[test]
fn worst_fit_never_loses_to_sequential() {
    for seed in 0..32 {
        let stages = random_stages(seed, 60, 128);
        let worst = solve_with(&stages, StrategyKind::WorstFit, 1);
        let seq = solve_with(&stages, StrategyKind::Sequential, 1);
        assert!(worst.arena_size() <= seq.arena_size(), "seed {seed}");
        assert_eq!(seq.arena_size(), Some(seq.total_weight()));
    }
}

#[test]
fn layout_offsets_match_tree() {
    let tree = solve_with(&random_stages(11, 40, 16), StrategyKind::WorstFit, 1);
    let layout = ArenaLayout::from_tree(&tree).unwrap();
    for (stage, offset) in layout.offsets() {
        let idx = tree.index_of(stage).unwrap();
        assert_eq!(tree.node(idx).offset(), Some(offset));
    }
    assert_eq!(layout.arena_size(), tree.arena_size().unwrap());
}

#[test]
fn strategies_are_usable_as_trait_objects() {
    let tree = LifetimeTree::build(&reference_stages()).unwrap();
    let strategies: Vec<Box<dyn AllocationStrategy>> = vec![Box::new(WorstFit), Box::new(Sequential)];
    for strategy in strategies {
        let placement = strategy.place(&tree, 1).unwrap();
        assert_eq!(placement.offsets().len(), tree.len());
    }
}

#[test]
fn solved_tree_rejects_second_solve_for_every_strategy() {
    for strategy in [StrategyKind::WorstFit, StrategyKind::Sequential] {
        let mut tree = solve_with(&reference_stages(), strategy, 1);
        let allocator = Allocator::new(AllocatorConfig {
            strategy,
            ..AllocatorConfig::default()
        });
        assert_eq!(allocator.solve(&mut tree), Err(SolveError::AlreadySolved));
    }
}

#[test]
fn dump_lists_every_stage() {
    let tree = solve_with(&reference_stages(), StrategyKind::WorstFit, 1);
    let dot = tree.dump();
    for id in 0..10 {
        assert!(dot.contains(&format!("stage {}|", StageId(id))));
    }
}

// ── Properties ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn worst_fit_layout_is_valid(stages in arb_stages(), align_pow in 0u32..7) {
        let tree = solve_with(&stages, StrategyKind::WorstFit, 1 << align_pow);
        prop_assert_eq!(validate(&tree), Ok(()));
        prop_assert!(unrelated_pairs_disjoint(&tree));
        prop_assert_eq!(tree.arena_size().unwrap(), max_end(&tree));
        for (_, node) in tree.nodes() {
            prop_assert_eq!(node.offset().unwrap() % (1 << align_pow), 0);
        }
    }

    #[test]
    fn sequential_layout_is_valid(stages in arb_stages()) {
        let tree = solve_with(&stages, StrategyKind::Sequential, 1);
        prop_assert!(is_valid(&tree));
        prop_assert!(unrelated_pairs_disjoint(&tree));
    }

    #[test]
    fn arena_is_bounded(stages in arb_stages()) {
        let tree = solve_with(&stages, StrategyKind::WorstFit, 1);
        let arena = tree.arena_size().unwrap();
        prop_assert!(arena >= tree.max_antichain_weight());
        prop_assert!(arena <= tree.total_weight());
        let heaviest = tree.nodes().map(|(_, n)| n.weight()).max().unwrap();
        prop_assert!(arena >= heaviest);
    }

    #[test]
    fn antichain_bound_matches_brute_force(stages in arb_stages_up_to(12)) {
        let tree = LifetimeTree::build(&stages).unwrap();
        prop_assert_eq!(tree.max_antichain_weight(), brute_force_max_antichain(&stages));
    }

    #[test]
    fn validation_is_idempotent(seed in any::<u64>(), n in 1u32..80) {
        let tree = solve_with(&random_stages(seed, n, 64), StrategyKind::WorstFit, 1);
        prop_assert_eq!(validate(&tree), validate(&tree));
    }

    #[test]
    fn solving_is_deterministic(stages in arb_stages()) {
        let a = solve_with(&stages, StrategyKind::WorstFit, 1);
        let b = solve_with(&stages, StrategyKind::WorstFit, 1);
        let oa: Vec<_> = a.nodes().map(|(_, n)| n.offset()).collect();
        let ob: Vec<_> = b.nodes().map(|(_, n)| n.offset()).collect();
        prop_assert_eq!(oa, ob);
    }
}
