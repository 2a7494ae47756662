//! Placement strategies and the allocator that applies them.
//!
//! An [`AllocationStrategy`] reads a tree and proposes one offset per
//! node. The [`Allocator`] owns the contract around it: a tree is solved
//! exactly once, the proposal must have the right shape, and (when
//! `verify` is set) it must pass the independent validator before any
//! offset is written into the tree.

use tracing::debug;

use crate::config::{AllocatorConfig, StrategyKind};
use crate::error::SolveError;
use crate::sequential::Sequential;
use crate::tree::LifetimeTree;
use crate::validate::validate;
use crate::worst_fit::WorstFit;

/// Offsets proposed by a strategy, indexed by [`NodeIndex`](sfx_core::NodeIndex).
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Placement {
    offsets: Vec<usize>,
    arena_size: usize,
}

impl Placement {
    /// Wrap per-node offsets and the resulting arena size.
    pub fn new(offsets: Vec<usize>, arena_size: usize) -> Self {
        Self {
            offsets,
            arena_size,
        }
    }

    /// One offset per node, in node index order.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// `max(offset + weight)` over all nodes.
    pub fn arena_size(&self) -> usize {
        self.arena_size
    }
}

/// A buffer placement policy.
///
/// Implementations must be deterministic and must never place two
/// unrelated nodes on shared bytes. Every offset must be a multiple of
/// `alignment`, which the allocator guarantees is a power of two.
pub trait AllocationStrategy {
    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Propose an offset for every node of an unsolved tree.
    fn place(&self, tree: &LifetimeTree, alignment: usize) -> Result<Placement, SolveError>;
}

/// Solves lifetime trees with a configured strategy.
pub struct Allocator {
    config: AllocatorConfig,
    strategy: Box<dyn AllocationStrategy>,
}

impl Allocator {
    /// Create an allocator using the strategy named in `config`.
    pub fn new(config: AllocatorConfig) -> Self {
        let strategy: Box<dyn AllocationStrategy> = match config.strategy {
            StrategyKind::WorstFit => Box::new(WorstFit),
            StrategyKind::Sequential => Box::new(Sequential),
        };
        Self { config, strategy }
    }

    /// Create an allocator with a caller-supplied strategy.
    ///
    /// `config.strategy` is ignored.
    pub fn with_strategy(config: AllocatorConfig, strategy: Box<dyn AllocationStrategy>) -> Self {
        Self { config, strategy }
    }

    /// The active configuration.
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Assign an offset to every node and return the arena size.
    ///
    /// Fails with [`SolveError::AlreadySolved`] if the tree already has
    /// offsets; a layout is computed once per compiled pipeline. On any
    /// error the tree is left untouched.
    pub fn solve(&self, tree: &mut LifetimeTree) -> Result<usize, SolveError> {
        if tree.is_solved() {
            return Err(SolveError::AlreadySolved);
        }
        self.config.validate()?;

        let placement = self.strategy.place(tree, self.config.alignment)?;
        if placement.offsets().len() != tree.len() {
            return Err(SolveError::PlacementMismatch {
                strategy: self.strategy.name().to_string(),
                expected: tree.len(),
                actual: placement.offsets().len(),
            });
        }

        if self.config.verify {
            let mut candidate = tree.clone();
            candidate.assign(placement.offsets(), placement.arena_size());
            validate(&candidate)?;
            *tree = candidate;
        } else {
            tree.assign(placement.offsets(), placement.arena_size());
        }

        debug!(
            strategy = self.strategy.name(),
            nodes = tree.len(),
            arena_size = placement.arena_size(),
            total_weight = tree.total_weight(),
            lower_bound = tree.max_antichain_weight(),
            "solved buffer layout"
        );
        Ok(placement.arena_size())
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}

/// Solve `tree` with the default worst-fit configuration.
pub fn solve(tree: &mut LifetimeTree) -> Result<usize, SolveError> {
    Allocator::default().solve(tree)
}

/// Round `value` up to a multiple of `alignment` (a power of two).
pub(crate) fn align_up(value: usize, alignment: usize) -> Option<usize> {
    let mask = alignment - 1;
    Some(value.checked_add(mask)? & !mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::is_valid;
    use sfx_core::{NodeIndex, StageDesc, StageId};
    use sfx_test_utils::reference_stages;

    fn reference_tree() -> LifetimeTree {
        LifetimeTree::build(&reference_stages()).unwrap()
    }

    /// Puts every node at offset zero.
    struct Stacked;

    impl AllocationStrategy for Stacked {
        fn name(&self) -> &str {
            "stacked"
        }

        fn place(&self, tree: &LifetimeTree, _alignment: usize) -> Result<Placement, SolveError> {
            let max = tree.nodes().map(|(_, n)| n.weight()).max().unwrap_or(0);
            Ok(Placement::new(vec![0; tree.len()], max))
        }
    }

    /// Forgets the last node.
    struct Short;

    impl AllocationStrategy for Short {
        fn name(&self) -> &str {
            "short"
        }

        fn place(&self, tree: &LifetimeTree, _alignment: usize) -> Result<Placement, SolveError> {
            Ok(Placement::new(vec![0; tree.len() - 1], 1))
        }
    }

    #[test]
    fn single_node_solves_to_zero() {
        let mut tree = LifetimeTree::build(&[StageDesc::root(0, 48)]).unwrap();
        let arena = solve(&mut tree).unwrap();
        assert_eq!(arena, 48);
        assert_eq!(tree.node(NodeIndex::ROOT).offset(), Some(0));
        assert_eq!(tree.arena_size(), Some(48));
    }

    #[test]
    fn reference_tree_solves_and_validates() {
        let mut tree = reference_tree();
        let arena = solve(&mut tree).unwrap();
        assert!(is_valid(&tree));
        assert_eq!(arena, 10);
        assert!(arena >= tree.max_antichain_weight());
        assert!(arena <= tree.total_weight());
    }

    #[test]
    fn double_solve_is_rejected() {
        let mut tree = reference_tree();
        let allocator = Allocator::default();
        let first = allocator.solve(&mut tree).unwrap();
        let offsets: Vec<_> = tree.nodes().map(|(_, n)| n.offset()).collect();

        assert_eq!(allocator.solve(&mut tree), Err(SolveError::AlreadySolved));
        let after: Vec<_> = tree.nodes().map(|(_, n)| n.offset()).collect();
        assert_eq!(offsets, after);
        assert_eq!(tree.arena_size(), Some(first));
    }

    #[test]
    fn solve_is_deterministic() {
        let mut a = reference_tree();
        let mut b = reference_tree();
        solve(&mut a).unwrap();
        solve(&mut b).unwrap();
        let offsets_a: Vec<_> = a.nodes().map(|(_, n)| n.offset()).collect();
        let offsets_b: Vec<_> = b.nodes().map(|(_, n)| n.offset()).collect();
        assert_eq!(offsets_a, offsets_b);
    }

    #[test]
    fn invalid_alignment_leaves_tree_unsolved() {
        let mut tree = reference_tree();
        let allocator = Allocator::new(AllocatorConfig::with_alignment(3));
        assert_eq!(
            allocator.solve(&mut tree),
            Err(SolveError::InvalidAlignment { alignment: 3 })
        );
        assert!(!tree.is_solved());
    }

    #[test]
    fn verify_rejects_aliasing_strategy() {
        let mut tree = reference_tree();
        let config = AllocatorConfig {
            verify: true,
            ..AllocatorConfig::default()
        };
        let allocator = Allocator::with_strategy(config, Box::new(Stacked));
        let err = allocator.solve(&mut tree).unwrap_err();
        assert!(matches!(err, SolveError::Validation(_)));
        assert!(!tree.is_solved());
        assert!(tree.nodes().all(|(_, n)| n.offset().is_none()));
    }

    #[test]
    fn short_placement_is_rejected() {
        let mut tree = reference_tree();
        let allocator = Allocator::with_strategy(AllocatorConfig::default(), Box::new(Short));
        assert_eq!(
            allocator.solve(&mut tree),
            Err(SolveError::PlacementMismatch {
                strategy: "short".into(),
                expected: 10,
                actual: 9,
            })
        );
    }

    #[test]
    fn sequential_strategy_uses_total_weight() {
        let mut tree = reference_tree();
        let allocator = Allocator::new(AllocatorConfig {
            strategy: StrategyKind::Sequential,
            ..AllocatorConfig::default()
        });
        assert_eq!(allocator.strategy_name(), "sequential");
        let arena = allocator.solve(&mut tree).unwrap();
        assert_eq!(arena, tree.total_weight());
        assert!(is_valid(&tree));
    }

    #[test]
    fn aligned_offsets() {
        let mut tree = reference_tree();
        let allocator = Allocator::new(AllocatorConfig::with_alignment(16));
        allocator.solve(&mut tree).unwrap();
        assert!(is_valid(&tree));
        for (_, node) in tree.nodes() {
            assert_eq!(node.offset().unwrap() % 16, 0, "stage {}", node.stage());
        }
        let stage = tree.index_of(StageId(5)).unwrap();
        assert!(tree.node(stage).offset().is_some());
    }

    #[test]
    fn align_up_rounds_to_power_of_two() {
        assert_eq!(align_up(0, 8), Some(0));
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(16, 8), Some(16));
        assert_eq!(align_up(5, 1), Some(5));
        assert_eq!(align_up(usize::MAX, 8), None);
    }
}
