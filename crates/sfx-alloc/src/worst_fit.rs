//! Worst-fit placement.
//!
//! Nodes are placed in pre-order. When a node is placed, every node
//! placed before it is either one of its ancestors (whose bytes it may
//! reuse) or lives in a finished sibling subtree of it or of one of its
//! ancestors (whose bytes it must avoid). The node goes into the largest
//! free gap between the intervals it must avoid. Taking the largest gap
//! leaves big holes for the heavy buffers that tend to appear deeper in
//! band-splitting pipelines.
//!
//! Ties between equally large gaps go to the lowest start offset. When
//! no gap fits, the arena grows: the node starts right after the highest
//! interval it must avoid, overlapping only ancestor bytes.

use sfx_core::{ByteRange, NodeIndex};

use crate::error::SolveError;
use crate::solver::{align_up, AllocationStrategy, Placement};
use crate::tree::LifetimeTree;

/// The worst-fit strategy. See the module docs.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorstFit;

impl AllocationStrategy for WorstFit {
    fn name(&self) -> &str {
        "worst-fit"
    }

    fn place(&self, tree: &LifetimeTree, alignment: usize) -> Result<Placement, SolveError> {
        let spans = SubtreeSpans::new(tree);
        let mut offsets = vec![0usize; tree.len()];
        let mut placed: Vec<(NodeIndex, ByteRange)> = Vec::with_capacity(tree.len());
        let mut obstacles: Vec<ByteRange> = Vec::with_capacity(tree.len());
        let mut arena_size = 0usize;

        for idx in tree.preorder() {
            let node = tree.node(idx);
            let overflow = || SolveError::Overflow {
                stage: node.stage(),
            };

            obstacles.clear();
            obstacles.extend(
                placed
                    .iter()
                    .filter(|(other, _)| !spans.contains(*other, idx))
                    .map(|(_, range)| *range),
            );
            obstacles.sort_unstable();

            let offset = choose_offset(&obstacles, arena_size, node.weight(), alignment)
                .ok_or_else(overflow)?;
            let range = ByteRange::new(offset, node.weight()).ok_or_else(overflow)?;

            offsets[idx.get()] = offset;
            arena_size = arena_size.max(range.end);
            placed.push((idx, range));
        }

        Ok(Placement::new(offsets, arena_size))
    }
}

/// Pre-order position and subtree size per node, for O(1) ancestry.
///
/// Computed independently of the tree's parent-link walk so that the
/// validator's check does not share bookkeeping with the solver.
struct SubtreeSpans {
    position: Vec<usize>,
    size: Vec<usize>,
}

impl SubtreeSpans {
    fn new(tree: &LifetimeTree) -> Self {
        let order: Vec<NodeIndex> = tree.preorder().collect();
        let mut position = vec![0; tree.len()];
        for (pos, idx) in order.iter().enumerate() {
            position[idx.get()] = pos;
        }
        let mut size = vec![1; tree.len()];
        for idx in order.iter().rev() {
            if let Some(parent) = tree.node(*idx).parent() {
                size[parent.get()] += size[idx.get()];
            }
        }
        Self { position, size }
    }

    /// Whether `node` lies in the subtree rooted at `root` (inclusive).
    fn contains(&self, root: NodeIndex, node: NodeIndex) -> bool {
        let start = self.position[root.get()];
        let pos = self.position[node.get()];
        start <= pos && pos < start + self.size[root.get()]
    }
}

/// Pick the offset for a `weight`-byte buffer that must avoid the sorted
/// `obstacles`, inside an arena currently `arena_size` bytes long.
///
/// Returns `None` only on arithmetic overflow.
fn choose_offset(
    obstacles: &[ByteRange],
    arena_size: usize,
    weight: usize,
    alignment: usize,
) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None; // (gap length, aligned start)
    let mut consider = |gap_start: usize, gap_end: usize| -> Option<()> {
        let start = align_up(gap_start, alignment)?;
        let fits = start
            .checked_add(weight)
            .is_some_and(|end| end <= gap_end);
        let len = gap_end - gap_start;
        if fits && best.map_or(true, |(best_len, _)| len > best_len) {
            best = Some((len, start));
        }
        Some(())
    };

    let mut cursor = 0usize;
    for range in obstacles {
        if range.start > cursor {
            consider(cursor, range.start)?;
        }
        cursor = cursor.max(range.end);
    }
    if arena_size > cursor {
        consider(cursor, arena_size)?;
    }

    match best {
        Some((_, start)) => Some(start),
        None => align_up(cursor, alignment),
    }
}
