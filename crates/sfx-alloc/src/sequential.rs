//! Sequential placement: no reuse at all.
//!
//! Every buffer gets its own bytes, in pre-order. The arena is the sum
//! of all weights (plus alignment padding). Useful as a baseline when
//! measuring what worst-fit saves, and as a trivially correct second
//! strategy for the validator.

use sfx_core::ByteRange;

use crate::error::SolveError;
use crate::solver::{align_up, AllocationStrategy, Placement};
use crate::tree::LifetimeTree;

/// The sequential strategy. See the module docs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl AllocationStrategy for Sequential {
    fn name(&self) -> &str {
        "sequential"
    }

    fn place(&self, tree: &LifetimeTree, alignment: usize) -> Result<Placement, SolveError> {
        let mut offsets = vec![0usize; tree.len()];
        let mut cursor = 0usize;
        for idx in tree.preorder() {
            let node = tree.node(idx);
            let range = align_up(cursor, alignment)
                .and_then(|start| ByteRange::new(start, node.weight()))
                .ok_or(SolveError::Overflow {
                    stage: node.stage(),
                })?;
            offsets[idx.get()] = range.start;
            cursor = range.end;
        }
        Ok(Placement::new(offsets, cursor))
    }
}
