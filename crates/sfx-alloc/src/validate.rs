//! Independent layout validation.
//!
//! [`validate`] re-derives everything it needs from the solved tree:
//! intervals from offsets and weights, ancestry by walking parent links.
//! It shares no bookkeeping with any strategy, so a strategy bug cannot
//! hide itself. Intervals are swept in offset order and only pairs that
//! numerically overlap are checked for ancestry.

use sfx_core::{ByteRange, NodeIndex};

use crate::error::{Overlap, ValidationError};
use crate::tree::LifetimeTree;

/// Check that no two unrelated buffers share bytes and that the recorded
/// arena size matches the intervals. Never mutates the tree.
pub fn validate(tree: &LifetimeTree) -> Result<(), ValidationError> {
    let root_stage = tree.node(tree.root()).stage();
    let recorded = tree
        .arena_size()
        .ok_or(ValidationError::Unsolved { stage: root_stage })?;

    let mut spans: Vec<(ByteRange, NodeIndex)> = Vec::with_capacity(tree.len());
    for (idx, node) in tree.nodes() {
        let offset = node.offset().ok_or(ValidationError::Unsolved {
            stage: node.stage(),
        })?;
        let range = ByteRange::new(offset, node.weight()).ok_or(ValidationError::RangeOverflow {
            stage: node.stage(),
        })?;
        spans.push((range, idx));
    }

    let actual = spans.iter().map(|(r, _)| r.end).max().unwrap_or(0);
    if actual != recorded {
        return Err(ValidationError::ArenaSizeMismatch { recorded, actual });
    }

    spans.sort_unstable();
    let mut overlaps = Vec::new();
    let mut open: Vec<(ByteRange, NodeIndex)> = Vec::new();
    for &(range, idx) in &spans {
        open.retain(|(r, _)| r.end > range.start);
        for &(other_range, other) in &open {
            if !tree.is_ancestor(other, idx) && !tree.is_ancestor(idx, other) {
                overlaps.push(Overlap {
                    first: tree.node(other).stage(),
                    first_range: other_range,
                    second: tree.node(idx).stage(),
                    second_range: range,
                });
            }
        }
        open.push((range, idx));
    }

    if overlaps.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Overlap(overlaps))
    }
}

/// `true` if [`validate`] succeeds.
pub fn is_valid(tree: &LifetimeTree) -> bool {
    validate(tree).is_ok()
}
