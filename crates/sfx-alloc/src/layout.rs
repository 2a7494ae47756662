//! Solved layouts, detached from the tree.
//!
//! An [`ArenaLayout`] is what the execution side needs from a solved
//! tree: the arena size and, per stage, where its buffer lives. It is
//! only produced from a tree that passes validation.

use indexmap::IndexMap;
use sfx_core::{ByteRange, NodeIndex, PayloadRef, StageId};

use crate::error::ValidationError;
use crate::tree::LifetimeTree;
use crate::validate::validate;

/// Where one stage's buffer lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Node in the source tree.
    pub node: NodeIndex,
    /// Arena interval.
    pub range: ByteRange,
    /// The stage's payload reference.
    pub payload: PayloadRef,
}

/// Validated `StageId -> interval` map plus the arena size.
#[derive(Clone, Debug)]
pub struct ArenaLayout {
    arena_size: usize,
    total_weight: usize,
    entries: IndexMap<StageId, LayoutEntry>,
}

impl ArenaLayout {
    /// Snapshot a solved tree. Fails if the tree does not validate.
    pub fn from_tree(tree: &LifetimeTree) -> Result<Self, ValidationError> {
        validate(tree)?;
        let mut entries = IndexMap::with_capacity(tree.len());
        for (idx, node) in tree.nodes() {
            let range = node.range().ok_or(ValidationError::Unsolved {
                stage: node.stage(),
            })?;
            entries.insert(
                node.stage(),
                LayoutEntry {
                    node: idx,
                    range,
                    payload: node.payload(),
                },
            );
        }
        let arena_size = tree.arena_size().ok_or(ValidationError::Unsolved {
            stage: tree.node(tree.root()).stage(),
        })?;
        Ok(Self {
            arena_size,
            total_weight: tree.total_weight(),
            entries,
        })
    }

    /// Bytes needed to back every buffer.
    pub fn arena_size(&self) -> usize {
        self.arena_size
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a layout built from a tree.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full entry for a stage.
    pub fn get(&self, stage: StageId) -> Option<&LayoutEntry> {
        self.entries.get(&stage)
    }

    /// Arena offset of a stage's buffer.
    pub fn offset(&self, stage: StageId) -> Option<usize> {
        self.get(stage).map(|e| e.range.start)
    }

    /// Arena interval of a stage's buffer.
    pub fn range(&self, stage: StageId) -> Option<ByteRange> {
        self.get(stage).map(|e| e.range)
    }

    /// All entries in build order.
    pub fn iter(&self) -> impl Iterator<Item = (StageId, &LayoutEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// `StageId -> offset`, in build order.
    pub fn offsets(&self) -> IndexMap<StageId, usize> {
        self.entries
            .iter()
            .map(|(id, e)| (*id, e.range.start))
            .collect()
    }

    /// How many bytes of buffers each arena byte backs on average.
    /// `1.0` means no reuse.
    pub fn reuse_ratio(&self) -> f64 {
        if self.arena_size == 0 {
            return 1.0;
        }
        self.total_weight as f64 / self.arena_size as f64
    }
}
