//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a pipeline stage, as named by the pipeline compiler.
///
/// Stage ids are chosen by the caller and only need to be unique within
/// one pipeline. They are the public key of a solved layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub u32);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StageId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Position of a node inside a lifetime tree's node pool.
///
/// Indices are assigned in build order, so `NodeIndex(0)` is always the
/// root. They stay valid for the lifetime of the tree because the pool
/// never removes or reorders nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// The root of every tree.
    pub const ROOT: NodeIndex = NodeIndex(0);

    /// The index as a `usize`, for pool lookups.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque association back to the real buffer object of a stage.
///
/// The allocator never interprets or owns the value; it is carried
/// through so that the consumer of a layout can find its buffer again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PayloadRef(pub u64);

impl fmt::Display for PayloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
