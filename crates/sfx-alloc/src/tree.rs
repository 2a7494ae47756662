//! The lifetime tree: which buffers exist and how their lifetimes nest.
//!
//! A [`LifetimeTree`] is built once from the pipeline compiler's stage
//! list. Nodes live in an index-addressed pool; parent and child links
//! are [`NodeIndex`] values, so references stay valid no matter how the
//! pool grows while building. The parent link is non-owning and is only
//! used for ancestry queries.
//!
//! Solving adds an offset to every node and records the arena size.
//! Nothing else about the tree ever changes.

use indexmap::IndexMap;
use sfx_core::{ByteRange, NodeIndex, PayloadRef, StageDesc, StageId, TopologyError};
use smallvec::SmallVec;

/// One pipeline-stage output buffer.
#[derive(Clone, Debug)]
pub struct Node {
    stage: StageId,
    weight: usize,
    parent: Option<NodeIndex>,
    children: SmallVec<[NodeIndex; 4]>,
    payload: PayloadRef,
    offset: Option<usize>,
}

impl Node {
    /// The caller's id for this stage.
    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// Buffer size in bytes.
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// The node this buffer was derived from. `None` for the root.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Consumers of this buffer, in build order.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Opaque reference to the real buffer object.
    pub fn payload(&self) -> PayloadRef {
        self.payload
    }

    /// Arena offset, once solved.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The arena interval this buffer occupies, once solved.
    pub fn range(&self) -> Option<ByteRange> {
        ByteRange::new(self.offset?, self.weight)
    }
}

/// Rooted tree of buffer lifetimes.
#[derive(Clone, Debug)]
pub struct LifetimeTree {
    nodes: Vec<Node>,
    index: IndexMap<StageId, NodeIndex>,
    total_weight: usize,
    arena_size: Option<usize>,
}

impl LifetimeTree {
    /// Build a tree from stages listed in execution order.
    ///
    /// Every stage except the root must name a parent listed before it.
    /// Nodes are created in list order and children keep list order.
    pub fn build(stages: &[StageDesc]) -> Result<Self, TopologyError> {
        let positions = first_positions(stages);
        let mut builder = TreeBuilder::with_capacity(stages.len());
        for (pos, desc) in stages.iter().enumerate() {
            if let Some(parent) = desc.parent {
                check_parent_order(stages, &positions, pos, desc.stage, parent)?;
            }
            builder.push(*desc)?;
        }
        builder.finish()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node's index.
    pub fn root(&self) -> NodeIndex {
        NodeIndex::ROOT
    }

    /// Look up a node.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this tree.
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.get()]
    }

    /// Look up a node, returning `None` for foreign indices.
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.get())
    }

    /// Find the node for a stage id.
    pub fn index_of(&self, stage: StageId) -> Option<NodeIndex> {
        self.index.get(&stage).copied()
    }

    /// All nodes in build order, paired with their indices.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    /// Pre-order walk: root first, then each child subtree in order.
    pub fn preorder(&self) -> Preorder<'_> {
        let mut stack = SmallVec::new();
        stack.push(NodeIndex::ROOT);
        Preorder { tree: self, stack }
    }

    /// Walk parent links upwards from `idx` (exclusive) to the root.
    pub fn ancestors(&self, idx: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(idx).parent,
        }
    }

    /// Whether `ancestor` is a proper ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether one of the two nodes is an ancestor of the other (or they
    /// are the same node). Unrelated nodes may be live simultaneously.
    pub fn related(&self, a: NodeIndex, b: NodeIndex) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    /// Number of edges between `idx` and the root.
    pub fn depth(&self, idx: NodeIndex) -> usize {
        self.ancestors(idx).count()
    }

    /// Sum of all buffer sizes: the arena size without any reuse.
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    /// Heaviest set of pairwise-unrelated nodes.
    ///
    /// No valid layout can fit in fewer bytes. Computed bottom-up as
    /// `best(v) = max(weight(v), sum of best(children))`.
    pub fn max_antichain_weight(&self) -> usize {
        let mut best: Vec<usize> = self.nodes.iter().map(|n| n.weight).collect();
        let mut child_sum = vec![0usize; self.nodes.len()];
        // Children always have a larger index than their parent.
        for i in (0..self.nodes.len()).rev() {
            best[i] = best[i].max(child_sum[i]);
            if let Some(parent) = self.nodes[i].parent {
                child_sum[parent.get()] += best[i];
            }
        }
        best[0]
    }

    /// Arena size recorded by the solver. `None` until solved.
    pub fn arena_size(&self) -> Option<usize> {
        self.arena_size
    }

    /// Whether offsets have been assigned.
    pub fn is_solved(&self) -> bool {
        self.arena_size.is_some()
    }

    /// Record a solution. Callers check [`is_solved`](Self::is_solved)
    /// and the offset count first.
    pub(crate) fn assign(&mut self, offsets: &[usize], arena_size: usize) {
        debug_assert_eq!(offsets.len(), self.nodes.len());
        debug_assert!(self.arena_size.is_none());
        for (node, &offset) in self.nodes.iter_mut().zip(offsets) {
            node.offset = Some(offset);
        }
        self.arena_size = Some(arena_size);
    }
}

/// Pre-order iterator returned by [`LifetimeTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a LifetimeTree,
    stack: SmallVec<[NodeIndex; 16]>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let idx = self.stack.pop()?;
        self.stack
            .extend(self.tree.node(idx).children.iter().rev().copied());
        Some(idx)
    }
}

/// Parent-link iterator returned by [`LifetimeTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a LifetimeTree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let idx = self.next?;
        self.next = self.tree.node(idx).parent;
        Some(idx)
    }
}

/// Incremental tree construction.
///
/// Each pushed stage must name a parent that was already pushed; the
/// first stage pushed is the root.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    index: IndexMap<StageId, NodeIndex>,
    total_weight: usize,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `n` stages.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
            index: IndexMap::with_capacity(n),
            total_weight: 0,
        }
    }

    /// Add a stage and return its node index.
    pub fn push(&mut self, desc: StageDesc) -> Result<NodeIndex, TopologyError> {
        if desc.weight == 0 {
            return Err(TopologyError::ZeroWeight { stage: desc.stage });
        }
        if self.index.contains_key(&desc.stage) {
            return Err(TopologyError::DuplicateStage { stage: desc.stage });
        }
        let parent = match desc.parent {
            None => {
                if let Some(root) = self.nodes.first() {
                    return Err(TopologyError::MultipleRoots {
                        first: root.stage,
                        second: desc.stage,
                    });
                }
                None
            }
            Some(parent) if parent == desc.stage => {
                return Err(TopologyError::Cycle { stage: desc.stage });
            }
            Some(parent) => Some(self.index.get(&parent).copied().ok_or(
                TopologyError::DanglingParent {
                    stage: desc.stage,
                    parent,
                },
            )?),
        };
        let total_weight = self
            .total_weight
            .checked_add(desc.weight)
            .ok_or(TopologyError::WeightOverflow)?;

        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            stage: desc.stage,
            weight: desc.weight,
            parent,
            children: SmallVec::new(),
            payload: desc.payload,
            offset: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.get()].children.push(idx);
        }
        self.index.insert(desc.stage, idx);
        self.total_weight = total_weight;
        Ok(idx)
    }

    /// Number of stages pushed so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finish building.
    pub fn finish(self) -> Result<LifetimeTree, TopologyError> {
        if self.nodes.is_empty() {
            return Err(TopologyError::Empty);
        }
        Ok(LifetimeTree {
            nodes: self.nodes,
            index: self.index,
            total_weight: self.total_weight,
            arena_size: None,
        })
    }
}

fn first_positions(stages: &[StageDesc]) -> IndexMap<StageId, usize> {
    let mut positions = IndexMap::with_capacity(stages.len());
    for (pos, desc) in stages.iter().enumerate() {
        positions.entry(desc.stage).or_insert(pos);
    }
    positions
}

/// Classify a parent reference that does not point strictly backwards.
///
/// A parent listed later either closes a cycle through `stage` or is
/// merely out of execution order.
fn check_parent_order(
    stages: &[StageDesc],
    positions: &IndexMap<StageId, usize>,
    pos: usize,
    stage: StageId,
    parent: StageId,
) -> Result<(), TopologyError> {
    let Some(&parent_pos) = positions.get(&parent) else {
        return Err(TopologyError::DanglingParent { stage, parent });
    };
    if parent_pos < pos {
        return Ok(());
    }

    let mut cursor = parent;
    for _ in 0..stages.len() {
        if cursor == stage {
            return Err(TopologyError::Cycle { stage });
        }
        match positions.get(&cursor).and_then(|&p| stages[p].parent) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    Err(TopologyError::OutOfOrder { stage, parent })
}
