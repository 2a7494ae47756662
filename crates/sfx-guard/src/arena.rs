//! A solved layout backed by real memory.

use sfx_alloc::{ArenaLayout, LifetimeTree};
use sfx_core::{ByteRange, StageId};

use crate::error::ArenaError;
use crate::protector::MemoryProtector;
use crate::region::AlignedRegion;

/// Configuration for a [`GuardedArena`].
#[derive(Clone, Debug)]
pub struct GuardConfig {
    /// Make expired buffers read-only when sealed.
    ///
    /// Default: on in debug builds, off in release builds.
    pub protect_expired: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protect_expired: cfg!(debug_assertions),
        }
    }
}

/// One page-aligned allocation holding every buffer of a solved tree.
///
/// Buffers are looked up by stage. Buffers of unrelated stages may share
/// bytes, so the caller must only touch a buffer while its stage is live.
/// [`seal`](Self::seal) makes that checkable for buffers that are done.
///
/// Solve with a page-sized alignment if sealed buffers should be
/// protected exactly; otherwise only the whole pages inside each buffer
/// are covered.
#[derive(Debug)]
pub struct GuardedArena {
    layout: ArenaLayout,
    memory: AlignedRegion,
    config: GuardConfig,
}

impl GuardedArena {
    /// Allocate backing memory for a solved tree.
    pub fn new(tree: &LifetimeTree, config: GuardConfig) -> Result<Self, ArenaError> {
        Self::from_layout(ArenaLayout::from_tree(tree)?, config)
    }

    /// Allocate backing memory for an already extracted layout.
    pub fn from_layout(layout: ArenaLayout, config: GuardConfig) -> Result<Self, ArenaError> {
        let memory = AlignedRegion::new(layout.arena_size())?;
        Ok(Self {
            layout,
            memory,
            config,
        })
    }

    /// The layout this arena was built from.
    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    /// Bytes of arena in use.
    pub fn arena_size(&self) -> usize {
        self.layout.arena_size()
    }

    /// Active configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// A stage's buffer.
    pub fn buffer(&self, stage: StageId) -> Result<&[u8], ArenaError> {
        let range = self.range(stage)?;
        Ok(&self.memory.as_slice()[range.as_range()])
    }

    /// A stage's buffer, for writing.
    pub fn buffer_mut(&mut self, stage: StageId) -> Result<&mut [u8], ArenaError> {
        let range = self.range(stage)?;
        Ok(&mut self.memory.as_mut_slice()[range.as_range()])
    }

    /// Make a finished stage's buffer read-only until the guard drops.
    ///
    /// Returns an inert guard when `protect_expired` is off. While the
    /// guard lives the arena is borrowed, so no buffer can be written
    /// through safe code.
    pub fn seal(&self, stage: StageId) -> Result<MemoryProtector<'_>, ArenaError> {
        let buf = self.buffer(stage)?;
        if !self.config.protect_expired {
            return Ok(MemoryProtector::disabled());
        }
        Ok(MemoryProtector::protect(buf))
    }

    fn range(&self, stage: StageId) -> Result<ByteRange, ArenaError> {
        self.layout
            .range(stage)
            .ok_or(ArenaError::UnknownStage { stage })
    }
}
