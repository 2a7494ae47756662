//! sfx: buffer allocation for tree-shaped processing pipelines.
//!
//! A pipeline is a rooted tree of stages. Each stage owns a scratch
//! buffer that lives from the moment the stage starts until its whole
//! subtree has finished, so a stage may reuse the bytes of its
//! ancestors while stages on different branches must stay apart. This
//! crate packs every buffer into one arena and can make finished
//! buffers read-only to catch stages that write after their lifetime.
//!
//! This is the facade crate re-exporting the sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use sfx::prelude::*;
//!
//! let stages = vec![
//!     StageDesc::root(StageId(0), 4),
//!     StageDesc::child(StageId(1), 2, StageId(0)),
//!     StageDesc::child(StageId(2), 2, StageId(0)),
//! ];
//! let mut tree = LifetimeTree::build(&stages).unwrap();
//!
//! // Children may reuse their parent's bytes; siblings must not overlap.
//! let arena_size = Allocator::default().solve(&mut tree).unwrap();
//! assert_eq!(arena_size, 4);
//! assert!(is_valid(&tree));
//!
//! let layout = ArenaLayout::from_tree(&tree).unwrap();
//! assert_eq!(layout.offset(StageId(1)), Some(0));
//! assert_eq!(layout.offset(StageId(2)), Some(2));
//!
//! let mut arena = GuardedArena::new(&tree, GuardConfig::default()).unwrap();
//! arena.buffer_mut(StageId(1)).unwrap().fill(1);
//! let _sealed = arena.seal(StageId(1)).unwrap();
//! assert_eq!(arena.buffer(StageId(1)).unwrap(), &[1, 1]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sfx-core` | IDs, stage descriptors, byte ranges, topology errors |
//! | [`alloc`] | `sfx-alloc` | Lifetime tree, allocation strategies, validator, layouts |
//! | [`guard`] | `sfx-guard` | Page protection and page-aligned arenas |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// IDs, stage descriptors, and byte ranges (`sfx-core`).
pub use sfx_core as types;

/// Lifetime tree, solver, and validator (`sfx-alloc`).
///
/// [`alloc::Allocator`] runs an [`alloc::AllocationStrategy`] over an
/// [`alloc::LifetimeTree`]; [`alloc::validate`] checks the result.
pub use sfx_alloc as alloc;

/// Memory protection and backing storage (`sfx-guard`).
///
/// [`guard::MemoryProtector`] makes whole pages read-only for its
/// lifetime; [`guard::GuardedArena`] backs a solved layout with memory.
pub use sfx_guard as guard;

/// Common imports for typical sfx usage.
///
/// ```rust
/// use sfx::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use sfx_core::{ByteRange, NodeIndex, PayloadRef, StageDesc, StageId};

    // Tree and solving
    pub use sfx_alloc::{
        is_valid, solve, validate, AllocationStrategy, Allocator, AllocatorConfig, ArenaLayout,
        LifetimeTree, Placement, Sequential, StrategyKind, WorstFit,
    };

    // Guards
    pub use sfx_guard::{GuardConfig, GuardedArena, MemoryProtector, ProtectionStatus};

    // Errors
    pub use sfx_alloc::{SolveError, ValidationError};
    pub use sfx_core::TopologyError;
    pub use sfx_guard::{ArenaError, ProtectionError};
}
