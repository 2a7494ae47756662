//! Buffer layout for sfx signal-processing pipelines.
//!
//! Every stage of a compiled pipeline writes its output into a buffer.
//! Instead of allocating those buffers one by one, the pipeline reserves
//! a single arena and this crate decides, once, where in the arena each
//! buffer lives.
//!
//! # Architecture
//!
//! ```text
//! StageDesc[] (from the pipeline compiler)
//! └── LifetimeTree::build ── TopologyError
//!     └── Allocator::solve (AllocationStrategy: WorstFit | Sequential)
//!         ├── validate()  (independent, parent-link ancestry)
//!         └── ArenaLayout (StageId -> interval, arena size)
//! ```
//!
//! # The invariant
//!
//! A buffer's lifetime ends once all of its descendants have been
//! produced, so a descendant may reuse its ancestors' bytes. Nodes that
//! are not in an ancestor/descendant relation are treated as possibly
//! live at the same time, whatever the runtime's scheduling, and never
//! share bytes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
mod dump;
pub mod error;
pub mod layout;
pub mod sequential;
pub mod solver;
pub mod tree;
pub mod validate;
pub mod worst_fit;

// Public re-exports for the primary API surface.
pub use config::{AllocatorConfig, StrategyKind};
pub use error::{Overlap, SolveError, ValidationError};
pub use layout::{ArenaLayout, LayoutEntry};
pub use sequential::Sequential;
pub use solver::{solve, AllocationStrategy, Allocator, Placement};
pub use tree::{LifetimeTree, Node, TreeBuilder};
pub use validate::{is_valid, validate};
pub use worst_fit::WorstFit;
