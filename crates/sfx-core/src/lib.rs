//! Core types for the sfx buffer-layout engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: stage and node
//! identifiers, the stage descriptors a pipeline compiler hands to the
//! allocator, byte intervals, and the topology error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod interval;
pub mod stage;

pub use error::TopologyError;
pub use id::{NodeIndex, PayloadRef, StageId};
pub use interval::ByteRange;
pub use stage::StageDesc;
