//! Runtime memory guards for sfx pipelines.
//!
//! A solved layout says when a buffer's lifetime is over. This crate
//! turns that into something the operating system enforces: a finished
//! buffer's pages can be made read-only so that a stage writing past its
//! allotted lifetime faults immediately instead of corrupting a sibling.
//!
//! ```text
//! GuardedArena (ArenaLayout + AlignedRegion)
//! ├── buffer / buffer_mut (StageId -> &[u8])
//! └── seal(stage) -> MemoryProtector (read-only until dropped)
//!         └── PageProtection backend: Mprotect (unix) | NoProtection
//! ```
//!
//! Page protection is process-wide, not per thread. Treat it as a
//! debugging aid: a protected page shared with a buffer another thread
//! legitimately writes will fault.
//!
//! This is the only crate in the workspace that contains `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod backend;
pub mod error;
pub mod page;
pub mod protector;
pub mod region;

pub use arena::{GuardConfig, GuardedArena};
pub use backend::{NoProtection, PageProtection, SystemProtection};
#[cfg(unix)]
pub use backend::Mprotect;
pub use error::{ArenaError, ProtectionError};
pub use page::{page_size, PageRange};
pub use protector::{MemoryProtector, ProtectionStatus};
pub use region::AlignedRegion;
