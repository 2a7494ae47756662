//! Stage descriptors: the allocator's input format.
//!
//! A pipeline compiler walks its transform graph in execution order and
//! emits one [`StageDesc`] per output buffer. The list is handed to the
//! lifetime tree builder as-is.

use crate::id::{PayloadRef, StageId};

/// One pipeline-stage output buffer, as described by the pipeline compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageDesc {
    /// Caller-chosen identifier, unique within the pipeline.
    pub stage: StageId,
    /// Buffer size in bytes. Must be positive.
    pub weight: usize,
    /// The stage whose output this buffer was derived from, if any.
    /// Exactly one stage per pipeline has no parent.
    pub parent: Option<StageId>,
    /// Opaque reference to the real buffer object.
    pub payload: PayloadRef,
}

impl StageDesc {
    /// Describe the root stage of a pipeline.
    pub fn root(stage: impl Into<StageId>, weight: usize) -> Self {
        Self {
            stage: stage.into(),
            weight,
            parent: None,
            payload: PayloadRef::default(),
        }
    }

    /// Describe a stage derived from `parent`.
    pub fn child(stage: impl Into<StageId>, weight: usize, parent: impl Into<StageId>) -> Self {
        Self {
            stage: stage.into(),
            weight,
            parent: Some(parent.into()),
            payload: PayloadRef::default(),
        }
    }

    /// Attach a payload reference.
    pub fn with_payload(mut self, payload: PayloadRef) -> Self {
        self.payload = payload;
        self
    }
}
