//! Solver and validator error types.

use std::error::Error;
use std::fmt;

use sfx_core::{ByteRange, StageId};

/// Two unrelated buffers that share arena bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlap {
    /// The buffer placed at the lower offset.
    pub first: StageId,
    /// Its interval.
    pub first_range: ByteRange,
    /// The other buffer.
    pub second: StageId,
    /// Its interval.
    pub second_range: ByteRange,
}

/// A solved tree that breaks the no-aliasing invariant.
///
/// Always fatal: an invalid layout means two buffers that may be live
/// at the same time share memory, which silently corrupts samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A node has no offset, or the tree has not been solved.
    Unsolved {
        /// The first stage found without an offset.
        stage: StageId,
    },
    /// A node's interval runs past `usize::MAX`.
    RangeOverflow {
        /// The offending stage.
        stage: StageId,
    },
    /// The recorded arena size differs from `max(offset + weight)`.
    ArenaSizeMismatch {
        /// What the solver recorded.
        recorded: usize,
        /// What the node intervals actually need.
        actual: usize,
    },
    /// One or more unrelated pairs share bytes.
    Overlap(Vec<Overlap>),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsolved { stage } => write!(f, "stage {stage} has no arena offset"),
            Self::RangeOverflow { stage } => {
                write!(f, "buffer of stage {stage} extends past the address space")
            }
            Self::ArenaSizeMismatch { recorded, actual } => {
                write!(
                    f,
                    "recorded arena size {recorded} bytes, node intervals need {actual} bytes"
                )
            }
            Self::Overlap(overlaps) => {
                write!(f, "unrelated buffers alias: ")?;
                for (i, o) in overlaps.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "stage {} {} and stage {} {}",
                        o.first, o.first_range, o.second, o.second_range,
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ValidationError {}

/// Errors from [`Allocator::solve`](crate::Allocator::solve).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// The tree already carries offsets. Layouts are computed once.
    AlreadySolved,
    /// Configured alignment is zero or not a power of two.
    InvalidAlignment {
        /// The rejected value.
        alignment: usize,
    },
    /// An offset computation overflowed `usize`.
    Overflow {
        /// The stage being placed.
        stage: StageId,
    },
    /// A strategy returned a placement of the wrong shape.
    PlacementMismatch {
        /// Name of the strategy.
        strategy: String,
        /// Number of nodes in the tree.
        expected: usize,
        /// Number of offsets returned.
        actual: usize,
    },
    /// The placement failed independent validation.
    Validation(ValidationError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySolved => write!(f, "lifetime tree is already solved"),
            Self::InvalidAlignment { alignment } => {
                write!(f, "alignment must be a non-zero power of two, got {alignment}")
            }
            Self::Overflow { stage } => {
                write!(f, "arena offset overflow while placing stage {stage}")
            }
            Self::PlacementMismatch {
                strategy,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "strategy '{strategy}' returned {actual} offsets for {expected} nodes"
                )
            }
            Self::Validation(e) => write!(f, "layout failed validation: {e}"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for SolveError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}
