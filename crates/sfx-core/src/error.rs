//! Error types shared across the workspace.

use std::error::Error;
use std::fmt;

use crate::id::StageId;

/// A stage list that does not describe a single rooted tree.
///
/// Returned by the lifetime tree builder before any solving happens.
/// Always fatal to pipeline compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// The stage list is empty.
    Empty,
    /// The same stage id was listed twice.
    DuplicateStage {
        /// The repeated id.
        stage: StageId,
    },
    /// A stage declared a zero-byte buffer.
    ZeroWeight {
        /// The offending stage.
        stage: StageId,
    },
    /// A stage names a parent that is not in the list.
    DanglingParent {
        /// The stage with the bad reference.
        stage: StageId,
        /// The parent id that does not exist.
        parent: StageId,
    },
    /// Following parent links from a stage leads back to itself.
    Cycle {
        /// A stage on the cycle.
        stage: StageId,
    },
    /// A stage's parent is listed after it. Input must be in execution order.
    OutOfOrder {
        /// The stage listed too early.
        stage: StageId,
        /// Its parent, listed later.
        parent: StageId,
    },
    /// More than one stage has no parent.
    MultipleRoots {
        /// The first root.
        first: StageId,
        /// The second root.
        second: StageId,
    },
    /// The total buffer size does not fit in `usize`.
    WeightOverflow,
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "stage list is empty"),
            Self::DuplicateStage { stage } => write!(f, "stage {stage} is listed twice"),
            Self::ZeroWeight { stage } => write!(f, "stage {stage} has a zero-byte buffer"),
            Self::DanglingParent { stage, parent } => {
                write!(f, "stage {stage} references unknown parent {parent}")
            }
            Self::Cycle { stage } => write!(f, "stage {stage} is its own ancestor"),
            Self::OutOfOrder { stage, parent } => {
                write!(
                    f,
                    "stage {stage} is listed before its parent {parent}; stages must be in execution order"
                )
            }
            Self::MultipleRoots { first, second } => {
                write!(f, "stages {first} and {second} both have no parent")
            }
            Self::WeightOverflow => write!(f, "total buffer size overflows usize"),
        }
    }
}

impl Error for TopologyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stages() {
        let err = TopologyError::DanglingParent {
            stage: StageId(4),
            parent: StageId(9),
        };
        assert_eq!(err.to_string(), "stage 4 references unknown parent 9");
    }

    #[test]
    fn is_std_error() {
        let err: Box<dyn Error> = Box::new(TopologyError::Empty);
        assert_eq!(err.to_string(), "stage list is empty");
    }
}
