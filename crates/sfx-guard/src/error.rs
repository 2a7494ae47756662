//! Guard-specific error types.

use std::error::Error;
use std::fmt;

use sfx_alloc::ValidationError;
use sfx_core::StageId;

/// Page protection could not be applied or lifted.
///
/// Never fatal: a protector that hits this logs it once and carries on
/// as a no-op. Losing protection only loses a debugging safety net.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtectionError {
    /// The platform has no page-level write protection.
    Unsupported,
    /// The protection syscall failed.
    Os {
        /// Which operation failed.
        op: &'static str,
        /// The OS error number.
        errno: i32,
    },
}

impl fmt::Display for ProtectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "page protection is not supported on this platform"),
            Self::Os { op, errno } => write!(f, "{op} failed with errno {errno}"),
        }
    }
}

impl Error for ProtectionError {}

/// Errors from [`GuardedArena`](crate::GuardedArena).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The tree has no valid layout.
    Unsolved(ValidationError),
    /// The stage is not part of the layout.
    UnknownStage {
        /// The stage that was asked for.
        stage: StageId,
    },
    /// Backing memory could not be allocated.
    Allocation {
        /// Bytes requested.
        bytes: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsolved(e) => write!(f, "no valid layout: {e}"),
            Self::UnknownStage { stage } => write!(f, "stage {stage} is not in the layout"),
            Self::Allocation { bytes } => write!(f, "failed to allocate {bytes} bytes of arena"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unsolved(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for ArenaError {
    fn from(e: ValidationError) -> Self {
        Self::Unsolved(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_error_display() {
        let err = ProtectionError::Os {
            op: "mprotect(PROT_READ)",
            errno: 12,
        };
        assert_eq!(err.to_string(), "mprotect(PROT_READ) failed with errno 12");
    }

    #[test]
    fn unsolved_has_source() {
        let err = ArenaError::from(ValidationError::Unsolved { stage: StageId(0) });
        assert!(err.source().is_some());
        assert!(ArenaError::Allocation { bytes: 1 }.source().is_none());
    }
}
