//! Allocator configuration.

use crate::error::SolveError;

/// Which placement policy the allocator uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrategyKind {
    /// Largest free gap first. Reuses memory of finished lineages.
    #[default]
    WorstFit,
    /// Every buffer gets its own bytes. Baseline with no reuse.
    Sequential,
}

/// Configuration for the [`Allocator`](crate::Allocator).
///
/// Validated when the allocator solves; all values are fixed for the
/// lifetime of a compiled pipeline.
#[derive(Clone, Debug)]
pub struct AllocatorConfig {
    /// Placement policy. Default: [`StrategyKind::WorstFit`].
    pub strategy: StrategyKind,

    /// Every offset is a multiple of this many bytes.
    ///
    /// Default: 1. Must be a power of two. Use
    /// [`SIMD_ALIGNMENT`](Self::SIMD_ALIGNMENT) when buffers feed vector
    /// kernels.
    pub alignment: usize,

    /// Run the validator after every solve.
    ///
    /// Default: on in debug builds, off in release builds.
    pub verify: bool,
}

impl AllocatorConfig {
    /// Alignment suitable for 512-bit vector loads.
    pub const SIMD_ALIGNMENT: usize = 64;

    /// Default config with the given alignment.
    pub fn with_alignment(alignment: usize) -> Self {
        Self {
            alignment,
            ..Self::default()
        }
    }

    /// Check structural constraints.
    pub fn validate(&self) -> Result<(), SolveError> {
        if !self.alignment.is_power_of_two() {
            return Err(SolveError::InvalidAlignment {
                alignment: self.alignment,
            });
        }
        Ok(())
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            alignment: 1,
            verify: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unaligned_worst_fit() {
        let config = AllocatorConfig::default();
        assert_eq!(config.strategy, StrategyKind::WorstFit);
        assert_eq!(config.alignment, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_and_odd_alignment() {
        for alignment in [0, 3, 48] {
            let config = AllocatorConfig::with_alignment(alignment);
            assert_eq!(
                config.validate(),
                Err(SolveError::InvalidAlignment { alignment })
            );
        }
    }

    #[test]
    fn simd_alignment_is_valid() {
        let config = AllocatorConfig::with_alignment(AllocatorConfig::SIMD_ALIGNMENT);
        assert!(config.validate().is_ok());
    }
}
