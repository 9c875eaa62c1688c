//! Error types for grid linear algebra and the multigrid driver.
//!
//! A solve that fails to reduce the residual is not an error: convergence is
//! reported through [`MultigridResult`](crate::MultigridResult) only.

use thiserror::Error;

/// Errors raised by BLAS operations, transfer operators and the V-cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultigridError {
    /// Operand extents disagree.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Extent of the reference operand
        expected: Vec<usize>,
        /// Extent of the offending operand
        actual: Vec<usize>,
    },

    /// A vector hierarchy does not have as many levels as the matrix hierarchy.
    #[error("level count mismatch for {name}: expected {expected} levels, got {actual}")]
    LevelCountMismatch {
        /// Which hierarchy is short or long (`x`, `b` or `buffer`)
        name: &'static str,
        /// Number of matrix levels
        expected: usize,
        /// Number of levels found
        actual: usize,
    },

    /// Two grids cannot be related by a 2:1 or 1:1 ratio on every axis.
    #[error("incompatible transfer on axis {axis}: fine extent {fine:?}, coarse extent {coarse:?}")]
    IncompatibleLevels {
        /// First axis whose lengths are not related
        axis: usize,
        /// Extent of the finer grid
        fine: Vec<usize>,
        /// Extent of the coarser grid
        coarse: Vec<usize>,
    },
}

impl MultigridError {
    /// Build a [`MultigridError::DimensionMismatch`] from two extents
    pub fn dimension_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Check whether this is a shape error of any kind
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::IncompatibleLevels { .. }
        )
    }
}

/// Result type for multigrid operations.
pub type Result<T> = std::result::Result<T, MultigridError>;

/// Fail with [`MultigridError::DimensionMismatch`] unless both extents are equal
#[inline]
pub(crate) fn ensure_same_extent(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MultigridError::dimension_mismatch(expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = MultigridError::dimension_mismatch(&[4, 4], &[4, 2]);
        assert_eq!(
            err.to_string(),
            "dimension mismatch: expected [4, 4], got [4, 2]"
        );
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_ensure_same_extent() {
        assert!(ensure_same_extent(&[2, 2, 2], &[2, 2, 2]).is_ok());
        assert_eq!(
            ensure_same_extent(&[2, 2, 2], &[2, 2]),
            Err(MultigridError::DimensionMismatch {
                expected: vec![2, 2, 2],
                actual: vec![2, 2],
            })
        );
    }

    #[test]
    fn test_level_count_is_not_shape_error() {
        let err = MultigridError::LevelCountMismatch {
            name: "buffer",
            expected: 3,
            actual: 2,
        };
        assert!(!err.is_shape_error());
        assert!(err.to_string().contains("buffer"));
    }
}
