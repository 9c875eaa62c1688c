//! Multigrid V-cycle solver for grid-structured linear systems
//!
//! This crate provides a recursive multigrid V-cycle that is generic over a
//! linear-algebra capability set, together with a finite-difference
//! implementation of that set for regular 2-D and 3-D grids.
//!
//! # Features
//!
//! - **Generic V-cycle**: static dispatch over the [`Blas`] trait, with
//!   user-supplied relax / restrict / correct operators
//! - **Finite-difference BLAS**: symmetric stencil matrices stored one row per
//!   grid cell, any dimensionality
//! - **Smoothers**: Jacobi, Gauss-Seidel (SOR) and red-black Gauss-Seidel
//! - **Transfer operators**: full-weighting restriction and linear
//!   interpolation, with semi-coarsening
//! - **Parallel kernels**: rayon-backed with the `native` feature
//!
//! # Example
//!
//! ```ignore
//! use math_multigrid::{FdmMgLinearSystem3, Relaxation, VCycleConfig, fdm_parameters, multigrid_v_cycle};
//!
//! let mut system = FdmMgLinearSystem3::with_finest((64, 64, 64), 5);
//! // fill system.a (every level) and system.b[0]
//! let mut buffer = system.buffer();
//! let params = fdm_parameters(VCycleConfig::default(), Relaxation::default());
//!
//! for _ in 0..20 {
//!     let result = multigrid_v_cycle(&system.a, &params, &mut system.x, &mut system.b, &mut buffer)?;
//!     if result.last_residual_norm < 1e-8 {
//!         break;
//!     }
//! }
//! ```

pub mod error;
pub mod fdm;
pub mod multigrid;
pub mod parallel;
pub mod traits;

// Re-export main types
pub use error::{MultigridError, Result};
pub use traits::{Blas, GridScalar};

// Re-export the driver
pub use multigrid::{
    CorrectFn, MultigridLinearSystem, MultigridMatrix, MultigridParameters, MultigridResult,
    MultigridVector, RelaxFn, RestrictFn, VCycleConfig, multigrid_v_cycle,
};

// Re-export finite-difference grids
pub use fdm::{
    FdmBlas, FdmBlas2, FdmBlas3, FdmMatrix2, FdmMatrix3, FdmMatrixRow2, FdmMatrixRow3,
    FdmMgLinearSystem, FdmMgLinearSystem2, FdmMgLinearSystem3, FdmVector2, FdmVector3, Relaxation,
    StencilRow, fdm_parameters, level_extents,
};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
