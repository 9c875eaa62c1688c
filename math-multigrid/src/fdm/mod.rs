//! Finite-difference grids: stencils, BLAS, smoothers and transfer operators
//!
//! Everything here plugs into the generic driver in [`crate::multigrid`]
//! through [`FdmBlas`] and [`fdm_parameters`].

pub mod blas;
pub mod relax;
pub mod stencil;
pub mod system;
pub mod transfer;

pub use blas::{FdmBlas, FdmBlas2, FdmBlas3, FdmMatrix2, FdmMatrix3, FdmVector2, FdmVector3};
pub use relax::{Relaxation, relaxation_fn};
pub use stencil::{FdmMatrixRow2, FdmMatrixRow3, StencilRow};
pub use system::{
    FdmMgLinearSystem, FdmMgLinearSystem2, FdmMgLinearSystem3, fdm_parameters, level_extents,
};
pub use transfer::{correct, restrict};
