//! Core traits for grid-structured linear algebra
//!
//! This module defines the abstractions the multigrid driver is generic over:
//! - [`GridScalar`]: Trait for real scalar types stored in grid vectors
//! - [`Blas`]: The capability set of linear-algebra primitives over one
//!   grid representation (2-D, 3-D, boundary-aware, ...)

use crate::error::Result;
use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::Debug;

/// Trait for scalar types that can be stored in grid vectors and stencils.
///
/// # Implementations
///
/// Provided for:
/// - `f64` (default for pressure and diffusion solves)
/// - `f32` (for memory-constrained simulations)
pub trait GridScalar:
    Float + NumAssign + FromPrimitive + Default + Send + Sync + Debug + 'static
{
    /// Convert a literal constant into this scalar type
    fn from_const(value: f64) -> Self;

    /// Lossy conversion used for logging
    fn to_log_value(self) -> f64;
}

impl GridScalar for f64 {
    #[inline]
    fn from_const(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_log_value(self) -> f64 {
        self
    }
}

impl GridScalar for f32 {
    #[inline]
    fn from_const(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_log_value(self) -> f64 {
        self as f64
    }
}

/// Linear-algebra capability set over one grid representation.
///
/// Every operation is an associated function so that a representation is
/// selected purely by type: the multigrid driver is generic over `B: Blas`
/// and never holds an instance.
///
/// Per-element work must be order-independent: every output element depends
/// only on read-only inputs, so implementations are free to partition the
/// index space across threads. Reductions ([`Blas::dot`], the norms) are only
/// approximately order-independent because floating-point addition is not
/// associative.
pub trait Blas {
    /// Scalar type of vector entries and stencil weights
    type Scalar: GridScalar;

    /// Grid vector: one scalar per grid index
    type Vector: Send + Sync;

    /// Grid matrix: one stencil row per grid index
    type Matrix: Send + Sync;

    /// Fill every element of `result` with `s`
    fn set_scalar(s: Self::Scalar, result: &mut Self::Vector);

    /// Copy `v` into `result`
    fn set_vector(v: &Self::Vector, result: &mut Self::Vector) -> Result<()>;

    /// Fill every stencil weight of `result` with `s`
    fn set_matrix_scalar(s: Self::Scalar, result: &mut Self::Matrix);

    /// Copy `m` into `result`
    fn set_matrix(m: &Self::Matrix, result: &mut Self::Matrix) -> Result<()>;

    /// Sum over all indices of `a[i] * b[i]`
    fn dot(a: &Self::Vector, b: &Self::Vector) -> Result<Self::Scalar>;

    /// `result[i] = a * x[i] + y[i]`
    fn ax_plus_y(
        a: Self::Scalar,
        x: &Self::Vector,
        y: &Self::Vector,
        result: &mut Self::Vector,
    ) -> Result<()>;

    /// Matrix-vector multiplication: `result = m * v`
    fn mvm(m: &Self::Matrix, v: &Self::Vector, result: &mut Self::Vector) -> Result<()>;

    /// Residual: `result = b - a * x`
    fn residual(
        a: &Self::Matrix,
        x: &Self::Vector,
        b: &Self::Vector,
        result: &mut Self::Vector,
    ) -> Result<()>;

    /// L2 norm: `sqrt(dot(v, v))`
    fn l2_norm(v: &Self::Vector) -> Self::Scalar;

    /// Maximum absolute element value (zero for an empty vector)
    fn linf_norm(v: &Self::Vector) -> Self::Scalar;

    /// Extent of a vector, one length per grid axis
    fn vector_extent(v: &Self::Vector) -> &[usize];

    /// Extent of a matrix, one length per grid axis
    fn matrix_extent(m: &Self::Matrix) -> &[usize];
}
