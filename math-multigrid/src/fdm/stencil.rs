//! Symmetric finite-difference stencil rows
//!
//! A stencil row stores the center weight of a cell and one coupling weight
//! per positive axis direction (`right` = +x, `up` = +y, `front` = +z). The
//! coupling to the negative neighbor is read from that neighbor's own row,
//! which makes the assembled operator symmetric by construction.

use crate::traits::GridScalar;
use ndarray::{Array, Dimension, Ix2, Ix3};
use num_traits::Zero;
use std::fmt::Debug;

/// One row of a symmetric finite-difference matrix
pub trait StencilRow: Copy + Default + Send + Sync + Debug + 'static {
    /// Scalar type of the weights
    type Scalar: GridScalar;

    /// Grid dimensionality the row belongs to
    type Dim: Dimension<Pattern: Send> + Copy;

    /// Weight of the cell itself
    fn center(&self) -> Self::Scalar;

    /// Coupling weight to the positive neighbor along `axis`
    fn axis_weight(&self, axis: usize) -> Self::Scalar;

    /// Row with every weight (center and couplings) set to `value`
    fn uniform(value: Self::Scalar) -> Self;
}

/// Stencil row of a 2-D finite-difference matrix
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FdmMatrixRow2<T> {
    /// Diagonal entry
    pub center: T,
    /// Coupling to (i + 1, j)
    pub right: T,
    /// Coupling to (i, j + 1)
    pub up: T,
}

/// Stencil row of a 3-D finite-difference matrix
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FdmMatrixRow3<T> {
    /// Diagonal entry
    pub center: T,
    /// Coupling to (i + 1, j, k)
    pub right: T,
    /// Coupling to (i, j + 1, k)
    pub up: T,
    /// Coupling to (i, j, k + 1)
    pub front: T,
}

impl<T: GridScalar> FdmMatrixRow2<T> {
    /// Create a row from its diagonal and positive-side couplings
    pub fn new(center: T, right: T, up: T) -> Self {
        Self { center, right, up }
    }
}

impl<T: GridScalar> FdmMatrixRow3<T> {
    /// Create a row from its diagonal and positive-side couplings
    pub fn new(center: T, right: T, up: T, front: T) -> Self {
        Self {
            center,
            right,
            up,
            front,
        }
    }
}

impl<T: GridScalar> StencilRow for FdmMatrixRow2<T> {
    type Scalar = T;
    type Dim = Ix2;

    #[inline]
    fn center(&self) -> T {
        self.center
    }

    #[inline]
    fn axis_weight(&self, axis: usize) -> T {
        match axis {
            0 => self.right,
            1 => self.up,
            _ => T::zero(),
        }
    }

    #[inline]
    fn uniform(value: T) -> Self {
        Self::new(value, value, value)
    }
}

impl<T: GridScalar> StencilRow for FdmMatrixRow3<T> {
    type Scalar = T;
    type Dim = Ix3;

    #[inline]
    fn center(&self) -> T {
        self.center
    }

    #[inline]
    fn axis_weight(&self, axis: usize) -> T {
        match axis {
            0 => self.right,
            1 => self.up,
            2 => self.front,
            _ => T::zero(),
        }
    }

    #[inline]
    fn uniform(value: T) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Neighbor contribution `Σ_axis w⁻ v[i - e] + w⁺ v[i + e]` at `idx`.
///
/// Neighbors outside the grid are skipped, which is the homogeneous Neumann
/// behavior of the stencil. Callers guarantee `m` and `v` share an extent.
#[inline]
pub(crate) fn off_diagonal<R: StencilRow>(
    m: &Array<R, R::Dim>,
    v: &Array<R::Scalar, R::Dim>,
    idx: &R::Dim,
) -> R::Scalar {
    let shape = v.shape();
    let mut sum = R::Scalar::zero();
    let mut neighbor = idx.clone();

    for axis in 0..idx.ndim() {
        let i = idx[axis];
        if i > 0 {
            neighbor[axis] = i - 1;
            sum += m[neighbor.clone()].axis_weight(axis) * v[neighbor.clone()];
        }
        if i + 1 < shape[axis] {
            neighbor[axis] = i + 1;
            sum += m[idx.clone()].axis_weight(axis) * v[neighbor.clone()];
        }
        neighbor[axis] = i;
    }

    sum
}

/// Full row product `(m v)[idx]`
#[inline]
pub(crate) fn apply_row<R: StencilRow>(
    m: &Array<R, R::Dim>,
    v: &Array<R::Scalar, R::Dim>,
    idx: &R::Dim,
) -> R::Scalar {
    m[idx.clone()].center() * v[idx.clone()] + off_diagonal(m, v, idx)
}
