//! Relaxation (smoothing) sweeps for finite-difference grids
//!
//! Every smoother here has the signature the V-cycle expects from its relax
//! callable: `(A, b, iterations, max_tolerance, &mut x, &mut buffer)`. A
//! smoother stops early once the residual L2 norm after a sweep drops below
//! `max_tolerance`; a non-positive tolerance disables the check.

use super::blas::FdmBlas;
use super::stencil::{StencilRow, off_diagonal};
use crate::error::{Result, ensure_same_extent};
use crate::multigrid::RelaxFn;
use crate::parallel::{for_each_indexed, unravel_index};
use crate::traits::{Blas, GridScalar};
use ndarray::{Array, Dimension};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Smoother selection for finite-difference multigrid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Relaxation {
    /// Jacobi: every cell updated from the previous iterate, fully parallel
    Jacobi,

    /// Lexicographic Gauss-Seidel with successive over-relaxation
    GaussSeidel {
        /// Over-relaxation factor (1.0 = plain Gauss-Seidel)
        sor_factor: f64,
    },

    /// Red-black Gauss-Seidel: two colour passes, each fully parallel
    RedBlackGaussSeidel {
        /// Over-relaxation factor (1.0 = plain Gauss-Seidel)
        sor_factor: f64,
    },
}

impl Default for Relaxation {
    fn default() -> Self {
        Self::RedBlackGaussSeidel { sor_factor: 1.0 }
    }
}

/// Build the relax callable for `relaxation`
pub fn relaxation_fn<R: StencilRow>(relaxation: Relaxation) -> RelaxFn<FdmBlas<R>> {
    match relaxation {
        Relaxation::Jacobi => shared::<R, _>(jacobi::<R>),
        Relaxation::GaussSeidel { sor_factor } => {
            let omega = R::Scalar::from_const(sor_factor);
            shared::<R, _>(move |a, b, iterations, max_tolerance, x, buffer| {
                gauss_seidel::<R>(a, b, iterations, max_tolerance, omega, x, buffer)
            })
        }
        Relaxation::RedBlackGaussSeidel { sor_factor } => {
            let omega = R::Scalar::from_const(sor_factor);
            shared::<R, _>(move |a, b, iterations, max_tolerance, x, buffer| {
                red_black_gauss_seidel::<R>(a, b, iterations, max_tolerance, omega, x, buffer)
            })
        }
    }
}

fn shared<R, F>(relax: F) -> RelaxFn<FdmBlas<R>>
where
    R: StencilRow,
    F: Fn(
            &Array<R, R::Dim>,
            &Array<R::Scalar, R::Dim>,
            usize,
            R::Scalar,
            &mut Array<R::Scalar, R::Dim>,
            &mut Array<R::Scalar, R::Dim>,
        ) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    Arc::new(relax)
}

/// Jacobi relaxation
///
/// New values are computed into `buffer` from the current `x`, then the two
/// arrays are swapped.
pub fn jacobi<R: StencilRow>(
    a: &Array<R, R::Dim>,
    b: &Array<R::Scalar, R::Dim>,
    iterations: usize,
    max_tolerance: R::Scalar,
    x: &mut Array<R::Scalar, R::Dim>,
    buffer: &mut Array<R::Scalar, R::Dim>,
) -> Result<()> {
    check_extents(a, b, x, buffer)?;

    for iter in 0..iterations {
        let current = &*x;
        for_each_indexed(buffer, |idx, out| {
            *out = relaxed_value(a, b, current, &idx, R::Scalar::one());
        });
        std::mem::swap(x, buffer);

        if tolerance_met(a, b, x, buffer, max_tolerance, iter)? {
            break;
        }
    }
    Ok(())
}

/// Lexicographic Gauss-Seidel / SOR relaxation, updating `x` in place
///
/// Sequential by nature; `buffer` is only used for the tolerance check.
pub fn gauss_seidel<R: StencilRow>(
    a: &Array<R, R::Dim>,
    b: &Array<R::Scalar, R::Dim>,
    iterations: usize,
    max_tolerance: R::Scalar,
    sor_factor: R::Scalar,
    x: &mut Array<R::Scalar, R::Dim>,
    buffer: &mut Array<R::Scalar, R::Dim>,
) -> Result<()> {
    check_extents(a, b, x, buffer)?;

    let dim = x.raw_dim();
    for iter in 0..iterations {
        for flat in 0..x.len() {
            let idx = unravel_index(flat, &dim);
            let value = relaxed_value(a, b, x, &idx, sor_factor);
            x[idx] = value;
        }

        if tolerance_met(a, b, x, buffer, max_tolerance, iter)? {
            break;
        }
    }
    Ok(())
}

/// Red-black Gauss-Seidel / SOR relaxation
///
/// Cells are coloured by the parity of their index sum. A cell only couples
/// to cells of the other colour, so each colour pass is computed in parallel
/// into `buffer` from the current `x` and swapped in.
pub fn red_black_gauss_seidel<R: StencilRow>(
    a: &Array<R, R::Dim>,
    b: &Array<R::Scalar, R::Dim>,
    iterations: usize,
    max_tolerance: R::Scalar,
    sor_factor: R::Scalar,
    x: &mut Array<R::Scalar, R::Dim>,
    buffer: &mut Array<R::Scalar, R::Dim>,
) -> Result<()> {
    check_extents(a, b, x, buffer)?;

    for iter in 0..iterations {
        for color in 0..2 {
            let current = &*x;
            for_each_indexed(buffer, |idx, out| {
                *out = if parity(&idx) == color {
                    relaxed_value(a, b, current, &idx, sor_factor)
                } else {
                    current[idx]
                };
            });
            std::mem::swap(x, buffer);
        }

        if tolerance_met(a, b, x, buffer, max_tolerance, iter)? {
            break;
        }
    }
    Ok(())
}

/// Over-relaxed update of one cell; rows with a zero center keep their value
#[inline]
fn relaxed_value<R: StencilRow>(
    a: &Array<R, R::Dim>,
    b: &Array<R::Scalar, R::Dim>,
    x: &Array<R::Scalar, R::Dim>,
    idx: &R::Dim,
    omega: R::Scalar,
) -> R::Scalar {
    let old = x[idx.clone()];
    let center = a[idx.clone()].center();
    if center.is_zero() {
        return old;
    }
    let solved = (b[idx.clone()] - off_diagonal(a, x, idx)) / center;
    old + omega * (solved - old)
}

#[inline]
fn parity<D: Dimension>(idx: &D) -> usize {
    idx.slice().iter().sum::<usize>() % 2
}

fn check_extents<R: StencilRow>(
    a: &Array<R, R::Dim>,
    b: &Array<R::Scalar, R::Dim>,
    x: &Array<R::Scalar, R::Dim>,
    buffer: &Array<R::Scalar, R::Dim>,
) -> Result<()> {
    ensure_same_extent(a.shape(), b.shape())?;
    ensure_same_extent(a.shape(), x.shape())?;
    ensure_same_extent(a.shape(), buffer.shape())
}

/// Residual into `buffer` and compare against the tolerance
fn tolerance_met<R: StencilRow>(
    a: &Array<R, R::Dim>,
    b: &Array<R::Scalar, R::Dim>,
    x: &Array<R::Scalar, R::Dim>,
    buffer: &mut Array<R::Scalar, R::Dim>,
    max_tolerance: R::Scalar,
    iter: usize,
) -> Result<bool> {
    if max_tolerance <= R::Scalar::zero() {
        return Ok(false);
    }
    FdmBlas::<R>::residual(a, x, b, buffer)?;
    let norm = FdmBlas::<R>::l2_norm(buffer);
    if norm < max_tolerance {
        log::trace!(
            "relaxation converged after {} sweeps: residual = {:.6e}",
            iter + 1,
            norm.to_log_value()
        );
        return Ok(true);
    }
    Ok(false)
}
