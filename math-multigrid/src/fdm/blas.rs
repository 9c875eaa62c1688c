//! Finite-difference BLAS over regular grids
//!
//! [`FdmBlas`] implements the [`Blas`] capability set for grid vectors stored
//! as `ndarray` arrays and grid matrices stored as arrays of stencil rows. The
//! same implementation serves every dimensionality: the row type selects it.

use super::stencil::{FdmMatrixRow2, FdmMatrixRow3, StencilRow, apply_row};
use crate::error::{Result, ensure_same_extent};
use crate::parallel::{for_each_indexed, max_map, zip_assign, zip_sum};
use crate::traits::Blas;
use ndarray::{Array, Array2, Array3};
use num_traits::{Float, Zero};
use std::marker::PhantomData;

/// 2-D grid vector
pub type FdmVector2 = Array2<f64>;
/// 3-D grid vector
pub type FdmVector3 = Array3<f64>;
/// 2-D grid matrix
pub type FdmMatrix2 = Array2<FdmMatrixRow2<f64>>;
/// 3-D grid matrix
pub type FdmMatrix3 = Array3<FdmMatrixRow3<f64>>;

/// BLAS operations for finite-difference grids with stencil rows `R`
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmBlas<R>(PhantomData<R>);

/// 2-D finite-difference BLAS in double precision
pub type FdmBlas2 = FdmBlas<FdmMatrixRow2<f64>>;
/// 3-D finite-difference BLAS in double precision
pub type FdmBlas3 = FdmBlas<FdmMatrixRow3<f64>>;

impl<R: StencilRow> Blas for FdmBlas<R> {
    type Scalar = R::Scalar;
    type Vector = Array<R::Scalar, R::Dim>;
    type Matrix = Array<R, R::Dim>;

    fn set_scalar(s: R::Scalar, result: &mut Self::Vector) {
        result.fill(s);
    }

    fn set_vector(v: &Self::Vector, result: &mut Self::Vector) -> Result<()> {
        ensure_same_extent(v.shape(), result.shape())?;
        result.assign(v);
        Ok(())
    }

    fn set_matrix_scalar(s: R::Scalar, result: &mut Self::Matrix) {
        result.fill(R::uniform(s));
    }

    fn set_matrix(m: &Self::Matrix, result: &mut Self::Matrix) -> Result<()> {
        ensure_same_extent(m.shape(), result.shape())?;
        result.assign(m);
        Ok(())
    }

    fn dot(a: &Self::Vector, b: &Self::Vector) -> Result<R::Scalar> {
        ensure_same_extent(a.shape(), b.shape())?;
        Ok(zip_sum(a, b, |ai, bi| ai * bi))
    }

    fn ax_plus_y(
        a: R::Scalar,
        x: &Self::Vector,
        y: &Self::Vector,
        result: &mut Self::Vector,
    ) -> Result<()> {
        ensure_same_extent(x.shape(), y.shape())?;
        ensure_same_extent(x.shape(), result.shape())?;

        // x must not leak into the result when a == 0, even if it holds inf/NaN
        if a.is_zero() {
            result.assign(y);
        } else {
            zip_assign(result, x, y, |xi, yi| a * xi + yi);
        }
        Ok(())
    }

    fn mvm(m: &Self::Matrix, v: &Self::Vector, result: &mut Self::Vector) -> Result<()> {
        ensure_same_extent(m.shape(), v.shape())?;
        ensure_same_extent(m.shape(), result.shape())?;

        for_each_indexed(result, |idx, r| *r = apply_row(m, v, &idx));
        Ok(())
    }

    fn residual(
        a: &Self::Matrix,
        x: &Self::Vector,
        b: &Self::Vector,
        result: &mut Self::Vector,
    ) -> Result<()> {
        ensure_same_extent(a.shape(), x.shape())?;
        ensure_same_extent(a.shape(), b.shape())?;
        ensure_same_extent(a.shape(), result.shape())?;

        for_each_indexed(result, |idx, r| {
            *r = b[idx.clone()] - apply_row(a, x, &idx);
        });
        Ok(())
    }

    fn l2_norm(v: &Self::Vector) -> R::Scalar {
        zip_sum(v, v, |vi, wi| vi * wi).sqrt()
    }

    fn linf_norm(v: &Self::Vector) -> R::Scalar {
        max_map(v, |vi| vi.abs())
    }

    fn vector_extent(v: &Self::Vector) -> &[usize] {
        v.shape()
    }

    fn matrix_extent(m: &Self::Matrix) -> &[usize] {
        m.shape()
    }
}

impl<R: StencilRow> FdmBlas<R> {
    /// Allocate a zeroed vector matching the extent of `m`
    pub fn zeros_like(m: &Array<R, R::Dim>) -> Array<R::Scalar, R::Dim> {
        Array::zeros(m.raw_dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MultigridError;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, Array3};

    fn ramp3(n: (usize, usize, usize), scale: f64) -> FdmVector3 {
        Array3::from_shape_fn(n, |(i, j, k)| scale * ((i + 1) as f64) - (j * k) as f64 * 0.25)
    }

    /// Dirichlet Poisson stencil: center 6, couplings -1 on every existing edge
    fn poisson3(n: (usize, usize, usize)) -> FdmMatrix3 {
        Array3::from_shape_fn(n, |(i, j, k)| FdmMatrixRow3 {
            center: 6.0,
            right: if i + 1 < n.0 { -1.0 } else { 0.0 },
            up: if j + 1 < n.1 { -1.0 } else { 0.0 },
            front: if k + 1 < n.2 { -1.0 } else { 0.0 },
        })
    }

    #[test]
    fn test_set_scalar_and_vector() {
        let mut v = FdmVector3::zeros((2, 3, 4));
        FdmBlas3::set_scalar(3.5, &mut v);
        assert!(v.iter().all(|&x| x == 3.5));

        let src = ramp3((2, 3, 4), 1.0);
        FdmBlas3::set_vector(&src, &mut v).unwrap();
        assert_eq!(v, src);

        // Idempotent
        FdmBlas3::set_vector(&src, &mut v).unwrap();
        assert_eq!(v, src);
    }

    #[test]
    fn test_set_vector_mismatch() {
        let src = FdmVector3::zeros((2, 2, 2));
        let mut dst = FdmVector3::zeros((2, 2, 3));
        let err = FdmBlas3::set_vector(&src, &mut dst).unwrap_err();
        assert_eq!(err, MultigridError::dimension_mismatch(&[2, 2, 2], &[2, 2, 3]));
    }

    #[test]
    fn test_set_matrix() {
        let mut m = FdmMatrix3::default((2, 2, 2));
        FdmBlas3::set_matrix_scalar(1.5, &mut m);
        assert!(m.iter().all(|row| *row == FdmMatrixRow3::new(1.5, 1.5, 1.5, 1.5)));

        let src = poisson3((2, 2, 2));
        FdmBlas3::set_matrix(&src, &mut m).unwrap();
        assert_eq!(m, src);
    }

    #[test]
    fn test_dot_commutative() {
        let a = ramp3((4, 5, 6), 0.3);
        let b = ramp3((4, 5, 6), -1.7);
        let ab = FdmBlas3::dot(&a, &b).unwrap();
        let ba = FdmBlas3::dot(&b, &a).unwrap();
        assert_relative_eq!(ab, ba, max_relative = 1e-12);

        let expected: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        assert_relative_eq!(ab, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_dot_mismatch_fails() {
        let a = FdmVector3::zeros((2, 2, 2));
        let b = FdmVector3::zeros((2, 2, 1));
        assert!(matches!(
            FdmBlas3::dot(&a, &b),
            Err(MultigridError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_ax_plus_y() {
        let x = ramp3((3, 3, 3), 1.0);
        let y = ramp3((3, 3, 3), 2.0);
        let mut r = FdmVector3::zeros((3, 3, 3));

        FdmBlas3::ax_plus_y(2.0, &x, &y, &mut r).unwrap();
        for ((ri, xi), yi) in r.iter().zip(x.iter()).zip(y.iter()) {
            assert_relative_eq!(*ri, 2.0 * xi + yi);
        }
    }

    #[test]
    fn test_ax_plus_y_zero_scale_is_exact_copy() {
        let mut x = ramp3((3, 2, 2), 1.0);
        x[[0, 0, 0]] = f64::INFINITY;
        x[[1, 1, 1]] = f64::NAN;
        let y = ramp3((3, 2, 2), 0.1);
        let mut r = FdmVector3::zeros((3, 2, 2));

        FdmBlas3::ax_plus_y(0.0, &x, &y, &mut r).unwrap();
        assert_eq!(r, y);
    }

    #[test]
    fn test_ax_plus_y_mismatch() {
        let x = FdmVector3::zeros((3, 3, 3));
        let y = FdmVector3::zeros((3, 3, 3));
        let mut r = FdmVector3::zeros((3, 3, 2));
        assert!(FdmBlas3::ax_plus_y(1.0, &x, &y, &mut r).is_err());
        // Nothing written on failure
        assert!(r.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mvm_identity_2x2x2() {
        let m = FdmMatrix3::from_elem((2, 2, 2), FdmMatrixRow3::new(1.0, 0.0, 0.0, 0.0));
        let v = ramp3((2, 2, 2), 3.0);
        let mut r = FdmVector3::zeros((2, 2, 2));

        FdmBlas3::mvm(&m, &v, &mut r).unwrap();
        assert_eq!(r, v);
    }

    #[test]
    fn test_mvm_laplacian_of_constant() {
        // Pure Neumann Laplacian: center = number of neighbors, so A * 1 = 0
        let n = (4, 3, 5);
        let m = Array3::from_shape_fn(n, |(i, j, k)| {
            let count = |c: usize, len: usize| (c > 0) as usize + (c + 1 < len) as usize;
            FdmMatrixRow3 {
                center: (count(i, n.0) + count(j, n.1) + count(k, n.2)) as f64,
                right: -1.0,
                up: -1.0,
                front: -1.0,
            }
        });
        let v = FdmVector3::from_elem(n, 2.5);
        let mut r = FdmVector3::zeros(n);

        FdmBlas3::mvm(&m, &v, &mut r).unwrap();
        assert_relative_eq!(FdmBlas3::linf_norm(&r), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_mvm_matches_dense_product_2d() {
        let n = (3, 4);
        let m = Array2::from_shape_fn(n, |(i, j)| FdmMatrixRow2 {
            center: 4.0 + i as f64,
            right: -0.5 - j as f64 * 0.1,
            up: -0.25 * (i + 1) as f64,
        });
        let v = Array2::from_shape_fn(n, |(i, j)| (i * 7 + j * 3) as f64 * 0.1 - 1.0);
        let mut r = FdmVector2::zeros(n);
        FdmBlas2::mvm(&m, &v, &mut r).unwrap();

        // Dense assembly of the same symmetric operator
        let flat = |i: usize, j: usize| i * n.1 + j;
        let size = n.0 * n.1;
        let mut dense = Array2::<f64>::zeros((size, size));
        for i in 0..n.0 {
            for j in 0..n.1 {
                let row = m[[i, j]];
                dense[[flat(i, j), flat(i, j)]] = row.center;
                if i + 1 < n.0 {
                    dense[[flat(i, j), flat(i + 1, j)]] = row.right;
                    dense[[flat(i + 1, j), flat(i, j)]] = row.right;
                }
                if j + 1 < n.1 {
                    dense[[flat(i, j), flat(i, j + 1)]] = row.up;
                    dense[[flat(i, j + 1), flat(i, j)]] = row.up;
                }
            }
        }
        let flat_v = Array1::from_iter(v.iter().copied());
        let expected = dense.dot(&flat_v);

        for (got, want) in r.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_residual_of_exact_solution() {
        // x = c is exact for the Dirichlet stencil when b carries the
        // boundary source (6 - neighbors) * c
        let n = (5, 4, 6);
        let c = 1.75;
        let a = poisson3(n);
        let x = FdmVector3::from_elem(n, c);
        let b = Array3::from_shape_fn(n, |(i, j, k)| {
            let missing = |p: usize, len: usize| (p == 0) as usize + (p + 1 == len) as usize;
            (missing(i, n.0) + missing(j, n.1) + missing(k, n.2)) as f64 * c
        });
        let mut r = FdmVector3::zeros(n);

        FdmBlas3::residual(&a, &x, &b, &mut r).unwrap();
        assert!(FdmBlas3::l2_norm(&r) < 1e-10);
    }

    #[test]
    fn test_residual_matches_b_minus_mvm() {
        let n = (4, 4, 4);
        let a = poisson3(n);
        let x = ramp3(n, 0.5);
        let b = ramp3(n, -2.0);

        let mut ax = FdmVector3::zeros(n);
        FdmBlas3::mvm(&a, &x, &mut ax).unwrap();
        let mut expected = FdmVector3::zeros(n);
        FdmBlas3::ax_plus_y(-1.0, &ax, &b, &mut expected).unwrap();

        let mut r = FdmVector3::zeros(n);
        FdmBlas3::residual(&a, &x, &b, &mut r).unwrap();
        for (got, want) in r.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_residual_mismatch() {
        let a = poisson3((3, 3, 3));
        let x = FdmVector3::zeros((3, 3, 3));
        let b = FdmVector3::zeros((3, 3, 4));
        let mut r = FdmVector3::zeros((3, 3, 3));
        assert!(FdmBlas3::residual(&a, &x, &b, &mut r).is_err());
    }

    #[test]
    fn test_norms() {
        let mut v = FdmVector2::zeros((2, 2));
        v[[0, 0]] = 3.0;
        v[[1, 1]] = -4.0;
        assert_relative_eq!(FdmBlas2::l2_norm(&v), 5.0, epsilon = 1e-12);
        assert_relative_eq!(FdmBlas2::linf_norm(&v), 4.0);
        assert_eq!(FdmBlas2::vector_extent(&v), &[2, 2]);
    }

    #[test]
    fn test_norms_report_nan() {
        let mut v = FdmVector3::zeros((2, 2, 2));
        v[[0, 0, 0]] = f64::NAN;
        assert!(FdmBlas3::linf_norm(&v).is_nan());
        assert!(FdmBlas3::l2_norm(&v).is_nan());
    }

    #[test]
    fn test_zeros_like() {
        let m = poisson3((2, 3, 4));
        let z = FdmBlas3::zeros_like(&m);
        assert_eq!(z.shape(), &[2, 3, 4]);
        assert_eq!(FdmBlas3::l2_norm(&z), 0.0);
    }
}
