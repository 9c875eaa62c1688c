//! Parallel grid kernels with feature-gated implementations
//!
//! Every BLAS, relaxation and transfer kernel writes each output element
//! exactly once and only reads buffers nobody writes during the call, so the
//! index space can be split freely across threads. With the `native` feature
//! these helpers run on rayon (through ndarray's `rayon` support); without it
//! they fall back to sequential loops with the same results.

use crate::traits::GridScalar;
use ndarray::{Array, Dimension, IntoDimension, Zip};

/// Check if parallel processing is available
#[cfg(feature = "native")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "native"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Parallel write of every element of `out`, given its grid index
#[cfg(feature = "native")]
pub fn for_each_indexed<A, D, F>(out: &mut Array<A, D>, f: F)
where
    A: Send,
    D: Dimension + Copy,
    D::Pattern: Send,
    F: Fn(D, &mut A) + Sync + Send,
{
    use rayon::prelude::*;
    let dim = out.raw_dim();
    if let Some(slice) = out.as_slice_mut() {
        slice
            .par_iter_mut()
            .enumerate()
            .for_each(|(flat, elem)| f(unravel_index(flat, &dim), elem));
        return;
    }
    Zip::indexed(out).par_for_each(|idx, elem| f(idx.into_dimension(), elem));
}

/// Sequential indexed write (fallback)
#[cfg(not(feature = "native"))]
pub fn for_each_indexed<A, D, F>(out: &mut Array<A, D>, f: F)
where
    D: Dimension + Copy,
    F: Fn(D, &mut A),
{
    Zip::indexed(out).for_each(|idx, elem| f(idx.into_dimension(), elem));
}

/// Grid index of the `flat`-th element of a row-major array of extent `dim`
#[inline]
pub fn unravel_index<D: Dimension>(mut flat: usize, dim: &D) -> D {
    let mut idx = D::zeros(dim.ndim());
    for axis in (0..dim.ndim()).rev() {
        let len = dim[axis];
        idx[axis] = flat % len;
        flat /= len;
    }
    idx
}

/// Parallel `result[i] = f(x[i], y[i])`
///
/// Extents must already have been checked by the caller.
#[cfg(feature = "native")]
pub fn zip_assign<T, D, F>(result: &mut Array<T, D>, x: &Array<T, D>, y: &Array<T, D>, f: F)
where
    T: GridScalar,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    Zip::from(result)
        .and(x)
        .and(y)
        .par_for_each(|r, &xi, &yi| *r = f(xi, yi));
}

/// Sequential `result[i] = f(x[i], y[i])` (fallback)
#[cfg(not(feature = "native"))]
pub fn zip_assign<T, D, F>(result: &mut Array<T, D>, x: &Array<T, D>, y: &Array<T, D>, f: F)
where
    T: GridScalar,
    D: Dimension,
    F: Fn(T, T) -> T,
{
    Zip::from(result)
        .and(x)
        .and(y)
        .for_each(|r, &xi, &yi| *r = f(xi, yi));
}

/// Parallel in-place accumulation `result[i] += v[i]`
#[cfg(feature = "native")]
pub fn add_assign<T, D>(result: &mut Array<T, D>, v: &Array<T, D>)
where
    T: GridScalar,
    D: Dimension,
{
    Zip::from(result).and(v).par_for_each(|r, &vi| *r += vi);
}

/// Sequential in-place accumulation (fallback)
#[cfg(not(feature = "native"))]
pub fn add_assign<T, D>(result: &mut Array<T, D>, v: &Array<T, D>)
where
    T: GridScalar,
    D: Dimension,
{
    Zip::from(result).and(v).for_each(|r, &vi| *r += vi);
}

/// Sum of `f(a[i], b[i])` over all indices
///
/// Contiguous arrays are reduced in parallel, so the summation order (and the
/// last bits of the result) depends on the thread count.
#[cfg(feature = "native")]
pub fn zip_sum<T, D, F>(a: &Array<T, D>, b: &Array<T, D>, f: F) -> T
where
    T: GridScalar,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    use rayon::prelude::*;
    match (a.as_slice(), b.as_slice()) {
        (Some(a), Some(b)) => a
            .par_iter()
            .zip(b.par_iter())
            .map(|(&ai, &bi)| f(ai, bi))
            .reduce(T::zero, |l, r| l + r),
        _ => Zip::from(a)
            .and(b)
            .fold(T::zero(), |acc, &ai, &bi| acc + f(ai, bi)),
    }
}

/// Sequential sum (fallback)
#[cfg(not(feature = "native"))]
pub fn zip_sum<T, D, F>(a: &Array<T, D>, b: &Array<T, D>, f: F) -> T
where
    T: GridScalar,
    D: Dimension,
    F: Fn(T, T) -> T,
{
    Zip::from(a)
        .and(b)
        .fold(T::zero(), |acc, &ai, &bi| acc + f(ai, bi))
}

/// Larger of two values; NaN wins over any number
#[inline]
fn nan_max<T: GridScalar>(acc: T, x: T) -> T {
    if x.is_nan() || x > acc { x } else { acc }
}

/// Maximum of `f(v[i])` over all indices, zero for an empty array
///
/// NaN propagates: a single NaN entry makes the result NaN.
#[cfg(feature = "native")]
pub fn max_map<T, D, F>(v: &Array<T, D>, f: F) -> T
where
    T: GridScalar,
    D: Dimension,
    F: Fn(T) -> T + Sync + Send,
{
    use rayon::prelude::*;
    match v.as_slice() {
        Some(slice) => slice
            .par_iter()
            .map(|&vi| f(vi))
            .reduce(T::zero, nan_max),
        None => v.fold(T::zero(), |acc, &vi| nan_max(acc, f(vi))),
    }
}

/// Sequential maximum (fallback)
#[cfg(not(feature = "native"))]
pub fn max_map<T, D, F>(v: &Array<T, D>, f: F) -> T
where
    T: GridScalar,
    D: Dimension,
    F: Fn(T) -> T,
{
    v.fold(T::zero(), |acc, &vi| nan_max(acc, f(vi)))
}
