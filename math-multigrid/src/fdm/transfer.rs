//! Grid transfer operators for cell-centred finite-difference grids
//!
//! Both operators are separable: they are applied one axis at a time. An
//! axis whose length is the same on both grids is passed through unchanged,
//! which allows semi-coarsening of anisotropic grids.

use crate::error::{MultigridError, Result};
use crate::parallel::{add_assign, for_each_indexed};
use crate::traits::GridScalar;
use ndarray::{Array, Dimension};

/// Restriction weights over fine cells `2c - 1 ..= 2c + 2`
const RESTRICTION_KERNEL: [f64; 4] = [0.125, 0.375, 0.375, 0.125];

/// Restrict `finer` onto `coarser` (overwritten)
///
/// Every halved axis uses full weighting with the kernel
/// (1/8, 3/8, 3/8, 1/8); fine indices past the boundary are clamped, so a
/// constant field restricts to the same constant.
pub fn restrict<T, D>(finer: &Array<T, D>, coarser: &mut Array<T, D>) -> Result<()>
where
    T: GridScalar,
    D: Dimension<Pattern: Send> + Copy,
{
    let halved = halved_axes(finer.shape(), coarser.shape())?;

    let mut current: Option<Array<T, D>> = None;
    for axis in halved {
        let src = current.as_ref().unwrap_or(finer);
        let next = restrict_axis(src, axis, coarser.shape()[axis]);
        current = Some(next);
    }

    match current {
        Some(restricted) => coarser.assign(&restricted),
        None => coarser.assign(finer),
    }
    Ok(())
}

/// Interpolate `coarser` linearly and add it into `finer`
///
/// A fine cell takes 3/4 of its parent coarse cell and 1/4 of the nearest
/// other coarse cell along each halved axis (clamped at the boundary).
pub fn correct<T, D>(coarser: &Array<T, D>, finer: &mut Array<T, D>) -> Result<()>
where
    T: GridScalar,
    D: Dimension<Pattern: Send> + Copy,
{
    let halved = halved_axes(finer.shape(), coarser.shape())?;

    let mut current: Option<Array<T, D>> = None;
    for axis in halved {
        let src = current.as_ref().unwrap_or(coarser);
        let next = prolong_axis(src, axis, finer.shape()[axis]);
        current = Some(next);
    }

    add_assign(finer, current.as_ref().unwrap_or(coarser));
    Ok(())
}

/// Axes along which `fine` is twice `coarse`
fn halved_axes(fine: &[usize], coarse: &[usize]) -> Result<Vec<usize>> {
    if fine.len() != coarse.len() {
        return Err(MultigridError::dimension_mismatch(fine, coarse));
    }
    let mut halved = Vec::with_capacity(fine.len());
    for (axis, (&f, &c)) in fine.iter().zip(coarse).enumerate() {
        if f == 2 * c && c > 0 {
            halved.push(axis);
        } else if f != c {
            return Err(MultigridError::IncompatibleLevels {
                axis,
                fine: fine.to_vec(),
                coarse: coarse.to_vec(),
            });
        }
    }
    Ok(halved)
}

fn restrict_axis<T, D>(src: &Array<T, D>, axis: usize, coarse_len: usize) -> Array<T, D>
where
    T: GridScalar,
    D: Dimension<Pattern: Send> + Copy,
{
    let fine_last = src.shape()[axis] - 1;
    let weights = RESTRICTION_KERNEL.map(T::from_const);

    let mut dim = src.raw_dim();
    dim[axis] = coarse_len;
    let mut out = Array::zeros(dim);

    for_each_indexed(&mut out, |idx: D, o: &mut T| {
        let c = idx[axis];
        let mut fine_idx = idx.clone();
        let mut sum = T::zero();
        for (k, &w) in weights.iter().enumerate() {
            // 2c - 1 + k, clamped to the grid
            fine_idx[axis] = (2 * c + k).saturating_sub(1).min(fine_last);
            sum += w * src[fine_idx.clone()];
        }
        *o = sum;
    });
    out
}

fn prolong_axis<T, D>(src: &Array<T, D>, axis: usize, fine_len: usize) -> Array<T, D>
where
    T: GridScalar,
    D: Dimension<Pattern: Send> + Copy,
{
    let coarse_last = src.shape()[axis] - 1;
    let near = T::from_const(0.75);
    let far = T::from_const(0.25);

    let mut dim = src.raw_dim();
    dim[axis] = fine_len;
    let mut out = Array::zeros(dim);

    for_each_indexed(&mut out, |idx: D, o: &mut T| {
        let f = idx[axis];
        let c = f / 2;
        let other = if f % 2 == 0 {
            c.saturating_sub(1)
        } else {
            (c + 1).min(coarse_last)
        };

        let mut parent = idx.clone();
        parent[axis] = c;
        let mut neighbor = idx;
        neighbor[axis] = other;
        *o = near * src[parent] + far * src[neighbor];
    });
    out
}
