//! Allocation of finite-difference multigrid hierarchies
//!
//! Levels are obtained by halving every axis of the finest grid while all
//! axes stay even. Only storage is allocated here: the coarse-level stencils
//! have to be filled in by the caller.

use super::blas::FdmBlas;
use super::relax::{Relaxation, relaxation_fn};
use super::stencil::{FdmMatrixRow2, FdmMatrixRow3, StencilRow};
use super::transfer::{correct, restrict};
use crate::multigrid::{
    MultigridLinearSystem, MultigridMatrix, MultigridParameters, MultigridVector, VCycleConfig,
};
use ndarray::{Array, Dimension, IntoDimension};
use std::sync::Arc;

/// Multigrid system over finite-difference grids with stencil rows `R`
pub type FdmMgLinearSystem<R> = MultigridLinearSystem<FdmBlas<R>>;
/// 2-D finite-difference multigrid system in double precision
pub type FdmMgLinearSystem2 = FdmMgLinearSystem<FdmMatrixRow2<f64>>;
/// 3-D finite-difference multigrid system in double precision
pub type FdmMgLinearSystem3 = FdmMgLinearSystem<FdmMatrixRow3<f64>>;

/// Extents of every level, finest first
///
/// Keeps halving all axes while each is even and non-zero, up to
/// `max_levels` levels in total.
pub fn level_extents<D: Dimension>(finest: &D, max_levels: usize) -> Vec<D> {
    let mut extents = Vec::new();
    if max_levels == 0 {
        return extents;
    }

    let mut current = finest.clone();
    extents.push(current.clone());
    while extents.len() < max_levels && current.slice().iter().all(|&n| n > 0 && n % 2 == 0) {
        for n in current.slice_mut() {
            *n /= 2;
        }
        extents.push(current.clone());
    }
    extents
}

impl<R: StencilRow> MultigridLinearSystem<FdmBlas<R>> {
    /// Allocate zeroed levels below a finest grid of extent `finest`
    pub fn with_finest<E>(finest: E, max_levels: usize) -> Self
    where
        E: IntoDimension<Dim = R::Dim>,
    {
        let extents = level_extents(&finest.into_dimension(), max_levels);
        log::debug!("allocating multigrid hierarchy: {:?}", extents);

        let a = extents
            .iter()
            .map(|e| Array::from_elem(e.clone(), R::default()))
            .collect();
        let x: Vec<Array<R::Scalar, R::Dim>> =
            extents.iter().map(|e| Array::zeros(e.clone())).collect();
        let b = x.clone();

        Self {
            a: MultigridMatrix::new(a),
            x: MultigridVector::new(x),
            b: MultigridVector::new(b),
        }
    }

    /// Zeroed scratch hierarchy matching the matrix levels
    pub fn buffer(&self) -> MultigridVector<FdmBlas<R>> {
        self.a.iter().map(FdmBlas::<R>::zeros_like).collect::<Vec<_>>().into()
    }
}

/// V-cycle operators for finite-difference grids
///
/// Wires the chosen smoother together with full-weighting restriction and
/// linear-interpolation correction.
pub fn fdm_parameters<R: StencilRow>(
    config: VCycleConfig<R::Scalar>,
    relaxation: Relaxation,
) -> MultigridParameters<FdmBlas<R>> {
    MultigridParameters {
        relax: relaxation_fn::<R>(relaxation),
        restrict: Arc::new(restrict::<R::Scalar, R::Dim>),
        correct: Arc::new(correct::<R::Scalar, R::Dim>),
        config,
    }
}
