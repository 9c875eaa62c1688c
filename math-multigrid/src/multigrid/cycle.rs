//! Recursive multigrid V-cycle
//!
//! One call performs a single V-cycle over the whole hierarchy: pre-smooth,
//! restrict the residual, recurse on the coarse correction equation, correct
//! and post-smooth. Repeating cycles until the residual is small enough is
//! left to the caller.

use super::hierarchy::{MultigridMatrix, MultigridVector};
use crate::error::{MultigridError, Result, ensure_same_extent};
use crate::traits::{Blas, GridScalar};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Relaxation callable: `(A, b, iterations, max_tolerance, &mut x, &mut buffer)`
///
/// Runs up to `iterations` smoothing sweeps on `A x = b`, updating `x` in
/// place. `buffer` is scratch space of the same extent.
pub type RelaxFn<B> = Arc<
    dyn Fn(
            &<B as Blas>::Matrix,
            &<B as Blas>::Vector,
            usize,
            <B as Blas>::Scalar,
            &mut <B as Blas>::Vector,
            &mut <B as Blas>::Vector,
        ) -> Result<()>
        + Send
        + Sync,
>;

/// Restriction callable: `(finer, &mut coarser)`, overwriting `coarser`
pub type RestrictFn<B> =
    Arc<dyn Fn(&<B as Blas>::Vector, &mut <B as Blas>::Vector) -> Result<()> + Send + Sync>;

/// Correction callable: `(coarser, &mut finer)`, adding the interpolated
/// coarse values into `finer`
pub type CorrectFn<B> =
    Arc<dyn Fn(&<B as Blas>::Vector, &mut <B as Blas>::Vector) -> Result<()> + Send + Sync>;

/// Iteration counts and tolerance of one V-cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VCycleConfig<R> {
    /// Smoothing sweeps on the way down (before restriction)
    pub restriction_iterations: usize,
    /// Smoothing sweeps after correction on intermediate levels
    pub correction_iterations: usize,
    /// Smoothing sweeps after correction on the finest level
    pub final_iterations: usize,
    /// Smoothing sweeps on the coarsest level
    pub coarsest_iterations: usize,
    /// Early-exit tolerance handed to the smoother on the finest level,
    /// halved on every coarser level
    pub max_tolerance: R,
}

impl<R: GridScalar> VCycleConfig<R> {
    /// Few sweeps per level, loose tolerance
    pub fn fast() -> Self {
        Self {
            restriction_iterations: 2,
            correction_iterations: 2,
            final_iterations: 5,
            coarsest_iterations: 10,
            max_tolerance: R::from_const(1e-6),
        }
    }

    /// Many sweeps per level, tight tolerance
    pub fn accurate() -> Self {
        Self {
            restriction_iterations: 10,
            correction_iterations: 10,
            final_iterations: 40,
            coarsest_iterations: 50,
            max_tolerance: R::from_const(1e-12),
        }
    }

    fn standard() -> Self {
        Self {
            restriction_iterations: 5,
            correction_iterations: 5,
            final_iterations: 20,
            coarsest_iterations: 20,
            max_tolerance: R::from_const(1e-9),
        }
    }
}

impl Default for VCycleConfig<f64> {
    fn default() -> Self {
        Self::standard()
    }
}

impl Default for VCycleConfig<f32> {
    fn default() -> Self {
        Self {
            max_tolerance: 1e-6,
            ..Self::standard()
        }
    }
}

/// Operators and configuration of a V-cycle
pub struct MultigridParameters<B: Blas> {
    /// Smoother
    pub relax: RelaxFn<B>,
    /// Fine-to-coarse transfer of residuals
    pub restrict: RestrictFn<B>,
    /// Coarse-to-fine transfer of corrections
    pub correct: CorrectFn<B>,
    /// Iteration counts and tolerance
    pub config: VCycleConfig<B::Scalar>,
}

impl<B: Blas> MultigridParameters<B> {
    /// Bundle three operators with a configuration
    pub fn new<Fr, Fs, Fc>(
        relax: Fr,
        restrict: Fs,
        correct: Fc,
        config: VCycleConfig<B::Scalar>,
    ) -> Self
    where
        Fr: Fn(
                &B::Matrix,
                &B::Vector,
                usize,
                B::Scalar,
                &mut B::Vector,
                &mut B::Vector,
            ) -> Result<()>
            + Send
            + Sync
            + 'static,
        Fs: Fn(&B::Vector, &mut B::Vector) -> Result<()> + Send + Sync + 'static,
        Fc: Fn(&B::Vector, &mut B::Vector) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            relax: Arc::new(relax),
            restrict: Arc::new(restrict),
            correct: Arc::new(correct),
            config,
        }
    }

    /// Same operators with a different configuration
    pub fn with_config(&self, config: VCycleConfig<B::Scalar>) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }
}

impl<B: Blas> Clone for MultigridParameters<B> {
    fn clone(&self) -> Self {
        Self {
            relax: Arc::clone(&self.relax),
            restrict: Arc::clone(&self.restrict),
            correct: Arc::clone(&self.correct),
            config: self.config,
        }
    }
}

impl<B: Blas> fmt::Debug for MultigridParameters<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultigridParameters")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Outcome of one V-cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultigridResult<R> {
    /// L2 norm of `b - A x` on the finest level after the cycle
    pub last_residual_norm: R,
}

/// Run one V-cycle on the hierarchy `a x = b`
///
/// `x` holds the initial guess on the finest level and receives the improved
/// solution. The coarse levels of `x` and `b` as well as every level of
/// `buffer` are overwritten. The hierarchies are validated before any work:
/// all four must have the same number of levels and matching extents per
/// level. An empty hierarchy is a no-op with a zero residual.
///
/// The tolerance scaling (halved per coarser level) is tuned for the
/// V-cycle's single visit of each level.
pub fn multigrid_v_cycle<B: Blas>(
    a: &MultigridMatrix<B>,
    params: &MultigridParameters<B>,
    x: &mut MultigridVector<B>,
    b: &mut MultigridVector<B>,
    buffer: &mut MultigridVector<B>,
) -> Result<MultigridResult<B::Scalar>> {
    validate_hierarchy(a, x, b, buffer)?;

    if a.is_empty() {
        return Ok(MultigridResult {
            last_residual_norm: B::Scalar::zero(),
        });
    }

    let norm = v_cycle(a, params, 0, params.config.max_tolerance, x, b, buffer)?;
    log::debug!(
        "V-cycle over {} levels: residual = {:.6e}",
        a.len(),
        norm.to_log_value()
    );

    Ok(MultigridResult {
        last_residual_norm: norm,
    })
}

fn v_cycle<B: Blas>(
    a: &MultigridMatrix<B>,
    params: &MultigridParameters<B>,
    level: usize,
    max_tolerance: B::Scalar,
    x: &mut MultigridVector<B>,
    b: &mut MultigridVector<B>,
    buffer: &mut MultigridVector<B>,
) -> Result<B::Scalar> {
    let config = &params.config;
    let relax = &params.relax;

    relax(
        &a[level],
        &b[level],
        config.restriction_iterations,
        max_tolerance,
        &mut x[level],
        &mut buffer[level],
    )?;

    if level + 1 < a.len() {
        B::residual(&a[level], &x[level], &b[level], &mut buffer[level])?;
        (params.restrict)(&buffer[level], &mut b[level + 1])?;
        B::set_scalar(B::Scalar::zero(), &mut x[level + 1]);

        let half = B::Scalar::from_const(0.5);
        v_cycle(a, params, level + 1, max_tolerance * half, x, b, buffer)?;

        let (fine, coarse) = x.split_pair_mut(level);
        (params.correct)(coarse, fine)?;

        let iterations = if level == 0 {
            config.final_iterations
        } else {
            config.correction_iterations
        };
        relax(
            &a[level],
            &b[level],
            iterations,
            max_tolerance,
            &mut x[level],
            &mut buffer[level],
        )?;
    } else {
        relax(
            &a[level],
            &b[level],
            config.coarsest_iterations,
            max_tolerance,
            &mut x[level],
            &mut buffer[level],
        )?;
    }

    B::residual(&a[level], &x[level], &b[level], &mut buffer[level])?;
    let norm = B::l2_norm(&buffer[level]);
    log::trace!("level {}: residual = {:.6e}", level, norm.to_log_value());
    Ok(norm)
}

fn validate_hierarchy<B: Blas>(
    a: &MultigridMatrix<B>,
    x: &MultigridVector<B>,
    b: &MultigridVector<B>,
    buffer: &MultigridVector<B>,
) -> Result<()> {
    for (name, levels) in [("x", x), ("b", b), ("buffer", buffer)] {
        if levels.len() != a.len() {
            return Err(MultigridError::LevelCountMismatch {
                name,
                expected: a.len(),
                actual: levels.len(),
            });
        }
    }

    for (level, m) in a.iter().enumerate() {
        let extent = B::matrix_extent(m);
        ensure_same_extent(extent, B::vector_extent(&x[level]))?;
        ensure_same_extent(extent, B::vector_extent(&b[level]))?;
        ensure_same_extent(extent, B::vector_extent(&buffer[level]))?;
    }
    Ok(())
}
