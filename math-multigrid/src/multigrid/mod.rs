//! Generic multigrid driver
//!
//! The driver only knows the [`Blas`](crate::traits::Blas) capability set
//! and three operator callables (relax, restrict, correct). Grid-specific
//! operators live in [`crate::fdm`].

mod cycle;
mod hierarchy;

pub use cycle::*;
pub use hierarchy::*;
