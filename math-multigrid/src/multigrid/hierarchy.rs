//! Level hierarchies for the multigrid driver
//!
//! Levels are stored finest first: index 0 is the finest grid and the last
//! index is the coarsest.

use crate::traits::Blas;
use std::fmt;
use std::ops::{Index, IndexMut};

macro_rules! level_hierarchy {
    ($(#[$meta:meta])* $name:ident, $elem:ident) => {
        $(#[$meta])*
        pub struct $name<B: Blas> {
            /// Levels, finest first
            pub levels: Vec<B::$elem>,
        }

        impl<B: Blas> $name<B> {
            /// Create a hierarchy from levels ordered finest first
            pub fn new(levels: Vec<B::$elem>) -> Self {
                Self { levels }
            }

            /// Number of levels
            pub fn len(&self) -> usize {
                self.levels.len()
            }

            /// Whether the hierarchy has no levels
            pub fn is_empty(&self) -> bool {
                self.levels.is_empty()
            }

            /// Finest level, `None` for an empty hierarchy
            pub fn finest(&self) -> Option<&B::$elem> {
                self.levels.first()
            }

            /// Mutable finest level, `None` for an empty hierarchy
            pub fn finest_mut(&mut self) -> Option<&mut B::$elem> {
                self.levels.first_mut()
            }

            /// Coarsest level, `None` for an empty hierarchy
            pub fn coarsest(&self) -> Option<&B::$elem> {
                self.levels.last()
            }

            /// Iterate over levels, finest first
            pub fn iter(&self) -> std::slice::Iter<'_, B::$elem> {
                self.levels.iter()
            }

            /// Iterate mutably over levels, finest first
            pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, B::$elem> {
                self.levels.iter_mut()
            }

            /// Append a level below the current coarsest one
            pub fn push(&mut self, level: B::$elem) {
                self.levels.push(level);
            }

            /// Mutable access to `level` and the next coarser level at once
            ///
            /// # Panics
            ///
            /// Panics if `level + 1` is not a valid level.
            pub fn split_pair_mut(&mut self, level: usize) -> (&mut B::$elem, &mut B::$elem) {
                let (fine, coarse) = self.levels.split_at_mut(level + 1);
                (&mut fine[level], &mut coarse[0])
            }
        }

        impl<B: Blas> Default for $name<B> {
            fn default() -> Self {
                Self { levels: Vec::new() }
            }
        }

        impl<B: Blas> Clone for $name<B>
        where
            B::$elem: Clone,
        {
            fn clone(&self) -> Self {
                Self {
                    levels: self.levels.clone(),
                }
            }
        }

        impl<B: Blas> fmt::Debug for $name<B>
        where
            B::$elem: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("levels", &self.levels)
                    .finish()
            }
        }

        impl<B: Blas> From<Vec<B::$elem>> for $name<B> {
            fn from(levels: Vec<B::$elem>) -> Self {
                Self::new(levels)
            }
        }

        impl<B: Blas> Index<usize> for $name<B> {
            type Output = B::$elem;

            fn index(&self, level: usize) -> &B::$elem {
                &self.levels[level]
            }
        }

        impl<B: Blas> IndexMut<usize> for $name<B> {
            fn index_mut(&mut self, level: usize) -> &mut B::$elem {
                &mut self.levels[level]
            }
        }
    };
}

level_hierarchy!(
    /// System matrices of every level
    MultigridMatrix,
    Matrix
);

level_hierarchy!(
    /// Grid vectors of every level (solution, right-hand side or scratch)
    MultigridVector,
    Vector
);

/// Matrix, solution and right-hand-side hierarchies of one multigrid system
pub struct MultigridLinearSystem<B: Blas> {
    /// System matrices
    pub a: MultigridMatrix<B>,
    /// Solution (finest) and coarse-grid corrections
    pub x: MultigridVector<B>,
    /// Right-hand side (finest) and restricted residuals
    pub b: MultigridVector<B>,
}

impl<B: Blas> MultigridLinearSystem<B> {
    /// Assemble a system from its three hierarchies
    pub fn new(a: MultigridMatrix<B>, x: MultigridVector<B>, b: MultigridVector<B>) -> Self {
        Self { a, x, b }
    }

    /// Drop every level of every hierarchy
    pub fn clear(&mut self) {
        self.a.levels.clear();
        self.x.levels.clear();
        self.b.levels.clear();
    }

    /// Number of matrix levels
    pub fn number_of_levels(&self) -> usize {
        self.a.len()
    }
}

impl<B: Blas> Default for MultigridLinearSystem<B> {
    fn default() -> Self {
        Self {
            a: MultigridMatrix::default(),
            x: MultigridVector::default(),
            b: MultigridVector::default(),
        }
    }
}

impl<B: Blas> Clone for MultigridLinearSystem<B>
where
    B::Matrix: Clone,
    B::Vector: Clone,
{
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            x: self.x.clone(),
            b: self.b.clone(),
        }
    }
}

impl<B: Blas> fmt::Debug for MultigridLinearSystem<B>
where
    B::Matrix: fmt::Debug,
    B::Vector: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultigridLinearSystem")
            .field("a", &self.a)
            .field("x", &self.x)
            .field("b", &self.b)
            .finish()
    }
}
