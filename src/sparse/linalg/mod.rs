//! Sparse linear algebra kernels.
//!
//! Each kernel operates on borrowed inputs and either writes into caller provided storage, or
//! returns a newly allocated result. Kernels that need scratch memory take a
//! [`PodStack`](dyn_stack::PodStack), whose size can be queried with the corresponding `*_req`
//! function.

use super::*;

/// Sparse-sparse and sparse-dense matrix products.
pub mod matmul;

/// Row, column and symmetric permutations of sparse matrices.
pub mod permute;

/// Triangular solves with a sparse factor.
pub mod triangular_solve;

/// Sparse LU decomposition.
pub mod lu;

/// Sparse QR decomposition.
pub mod qr;

/// Fill-reducing column orderings.
pub mod ordering;

/// High level solve, invert and determinant routines.
pub mod solvers;

/// Errors that can occur in the sparse LU decomposition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LuError {
    /// Generic error (allocation or index overflow).
    Generic(SparseError),
    /// The matrix is structurally singular: the column at this step has no candidate pivot.
    SymbolicSingular(usize),
    /// The pivot selected at this step is zero, or not finite.
    ZeroPivot(usize),
}

impl core::fmt::Display for LuError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            LuError::Generic(err) => write!(f, "{err}"),
            LuError::SymbolicSingular(col) => {
                write!(f, "matrix is structurally singular at column {col}")
            }
            LuError::ZeroPivot(col) => write!(f, "zero pivot encountered at column {col}"),
        }
    }
}

impl std::error::Error for LuError {}

impl From<SparseError> for LuError {
    #[inline]
    fn from(value: SparseError) -> Self {
        Self::Generic(value)
    }
}

/// Errors that can occur in the sparse QR decomposition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum QrError {
    /// Generic error (allocation or index overflow).
    Generic(SparseError),
    /// The matrix does not have full column rank: the diagonal element of `R` at this step is
    /// zero, or negligible compared to the other diagonal elements.
    RankDeficient(usize),
}

impl core::fmt::Display for QrError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            QrError::Generic(err) => write!(f, "{err}"),
            QrError::RankDeficient(col) => write!(f, "matrix is rank deficient at column {col}"),
        }
    }
}

impl std::error::Error for QrError {}

impl From<SparseError> for QrError {
    #[inline]
    fn from(value: SparseError) -> Self {
        Self::Generic(value)
    }
}
