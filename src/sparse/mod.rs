//! Sparse matrix data structures.
//!
//! Sparse matrices are stored in compressed sparse column (CSC) format.
//! This format represents each column of the matrix by storing the row indices of its non-zero
//! elements, as well as their values.
//!
//! The indices and the values are each stored in a contiguous slice. In order to specify where
//! each column starts and ends, a slice of size `ncols + 1` stores the start of each column, with
//! the last element being equal to the total number of non-zeros.
//!
//! # Example
//!
//! Consider the 4-by-5 matrix:
//! ```notcode
//! [[10.0, 0.0, 12.0, -1.0, 13.0]
//!  [ 0.0, 0.0, 25.0, -2.0,  0.0]
//!  [ 1.0, 0.0,  0.0,  0.0,  0.0]
//!  [ 4.0, 0.0,  0.0,  0.0,  5.0]]
//! ```
//!
//! The matrix is stored as follows:
//! ```notcode
//! column pointers:  0 |  3 |  3 |  5 |  7 |  9
//!
//! row indices:    0 |    2 |    3 |    0 |    1 |    0 |    1 |    0 |    3
//! values     : 10.0 |  1.0 |  4.0 | 12.0 | 25.0 | -1.0 | -2.0 | 13.0 |  5.0
//! ```
//!
//! # Sortedness
//!
//! Every sparse matrix carries a flag stating whether the row indices of each column are strictly
//! increasing, which can be queried with `is_sorted()`. Some kernels produce unsorted output (this
//! is documented on each kernel), which can be sorted explicitly with
//! [`SparseColMat::sort_indices`]. Duplicate row indices within a column are never allowed.
//!
//! # Workspaces
//!
//! Kernels that need scratch memory take a [`PodStack`](dyn_stack::PodStack), along with a
//! matching `*_req` function that computes the size and alignment requirements of the workspace.
//! Kernels fully initialize the workspace memory they use, so the same buffer can be reused across
//! calls.

use crate::{ComplexField, Index, Mat, MatRef};
use core::{iter::zip, ops::Range};
use reborrow::*;

#[cfg(test)]
macro_rules! monomorphize_test {
    ($name: ident) => {
        monomorphize_test!($name, u32);
        monomorphize_test!($name, u64);
    };

    ($name: ident, $ty: ident) => {
        paste::paste! {
            #[test]
            fn [<$name _ $ty>]() {
                $name::<$ty>();
            }
        }
    };
}

mod csc;

/// Conversion from and to lists of `(row, col, value)` triplets.
pub mod triplet;

/// Low level utilities: structure validation, sorting and transposition.
pub mod utils;

/// Sparse matrix binary operations, concatenation and extraction.
pub mod ops;

/// Row, column and matrix-wide reductions, scaling, and elementwise maps.
pub mod reduce;

/// Structural and numerical predicates on sparse matrices.
pub mod features;

/// Sparse linear algebra module.
/// Contains low level routines and the implementation of their corresponding high level wrappers.
pub mod linalg;

pub use csc::*;
pub use triplet::TripletMat;

/// Sentinel value for index arrays.
#[inline(always)]
pub(crate) fn none<I: Index>() -> I {
    I::MAX
}

mod mem {
    use crate::Index;

    #[inline]
    pub fn fill_none<I: Index>(slice: &mut [I]) {
        slice.fill(super::none::<I>());
    }

    #[inline]
    pub fn fill_zero<E: crate::ComplexField>(slice: &mut [E]) {
        slice.fill(E::zero());
    }
}

#[inline(always)]
#[doc(hidden)]
pub fn windows2<I>(slice: &[I]) -> impl DoubleEndedIterator<Item = [&I; 2]> {
    slice.windows(2).map(|window| [&window[0], &window[1]])
}

/// Errors that can occur in sparse algorithms.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[non_exhaustive]
pub enum SparseError {
    /// An index exceeding the maximum value (`I::MAX` for a given index type `I`).
    IndexOverflow,
    /// Memory allocation failed.
    OutOfMemory,
}

impl core::fmt::Display for SparseError {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for SparseError {}

/// Errors that can occur when creating a sparse matrix from a list of entries.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[non_exhaustive]
pub enum CreationError {
    /// Generic error (allocation or index overflow).
    Generic(SparseError),
    /// Matrix index out-of-bounds error.
    OutOfBounds {
        /// Row of the out-of-bounds index.
        row: usize,
        /// Column of the out-of-bounds index.
        col: usize,
    },
}

impl From<SparseError> for CreationError {
    #[inline]
    fn from(value: SparseError) -> Self {
        Self::Generic(value)
    }
}

impl core::fmt::Display for CreationError {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for CreationError {}

/// Violation of the structural invariants of a compressed sparse column matrix.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum StructureError {
    /// The column pointer array does not have `ncols + 1` elements.
    ColPtrLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// The first column pointer is not zero.
    NonZeroFirstColPtr,
    /// The column pointers decrease at the given column.
    DecreasingColPtr {
        /// Column at which the column pointers decrease.
        col: usize,
    },
    /// The last column pointer does not match the number of stored entries.
    NnzMismatch {
        /// Value of the last column pointer.
        col_ptr_end: usize,
        /// Number of stored row indices.
        nnz: usize,
    },
    /// A row index is not less than the number of rows.
    RowIndexOutOfBounds {
        /// The row index.
        row: usize,
        /// The column containing the row index.
        col: usize,
    },
    /// A row index appears more than once in the same column.
    DuplicateRowIndex {
        /// The duplicated row index.
        row: usize,
        /// The column containing the duplicate.
        col: usize,
    },
    /// The matrix claims to be sorted, but the row indices of this column are not strictly
    /// increasing.
    UnsortedColumn {
        /// The unsorted column.
        col: usize,
    },
}

impl core::fmt::Display for StructureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            StructureError::ColPtrLength { expected, found } => write!(
                f,
                "column pointer array has length {found}, expected {expected}"
            ),
            StructureError::NonZeroFirstColPtr => f.write_str("first column pointer is not zero"),
            StructureError::DecreasingColPtr { col } => {
                write!(f, "column pointers decrease at column {col}")
            }
            StructureError::NnzMismatch { col_ptr_end, nnz } => write!(
                f,
                "last column pointer is {col_ptr_end}, but {nnz} entries are stored"
            ),
            StructureError::RowIndexOutOfBounds { row, col } => {
                write!(f, "row index {row} in column {col} is out of bounds")
            }
            StructureError::DuplicateRowIndex { row, col } => {
                write!(f, "row index {row} appears more than once in column {col}")
            }
            StructureError::UnsortedColumn { col } => {
                write!(f, "column {col} is flagged as sorted but is not")
            }
        }
    }
}

impl std::error::Error for StructureError {}

#[inline]
fn oom<T>(_: T) -> SparseError {
    SparseError::OutOfMemory
}

#[inline]
fn try_zeroed<I: bytemuck::Pod>(n: usize) -> Result<Vec<I>, SparseError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n).map_err(oom)?;
    v.resize(n, I::zeroed());
    Ok(v)
}

#[inline]
fn try_filled<E: Copy>(n: usize, value: E) -> Result<Vec<E>, SparseError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n).map_err(oom)?;
    v.resize(n, value);
    Ok(v)
}

#[inline]
fn try_reserve<T>(v: &mut Vec<T>, additional: usize) -> Result<(), SparseError> {
    v.try_reserve(additional).map_err(oom)
}

#[inline]
fn try_collect<I: IntoIterator>(iter: I) -> Result<Vec<I::Item>, SparseError> {
    let iter = iter.into_iter();
    let mut v = Vec::new();
    v.try_reserve_exact(iter.size_hint().0).map_err(oom)?;
    v.extend(iter);
    Ok(v)
}

/// Returns `Err(SparseError::IndexOverflow)` if `value` cannot be stored in `I`.
#[inline]
fn check_index<I: Index>(value: usize) -> Result<I, SparseError> {
    if value >= I::MAX.zx() {
        Err(SparseError::IndexOverflow)
    } else {
        Ok(I::truncate(value))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn structure_error_messages() {
        let err = StructureError::DuplicateRowIndex { row: 3, col: 1 };
        assert!(err.to_string() == "row index 3 appears more than once in column 1");
        let err: CreationError = SparseError::OutOfMemory.into();
        assert!(err == CreationError::Generic(SparseError::OutOfMemory));
    }

    #[test]
    fn index_overflow_is_detected() {
        assert!(check_index::<u32>(u32::MAX as usize) == Err(SparseError::IndexOverflow));
        assert!(check_index::<u32>(17) == Ok(17u32));
    }
}
