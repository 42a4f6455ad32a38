use super::*;
use crate::assert;

/// Symbolic structure of sparse matrix in column format.
///
/// Requires:
/// * `nrows < I::MAX` (always checked)
/// * `ncols < I::MAX` (always checked)
/// * `col_ptrs` has length `ncols + 1`
/// * `col_ptrs[0] == 0`, `col_ptrs` is non-decreasing, and `col_ptrs[ncols] == row_indices.len()`
/// * elements of `row_indices[col_ptrs[j]..col_ptrs[j + 1]]` are less than `nrows`, and are
///   pairwise distinct
/// * if the matrix is flagged as sorted, the row indices of each column are strictly increasing
#[derive(Clone)]
pub struct SymbolicSparseColMat<I: Index> {
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) col_ptr: Vec<I>,
    pub(crate) row_ind: Vec<I>,
    pub(crate) sorted: bool,
}

impl<I: Index> SymbolicSparseColMat<I> {
    /// Creates a new symbolic matrix with sorted columns, after checking its invariants.
    ///
    /// # Panics
    ///
    /// See type level documentation.
    #[inline]
    #[track_caller]
    pub fn new_checked(nrows: usize, ncols: usize, col_ptrs: Vec<I>, row_indices: Vec<I>) -> Self {
        match Self::try_new(nrows, ncols, col_ptrs, row_indices, true) {
            Ok(this) => this,
            Err(err) => panic!("invalid sparse matrix structure: {err}"),
        }
    }

    /// Creates a new symbolic matrix whose columns may be unsorted, after checking its other
    /// invariants.
    ///
    /// # Panics
    ///
    /// See type level documentation.
    #[inline]
    #[track_caller]
    pub fn new_unsorted_checked(
        nrows: usize,
        ncols: usize,
        col_ptrs: Vec<I>,
        row_indices: Vec<I>,
    ) -> Self {
        match Self::try_new(nrows, ncols, col_ptrs, row_indices, false) {
            Ok(this) => this,
            Err(err) => panic!("invalid sparse matrix structure: {err}"),
        }
    }

    /// Creates a new symbolic matrix, or returns the first violated invariant.
    ///
    /// # Panics
    ///
    /// Panics if `nrows` or `ncols` is not less than `I::MAX`.
    #[track_caller]
    pub fn try_new(
        nrows: usize,
        ncols: usize,
        col_ptrs: Vec<I>,
        row_indices: Vec<I>,
        sorted: bool,
    ) -> Result<Self, StructureError> {
        SymbolicSparseColMatRef::try_new(nrows, ncols, &col_ptrs, &row_indices, sorted)?;
        if col_ptrs[ncols].zx() != row_indices.len() {
            return Err(StructureError::NnzMismatch {
                col_ptr_end: col_ptrs[ncols].zx(),
                nnz: row_indices.len(),
            });
        }
        Ok(Self {
            nrows,
            ncols,
            col_ptr: col_ptrs,
            row_ind: row_indices,
            sorted,
        })
    }

    /// Creates a new symbolic matrix, only checking the length of `col_ptrs` and the total number
    /// of entries.
    #[inline]
    #[track_caller]
    pub(crate) fn new_unchecked(
        nrows: usize,
        ncols: usize,
        col_ptrs: Vec<I>,
        row_indices: Vec<I>,
        sorted: bool,
    ) -> Self {
        assert!(all(
            col_ptrs.len() == ncols + 1,
            col_ptrs[ncols].zx() == row_indices.len(),
        ));
        Self {
            nrows,
            ncols,
            col_ptr: col_ptrs,
            row_ind: row_indices,
            sorted,
        }
    }

    /// Returns an empty `nrows×ncols` structure.
    #[inline]
    pub fn empty(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            col_ptr: vec![I::truncate(0); ncols + 1],
            row_ind: Vec::new(),
            sorted: true,
        }
    }

    /// Returns the components of the matrix in the order:
    /// - row count,
    /// - column count,
    /// - column pointers,
    /// - row indices,
    /// - sortedness flag.
    #[inline]
    pub fn into_parts(self) -> (usize, usize, Vec<I>, Vec<I>, bool) {
        (
            self.nrows,
            self.ncols,
            self.col_ptr,
            self.row_ind,
            self.sorted,
        )
    }

    /// Returns a view over the symbolic structure of `self`.
    #[inline]
    pub fn as_ref(&self) -> SymbolicSparseColMatRef<'_, I> {
        SymbolicSparseColMatRef {
            nrows: self.nrows,
            ncols: self.ncols,
            col_ptr: &self.col_ptr,
            row_ind: &self.row_ind,
            sorted: self.sorted,
        }
    }

    /// Returns the number of rows of the matrix.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the number of rows and columns of the matrix.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.row_ind.len()
    }

    /// Returns whether the row indices of each column are known to be strictly increasing.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Returns the column pointers.
    #[inline]
    pub fn col_ptrs(&self) -> &[I] {
        &self.col_ptr
    }

    /// Returns the row indices.
    #[inline]
    pub fn row_indices(&self) -> &[I] {
        &self.row_ind
    }

    /// Returns the range that the column `j` occupies in `self.row_indices()`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn col_range(&self, j: usize) -> Range<usize> {
        self.as_ref().col_range(j)
    }

    /// Returns the row indices of column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn row_indices_of_col_raw(&self, j: usize) -> &[I] {
        self.as_ref().row_indices_of_col_raw(j)
    }

    /// Returns the row indices of column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn row_indices_of_col(
        &self,
        j: usize,
    ) -> impl '_ + ExactSizeIterator + DoubleEndedIterator<Item = usize> {
        self.as_ref().row_indices_of_col(j)
    }

    /// Checks every structural invariant, including the sortedness claim.
    #[inline]
    pub fn check_structure(&self) -> Result<(), StructureError> {
        self.as_ref().check_structure()
    }
}

impl<I: Index> core::fmt::Debug for SymbolicSparseColMat<I> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.as_ref(), f)
    }
}
