use super::*;
use crate::assert;

/// Symbolic view structure of sparse matrix in column format.
///
/// Requires:
/// * `nrows < I::MAX` (always checked)
/// * `ncols < I::MAX` (always checked)
/// * `col_ptrs` has length `ncols + 1`
/// * `col_ptrs[0] == 0`, and `col_ptrs` is non-decreasing
/// * `col_ptrs[ncols] <= row_indices.len()`, only the first `col_ptrs[ncols]` row indices are
///   part of the matrix
/// * elements of `row_indices[col_ptrs[j]..col_ptrs[j + 1]]` are less than `nrows`, and are
///   pairwise distinct
/// * if the matrix is flagged as sorted, the row indices of each column are strictly increasing
///
/// The checked constructors verify all of the above. The unsorted constructors accept columns in
/// any order, but still reject duplicates.
pub struct SymbolicSparseColMatRef<'a, I: Index> {
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) col_ptr: &'a [I],
    pub(crate) row_ind: &'a [I],
    pub(crate) sorted: bool,
}

impl<I: Index> Copy for SymbolicSparseColMatRef<'_, I> {}
impl<I: Index> Clone for SymbolicSparseColMatRef<'_, I> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'short, I: Index> Reborrow<'short> for SymbolicSparseColMatRef<'_, I> {
    type Target = SymbolicSparseColMatRef<'short, I>;

    #[inline]
    fn rb(&self) -> Self::Target {
        *self
    }
}

impl<'short, I: Index> ReborrowMut<'short> for SymbolicSparseColMatRef<'_, I> {
    type Target = SymbolicSparseColMatRef<'short, I>;

    #[inline]
    fn rb_mut(&mut self) -> Self::Target {
        *self
    }
}

impl<'a, I: Index> IntoConst for SymbolicSparseColMatRef<'a, I> {
    type Target = SymbolicSparseColMatRef<'a, I>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, I: Index> SymbolicSparseColMatRef<'a, I> {
    /// Creates a new symbolic matrix view with sorted columns, after checking its invariants.
    ///
    /// # Panics
    ///
    /// See type level documentation.
    #[inline]
    #[track_caller]
    pub fn new_checked(
        nrows: usize,
        ncols: usize,
        col_ptrs: &'a [I],
        row_indices: &'a [I],
    ) -> Self {
        match Self::try_new(nrows, ncols, col_ptrs, row_indices, true) {
            Ok(this) => this,
            Err(err) => panic!("invalid sparse matrix structure: {err}"),
        }
    }

    /// Creates a new symbolic matrix view whose columns may be unsorted, after checking its other
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
        col_ptrs: &'a [I],
        row_indices: &'a [I],
    ) -> Self {
        match Self::try_new(nrows, ncols, col_ptrs, row_indices, false) {
            Ok(this) => this,
            Err(err) => panic!("invalid sparse matrix structure: {err}"),
        }
    }

    /// Creates a new symbolic matrix view, or returns the first violated invariant.
    ///
    /// # Panics
    ///
    /// Panics if `nrows` or `ncols` is not less than `I::MAX`.
    #[track_caller]
    pub fn try_new(
        nrows: usize,
        ncols: usize,
        col_ptrs: &'a [I],
        row_indices: &'a [I],
        sorted: bool,
    ) -> Result<Self, StructureError> {
        assert!(all(nrows < I::MAX.zx(), ncols < I::MAX.zx()));
        if col_ptrs.len() != ncols + 1 {
            return Err(StructureError::ColPtrLength {
                expected: ncols + 1,
                found: col_ptrs.len(),
            });
        }
        let nnz = col_ptrs[ncols].zx();
        if nnz > row_indices.len() {
            return Err(StructureError::NnzMismatch {
                col_ptr_end: nnz,
                nnz: row_indices.len(),
            });
        }
        let row_indices = &row_indices[..nnz];
        utils::check_structure(nrows, ncols, col_ptrs, row_indices, sorted)?;
        Ok(Self {
            nrows,
            ncols,
            col_ptr: col_ptrs,
            row_ind: row_indices,
            sorted,
        })
    }

    /// Creates a new symbolic matrix view, only checking the length of `col_ptrs` and the total
    /// number of entries. The remaining invariants must be upheld by the caller, and can be
    /// verified with [`Self::check_structure`].
    #[inline(always)]
    #[track_caller]
    pub(crate) fn new_unchecked(
        nrows: usize,
        ncols: usize,
        col_ptrs: &'a [I],
        row_indices: &'a [I],
        sorted: bool,
    ) -> Self {
        assert!(all(
            col_ptrs.len() == ncols + 1,
            col_ptrs[ncols].zx() <= row_indices.len(),
        ));
        let row_indices = &row_indices[..col_ptrs[ncols].zx()];
        Self {
            nrows,
            ncols,
            col_ptr: col_ptrs,
            row_ind: row_indices,
            sorted,
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
    pub fn col_ptrs(&self) -> &'a [I] {
        self.col_ptr
    }

    /// Returns the row indices of all the stored entries.
    #[inline]
    pub fn row_indices(&self) -> &'a [I] {
        self.row_ind
    }

    /// Returns the range that the column `j` occupies in `self.row_indices()`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn col_range(&self, j: usize) -> Range<usize> {
        assert!(j < self.ncols);
        self.col_ptr[j].zx()..self.col_ptr[j + 1].zx()
    }

    /// Returns the row indices of the column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn row_indices_of_col_raw(&self, j: usize) -> &'a [I] {
        &self.row_ind[self.col_range(j)]
    }

    /// Returns the row indices of the column `j`, zero extended to `usize`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn row_indices_of_col(
        &self,
        j: usize,
    ) -> impl 'a + ExactSizeIterator + DoubleEndedIterator<Item = usize> {
        self.row_indices_of_col_raw(j).iter().map(|&i| i.zx())
    }

    /// Returns the position of the entry `(row, col)` in `self.row_indices()`, if it is stored.
    ///
    /// Uses a binary search if the matrix is sorted, and a linear scan of the column otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[track_caller]
    pub fn find(&self, row: usize, col: usize) -> Option<usize> {
        assert!(all(row < self.nrows, col < self.ncols));
        let start = self.col_ptr[col].zx();
        let col_rows = self.row_indices_of_col_raw(col);
        let row = I::truncate(row);
        let pos = if self.sorted {
            col_rows.binary_search(&row).ok()
        } else {
            col_rows.iter().position(|&i| i == row)
        };
        pos.map(|pos| start + pos)
    }

    /// Returns whether the entry `(row, col)` is stored.
    #[inline]
    #[track_caller]
    pub fn is_assigned(&self, row: usize, col: usize) -> bool {
        self.find(row, col).is_some()
    }

    /// Checks every structural invariant, including the sortedness claim.
    #[inline]
    pub fn check_structure(&self) -> Result<(), StructureError> {
        utils::check_structure(self.nrows, self.ncols, self.col_ptr, self.row_ind, self.sorted)
    }

    /// Copies the current matrix into a newly allocated matrix.
    #[inline]
    pub fn to_owned(&self) -> Result<SymbolicSparseColMat<I>, SparseError> {
        Ok(SymbolicSparseColMat {
            nrows: self.nrows,
            ncols: self.ncols,
            col_ptr: try_collect(self.col_ptr.iter().copied())?,
            row_ind: try_collect(self.row_ind.iter().copied())?,
            sorted: self.sorted,
        })
    }
}

impl<I: Index> core::fmt::Debug for SymbolicSparseColMatRef<'_, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut entries = Vec::with_capacity(self.nnz());
        for j in 0..self.ncols {
            for i in self.row_indices_of_col(j) {
                entries.push((i, j));
            }
        }
        f.debug_struct("SymbolicSparseColMat")
            .field("nrows", &self.nrows)
            .field("ncols", &self.ncols)
            .field("sorted", &self.sorted)
            .field("entries", &entries)
            .finish()
    }
}
