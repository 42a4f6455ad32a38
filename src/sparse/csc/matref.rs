use super::*;
use crate::assert;
use dyn_stack::{GlobalPodBuffer, PodStack};

/// Sparse matrix view in column-major format.
pub struct SparseColMatRef<'a, I: Index, E> {
    pub(crate) symbolic: SymbolicSparseColMatRef<'a, I>,
    pub(crate) values: &'a [E],
}

impl<I: Index, E> Copy for SparseColMatRef<'_, I, E> {}
impl<I: Index, E> Clone for SparseColMatRef<'_, I, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'short, I: Index, E> Reborrow<'short> for SparseColMatRef<'_, I, E> {
    type Target = SparseColMatRef<'short, I, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, I: Index, E> ReborrowMut<'short> for SparseColMatRef<'_, I, E> {
    type Target = SparseColMatRef<'short, I, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<'a, I: Index, E> IntoConst for SparseColMatRef<'a, I, E> {
    type Target = SparseColMatRef<'a, I, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, I: Index, E: ComplexField> SparseColMatRef<'a, I, E> {
    /// Creates a new sparse matrix view.
    ///
    /// Only the first `symbolic.nnz()` elements of `values` are part of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if the length of `values` is less than `symbolic.nnz()`.
    #[inline]
    #[track_caller]
    pub fn new(symbolic: SymbolicSparseColMatRef<'a, I>, values: &'a [E]) -> Self {
        assert!(symbolic.nnz() <= values.len());
        Self {
            symbolic,
            values: &values[..symbolic.nnz()],
        }
    }

    /// Returns the number of rows of the matrix.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.symbolic.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.symbolic.ncols
    }

    /// Returns the number of rows and columns of the matrix.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.symbolic.nnz()
    }

    /// Returns whether the row indices of each column are known to be strictly increasing.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.symbolic.sorted
    }

    /// Returns a view over `self`.
    #[inline]
    pub fn as_ref(&self) -> SparseColMatRef<'_, I, E> {
        *self
    }

    /// Returns the symbolic structure of the matrix.
    #[inline]
    pub fn symbolic(&self) -> SymbolicSparseColMatRef<'a, I> {
        self.symbolic
    }

    /// Decomposes the matrix into the symbolic part and the numerical values.
    #[inline]
    pub fn parts(self) -> (SymbolicSparseColMatRef<'a, I>, &'a [E]) {
        (self.symbolic, self.values)
    }

    /// Returns the numerical values of the matrix.
    #[inline]
    pub fn values(&self) -> &'a [E] {
        self.values
    }

    /// Returns the column pointers.
    #[inline]
    pub fn col_ptrs(&self) -> &'a [I] {
        self.symbolic.col_ptr
    }

    /// Returns the row indices.
    #[inline]
    pub fn row_indices(&self) -> &'a [I] {
        self.symbolic.row_ind
    }

    /// Returns the range that the column `j` occupies in `self.row_indices()`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn col_range(&self, j: usize) -> Range<usize> {
        self.symbolic.col_range(j)
    }

    /// Returns the row indices of column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn row_indices_of_col_raw(&self, j: usize) -> &'a [I] {
        self.symbolic.row_indices_of_col_raw(j)
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
    ) -> impl 'a + ExactSizeIterator + DoubleEndedIterator<Item = usize> {
        self.symbolic.row_indices_of_col(j)
    }

    /// Returns the numerical values of column `j` of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn values_of_col(&self, j: usize) -> &'a [E] {
        &self.values[self.col_range(j)]
    }

    /// Returns whether the entry `(row, col)` is stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn is_assigned(&self, row: usize, col: usize) -> bool {
        self.symbolic.is_assigned(row, col)
    }

    /// Returns a reference to the value at the given index, or `None` if the entry is not stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn get(&self, row: usize, col: usize) -> Option<&'a E> {
        let values = self.values;
        self.symbolic.find(row, col).map(|pos| &values[pos])
    }

    /// Returns the value at the given index, or zero if the entry is not stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.get(row, col).copied().unwrap_or_else(E::zero)
    }

    /// Checks every structural invariant, including the sortedness claim.
    #[inline]
    pub fn check_structure(&self) -> Result<(), StructureError> {
        self.symbolic.check_structure()
    }

    /// Copies the current matrix into a newly allocated matrix.
    ///
    /// # Note
    /// Allows unsorted matrices, producing an unsorted output.
    #[inline]
    pub fn to_owned(&self) -> Result<SparseColMat<I, E>, SparseError> {
        Ok(SparseColMat {
            symbolic: self.symbolic.to_owned()?,
            values: try_collect(self.values.iter().copied())?,
        })
    }

    /// Copies the current matrix into a newly allocated dense matrix.
    pub fn to_dense(&self) -> Mat<E> {
        let mut mat = Mat::<E>::zeros(self.nrows(), self.ncols());
        for j in 0..self.ncols() {
            for (i, &value) in zip(self.row_indices_of_col(j), self.values_of_col(j)) {
                mat.write(i, j, value);
            }
        }
        mat
    }

    /// Returns the transpose of `self` as a newly allocated matrix.
    ///
    /// # Note
    /// Allows unsorted matrices, producing a sorted output.
    pub fn to_transposed(&self) -> Result<SparseColMat<I, E>, SparseError> {
        let nnz = self.nnz();
        let mut col_ptrs = try_zeroed::<I>(self.nrows() + 1)?;
        let mut row_indices = try_zeroed::<I>(nnz)?;
        let mut values = try_filled(nnz, E::zero())?;

        let mut mem = GlobalPodBuffer::try_new(utils::transpose_req::<I>(self.nrows()).map_err(oom)?)
            .map_err(oom)?;
        utils::transpose(
            &mut col_ptrs,
            &mut row_indices,
            &mut values,
            *self,
            PodStack::new(&mut mem),
        );

        Ok(SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(
                self.ncols(),
                self.nrows(),
                col_ptrs,
                row_indices,
                true,
            ),
            values,
        ))
    }
}

impl<I: Index, E: ComplexField> core::fmt::Debug for SparseColMatRef<'_, I, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut entries = Vec::with_capacity(self.nnz());
        for j in 0..self.ncols() {
            for (i, value) in zip(self.row_indices_of_col(j), self.values_of_col(j)) {
                entries.push((i, j, value));
            }
        }
        f.debug_struct("SparseColMat")
            .field("nrows", &self.nrows())
            .field("ncols", &self.ncols())
            .field("sorted", &self.is_sorted())
            .field("entries", &entries)
            .finish()
    }
}
