use super::*;
use crate::assert;

/// Sparse matrix view in column-major format, with mutable access to the values.
///
/// The structure of the matrix cannot be modified through this view.
pub struct SparseColMatMut<'a, I: Index, E> {
    pub(crate) symbolic: SymbolicSparseColMatRef<'a, I>,
    pub(crate) values: &'a mut [E],
}

impl<'short, I: Index, E> Reborrow<'short> for SparseColMatMut<'_, I, E> {
    type Target = SparseColMatRef<'short, I, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        SparseColMatRef {
            symbolic: self.symbolic,
            values: &*self.values,
        }
    }
}

impl<'short, I: Index, E> ReborrowMut<'short> for SparseColMatMut<'_, I, E> {
    type Target = SparseColMatMut<'short, I, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        SparseColMatMut {
            symbolic: self.symbolic,
            values: &mut *self.values,
        }
    }
}

impl<'a, I: Index, E> IntoConst for SparseColMatMut<'a, I, E> {
    type Target = SparseColMatRef<'a, I, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        SparseColMatRef {
            symbolic: self.symbolic,
            values: self.values,
        }
    }
}

impl<'a, I: Index, E: ComplexField> SparseColMatMut<'a, I, E> {
    /// Creates a new sparse matrix view.
    ///
    /// Only the first `symbolic.nnz()` elements of `values` are part of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if the length of `values` is less than `symbolic.nnz()`.
    #[inline]
    #[track_caller]
    pub fn new(symbolic: SymbolicSparseColMatRef<'a, I>, values: &'a mut [E]) -> Self {
        assert!(symbolic.nnz() <= values.len());
        Self {
            symbolic,
            values: &mut values[..symbolic.nnz()],
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

    /// Returns a view over `self`.
    #[inline]
    pub fn as_ref(&self) -> SparseColMatRef<'_, I, E> {
        self.rb()
    }

    /// Returns the symbolic structure of the matrix.
    #[inline]
    pub fn symbolic(&self) -> SymbolicSparseColMatRef<'a, I> {
        self.symbolic
    }

    /// Decomposes the matrix into the symbolic part and the numerical values.
    #[inline]
    pub fn parts_mut(self) -> (SymbolicSparseColMatRef<'a, I>, &'a mut [E]) {
        (self.symbolic, self.values)
    }

    /// Returns the numerical values of the matrix.
    #[inline]
    pub fn values_mut(self) -> &'a mut [E] {
        self.values
    }

    /// Returns the numerical values of column `j` of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn values_of_col_mut(self, j: usize) -> &'a mut [E] {
        let range = self.symbolic.col_range(j);
        &mut self.values[range]
    }

    /// Returns a mutable reference to the value at the given index, or `None` if the entry is
    /// not stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn get_mut(self, row: usize, col: usize) -> Option<&'a mut E> {
        let pos = self.symbolic.find(row, col)?;
        Some(&mut self.values[pos])
    }

    /// Fills the stored values with `constant`, leaving the structure untouched.
    #[inline]
    pub fn fill(&mut self, constant: E) {
        self.values.fill(constant);
    }
}

impl<I: Index, E: ComplexField> core::fmt::Debug for SparseColMatMut<'_, I, E> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}
