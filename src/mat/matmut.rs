use super::*;
use crate::assert;

/// Mutable view over a dense matrix, similar to a mutable reference to a 2D strided
/// [prim@slice].
pub struct MatMut<'a, E> {
    pub(super) data: &'a mut [E],
    pub(super) nrows: usize,
    pub(super) ncols: usize,
    pub(super) row_stride: usize,
    pub(super) col_stride: usize,
}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            data: &*self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            data: &mut *self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            data: self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }
}

impl<'a, E: ComplexField> MatMut<'a, E> {
    /// Creates a mutable view over a column-major slice of length `nrows * ncols`.
    ///
    /// # Panics
    /// Panics if the length of `data` does not match the dimensions.
    #[inline]
    #[track_caller]
    pub fn from_column_major_slice_mut(data: &'a mut [E], nrows: usize, ncols: usize) -> Self {
        assert!(data.len() == nrows * ncols);
        Self {
            data,
            nrows,
            ncols,
            row_stride: 1,
            col_stride: nrows,
        }
    }

    /// Creates a mutable view over a single column vector.
    #[inline]
    pub fn from_col_slice_mut(data: &'a mut [E]) -> Self {
        let n = data.len();
        Self::from_column_major_slice_mut(data, n, 1)
    }

    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the offset between the first elements of two successive rows in the matrix.
    #[inline(always)]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Returns the offset between the first elements of two successive columns in the matrix.
    #[inline(always)]
    pub fn col_stride(&self) -> usize {
        self.col_stride
    }

    /// Returns a mutable pointer to the first element of the matrix.
    #[inline(always)]
    pub fn as_ptr_mut(&mut self) -> *mut E {
        self.data.as_mut_ptr()
    }

    /// Reads the value of the element at the given indices.
    ///
    /// # Panics
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.rb().read(row, col)
    }

    /// Writes the value to the element at the given indices.
    ///
    /// # Panics
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows, col < self.ncols));
        self.data[offset(row, col, self.row_stride, self.col_stride)] = value;
    }

    /// Returns the transpose of `self`.
    #[inline]
    pub fn transpose_mut(self) -> Self {
        Self {
            data: self.data,
            nrows: self.ncols,
            ncols: self.nrows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    /// Returns the column at index `col` as a contiguous mutable slice, if its elements are
    /// stored contiguously.
    #[inline]
    #[track_caller]
    pub fn try_get_contiguous_col_mut(self, col: usize) -> Option<&'a mut [E]> {
        assert!(col < self.ncols);
        if self.nrows == 0 {
            return Some(&mut []);
        }
        if self.row_stride == 1 || self.nrows == 1 {
            let start = col * self.col_stride;
            let nrows = self.nrows;
            let data = self.data;
            Some(&mut data[start..start + nrows])
        } else {
            None
        }
    }

    /// Fills the elements of `self` with zeros.
    #[inline]
    pub fn fill_zero(&mut self) {
        self.fill(E::zero());
    }

    /// Fills the elements of `self` with `constant`.
    pub fn fill(&mut self, constant: E) {
        for j in 0..self.ncols {
            for i in 0..self.nrows {
                self.write(i, j, constant);
            }
        }
    }

    /// Copies the values from `other` into `self`.
    ///
    /// # Panics
    /// Panics if `self` and `other` don't have the same dimensions.
    #[track_caller]
    pub fn copy_from(&mut self, other: MatRef<'_, E>) {
        assert!(all(self.nrows == other.nrows(), self.ncols == other.ncols()));
        for j in 0..self.ncols {
            for i in 0..self.nrows {
                self.write(i, j, other.read(i, j));
            }
        }
    }
}
