use super::*;
use crate::assert;

/// Immutable view over a dense matrix, similar to an immutable reference to a 2D strided
/// [prim@slice].
pub struct MatRef<'a, E> {
    pub(super) data: &'a [E],
    pub(super) nrows: usize,
    pub(super) ncols: usize,
    pub(super) row_stride: usize,
    pub(super) col_stride: usize,
}

impl<E> Copy for MatRef<'_, E> {}
impl<E> Clone for MatRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<'a, E> IntoConst for MatRef<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, E: ComplexField> MatRef<'a, E> {
    /// Creates a view over a column-major slice of length `nrows * ncols`.
    ///
    /// # Panics
    /// Panics if the length of `data` does not match the dimensions.
    #[inline]
    #[track_caller]
    pub fn from_column_major_slice(data: &'a [E], nrows: usize, ncols: usize) -> Self {
        assert!(data.len() == nrows * ncols);
        Self {
            data,
            nrows,
            ncols,
            row_stride: 1,
            col_stride: nrows,
        }
    }

    /// Creates a view over a row-major slice of length `nrows * ncols`.
    ///
    /// # Panics
    /// Panics if the length of `data` does not match the dimensions.
    #[inline]
    #[track_caller]
    pub fn from_row_major_slice(data: &'a [E], nrows: usize, ncols: usize) -> Self {
        Self::from_column_major_slice(data, ncols, nrows).transpose()
    }

    /// Creates a view over a single column vector.
    #[inline]
    pub fn from_col_slice(data: &'a [E]) -> Self {
        Self::from_column_major_slice(data, data.len(), 1)
    }

    /// Creates a view with arbitrary strides.
    ///
    /// # Panics
    /// Panics if the last element is out of bounds of `data`.
    #[inline]
    #[track_caller]
    pub fn from_slice_with_strides(
        data: &'a [E],
        nrows: usize,
        ncols: usize,
        row_stride: usize,
        col_stride: usize,
    ) -> Self {
        assert!(required_len(nrows, ncols, row_stride, col_stride) <= data.len());
        Self {
            data,
            nrows,
            ncols,
            row_stride,
            col_stride,
        }
    }

    /// Returns a view over the matrix.
    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        *self
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

    /// Returns the number of rows and columns of the matrix.
    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
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

    /// Returns a pointer to the first element of the matrix.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.data.as_ptr()
    }

    /// Reads the value of the element at the given indices.
    ///
    /// # Panics
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows, col < self.ncols));
        self.data[offset(row, col, self.row_stride, self.col_stride)]
    }

    /// Returns the transpose of `self`.
    #[inline]
    pub fn transpose(self) -> Self {
        Self {
            data: self.data,
            nrows: self.ncols,
            ncols: self.nrows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    /// Returns the column at index `col` as a contiguous slice, if its elements are stored
    /// contiguously.
    #[inline]
    #[track_caller]
    pub fn try_get_contiguous_col(self, col: usize) -> Option<&'a [E]> {
        assert!(col < self.ncols);
        if self.nrows == 0 {
            return Some(&[]);
        }
        if self.row_stride == 1 || self.nrows == 1 {
            let start = col * self.col_stride;
            Some(&self.data[start..start + self.nrows])
        } else {
            None
        }
    }

    /// Returns a view over the submatrix starting at `(row_start, col_start)` with the given
    /// dimensions.
    #[inline]
    #[track_caller]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(
            row_start <= self.nrows,
            col_start <= self.ncols,
            nrows <= self.nrows - row_start,
            ncols <= self.ncols - col_start,
        ));
        let start = if nrows == 0 || ncols == 0 {
            0
        } else {
            offset(row_start, col_start, self.row_stride, self.col_stride)
        };
        Self {
            data: &self.data[start..],
            nrows,
            ncols,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }

    /// Returns an owned copy of the matrix.
    #[inline]
    pub fn to_owned(&self) -> Mat<E> {
        Mat::from_fn(self.nrows, self.ncols, |i, j| self.read(i, j))
    }

    /// Returns the maximum norm of the elements of the matrix, or zero if it is empty.
    pub fn norm_max(&self) -> E::Real {
        let mut max = <E::Real as ComplexField>::zero();
        for j in 0..self.ncols {
            for i in 0..self.nrows {
                let abs = self.read(i, j).abs();
                if abs > max {
                    max = abs;
                }
            }
        }
        max
    }
}
