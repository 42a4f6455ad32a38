use super::*;
use crate::assert;

/// Heap allocated resizable matrix, stored in column-major order.
#[derive(Clone)]
pub struct Mat<E> {
    data: Vec<E>,
    nrows: usize,
    ncols: usize,
}

impl<E: ComplexField> Default for Mat<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ComplexField> Mat<E> {
    /// Returns an empty matrix of dimension `0×0`.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            nrows: 0,
            ncols: 0,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with the provided function.
    pub fn from_fn(nrows: usize, ncols: usize, f: impl FnMut(usize, usize) -> E) -> Self {
        let mut f = f;
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![E::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros, except the main
    /// diagonal which is filled with ones.
    #[inline]
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        let mut out = Self::zeros(nrows, ncols);
        for i in 0..Ord::min(nrows, ncols) {
            out.write(i, i, E::one());
        }
        out
    }

    /// Returns a new column vector containing the elements of `values`.
    #[inline]
    pub fn from_col(values: &[E]) -> Self {
        Self {
            data: values.to_vec(),
            nrows: values.len(),
            ncols: 1,
        }
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

    /// Returns a view over the matrix.
    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        MatRef {
            data: &self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            row_stride: 1,
            col_stride: self.nrows,
        }
    }

    /// Returns a mutable view over the matrix.
    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, E> {
        MatMut {
            data: &mut self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            row_stride: 1,
            col_stride: self.nrows,
        }
    }

    /// Reads the value of the element at the given indices.
    ///
    /// # Panics
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows, col < self.ncols));
        self.data[row + col * self.nrows]
    }

    /// Writes the value to the element at the given indices.
    ///
    /// # Panics
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows, col < self.ncols));
        self.data[row + col * self.nrows] = value;
    }

    /// Returns the column at index `col` as a slice.
    #[inline]
    #[track_caller]
    pub fn col_as_slice(&self, col: usize) -> &[E] {
        assert!(col < self.ncols);
        &self.data[col * self.nrows..(col + 1) * self.nrows]
    }

    /// Returns the column at index `col` as a mutable slice.
    #[inline]
    #[track_caller]
    pub fn col_as_slice_mut(&mut self, col: usize) -> &mut [E] {
        assert!(col < self.ncols);
        &mut self.data[col * self.nrows..(col + 1) * self.nrows]
    }

    /// Returns the transpose of `self` as a new matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        self.as_ref().transpose().to_owned()
    }

    /// Returns the maximum norm of the elements of the matrix, or zero if it is empty.
    #[inline]
    pub fn norm_max(&self) -> E::Real {
        self.as_ref().norm_max()
    }
}

impl<E: ComplexField> core::ops::Index<(usize, usize)> for Mat<E> {
    type Output = E;

    #[inline]
    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &E {
        assert!(all(row < self.nrows, col < self.ncols));
        &self.data[row + col * self.nrows]
    }
}

impl<E: ComplexField> core::ops::IndexMut<(usize, usize)> for Mat<E> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut E {
        assert!(all(row < self.nrows, col < self.ncols));
        &mut self.data[row + col * self.nrows]
    }
}
