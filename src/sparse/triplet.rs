use super::*;
use crate::assert;

/// Sparse matrix stored as an unordered list of `(row, col, value)` entries.
///
/// The same index may appear more than once, in which case the values are summed when converting
/// to another format.
#[derive(Clone, Debug)]
pub struct TripletMat<I: Index, E> {
    nrows: usize,
    ncols: usize,
    entries: Vec<(I, I, E)>,
}

impl<I: Index, E: ComplexField> TripletMat<I, E> {
    /// Returns an empty `nrows×ncols` matrix.
    #[inline]
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            entries: Vec::new(),
        }
    }

    /// Returns an empty `nrows×ncols` matrix with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(nrows: usize, ncols: usize, capacity: usize) -> Self {
        Self {
            nrows,
            ncols,
            entries: Vec::with_capacity(capacity),
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

    /// Returns the number of stored entries, counting duplicates.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Returns the stored entries.
    #[inline]
    pub fn entries(&self) -> &[(I, I, E)] {
        &self.entries
    }

    /// Appends an entry without checking whether the index is already present.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn push(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows, col < self.ncols));
        self.entries.push((I::truncate(row), I::truncate(col), value));
    }

    /// Overwrites the first entry at the given index, or appends a new one.
    ///
    /// This performs a linear search.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[track_caller]
    pub fn set(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows, col < self.ncols));
        let (row, col) = (I::truncate(row), I::truncate(col));
        match self
            .entries
            .iter_mut()
            .find(|(i, j, _)| (*i, *j) == (row, col))
        {
            Some(entry) => entry.2 = value,
            None => self.entries.push((row, col, value)),
        }
    }

    /// Returns the sum of the entries at the given index, or zero if there are none.
    ///
    /// This performs a linear search.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows, col < self.ncols));
        let (row, col) = (I::truncate(row), I::truncate(col));
        let mut sum = E::zero();
        for &(i, j, v) in &self.entries {
            if (i, j) == (row, col) {
                sum += v;
            }
        }
        sum
    }

    /// Changes the shape of the matrix, discarding every entry.
    #[inline]
    pub fn reshape(&mut self, nrows: usize, ncols: usize) {
        self.nrows = nrows;
        self.ncols = ncols;
        self.entries.clear();
    }

    /// Removes every entry, keeping the shape.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Converts the matrix to column-major format, summing duplicates. The output is sorted.
    #[inline]
    pub fn to_col_major(&self) -> Result<SparseColMat<I, E>, CreationError> {
        SparseColMat::try_new_from_triplets(self.nrows, self.ncols, &self.entries)
    }

    /// Creates a triplet matrix holding the stored entries of `mat`, in column-major order.
    pub fn from_col_major(mat: SparseColMatRef<'_, I, E>) -> Result<Self, SparseError> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(mat.nnz())
            .map_err(|_| SparseError::OutOfMemory)?;
        for j in 0..mat.ncols() {
            let j_ = I::truncate(j);
            for (&i, &v) in zip(mat.row_indices_of_col_raw(j), mat.values_of_col(j)) {
                entries.push((i, j_, v));
            }
        }
        Ok(Self {
            nrows: mat.nrows(),
            ncols: mat.ncols(),
            entries,
        })
    }

    /// Copies the matrix into a newly allocated dense matrix, summing duplicates.
    pub fn to_dense(&self) -> Mat<E> {
        let mut mat = Mat::zeros(self.nrows, self.ncols);
        for &(i, j, v) in &self.entries {
            mat[(i.zx(), j.zx())] += v;
        }
        mat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat};

    fn round_trip<I: Index>() {
        let mut T = TripletMat::<I, f64>::new(3, 4);
        T.push(2, 3, 1.0);
        T.push(0, 0, 2.0);
        T.push(2, 3, 0.5);
        T.set(1, 2, 7.0);
        T.set(1, 2, 8.0);
        assert!(all(T.nnz() == 4, T.read(2, 3) == 1.5, T.read(1, 2) == 8.0));

        let A = T.to_col_major().unwrap();
        assert!(all(A.is_sorted(), A.nnz() == 3));
        assert!(A.check_structure() == Ok(()));
        assert!(A.to_dense() == T.to_dense());

        let back = TripletMat::from_col_major(A.as_ref()).unwrap();
        assert!(back.nnz() == 3);
        assert!(
            back.to_dense()
                == mat![
                    [2.0, 0.0, 0.0, 0.0],
                    [0.0, 0.0, 8.0, 0.0],
                    [0.0, 0.0, 0.0, 1.5],
                ]
        );

        T.reshape(1, 1);
        assert!(all(T.nnz() == 0, T.nrows() == 1));
    }
    monomorphize_test!(round_trip);
}
