use super::*;
use crate::assert;

/// Sparse matrix in column-major format.
///
/// The entries of the matrix are owned, and the structure can be modified with [`Self::set`],
/// [`Self::remove`], [`Self::reshape`] and [`Self::clear`].
#[derive(Clone)]
pub struct SparseColMat<I: Index, E> {
    pub(crate) symbolic: SymbolicSparseColMat<I>,
    pub(crate) values: Vec<E>,
}

impl<I: Index, E: ComplexField> SparseColMat<I, E> {
    /// Creates a new sparse matrix.
    ///
    /// # Panics
    ///
    /// Panics if the length of `values` is not equal to `symbolic.nnz()`.
    #[inline]
    #[track_caller]
    pub fn new(symbolic: SymbolicSparseColMat<I>, values: Vec<E>) -> Self {
        assert!(symbolic.nnz() == values.len());
        Self { symbolic, values }
    }

    /// Returns an `nrows×ncols` matrix with no stored entries.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            symbolic: SymbolicSparseColMat::empty(nrows, ncols),
            values: Vec::new(),
        }
    }

    /// Returns the `n×n` identity matrix, storing exactly its diagonal.
    pub fn identity(n: usize) -> Result<Self, SparseError> {
        Self::from_diagonal(&try_filled(n, E::one())?)
    }

    /// Returns the square diagonal matrix with the given diagonal, storing every diagonal
    /// element, including explicit zeros.
    pub fn from_diagonal(diag: &[E]) -> Result<Self, SparseError> {
        let n = diag.len();
        check_index::<I>(n)?;
        let col_ptrs = try_collect((0..n + 1).map(I::truncate))?;
        let row_indices = try_collect((0..n).map(I::truncate))?;
        let values = try_collect(diag.iter().copied())?;
        Ok(Self {
            symbolic: SymbolicSparseColMat::new_unchecked(n, n, col_ptrs, row_indices, true),
            values,
        })
    }

    /// Creates a new sparse matrix from the entries of `mat` whose magnitude is strictly greater
    /// than `tol`. The output is sorted.
    pub fn from_dense(mat: MatRef<'_, E>, tol: E::Real) -> Result<Self, SparseError> {
        let (m, n) = mat.shape();
        check_index::<I>(m)?;
        check_index::<I>(n)?;
        let mut col_ptrs = try_zeroed::<I>(n + 1)?;
        let mut row_indices = Vec::new();
        let mut values = Vec::new();
        for j in 0..n {
            for i in 0..m {
                let value = mat.read(i, j);
                if value.abs() > tol {
                    row_indices
                        .try_reserve(1)
                        .map_err(|_| SparseError::OutOfMemory)?;
                    values.try_reserve(1).map_err(|_| SparseError::OutOfMemory)?;
                    row_indices.push(I::truncate(i));
                    values.push(value);
                }
            }
            col_ptrs[j + 1] = check_index(row_indices.len())?;
        }
        Ok(Self {
            symbolic: SymbolicSparseColMat::new_unchecked(m, n, col_ptrs, row_indices, true),
            values,
        })
    }

    /// Creates a new sparse matrix from a list of `(row, col, value)` triplets.
    ///
    /// The triplets may be given in any order. Duplicate entries are summed. The output is
    /// sorted.
    pub fn try_new_from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(I, I, E)],
    ) -> Result<Self, CreationError> {
        check_index::<I>(nrows)?;
        check_index::<I>(ncols)?;
        for &(row, col, _) in triplets {
            if row.zx() >= nrows || col.zx() >= ncols {
                return Err(CreationError::OutOfBounds {
                    row: row.zx(),
                    col: col.zx(),
                });
            }
        }

        let mut argsort = try_collect(0..triplets.len())?;
        argsort.sort_unstable_by_key(|&k| (triplets[k].1, triplets[k].0));

        let mut col_ptrs = try_zeroed::<I>(ncols + 1)?;
        let mut row_indices = Vec::new();
        let mut values = Vec::new();
        row_indices
            .try_reserve_exact(triplets.len())
            .map_err(|_| SparseError::OutOfMemory)?;
        values
            .try_reserve_exact(triplets.len())
            .map_err(|_| SparseError::OutOfMemory)?;

        let mut prev: Option<(I, I)> = None;
        for &k in &argsort {
            let (row, col, value) = triplets[k];
            if prev == Some((row, col)) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                row_indices.push(row);
                values.push(value);
                col_ptrs[col.zx() + 1] += I::truncate(1);
            }
            prev = Some((row, col));
        }
        for j in 0..ncols {
            let next = col_ptrs[j] + col_ptrs[j + 1];
            col_ptrs[j + 1] = next;
        }

        Ok(Self {
            symbolic: SymbolicSparseColMat::new_unchecked(
                nrows,
                ncols,
                col_ptrs,
                row_indices,
                true,
            ),
            values,
        })
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

    /// Returns the number of entries that can be stored without reallocating.
    #[inline]
    pub fn nnz_capacity(&self) -> usize {
        Ord::min(self.symbolic.row_ind.capacity(), self.values.capacity())
    }

    /// Returns whether the row indices of each column are known to be strictly increasing.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.symbolic.sorted
    }

    /// Returns a view over `self`.
    #[inline]
    pub fn as_ref(&self) -> SparseColMatRef<'_, I, E> {
        SparseColMatRef {
            symbolic: self.symbolic.as_ref(),
            values: &self.values,
        }
    }

    /// Returns a mutable view over `self`.
    #[inline]
    pub fn as_mut(&mut self) -> SparseColMatMut<'_, I, E> {
        SparseColMatMut {
            symbolic: self.symbolic.as_ref(),
            values: &mut self.values,
        }
    }

    /// Returns the symbolic structure of the matrix.
    #[inline]
    pub fn symbolic(&self) -> SymbolicSparseColMatRef<'_, I> {
        self.symbolic.as_ref()
    }

    /// Decomposes the matrix into the symbolic part and the numerical values.
    #[inline]
    pub fn into_parts(self) -> (SymbolicSparseColMat<I>, Vec<E>) {
        (self.symbolic, self.values)
    }

    /// Returns the numerical values of the matrix.
    #[inline]
    pub fn values(&self) -> &[E] {
        &self.values
    }

    /// Returns the numerical values of the matrix.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [E] {
        &mut self.values
    }

    /// Returns the column pointers.
    #[inline]
    pub fn col_ptrs(&self) -> &[I] {
        &self.symbolic.col_ptr
    }

    /// Returns the row indices.
    #[inline]
    pub fn row_indices(&self) -> &[I] {
        &self.symbolic.row_ind
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
    pub fn row_indices_of_col_raw(&self, j: usize) -> &[I] {
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
    ) -> impl '_ + ExactSizeIterator + DoubleEndedIterator<Item = usize> {
        self.symbolic.row_indices_of_col(j)
    }

    /// Returns the numerical values of column `j` of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn values_of_col(&self, j: usize) -> &[E] {
        &self.values[self.symbolic.col_range(j)]
    }

    /// Returns the numerical values of column `j` of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if `j >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn values_of_col_mut(&mut self, j: usize) -> &mut [E] {
        let range = self.symbolic.col_range(j);
        &mut self.values[range]
    }

    /// Returns whether the entry `(row, col)` is stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn is_assigned(&self, row: usize, col: usize) -> bool {
        self.symbolic.as_ref().is_assigned(row, col)
    }

    /// Returns a reference to the value at the given index, or `None` if the entry is not stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn get(&self, row: usize, col: usize) -> Option<&E> {
        self.as_ref().get(row, col)
    }

    /// Returns a mutable reference to the value at the given index, or `None` if the entry is
    /// not stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut E> {
        self.as_mut().get_mut(row, col)
    }

    /// Returns the value at the given index, or zero if the entry is not stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[inline]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.as_ref().read(row, col)
    }

    /// Writes `value` at the given index, inserting the entry if it is not stored yet.
    ///
    /// Inserting an entry shifts every later entry, so building a matrix this way is quadratic in
    /// the number of entries. Prefer [`Self::try_new_from_triplets`] for bulk construction.
    /// Sortedness is preserved.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[track_caller]
    pub fn set(&mut self, row: usize, col: usize, value: E) -> Result<(), SparseError> {
        assert!(all(row < self.nrows(), col < self.ncols()));
        if let Some(pos) = self.symbolic.as_ref().find(row, col) {
            self.values[pos] = value;
            return Ok(());
        }

        check_index::<I>(self.nnz() + 1)?;
        let range = self.col_range(col);
        let pos = if self.is_sorted() {
            let col_rows = &self.symbolic.row_ind[range.clone()];
            range.start + col_rows.partition_point(|&i| i.zx() < row)
        } else {
            range.end
        };

        self.symbolic
            .row_ind
            .try_reserve(1)
            .map_err(|_| SparseError::OutOfMemory)?;
        self.values
            .try_reserve(1)
            .map_err(|_| SparseError::OutOfMemory)?;
        self.symbolic.row_ind.insert(pos, I::truncate(row));
        self.values.insert(pos, value);
        for ptr in &mut self.symbolic.col_ptr[col + 1..] {
            *ptr += I::truncate(1);
        }
        Ok(())
    }

    /// Removes the entry at the given index from the structure, and returns its value if it was
    /// stored.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
    #[track_caller]
    pub fn remove(&mut self, row: usize, col: usize) -> Option<E> {
        let pos = self.symbolic.as_ref().find(row, col)?;
        self.symbolic.row_ind.remove(pos);
        let value = self.values.remove(pos);
        for ptr in &mut self.symbolic.col_ptr[col + 1..] {
            *ptr = *ptr - I::truncate(1);
        }
        Some(value)
    }

    /// Changes the shape of the matrix to `nrows×ncols`, discarding every stored entry, and
    /// makes room for at least `nnz_capacity` entries. The capacity is never reduced.
    ///
    /// The matrix is flagged as unsorted afterwards.
    pub fn reshape(
        &mut self,
        nrows: usize,
        ncols: usize,
        nnz_capacity: usize,
    ) -> Result<(), SparseError> {
        check_index::<I>(nrows)?;
        check_index::<I>(ncols)?;
        self.symbolic.row_ind.clear();
        self.values.clear();
        self.symbolic
            .row_ind
            .try_reserve(nnz_capacity)
            .map_err(|_| SparseError::OutOfMemory)?;
        self.values
            .try_reserve(nnz_capacity)
            .map_err(|_| SparseError::OutOfMemory)?;
        self.symbolic.col_ptr.clear();
        self.symbolic
            .col_ptr
            .try_reserve(ncols + 1)
            .map_err(|_| SparseError::OutOfMemory)?;
        self.symbolic.col_ptr.resize(ncols + 1, I::truncate(0));
        self.symbolic.nrows = nrows;
        self.symbolic.ncols = ncols;
        self.symbolic.sorted = false;
        Ok(())
    }

    /// Removes every stored entry, keeping the shape and the allocated capacity.
    pub fn clear(&mut self) {
        self.symbolic.row_ind.clear();
        self.values.clear();
        self.symbolic.col_ptr.fill(I::truncate(0));
        self.symbolic.sorted = true;
    }

    /// Releases the unused capacity of the storage.
    pub fn shrink_to_fit(&mut self) {
        self.symbolic.row_ind.shrink_to_fit();
        self.values.shrink_to_fit();
    }

    /// Sorts the row indices of each column, along with their values.
    pub fn sort_indices(&mut self) {
        if self.is_sorted() {
            return;
        }
        utils::sort_indices(
            &self.symbolic.col_ptr,
            &mut self.symbolic.row_ind,
            &mut self.values,
        );
        self.symbolic.sorted = true;
    }

    /// Removes from the structure every entry whose magnitude is less than or equal to `tol`.
    ///
    /// The relative order of the remaining entries is preserved, so is sortedness.
    pub fn remove_zeros(&mut self, tol: E::Real) {
        let ncols = self.ncols();
        let mut write = 0usize;
        let mut start = 0usize;
        for j in 0..ncols {
            let end = self.symbolic.col_ptr[j + 1].zx();
            for read in start..end {
                let value = self.values[read];
                if value.abs() > tol {
                    self.symbolic.row_ind[write] = self.symbolic.row_ind[read];
                    self.values[write] = value;
                    write += 1;
                }
            }
            start = end;
            self.symbolic.col_ptr[j + 1] = I::truncate(write);
        }
        self.symbolic.row_ind.truncate(write);
        self.values.truncate(write);
    }

    /// Copies the current matrix into a newly allocated dense matrix.
    #[inline]
    pub fn to_dense(&self) -> Mat<E> {
        self.as_ref().to_dense()
    }

    /// Returns the transpose of `self` as a newly allocated sorted matrix.
    #[inline]
    pub fn to_transposed(&self) -> Result<Self, SparseError> {
        self.as_ref().to_transposed()
    }

    /// Checks every structural invariant, including the sortedness claim.
    #[inline]
    pub fn check_structure(&self) -> Result<(), StructureError> {
        self.symbolic.check_structure()
    }
}

impl<I: Index, E: ComplexField> core::fmt::Debug for SparseColMat<I, E> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.as_ref(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat};

    fn triplets_are_summed<I: Index>() {
        let t = |i: usize, j: usize, v: f64| (I::truncate(i), I::truncate(j), v);
        let A = SparseColMat::<I, f64>::try_new_from_triplets(
            3,
            3,
            &[t(2, 0, 1.0), t(0, 0, 2.0), t(1, 2, 3.0), t(2, 0, 4.0)],
        )
        .unwrap();
        assert!(A.is_sorted());
        assert!(A.check_structure() == Ok(()));
        assert!(A.nnz() == 3);
        assert!(A.read(2, 0) == 5.0);
        assert!(A.read(0, 0) == 2.0);
        assert!(A.read(1, 1) == 0.0);
        assert!(A.col_range(1) == (2..2));
    }
    monomorphize_test!(triplets_are_summed);

    #[test]
    fn triplet_out_of_bounds() {
        let err = SparseColMat::<usize, f64>::try_new_from_triplets(2, 2, &[(0, 2, 1.0)]);
        assert!(matches!(
            err,
            Err(CreationError::OutOfBounds { row: 0, col: 2 })
        ));
    }

    fn set_and_remove<I: Index>() {
        let mut A = SparseColMat::<I, f64>::zeros(4, 3);
        A.set(3, 1, 1.0).unwrap();
        A.set(0, 1, 2.0).unwrap();
        A.set(2, 2, 3.0).unwrap();
        A.set(3, 1, 4.0).unwrap();
        assert!(A.nnz() == 3);
        assert!(A.is_sorted());
        assert!(A.check_structure() == Ok(()));
        assert!(A.row_indices_of_col(1).collect::<Vec<_>>() == vec![0, 3]);
        assert!(A.read(3, 1) == 4.0);

        assert!(A.remove(0, 1) == Some(2.0));
        assert!(A.remove(0, 1) == None);
        assert!(!A.is_assigned(0, 1));
        assert!(A.nnz() == 2);
        assert!(A.check_structure() == Ok(()));
        assert!(
            A.to_dense()
                == mat![
                    [0.0, 0.0, 0.0],
                    [0.0, 0.0, 0.0],
                    [0.0, 0.0, 3.0],
                    [0.0, 4.0, 0.0],
                ]
        );
    }
    monomorphize_test!(set_and_remove);

    #[test]
    fn reshape_and_clear() {
        let mut A = SparseColMat::<u32, f64>::identity(3).unwrap();
        assert!(A.nnz() == 3);
        A.clear();
        assert!(all(A.nnz() == 0, A.shape() == (3, 3)));
        A.reshape(2, 5, 10).unwrap();
        assert!(all(A.shape() == (2, 5), A.nnz() == 0, A.nnz_capacity() >= 10));
        assert!(!A.is_sorted());
        assert!(A.col_ptrs() == &[0; 6]);
        A.shrink_to_fit();
        assert!(A.check_structure() == Ok(()));
    }

    #[test]
    fn dense_round_trip_drops_small_values() {
        let dense = mat![[1.0, 1e-12, 0.0], [0.0, -2.0, 3.0f64]];
        let A = SparseColMat::<usize, f64>::from_dense(dense.as_ref(), 1e-9).unwrap();
        assert!(A.nnz() == 3);
        assert!(A.read(0, 1) == 0.0);
        assert!(A.read(1, 1) == -2.0);

        let B = SparseColMat::<usize, f64>::from_dense(dense.as_ref(), 0.0).unwrap();
        assert!(B.to_dense() == dense);
    }

    #[test]
    fn remove_zeros_keeps_order() {
        let mut A = SparseColMat::<usize, f64>::try_new_from_triplets(
            3,
            2,
            &[(0, 0, 1.0), (1, 0, 1e-20), (2, 0, 2.0), (1, 1, 0.0)],
        )
        .unwrap();
        A.remove_zeros(1e-15);
        assert!(A.nnz() == 2);
        assert!(A.row_indices() == &[0, 2]);
        assert!(A.col_ptrs() == &[0, 2, 2]);
        assert!(A.check_structure() == Ok(()));
    }

    #[test]
    fn unsorted_structure_is_detected() {
        let col_ptrs = vec![0usize, 2];
        let row_indices = vec![1usize, 0];
        assert!(
            SymbolicSparseColMat::try_new(2, 1, col_ptrs.clone(), row_indices.clone(), true).err()
                == Some(StructureError::UnsortedColumn { col: 0 })
        );
        let mut A = SparseColMat::new(
            SymbolicSparseColMat::new_unsorted_checked(2, 1, col_ptrs, row_indices),
            vec![1.0, 2.0f64],
        );
        assert!(!A.is_sorted());
        assert!(A.read(0, 0) == 2.0);
        A.sort_indices();
        assert!(all(A.is_sorted(), A.row_indices() == &[0, 1], A.values() == &[2.0, 1.0]));

        assert!(
            SymbolicSparseColMat::try_new(2, 1, vec![0usize, 2], vec![1, 1], false).err()
                == Some(StructureError::DuplicateRowIndex { row: 1, col: 0 })
        );
    }

    #[test]
    fn unchecked_structure_is_validated_on_request() {
        // the unchecked constructors trust the caller beyond the column pointer bounds, so a
        // wrong sortedness claim is only reported by `check_structure`
        let col_ptrs = [0usize, 2, 3];
        let row_indices = [2usize, 0, 1, 7];
        let view = SymbolicSparseColMatRef::new_unchecked(3, 2, &col_ptrs, &row_indices, true);
        assert!(view.nnz() == 3);
        assert!(view.row_indices() == &[2, 0, 1]);
        assert!(view.check_structure() == Err(StructureError::UnsortedColumn { col: 0 }));

        let owned = SymbolicSparseColMat::new_unchecked(
            3,
            2,
            col_ptrs.to_vec(),
            row_indices[..3].to_vec(),
            true,
        );
        assert!(owned.check_structure() == Err(StructureError::UnsortedColumn { col: 0 }));
    }
}
