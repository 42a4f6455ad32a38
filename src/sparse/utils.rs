use super::*;
use crate::{assert, debug_assert};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

/// Checks the structural invariants of a compressed sparse column matrix.
///
/// `row_indices` must contain exactly the stored row indices, i.e. its length must be equal to
/// `col_ptrs[ncols]`. If `sorted` is `true`, the row indices of each column must also be strictly
/// increasing.
pub fn check_structure<I: Index>(
    nrows: usize,
    ncols: usize,
    col_ptrs: &[I],
    row_indices: &[I],
    sorted: bool,
) -> Result<(), StructureError> {
    if col_ptrs.len() != ncols + 1 {
        return Err(StructureError::ColPtrLength {
            expected: ncols + 1,
            found: col_ptrs.len(),
        });
    }
    if col_ptrs[0].zx() != 0 {
        return Err(StructureError::NonZeroFirstColPtr);
    }
    for (j, [c, c_next]) in windows2(col_ptrs).enumerate() {
        if c_next < c {
            return Err(StructureError::DecreasingColPtr { col: j });
        }
    }
    if col_ptrs[ncols].zx() != row_indices.len() {
        return Err(StructureError::NnzMismatch {
            col_ptr_end: col_ptrs[ncols].zx(),
            nnz: row_indices.len(),
        });
    }

    // last column that contained each row, for duplicate detection in unsorted columns
    let mut marker = if sorted {
        Vec::new()
    } else {
        vec![usize::MAX; nrows]
    };

    for j in 0..ncols {
        let col = &row_indices[col_ptrs[j].zx()..col_ptrs[j + 1].zx()];
        let mut prev: Option<usize> = None;
        for &i in col {
            let i = i.zx();
            if i >= nrows {
                return Err(StructureError::RowIndexOutOfBounds { row: i, col: j });
            }
            if sorted {
                if let Some(prev) = prev {
                    if i == prev {
                        return Err(StructureError::DuplicateRowIndex { row: i, col: j });
                    }
                    if i < prev {
                        return Err(StructureError::UnsortedColumn { col: j });
                    }
                }
                prev = Some(i);
            } else {
                if marker[i] == j {
                    return Err(StructureError::DuplicateRowIndex { row: i, col: j });
                }
                marker[i] = j;
            }
        }
    }
    Ok(())
}

/// Sorts the row indices of each column in increasing order, permuting the values alongside.
///
/// Uses an insertion sort per column, which is efficient for the short columns that are typical
/// of sparse matrices.
pub fn sort_indices<I: Index, E: ComplexField>(
    col_ptrs: &[I],
    row_indices: &mut [I],
    values: &mut [E],
) {
    assert!(all(
        !col_ptrs.is_empty(),
        row_indices.len() >= col_ptrs[col_ptrs.len() - 1].zx(),
        values.len() >= col_ptrs[col_ptrs.len() - 1].zx(),
    ));
    for [start, end] in windows2(col_ptrs) {
        let rows = &mut row_indices[start.zx()..end.zx()];
        let vals = &mut values[start.zx()..end.zx()];
        for k in 1..rows.len() {
            let row = rows[k];
            let val = vals[k];
            let mut pos = k;
            while pos > 0 && rows[pos - 1] > row {
                rows[pos] = rows[pos - 1];
                vals[pos] = vals[pos - 1];
                pos -= 1;
            }
            rows[pos] = row;
            vals[pos] = val;
        }
    }
}

/// Computes the size and alignment of required workspace for transposing a matrix with `nrows`
/// rows.
#[inline]
pub fn transpose_req<I: Index>(nrows: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<I>(nrows)
}

/// Computes the transpose of the matrix `A` and returns a view over it.
///
/// The result is stored in `new_col_ptrs`, `new_row_indices` and `new_values`.
///
/// # Note
/// Allows unsorted matrices, producing a sorted output.
///
/// # Panics
///
/// Panics if `new_col_ptrs.len() != A.nrows() + 1`, or if `new_row_indices` or `new_values` is
/// shorter than `A.nnz()`.
#[track_caller]
pub fn transpose<'a, I: Index, E: ComplexField>(
    new_col_ptrs: &'a mut [I],
    new_row_indices: &'a mut [I],
    new_values: &'a mut [E],
    A: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> SparseColMatMut<'a, I, E> {
    transpose_impl(new_col_ptrs, new_row_indices, new_values, A, false, stack)
}

/// Computes the adjoint (conjugate transpose) of the matrix `A` and returns a view over it.
///
/// The result is stored in `new_col_ptrs`, `new_row_indices` and `new_values`.
///
/// # Note
/// Allows unsorted matrices, producing a sorted output.
///
/// # Panics
///
/// See [`transpose`].
#[track_caller]
pub fn adjoint<'a, I: Index, E: ComplexField>(
    new_col_ptrs: &'a mut [I],
    new_row_indices: &'a mut [I],
    new_values: &'a mut [E],
    A: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> SparseColMatMut<'a, I, E> {
    transpose_impl(new_col_ptrs, new_row_indices, new_values, A, true, stack)
}

#[track_caller]
fn transpose_impl<'a, I: Index, E: ComplexField>(
    new_col_ptrs: &'a mut [I],
    new_row_indices: &'a mut [I],
    new_values: &'a mut [E],
    A: SparseColMatRef<'_, I, E>,
    conj: bool,
    stack: PodStack<'_>,
) -> SparseColMatMut<'a, I, E> {
    let m = A.nrows();
    let n = A.ncols();
    let nnz = A.nnz();
    assert!(all(
        new_col_ptrs.len() == m + 1,
        new_row_indices.len() >= nnz,
        new_values.len() >= nnz,
    ));

    let (col_count, _) = stack.make_raw::<I>(m);
    col_count.fill(I::truncate(0));

    // can't overflow because the total count is A.nnz() < I::MAX
    for j in 0..n {
        for i in A.row_indices_of_col(j) {
            col_count[i] += I::truncate(1);
        }
    }

    new_col_ptrs[0] = I::truncate(0);
    for i in 0..m {
        let pi = new_col_ptrs[i];
        new_col_ptrs[i + 1] = pi + col_count[i];
        col_count[i] = pi;
    }

    let new_row_indices = &mut new_row_indices[..nnz];
    let new_values = &mut new_values[..nnz];
    let current_row_position = &mut *col_count;
    for j in 0..n {
        let j_ = I::truncate(j);
        for (i, &val) in zip(A.row_indices_of_col(j), A.values_of_col(j)) {
            let ci = &mut current_row_position[i];
            new_row_indices[ci.zx()] = j_;
            new_values[ci.zx()] = if conj { val.conj() } else { val };
            *ci += I::truncate(1);
        }
    }
    debug_assert!(&*current_row_position == &new_col_ptrs[1..]);

    SparseColMatMut::new(
        SymbolicSparseColMatRef::new_unchecked(n, m, new_col_ptrs, new_row_indices, true),
        new_values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64};
    use dyn_stack::GlobalPodBuffer;
    use rand::{rngs::StdRng, SeedableRng};

    fn transpose_is_sorted<I: Index>() {
        let mut rng = StdRng::seed_from_u64(0);
        let A = test_utils::random_sparse::<I>(&mut rng, 7, 5, 0.4);
        let A = test_utils::shuffle_columns(&mut rng, A.as_ref());
        assert!(!A.is_sorted());

        let At = A.to_transposed().unwrap();
        test_utils::assert_valid(At.as_ref());
        assert!(all(At.is_sorted(), At.shape() == (5, 7)));
        assert!(At.to_dense() == A.to_dense().transpose());

        let Att = At.to_transposed().unwrap();
        assert!(Att.to_dense() == A.to_dense());
    }
    monomorphize_test!(transpose_is_sorted);

    #[test]
    fn adjoint_conjugates() {
        let A = SparseColMat::<usize, c64>::try_new_from_triplets(
            2,
            3,
            &[(0, 2, c64::new(1.0, 2.0)), (1, 0, c64::new(-3.0, 0.5))],
        )
        .unwrap();
        let mut col_ptrs = vec![0usize; 3];
        let mut row_indices = vec![0usize; 2];
        let mut values = vec![c64::new(0.0, 0.0); 2];
        let mut mem = GlobalPodBuffer::new(transpose_req::<usize>(2).unwrap());
        let Ah = adjoint(
            &mut col_ptrs,
            &mut row_indices,
            &mut values,
            A.as_ref(),
            PodStack::new(&mut mem),
        );
        assert!(Ah.shape() == (3, 2));
        assert!(Ah.as_ref().read(2, 0) == c64::new(1.0, -2.0));
        assert!(Ah.as_ref().read(0, 1) == c64::new(-3.0, -0.5));
    }

    #[test]
    fn sort_indices_permutes_values() {
        let col_ptrs = [0u32, 3, 3, 5];
        let mut row_indices = [2u32, 0, 1, 4, 3];
        let mut values = [2.0, 0.0, 1.0, 4.0, 3.0f64];
        sort_indices(&col_ptrs, &mut row_indices, &mut values);
        assert!(row_indices == [0, 1, 2, 3, 4]);
        assert!(values == [0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(check_structure(5, 3, &col_ptrs, &row_indices, true) == Ok(()));
    }

    #[test]
    fn structure_errors() {
        assert!(
            check_structure::<usize>(2, 2, &[0, 1], &[0], true)
                == Err(StructureError::ColPtrLength { expected: 3, found: 2 })
        );
        assert!(
            check_structure::<usize>(2, 1, &[1, 1], &[0], true)
                == Err(StructureError::NonZeroFirstColPtr)
        );
        assert!(
            check_structure::<usize>(2, 2, &[0, 2, 1], &[0, 1], true)
                == Err(StructureError::DecreasingColPtr { col: 1 })
        );
        assert!(
            check_structure::<usize>(2, 1, &[0, 1], &[0, 1], true)
                == Err(StructureError::NnzMismatch { col_ptr_end: 1, nnz: 2 })
        );
        assert!(
            check_structure::<usize>(2, 1, &[0, 1], &[2], false)
                == Err(StructureError::RowIndexOutOfBounds { row: 2, col: 0 })
        );
        assert!(
            check_structure::<usize>(3, 2, &[0, 1, 3], &[0, 2, 0], false) == Ok(())
        );
        assert!(
            check_structure::<usize>(3, 2, &[0, 1, 3], &[0, 2, 0], true)
                == Err(StructureError::UnsortedColumn { col: 1 })
        );
    }
}
