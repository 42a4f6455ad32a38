//! A permutation `p` maps old indices to new ones: row `i` of the input becomes row `p[i]` of the
//! output.

use super::*;
use crate::{
    assert, debug_assert,
    perm::{Perm, PermRef},
    Side,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

/// Computes `B = P × A`, i.e. `B[p[i], j] = A[i, j]`.
///
/// # Note
/// Produces an unsorted output.
///
/// # Panics
///
/// Panics if `perm.len() != A.nrows()`.
#[track_caller]
pub fn permute_rows<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    perm: PermRef<'_, I>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(perm.len() == A.nrows());
    let fwd = perm.arrays().0;
    let col_ptrs = try_collect(A.col_ptrs().iter().copied())?;
    let row_indices = try_collect(A.row_indices().iter().map(|&i| fwd[i.zx()]))?;
    let values = try_collect(A.values().iter().copied())?;
    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(A.nrows(), A.ncols(), col_ptrs, row_indices, false),
        values,
    ))
}

/// Computes `B = P⁻¹ × A`, i.e. `B[i, j] = A[p[i], j]`.
///
/// # Note
/// Produces an unsorted output.
///
/// # Panics
///
/// Panics if `perm.len() != A.nrows()`.
#[track_caller]
pub fn permute_rows_inverse<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    perm: PermRef<'_, I>,
) -> Result<SparseColMat<I, E>, SparseError> {
    permute_rows(A, perm.inverse())
}

/// Computes `B = A × Pᵀ`, i.e. `B[i, p[j]] = A[i, j]`.
///
/// # Note
/// Preserves sortedness.
///
/// # Panics
///
/// Panics if `perm.len() != A.ncols()`.
#[track_caller]
pub fn permute_cols<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    perm: PermRef<'_, I>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(perm.len() == A.ncols());
    let n = A.ncols();
    let inv = perm.arrays().1;
    let nnz = A.nnz();

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut values = try_filled(nnz, E::zero())?;

    let mut pos = 0usize;
    for new_j in 0..n {
        let old_j = inv[new_j].zx();
        let range = A.col_range(old_j);
        let len = range.len();
        row_indices[pos..pos + len].copy_from_slice(&A.row_indices()[range.clone()]);
        values[pos..pos + len].copy_from_slice(&A.values()[range]);
        pos += len;
        col_ptrs[new_j + 1] = I::truncate(pos);
    }
    debug_assert!(pos == nnz);

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(
            A.nrows(),
            n,
            col_ptrs,
            row_indices,
            A.is_sorted(),
        ),
        values,
    ))
}

/// Computes `B = P × A × Qᵀ`, i.e. `B[p[i], q[j]] = A[i, j]`.
///
/// The rows are permuted first, then the columns are copied into their new positions.
///
/// # Note
/// Produces an unsorted output.
///
/// # Panics
///
/// Panics if `row_perm.len() != A.nrows()` or `col_perm.len() != A.ncols()`.
#[track_caller]
pub fn permute<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    row_perm: PermRef<'_, I>,
    col_perm: PermRef<'_, I>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(row_perm.len() == A.nrows(), col_perm.len() == A.ncols()));
    let rows_permuted = permute_rows(A, row_perm)?;
    permute_cols(rows_permuted.as_ref(), col_perm)
}

/// Computes the size and alignment of the workspace required to symmetrically permute a matrix
/// of dimension `n`.
#[inline]
pub fn permute_symmetric_req<I: Index>(n: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<I>(n)
}

#[inline(always)]
fn in_triangle(side: Side, i: usize, j: usize) -> bool {
    match side {
        Side::Lower => i >= j,
        Side::Upper => i <= j,
    }
}

/// Computes the full symmetric matrix `B = P × A × Pᵀ`, i.e. `B[p[i], p[j]] = A[i, j]`, where `A`
/// is symmetric and only its triangular half given by `side` is read.
///
/// Both halves of `B` are written.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `A` is not square, or if `perm.len() != A.nrows()`.
#[track_caller]
pub fn permute_symmetric<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    perm: PermRef<'_, I>,
    side: Side,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(A.nrows() == A.ncols(), perm.len() == A.nrows()));
    let n = A.nrows();
    let fwd = perm.arrays().0;

    let (current, _) = stack.make_raw::<I>(n);
    current.fill(I::truncate(0));

    let mut nnz = 0usize;
    for j in 0..n {
        for i in A.row_indices_of_col(j) {
            if in_triangle(side, i, j) {
                current[fwd[j].zx()] += I::truncate(1);
                nnz += 1;
                if i != j {
                    current[fwd[i].zx()] += I::truncate(1);
                    nnz += 1;
                }
            }
        }
    }
    check_index::<I>(nnz)?;

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    for k in 0..n {
        col_ptrs[k + 1] = col_ptrs[k] + current[k];
        current[k] = col_ptrs[k];
    }

    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut values = try_filled(nnz, E::zero())?;
    for j in 0..n {
        let new_j = fwd[j];
        for (i, &value) in zip(A.row_indices_of_col(j), A.values_of_col(j)) {
            if in_triangle(side, i, j) {
                let new_i = fwd[i];

                let pos = &mut current[new_j.zx()];
                row_indices[pos.zx()] = new_i;
                values[pos.zx()] = value;
                *pos += I::truncate(1);

                if i != j {
                    let pos = &mut current[new_i.zx()];
                    row_indices[pos.zx()] = new_j;
                    values[pos.zx()] = value;
                    *pos += I::truncate(1);
                }
            }
        }
    }
    debug_assert!(&*current == &col_ptrs[1..]);

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(n, n, col_ptrs, row_indices, false),
        values,
    ))
}

/// Computes the triangular half `out_side` of `B = P × A × Pᵀ`, where `A` is symmetric and only
/// its triangular half given by `in_side` is read.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `A` is not square, or if `perm.len() != A.nrows()`.
#[track_caller]
pub fn permute_symmetric_triangle<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    perm: PermRef<'_, I>,
    in_side: Side,
    out_side: Side,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(A.nrows() == A.ncols(), perm.len() == A.nrows()));
    let n = A.nrows();
    let fwd = perm.arrays().0;

    // column of the output that the entry (new_i, new_j) lands in
    let target_col = |new_i: usize, new_j: usize| match out_side {
        Side::Lower => Ord::min(new_i, new_j),
        Side::Upper => Ord::max(new_i, new_j),
    };

    let (current, _) = stack.make_raw::<I>(n);
    current.fill(I::truncate(0));

    let mut nnz = 0usize;
    for j in 0..n {
        for i in A.row_indices_of_col(j) {
            if in_triangle(in_side, i, j) {
                current[target_col(fwd[i].zx(), fwd[j].zx())] += I::truncate(1);
                nnz += 1;
            }
        }
    }
    check_index::<I>(nnz)?;

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    for k in 0..n {
        col_ptrs[k + 1] = col_ptrs[k] + current[k];
        current[k] = col_ptrs[k];
    }

    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut values = try_filled(nnz, E::zero())?;
    for j in 0..n {
        for (i, &value) in zip(A.row_indices_of_col(j), A.values_of_col(j)) {
            if in_triangle(in_side, i, j) {
                let (new_i, new_j) = (fwd[i].zx(), fwd[j].zx());
                let col = target_col(new_i, new_j);
                let row = new_i + new_j - col;
                let pos = &mut current[col];
                row_indices[pos.zx()] = I::truncate(row);
                values[pos.zx()] = value;
                *pos += I::truncate(1);
            }
        }
    }
    debug_assert!(&*current == &col_ptrs[1..]);

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(n, n, col_ptrs, row_indices, false),
        values,
    ))
}

/// Returns the permutation matrix `P` such that `P × A == permute_rows(A, perm)`.
///
/// Column `i` of `P` holds a single one at row `perm[i]`.
pub fn permutation_matrix<I: Index, E: ComplexField>(
    perm: PermRef<'_, I>,
) -> Result<SparseColMat<I, E>, SparseError> {
    let n = perm.len();
    let col_ptrs = try_collect((0..n + 1).map(I::truncate))?;
    let row_indices = try_collect(perm.arrays().0.iter().copied())?;
    let values = try_filled(n, E::one())?;
    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(n, n, col_ptrs, row_indices, true),
        values,
    ))
}

/// Recovers the permutation `perm` from a permutation matrix built by [`permutation_matrix`].
///
/// Returns `None` if `P` is not square, if a column does not hold exactly one entry equal to one,
/// or if a row holds more than one entry.
pub fn permutation_vector<I: Index, E: ComplexField>(
    P: SparseColMatRef<'_, I, E>,
) -> Option<Perm<I>> {
    let n = P.ncols();
    if P.nrows() != n {
        return None;
    }
    let mut forward = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    for j in 0..n {
        let rows = P.row_indices_of_col_raw(j);
        let values = P.values_of_col(j);
        if rows.len() != 1 || values[0] != E::one() || seen[rows[0].zx()] {
            return None;
        }
        seen[rows[0].zx()] = true;
        forward.push(rows[0]);
    }
    Some(Perm::from_forward(forward))
}
