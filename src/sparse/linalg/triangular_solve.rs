//! Triangular solves where the triangular factor is sparse.
//!
//! The dense right-hand side solves work in place. The sparse right-hand side solve computes the
//! nonzero pattern of the solution ahead of time with a depth-first search over the graph of the
//! factor, so its cost is proportional to the number of floating point operations rather than
//! to the dimension of the matrix.

use super::*;
use crate::{assert, MatMut, Side};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

/// Whether the diagonal of a triangular matrix is implicitly equal to one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diag {
    /// The diagonal is assumed to be one. Stored diagonal entries are ignored.
    Unit,
    /// The diagonal is read from the matrix. A missing diagonal entry is treated as zero.
    NonUnit,
}

/// Returns the inverse of the diagonal element of column `j`.
///
/// For sorted matrices the diagonal is the first stored element of the column for lower
/// triangular matrices, and the last one for upper triangular matrices.
#[inline]
fn inv_diag<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    j: usize,
    side: Side,
    diag: Diag,
) -> E {
    if diag == Diag::Unit {
        return E::one();
    }
    let rows = mat.row_indices_of_col_raw(j);
    let values = mat.values_of_col(j);
    let pos = if mat.is_sorted() {
        let candidate = match side {
            Side::Lower => 0,
            Side::Upper => rows.len().wrapping_sub(1),
        };
        rows.get(candidate)
            .filter(|&&i| i.zx() == j)
            .map(|_| candidate)
    } else {
        rows.iter().position(|&i| i.zx() == j)
    };
    match pos {
        Some(pos) => values[pos].inv(),
        None => E::zero().inv(),
    }
}

#[inline]
#[track_caller]
fn check_shapes<I: Index, E: ComplexField>(
    tri: SparseColMatRef<'_, I, E>,
    diag: Diag,
    rhs: &MatMut<'_, E>,
) {
    assert!(all(tri.nrows() == tri.ncols(), rhs.nrows() == tri.nrows()));

    #[cfg(feature = "perf-warn")]
    if diag == Diag::NonUnit && !tri.is_sorted() && crate::__perf_warn!(TRIANGULAR_SOLVE_WARN) {
        log::warn!(target: "colsparse_perf", "triangular solve with an unsorted factor scans each column for its diagonal element. Consider sorting the factor first.");
    }
    #[cfg(not(feature = "perf-warn"))]
    let _ = diag;
}

/// Assuming `L` is a lower triangular matrix, solves the equation `L × X = rhs`, and stores the
/// result in `rhs`.
///
/// # Note
/// Allows unsorted matrices. Entries above the diagonal must not be stored.
///
/// # Panics
///
/// Panics if `L` is not square, or if `rhs.nrows() != L.nrows()`.
#[track_caller]
pub fn solve_lower_triangular_in_place<I: Index, E: ComplexField>(
    L: SparseColMatRef<'_, I, E>,
    diag: Diag,
    rhs: MatMut<'_, E>,
) {
    check_shapes(L, diag, &rhs);
    let mut x = rhs;
    for j in 0..L.ncols() {
        let d = inv_diag(L, j, Side::Lower, diag);
        for k in 0..x.ncols() {
            let xj = x.read(j, k) * d;
            x.write(j, k, xj);
            for (i, &lij) in zip(L.row_indices_of_col(j), L.values_of_col(j)) {
                if i != j {
                    x.write(i, k, x.read(i, k) - lij * xj);
                }
            }
        }
    }
}

/// Assuming `L` is a lower triangular matrix, solves the equation `L.transpose() × X = rhs`, and
/// stores the result in `rhs`.
///
/// # Note
/// Allows unsorted matrices. Entries above the diagonal must not be stored.
///
/// # Panics
///
/// Panics if `L` is not square, or if `rhs.nrows() != L.nrows()`.
#[track_caller]
pub fn solve_lower_triangular_transpose_in_place<I: Index, E: ComplexField>(
    L: SparseColMatRef<'_, I, E>,
    diag: Diag,
    rhs: MatMut<'_, E>,
) {
    check_shapes(L, diag, &rhs);
    let mut x = rhs;
    for j in (0..L.ncols()).rev() {
        let d = inv_diag(L, j, Side::Lower, diag);
        for k in 0..x.ncols() {
            let mut acc = x.read(j, k);
            for (i, &lij) in zip(L.row_indices_of_col(j), L.values_of_col(j)) {
                if i != j {
                    acc -= lij * x.read(i, k);
                }
            }
            x.write(j, k, acc * d);
        }
    }
}

/// Assuming `U` is an upper triangular matrix, solves the equation `U × X = rhs`, and stores the
/// result in `rhs`.
///
/// # Note
/// Allows unsorted matrices. Entries below the diagonal must not be stored.
///
/// # Panics
///
/// Panics if `U` is not square, or if `rhs.nrows() != U.nrows()`.
#[track_caller]
pub fn solve_upper_triangular_in_place<I: Index, E: ComplexField>(
    U: SparseColMatRef<'_, I, E>,
    diag: Diag,
    rhs: MatMut<'_, E>,
) {
    check_shapes(U, diag, &rhs);
    let mut x = rhs;
    for j in (0..U.ncols()).rev() {
        let d = inv_diag(U, j, Side::Upper, diag);
        for k in 0..x.ncols() {
            let xj = x.read(j, k) * d;
            x.write(j, k, xj);
            for (i, &uij) in zip(U.row_indices_of_col(j), U.values_of_col(j)) {
                if i != j {
                    x.write(i, k, x.read(i, k) - uij * xj);
                }
            }
        }
    }
}

/// Assuming `U` is an upper triangular matrix, solves the equation `U.transpose() × X = rhs`, and
/// stores the result in `rhs`.
///
/// # Note
/// Allows unsorted matrices. Entries below the diagonal must not be stored.
///
/// # Panics
///
/// Panics if `U` is not square, or if `rhs.nrows() != U.nrows()`.
#[track_caller]
pub fn solve_upper_triangular_transpose_in_place<I: Index, E: ComplexField>(
    U: SparseColMatRef<'_, I, E>,
    diag: Diag,
    rhs: MatMut<'_, E>,
) {
    check_shapes(U, diag, &rhs);
    let mut x = rhs;
    for j in 0..U.ncols() {
        let d = inv_diag(U, j, Side::Upper, diag);
        for k in 0..x.ncols() {
            let mut acc = x.read(j, k);
            for (i, &uij) in zip(U.row_indices_of_col(j), U.values_of_col(j)) {
                if i != j {
                    acc -= uij * x.read(i, k);
                }
            }
            x.write(j, k, acc * d);
        }
    }
}

/// Computes the size and alignment of the workspace required to solve a triangular system of
/// dimension `n` with a sparse right-hand side.
pub fn solve_sparse_rhs_req<I: Index, E: ComplexField>(n: usize) -> Result<StackReq, SizeOverflow> {
    let idx = StackReq::try_new::<I>(n)?;
    StackReq::try_all_of([idx, idx, idx, idx, StackReq::try_new::<E>(n)?])
}

/// Computes the set of columns of `G` reachable from `rhs_rows`, and stores it in
/// `xi[top..]` in topological order, returning `top`.
///
/// Nodes are marked by writing `stamp` into `marks`.
fn reach<I: Index>(
    G: SymbolicSparseColMatRef<'_, I>,
    rhs_rows: &[I],
    stamp: I,
    marks: &mut [I],
    dfs_stack: &mut [I],
    pos_stack: &mut [I],
    xi: &mut [I],
) -> usize {
    let row_ind = G.row_indices();
    let mut top = G.ncols();

    for &start in rhs_rows {
        if marks[start.zx()] == stamp {
            continue;
        }

        let mut len = 1usize;
        dfs_stack[0] = start;
        while len > 0 {
            let j = dfs_stack[len - 1].zx();
            let range = G.col_range(j);
            if marks[j] != stamp {
                marks[j] = stamp;
                pos_stack[len - 1] = I::truncate(range.start);
            }

            let mut p = pos_stack[len - 1].zx();
            let mut child = None;
            while p < range.end {
                let i = row_ind[p].zx();
                p += 1;
                if marks[i] != stamp {
                    child = Some(i);
                    break;
                }
            }
            pos_stack[len - 1] = I::truncate(p);

            match child {
                Some(i) => {
                    dfs_stack[len] = I::truncate(i);
                    len += 1;
                }
                None => {
                    len -= 1;
                    top -= 1;
                    xi[top] = I::truncate(j);
                }
            }
        }
    }
    top
}

/// Assuming `G` is a triangular matrix (either lower or upper), solves the equation `G × X = B`
/// where `B` is sparse, and returns `X`.
///
/// The nonzero pattern of each column of `X` is the set of nodes reachable from the pattern of
/// the corresponding column of `B` in the graph of `G`.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `G` is not square, or if `B.nrows() != G.nrows()`.
#[track_caller]
pub fn solve_sparse_rhs<I: Index, E: ComplexField>(
    G: SparseColMatRef<'_, I, E>,
    diag: Diag,
    B: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(G.nrows() == G.ncols(), B.nrows() == G.nrows()));
    let n = G.nrows();

    let (marks, stack) = stack.make_raw::<I>(n);
    let (dfs_stack, stack) = stack.make_raw::<I>(n);
    let (pos_stack, stack) = stack.make_raw::<I>(n);
    let (xi, stack) = stack.make_raw::<I>(n);
    let (x, _) = stack.make_raw::<E>(n);
    mem::fill_none(marks);

    let mut col_ptrs = try_zeroed::<I>(B.ncols() + 1)?;
    let mut row_indices = Vec::<I>::new();
    let mut values = Vec::<E>::new();

    for k in 0..B.ncols() {
        let top = reach(
            G.symbolic(),
            B.row_indices_of_col_raw(k),
            I::truncate(k),
            marks,
            dfs_stack,
            pos_stack,
            xi,
        );
        let pattern = &xi[top..n];

        for &j in pattern {
            x[j.zx()] = E::zero();
        }
        for (i, &b) in zip(B.row_indices_of_col(k), B.values_of_col(k)) {
            x[i] = b;
        }

        for &j in pattern {
            let j = j.zx();
            let d = match diag {
                Diag::Unit => E::one(),
                Diag::NonUnit => G.get(j, j).copied().unwrap_or_else(E::zero).inv(),
            };
            let xj = x[j] * d;
            x[j] = xj;
            for (i, &gij) in zip(G.row_indices_of_col(j), G.values_of_col(j)) {
                if i != j {
                    x[i] -= gij * xj;
                }
            }
        }

        let nnz = check_index::<I>(row_indices.len() + pattern.len())?;
        row_indices.try_reserve(pattern.len()).map_err(oom)?;
        values.try_reserve(pattern.len()).map_err(oom)?;
        for &j in pattern {
            row_indices.push(j);
            values.push(x[j.zx()]);
        }
        col_ptrs[k + 1] = nnz;
    }

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(n, B.ncols(), col_ptrs, row_indices, false),
        values,
    ))
}
