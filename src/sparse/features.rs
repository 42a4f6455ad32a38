//! Entries that are not stored are treated as zeros, so two matrices with different structures
//! can still compare equal. Predicates taking a tolerance compare magnitudes with `<=`.

use super::*;

/// Checks that every stored entry of `a` is within `tol` of the matching element of `b`, or of
/// `bᵀ` if `transpose` is set.
fn covers<I: Index, E: ComplexField>(
    a: SparseColMatRef<'_, I, E>,
    b: SparseColMatRef<'_, I, E>,
    transpose: bool,
    tol: E::Real,
) -> bool {
    (0..a.ncols()).all(|j| {
        zip(a.row_indices_of_col(j), a.values_of_col(j)).all(|(i, &v)| {
            let other = if transpose { b.read(j, i) } else { b.read(i, j) };
            (v - other).abs() <= tol
        })
    })
}

/// Returns `true` if `lhs` and `rhs` have the same shape, and every pair of matching elements
/// differs by at most `tol`.
///
/// # Note
/// Allows unsorted matrices.
pub fn is_equal<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    tol: E::Real,
) -> bool {
    if lhs.shape() != rhs.shape() {
        return false;
    }
    covers(lhs, rhs, false, tol) && covers(rhs, lhs, false, tol)
}

/// Returns `true` if `lhs` and `rhs` have the same shape and store the same set of entries,
/// regardless of their values and of the order of the row indices.
pub fn is_same_structure<I: Index>(
    lhs: SymbolicSparseColMatRef<'_, I>,
    rhs: SymbolicSparseColMatRef<'_, I>,
) -> bool {
    if lhs.shape() != rhs.shape() || lhs.col_ptrs() != rhs.col_ptrs() {
        return false;
    }
    if lhs.is_sorted() && rhs.is_sorted() {
        return lhs.row_indices() == rhs.row_indices();
    }
    // equal column sizes and no duplicates, so inclusion implies equality
    (0..lhs.ncols()).all(|j| lhs.row_indices_of_col(j).all(|i| rhs.is_assigned(i, j)))
}

/// Returns `true` if `rhs` is the transpose of `lhs`, up to `tol`.
///
/// # Note
/// Allows unsorted matrices.
pub fn is_transpose<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    tol: E::Real,
) -> bool {
    if lhs.nrows() != rhs.ncols() || lhs.ncols() != rhs.nrows() {
        return false;
    }
    covers(lhs, rhs, true, tol) && covers(rhs, lhs, true, tol)
}

/// Returns `true` if `mat` is square and equal to its transpose, up to `tol`.
pub fn is_symmetric<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    tol: E::Real,
) -> bool {
    mat.nrows() == mat.ncols() && is_transpose(mat, mat, tol)
}

/// Returns `true` if `mat` is square, its diagonal elements are within `tol` of one, and its
/// other elements are within `tol` of zero.
pub fn is_identity<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    tol: E::Real,
) -> bool {
    if mat.nrows() != mat.ncols() {
        return false;
    }
    (0..mat.ncols()).all(|j| {
        let one = E::one();
        (one - mat.read(j, j)).abs() <= tol
            && zip(mat.row_indices_of_col(j), mat.values_of_col(j))
                .all(|(i, &v)| i == j || v.abs() <= tol)
    })
}

/// Returns `true` if every element of `mat` above the diagonal is within `tol` of zero.
pub fn is_lower_triangular<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    tol: E::Real,
) -> bool {
    (0..mat.ncols()).all(|j| {
        zip(mat.row_indices_of_col(j), mat.values_of_col(j)).all(|(i, &v)| i >= j || v.abs() <= tol)
    })
}

/// Returns `true` if every element of `mat` below the diagonal is within `tol` of zero.
pub fn is_upper_triangular<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    tol: E::Real,
) -> bool {
    (0..mat.ncols()).all(|j| {
        zip(mat.row_indices_of_col(j), mat.values_of_col(j)).all(|(i, &v)| i <= j || v.abs() <= tol)
    })
}

/// Returns `true` if every element of `mat` is within `tol` of zero.
pub fn is_zeros<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>, tol: E::Real) -> bool {
    mat.values().iter().all(|v| v.abs() <= tol)
}

/// Returns `true` if any stored entry is infinite or NaN.
pub fn has_uncountable<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>) -> bool {
    mat.values().iter().any(|v| !v.is_finite())
}
