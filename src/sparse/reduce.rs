//! Reductions and elementwise operations.
//!
//! Unless stated otherwise, these functions only visit the stored entries of a matrix. In
//! particular, [`apply`] never creates new entries, even if the mapped function is nonzero at zero,
//! and the `reduce_*` functions never feed the implicit zeros to the accumulator.
//!
//! The min and max reductions are the exception: a column, row or matrix that is not fully stored
//! contains an implicit zero, which takes part in the comparison.
//!
//! Column reductions return a `1×ncols` row vector, and row reductions return an `nrows×1` column
//! vector.

use super::*;
use crate::{assert, RealField};

#[inline]
fn is_full(len: usize, count: usize) -> bool {
    len == count
}

/// Returns the sum of the stored entries of each column.
pub fn sum_cols<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>) -> Mat<E> {
    reduce_column_wise(mat, E::zero(), |acc, x| acc + x)
}

/// Returns the sum of the stored entries of each row.
pub fn sum_rows<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>) -> Mat<E> {
    reduce_row_wise(mat, E::zero(), |acc, x| acc + x)
}

fn extremum_cols<I: Index, E: RealField>(
    mat: SparseColMatRef<'_, I, E>,
    better: impl Fn(E, E) -> bool,
) -> Mat<E> {
    let mut out = Mat::zeros(1, mat.ncols());
    for j in 0..mat.ncols() {
        let values = mat.values_of_col(j);
        let mut acc = match values.first() {
            Some(&first) if is_full(mat.nrows(), values.len()) => first,
            _ => E::zero(),
        };
        for &v in values {
            if better(v, acc) {
                acc = v;
            }
        }
        out.write(0, j, acc);
    }
    out
}

fn extremum_rows<I: Index, E: RealField>(
    mat: SparseColMatRef<'_, I, E>,
    better: impl Fn(E, E) -> bool,
) -> Mat<E> {
    let m = mat.nrows();
    let mut count = vec![0usize; m];
    let mut out = Mat::zeros(m, 1);
    for j in 0..mat.ncols() {
        for (i, &v) in zip(mat.row_indices_of_col(j), mat.values_of_col(j)) {
            if count[i] == 0 || better(v, out.read(i, 0)) {
                out.write(i, 0, v);
            }
            count[i] += 1;
        }
    }
    for (i, &count) in count.iter().enumerate() {
        if !is_full(mat.ncols(), count) && better(E::zero(), out.read(i, 0)) {
            out.write(i, 0, E::zero());
        }
    }
    out
}

/// Returns the minimum of each column, including the implicit zero of the columns that are not
/// fully stored.
pub fn min_cols<I: Index, E: RealField>(mat: SparseColMatRef<'_, I, E>) -> Mat<E> {
    extremum_cols(mat, |v, acc| v < acc)
}

/// Returns the maximum of each column, including the implicit zero of the columns that are not
/// fully stored.
pub fn max_cols<I: Index, E: RealField>(mat: SparseColMatRef<'_, I, E>) -> Mat<E> {
    extremum_cols(mat, |v, acc| v > acc)
}

/// Returns the minimum of each row, including the implicit zero of the rows that are not fully
/// stored.
pub fn min_rows<I: Index, E: RealField>(mat: SparseColMatRef<'_, I, E>) -> Mat<E> {
    extremum_rows(mat, |v, acc| v < acc)
}

/// Returns the maximum of each row, including the implicit zero of the rows that are not fully
/// stored.
pub fn max_rows<I: Index, E: RealField>(mat: SparseColMatRef<'_, I, E>) -> Mat<E> {
    extremum_rows(mat, |v, acc| v > acc)
}

/// Returns the sum of the stored entries.
pub fn element_sum<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>) -> E {
    reduce_scalar(mat, E::zero(), |acc, x| acc + x)
}

fn element_extremum<I: Index, E: ComplexField, T: RealField>(
    mat: SparseColMatRef<'_, I, E>,
    map: impl Fn(E) -> T,
    better: impl Fn(T, T) -> bool,
) -> T {
    let values = mat.values();
    let full = mat
        .nrows()
        .checked_mul(mat.ncols())
        .is_some_and(|len| is_full(len, values.len()));

    let mut acc = match values.first() {
        Some(&first) if full => map(first),
        _ => T::zero(),
    };
    for &v in values {
        let v = map(v);
        if better(v, acc) {
            acc = v;
        }
    }
    acc
}

/// Returns the smallest element of the matrix, including the implicit zeros.
pub fn element_min<I: Index, E: RealField>(mat: SparseColMatRef<'_, I, E>) -> E {
    element_extremum(mat, |v| v, |v, acc| v < acc)
}

/// Returns the largest element of the matrix, including the implicit zeros.
pub fn element_max<I: Index, E: RealField>(mat: SparseColMatRef<'_, I, E>) -> E {
    element_extremum(mat, |v| v, |v, acc| v > acc)
}

/// Returns the smallest magnitude of the elements of the matrix, including the implicit zeros.
pub fn element_min_abs<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>) -> E::Real {
    element_extremum(mat, |v| v.abs(), |v, acc| v < acc)
}

/// Returns the largest magnitude of the elements of the matrix.
pub fn element_max_abs<I: Index, E: ComplexField>(mat: SparseColMatRef<'_, I, E>) -> E::Real {
    element_extremum(mat, |v| v.abs(), |v, acc| v > acc)
}

/// Multiplies every stored entry by `factor`.
pub fn scale<I: Index, E: ComplexField>(mat: SparseColMatMut<'_, I, E>, factor: E) {
    apply_in_place(mat, |x| x * factor);
}

/// Divides every stored entry by `divisor`.
pub fn divide<I: Index, E: ComplexField>(mat: SparseColMatMut<'_, I, E>, divisor: E) {
    apply_in_place(mat, |x| x / divisor);
}

/// Negates every stored entry.
pub fn change_sign<I: Index, E: ComplexField>(mat: SparseColMatMut<'_, I, E>) {
    apply_in_place(mat, |x| -x);
}

/// Multiplies row `i` of `mat` by `diag[i]`, computing `D × A`.
///
/// # Panics
///
/// Panics if `diag.len() != mat.nrows()`.
#[track_caller]
pub fn multiply_rows<I: Index, E: ComplexField>(diag: &[E], mat: SparseColMatMut<'_, I, E>) {
    assert!(diag.len() == mat.nrows());
    let (symbolic, values) = mat.parts_mut();
    for (&i, v) in zip(symbolic.row_indices(), values) {
        *v *= diag[i.zx()];
    }
}

/// Divides row `i` of `mat` by `diag[i]`, computing `D⁻¹ × A`.
///
/// # Panics
///
/// Panics if `diag.len() != mat.nrows()`.
#[track_caller]
pub fn divide_rows<I: Index, E: ComplexField>(diag: &[E], mat: SparseColMatMut<'_, I, E>) {
    assert!(diag.len() == mat.nrows());
    let (symbolic, values) = mat.parts_mut();
    for (&i, v) in zip(symbolic.row_indices(), values) {
        *v = *v / diag[i.zx()];
    }
}

/// Multiplies column `j` of `mat` by `diag[j]`, computing `A × D`.
///
/// # Panics
///
/// Panics if `diag.len() != mat.ncols()`.
#[track_caller]
pub fn multiply_cols<I: Index, E: ComplexField>(mat: SparseColMatMut<'_, I, E>, diag: &[E]) {
    assert!(diag.len() == mat.ncols());
    let (symbolic, values) = mat.parts_mut();
    for (j, &d) in diag.iter().enumerate() {
        for v in &mut values[symbolic.col_range(j)] {
            *v *= d;
        }
    }
}

/// Divides column `j` of `mat` by `diag[j]`, computing `A × D⁻¹`.
///
/// # Panics
///
/// Panics if `diag.len() != mat.ncols()`.
#[track_caller]
pub fn divide_cols<I: Index, E: ComplexField>(mat: SparseColMatMut<'_, I, E>, diag: &[E]) {
    assert!(diag.len() == mat.ncols());
    let (symbolic, values) = mat.parts_mut();
    for (j, &d) in diag.iter().enumerate() {
        for v in &mut values[symbolic.col_range(j)] {
            *v = *v / d;
        }
    }
}

/// Returns a matrix with the same structure as `mat`, where each stored entry `x` is replaced by
/// `f(x)`.
///
/// # Note
/// The structure is never extended: implicit zeros stay implicit, even if `f(0) != 0`.
/// Preserves sortedness.
pub fn apply<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    f: impl FnMut(E) -> E,
) -> Result<SparseColMat<I, E>, SparseError> {
    let symbolic = mat.symbolic().to_owned()?;
    let values = try_collect(mat.values().iter().copied().map(f))?;
    Ok(SparseColMat::new(symbolic, values))
}

/// Replaces each stored entry `x` of `mat` by `f(x)`.
///
/// # Note
/// The structure is never extended: implicit zeros stay implicit, even if `f(0) != 0`.
pub fn apply_in_place<I: Index, E: ComplexField>(
    mat: SparseColMatMut<'_, I, E>,
    mut f: impl FnMut(E) -> E,
) {
    for v in mat.values_mut() {
        *v = f(*v);
    }
}

/// Folds the stored entries of `mat` into a single value, starting from `init`.
pub fn reduce_scalar<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    init: E,
    f: impl FnMut(E, E) -> E,
) -> E {
    mat.values().iter().copied().fold(init, f)
}

/// Folds the stored entries of each column of `mat`, starting from `init`.
///
/// Returns a `1×ncols` row vector.
pub fn reduce_column_wise<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    init: E,
    mut f: impl FnMut(E, E) -> E,
) -> Mat<E> {
    let mut out = Mat::zeros(1, mat.ncols());
    for j in 0..mat.ncols() {
        let acc = mat
            .values_of_col(j)
            .iter()
            .fold(init, |acc, &x| f(acc, x));
        out.write(0, j, acc);
    }
    out
}

/// Folds the stored entries of each row of `mat`, starting from `init`.
///
/// Returns an `nrows×1` column vector.
pub fn reduce_row_wise<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    init: E,
    mut f: impl FnMut(E, E) -> E,
) -> Mat<E> {
    let mut out = Mat::from_fn(mat.nrows(), 1, |_, _| init);
    for j in 0..mat.ncols() {
        for (i, &v) in zip(mat.row_indices_of_col(j), mat.values_of_col(j)) {
            out.write(i, 0, f(out.read(i, 0), v));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64, mat};

    // [[ 1, 0, -2]
    //  [ 0, 0,  3]
    //  [ 4, 5, -6]]
    fn sample<I: Index>() -> SparseColMat<I, f64> {
        SparseColMat::from_dense(
            mat![[1.0, 0.0, -2.0], [0.0, 0.0, 3.0], [4.0, 5.0, -6.0]].as_ref(),
            0.0,
        )
        .unwrap()
    }

    fn row_and_column_reductions<I: Index>() {
        let A = sample::<I>();
        let A = A.as_ref();

        assert!(sum_cols(A) == mat![[5.0, 5.0, -5.0]]);
        assert!(sum_rows(A) == mat![[-1.0], [3.0], [3.0]]);

        // only the last column is full
        assert!(min_cols(A) == mat![[0.0, 0.0, -6.0]]);
        assert!(max_cols(A) == mat![[4.0, 5.0, 3.0]]);

        // only the last row is full
        assert!(min_rows(A) == mat![[-2.0], [0.0], [-6.0]]);
        assert!(max_rows(A) == mat![[1.0], [3.0], [5.0]]);
    }
    monomorphize_test!(row_and_column_reductions);

    #[test]
    fn full_rows_do_not_see_zero() {
        let A = SparseColMat::<u32, f64>::from_dense(mat![[2.0, 3.0], [0.0, -1.0]].as_ref(), 0.0)
            .unwrap();
        assert!(min_rows(A.as_ref()) == mat![[2.0], [-1.0]]);
        assert!(min_cols(A.as_ref()) == mat![[0.0, -1.0]]);
        assert!(max_cols(A.as_ref()) == mat![[2.0, 3.0]]);
    }

    #[test]
    fn element_reductions() {
        let A = sample::<u64>();
        let A = A.as_ref();
        assert!(element_sum(A) == 5.0);
        assert!(element_min(A) == -6.0);
        assert!(element_max(A) == 5.0);
        assert!(element_min_abs(A) == 0.0);
        assert!(element_max_abs(A) == 6.0);

        let full = SparseColMat::<u64, f64>::from_dense(mat![[2.0, -3.0], [4.0, 5.0]].as_ref(), 0.0)
            .unwrap();
        assert!(element_min(full.as_ref()) == -3.0);
        assert!(element_max(full.as_ref()) == 5.0);
        assert!(element_min_abs(full.as_ref()) == 2.0);

        let empty = SparseColMat::<u64, f64>::zeros(3, 2);
        assert!(element_min(empty.as_ref()) == 0.0);
        assert!(element_max_abs(empty.as_ref()) == 0.0);
    }

    #[test]
    fn apply_skips_structural_zeros() {
        let A = sample::<u32>();
        let B = apply(A.as_ref(), |x| x + 1.0).unwrap();
        assert!(B.nnz() == A.nnz());
        assert!(B.is_sorted());
        assert!(B.read(0, 1) == 0.0);
        assert!(B.read(2, 2) == -5.0);

        let mut C = A.clone();
        apply_in_place(C.as_mut(), |x| x * x);
        assert!(C.read(2, 0) == 16.0);
        assert!(C.nnz() == A.nnz());

        let A = A.as_ref();
        assert!(reduce_scalar(A, 1.0, |acc, x| acc * x) == 1.0 * -2.0 * 3.0 * 4.0 * 5.0 * -6.0);
        assert!(reduce_column_wise(A, 0.0, |acc, x| acc + x * x) == mat![[17.0, 25.0, 49.0]]);
        assert!(reduce_row_wise(A, 10.0, |acc, x| acc + x) == mat![[9.0], [13.0], [13.0]]);
    }

    #[test]
    fn scaling() {
        let mut A = sample::<u64>();
        scale(A.as_mut(), 2.0);
        assert!(A.read(2, 1) == 10.0);
        divide(A.as_mut(), 4.0);
        assert!(A.read(2, 1) == 2.5);
        change_sign(A.as_mut());
        assert!(A.read(0, 0) == -0.5);

        let mut A = sample::<u64>();
        multiply_rows(&[1.0, 2.0, 3.0], A.as_mut());
        assert!(A.to_dense() == mat![[1.0, 0.0, -2.0], [0.0, 0.0, 6.0], [12.0, 15.0, -18.0]]);
        divide_rows(&[1.0, 2.0, 3.0], A.as_mut());
        assert!(A.to_dense() == sample::<u64>().to_dense());

        multiply_cols(A.as_mut(), &[2.0, 1.0, -1.0]);
        assert!(A.to_dense() == mat![[2.0, 0.0, 2.0], [0.0, 0.0, -3.0], [8.0, 5.0, 6.0]]);
        divide_cols(A.as_mut(), &[2.0, 1.0, -1.0]);
        assert!(A.to_dense() == sample::<u64>().to_dense());
    }

    #[test]
    fn complex_entries() {
        let A = SparseColMat::<u32, c64>::from_diagonal(&[c64::new(3.0, 4.0), c64::new(0.0, -1.0)])
            .unwrap();
        assert!(element_sum(A.as_ref()) == c64::new(3.0, 3.0));
        assert!(element_max_abs(A.as_ref()) == 5.0);
        assert!(element_min_abs(A.as_ref()) == 0.0);
    }
}
