//! Each function returns `false` when the matrix cannot be decomposed, in which case the output is
//! left untouched.
//!
//! Square systems are solved with a [`SparseLu`] decomposition. Overdetermined systems are solved
//! in the least squares sense with a [`SparseQr`] decomposition.

use super::{
    lu::{SparseLu, SparseLuDecomposition},
    qr::SparseQr,
    *,
};
use crate::{assert, MatMut};

/// Solves the least squares problem `min ‖A × X - B‖` with a sparse QR decomposition.
fn solve_overdetermined<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    B: MatRef<'_, E>,
) -> Option<Mat<E>> {
    let mut qr = SparseQr::<I, E>::new();
    if let Err(err) = qr.try_decompose(A) {
        log::debug!(target: "colsparse", "least squares solve failed: {err}");
        return None;
    }
    qr.factors().map(|factors| factors.solve(B))
}

/// Solves `A × X = B` with the given decomposition, and stores the result in `X`.
///
/// # Panics
///
/// Panics if `A` is not square, or if the dimensions of `B` and `X` don't match.
#[track_caller]
pub fn solve_with<I: Index, E: ComplexField>(
    decomposition: &mut impl SparseLuDecomposition<I, E>,
    A: SparseColMatRef<'_, I, E>,
    B: MatRef<'_, E>,
    X: MatMut<'_, E>,
) -> bool {
    assert!(all(
        A.nrows() == A.ncols(),
        B.nrows() == A.nrows(),
        X.nrows() == A.ncols(),
        X.ncols() == B.ncols(),
    ));
    if !decomposition.decompose(A) {
        return false;
    }
    let mut X = X;
    X.copy_from(B);
    decomposition.solve_in_place(X);
    true
}

/// Solves `A × X = B`, and stores the result in `X`.
///
/// If `A` has more rows than columns, `X` is the least squares solution.
///
/// # Panics
///
/// Panics if `A` has fewer rows than columns, or if the dimensions of `B` and `X` don't match.
#[track_caller]
pub fn solve<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    B: MatRef<'_, E>,
    X: MatMut<'_, E>,
) -> bool {
    assert!(all(
        A.nrows() >= A.ncols(),
        B.nrows() == A.nrows(),
        X.nrows() == A.ncols(),
        X.ncols() == B.ncols(),
    ));
    if A.nrows() == A.ncols() {
        return solve_with(&mut SparseLu::<I, E>::new(), A, B, X);
    }

    match solve_overdetermined(A, B) {
        Some(solution) => {
            let mut X = X;
            X.copy_from(solution.as_ref());
            true
        }
        None => false,
    }
}

/// Solves `A × X = B` where `B` is sparse, and stores the result in `X`.
///
/// If `A` has more rows than columns, `X` is the least squares solution.
///
/// # Note
/// The output is unsorted for square systems, and sorted otherwise.
///
/// # Panics
///
/// Panics if `A` has fewer rows than columns, or if `B.nrows() != A.nrows()`.
#[track_caller]
pub fn solve_sparse<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    B: SparseColMatRef<'_, I, E>,
    X: &mut SparseColMat<I, E>,
) -> bool {
    assert!(all(A.nrows() >= A.ncols(), B.nrows() == A.nrows()));

    let solution = if A.nrows() == A.ncols() {
        let mut lu = SparseLu::<I, E>::new();
        if let Err(err) = lu.try_decompose(A) {
            log::debug!(target: "colsparse", "sparse solve failed: {err}");
            return false;
        }
        match lu.factors().map(|factors| factors.solve_sparse(B)) {
            Some(Ok(solution)) => solution,
            _ => return false,
        }
    } else {
        let Some(dense) = solve_overdetermined(A, B.to_dense().as_ref()) else {
            return false;
        };
        match SparseColMat::from_dense(dense.as_ref(), <E::Real as ComplexField>::zero()) {
            Ok(solution) => solution,
            Err(_) => return false,
        }
    };
    *X = solution;
    true
}

/// Computes the inverse of `A`, and stores it in `inv`.
///
/// # Panics
///
/// Panics if `A` is not square, or if `inv` doesn't have the same shape as `A`.
#[track_caller]
pub fn invert<I: Index, E: ComplexField>(A: SparseColMatRef<'_, I, E>, inv: MatMut<'_, E>) -> bool {
    assert!(all(
        A.nrows() == A.ncols(),
        inv.nrows() == A.nrows(),
        inv.ncols() == A.ncols(),
    ));
    let n = A.nrows();
    let identity = Mat::identity(n, n);
    solve(A, identity.as_ref(), inv)
}

/// Computes the inverse of `A`, and stores it in `inv`.
///
/// # Note
/// Produces an unsorted output.
///
/// # Panics
///
/// Panics if `A` is not square.
#[track_caller]
pub fn invert_sparse<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    inv: &mut SparseColMat<I, E>,
) -> bool {
    assert!(A.nrows() == A.ncols());
    let Ok(identity) = SparseColMat::<I, E>::identity(A.nrows()) else {
        return false;
    };
    solve_sparse(A, identity.as_ref(), inv)
}

/// Computes the determinant of `A`, or zero if the LU decomposition of `A` fails.
///
/// # Panics
///
/// Panics if `A` is not square.
#[track_caller]
pub fn det<I: Index, E: ComplexField>(A: SparseColMatRef<'_, I, E>) -> E {
    assert!(A.nrows() == A.ncols());
    let mut lu = SparseLu::<I, E>::new();
    if lu.decompose(A) {
        lu.determinant()
    } else {
        E::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, linalg::matmul::matmul as dense_matmul, mat};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn det_of_small_matrix() {
        let A = SparseColMat::<usize, f64>::from_dense(
            mat![[7.0, 2.0, 3.0], [0.0, 2.0, 0.0], [6.0, 3.0, 9.0]].as_ref(),
            0.0,
        )
        .unwrap();
        assert!((det(A.as_ref()) - 90.0).abs() < 1e-12);

        let singular = SparseColMat::<usize, f64>::from_dense(
            mat![[1.0, 2.0], [2.0, 4.0]].as_ref(),
            0.0,
        )
        .unwrap();
        assert!(det(singular.as_ref()) == 0.0);
    }

    fn solve_round_trip<I: Index>() {
        let mut rng = StdRng::seed_from_u64(0);
        let n = 12;
        let A = test_utils::random_nonsingular::<I>(&mut rng, n, 0.2);
        let A_dense = A.to_dense();
        let B = Mat::from_fn(n, 3, |_, _| rng.gen::<f64>());

        let mut X = Mat::zeros(n, 3);
        assert!(solve(A.as_ref(), B.as_ref(), X.as_mut()));
        let mut AX = Mat::zeros(n, 3);
        dense_matmul(AX.as_mut(), A_dense.as_ref(), X.as_ref(), None, 1.0);
        assert!((&AX - &B).norm_max() < 1e-12);

        let B_sparse = test_utils::random_sparse::<I>(&mut rng, n, 4, 0.3);
        let mut X_sparse = SparseColMat::zeros(0, 0);
        assert!(solve_sparse(A.as_ref(), B_sparse.as_ref(), &mut X_sparse));
        test_utils::assert_valid(X_sparse.as_ref());
        let mut AX = Mat::zeros(n, 4);
        dense_matmul(AX.as_mut(), A_dense.as_ref(), X_sparse.to_dense().as_ref(), None, 1.0);
        assert!((&AX - &B_sparse.to_dense()).norm_max() < 1e-12);
    }
    monomorphize_test!(solve_round_trip);

    fn invert_round_trip<I: Index>() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 10;
        let A = test_utils::random_nonsingular::<I>(&mut rng, n, 0.25);
        let A_dense = A.to_dense();
        let identity = Mat::<f64>::identity(n, n);

        let mut inv = Mat::zeros(n, n);
        assert!(invert(A.as_ref(), inv.as_mut()));
        let mut prod = Mat::zeros(n, n);
        dense_matmul(prod.as_mut(), A_dense.as_ref(), inv.as_ref(), None, 1.0);
        assert!((&prod - &identity).norm_max() < 1e-12);

        let mut inv_sparse = SparseColMat::zeros(0, 0);
        assert!(invert_sparse(A.as_ref(), &mut inv_sparse));
        test_utils::assert_valid(inv_sparse.as_ref());
        assert!(test_utils::dist(inv_sparse.as_ref(), &inv) < 1e-12);
    }
    monomorphize_test!(invert_round_trip);

    #[test]
    fn overdetermined_least_squares() {
        // fit y = a + b x through points that lie exactly on y = 1 + 2 x
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]].as_ref(),
            0.0,
        )
        .unwrap();
        let B = mat![[1.0], [3.0], [5.0], [7.0]];
        let mut X = Mat::zeros(2, 1);
        assert!(solve(A.as_ref(), B.as_ref(), X.as_mut()));
        assert!((X.read(0, 0) - 1.0).abs() < 1e-12);
        assert!((X.read(1, 0) - 2.0).abs() < 1e-12);

        let B = SparseColMat::<u32, f64>::from_dense(B.as_ref(), 0.0).unwrap();
        let mut X_sparse = SparseColMat::zeros(0, 0);
        assert!(solve_sparse(A.as_ref(), B.as_ref(), &mut X_sparse));
        assert!(X_sparse.is_sorted());
        assert!(test_utils::dist(X_sparse.as_ref(), &X) < 1e-12);
    }

    fn overdetermined_matches_normal_equations<I: Index>() {
        let mut rng = StdRng::seed_from_u64(2);
        let (m, n) = (30, 8);
        let top = test_utils::random_nonsingular::<I>(&mut rng, n, 0.2);
        let bottom = test_utils::random_sparse::<I>(&mut rng, m - n, n, 0.25);
        let A = crate::sparse::ops::concat_rows(top.as_ref(), bottom.as_ref()).unwrap();
        let A_dense = A.to_dense();
        let B = Mat::from_fn(m, 3, |_, _| rng.gen::<f64>());

        let mut X = Mat::zeros(n, 3);
        assert!(solve(A.as_ref(), B.as_ref(), X.as_mut()));

        let At = A_dense.transpose();
        let AtA = SparseColMat::<I, f64>::from_dense((&At * &A_dense).as_ref(), 0.0).unwrap();
        let mut expected = Mat::zeros(n, 3);
        assert!(solve(AtA.as_ref(), (&At * &B).as_ref(), expected.as_mut()));
        assert!((&X - &expected).norm_max() < 1e-10);
    }
    monomorphize_test!(overdetermined_matches_normal_equations);

    #[test]
    fn rank_deficient_least_squares_fails() {
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]].as_ref(),
            0.0,
        )
        .unwrap();
        let B = mat![[1.0], [2.0], [3.0]];
        let mut X = mat![[5.0], [6.0]];
        assert!(!solve(A.as_ref(), B.as_ref(), X.as_mut()));
        assert!(X == mat![[5.0], [6.0]]);
    }

    #[test]
    fn singular_systems_leave_the_output_untouched() {
        let A = SparseColMat::<u64, f64>::from_dense(
            mat![[1.0, 2.0, 0.0], [2.0, 4.0, 0.0], [0.0, 0.0, 1.0]].as_ref(),
            0.0,
        )
        .unwrap();
        let B = Mat::<f64>::identity(3, 3);
        let mut X = Mat::from_fn(3, 3, |i, j| (i + 3 * j) as f64);
        let before = X.clone();
        assert!(!solve(A.as_ref(), B.as_ref(), X.as_mut()));
        assert!(X == before);
        assert!(!invert(A.as_ref(), X.as_mut()));
        assert!(X == before);

        let mut inv = SparseColMat::<u64, f64>::zeros(0, 0);
        assert!(!invert_sparse(A.as_ref(), &mut inv));
        assert!(inv.shape() == (0, 0));
    }
}
