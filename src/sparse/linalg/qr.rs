//! Sparse QR decomposition.
//!
//! The decomposition of an `m×n` matrix `A` with `m >= n` is `A × Pᵀ = Q × R`, where `P` is a
//! fill-reducing column permutation computed ahead of time, `Q` is the product of `n` sparse
//! Householder reflections and `R` is `n×n` upper triangular.
//!
//! The factorization is left-looking: column `j` is computed by applying the previous reflections
//! to column `j` of the column-permuted matrix, then building the reflection that annihilates the
//! entries that are not already part of `R`. The leading row of that reflection becomes row `j` of
//! `R`, so the rows of `Q × R` are only defined up to this implicit row permutation.

use super::{
    ordering::{ColumnCountOrdering, FillReducingOrdering},
    triangular_solve::{self, Diag},
    *,
};
use crate::{
    assert,
    linalg::householder::{make_householder_in_place, norm_l2},
    perm::{self, Perm, PermRef},
    MatMut, MatRef, RealField,
};
use dyn_stack::{GlobalPodBuffer, PodStack, SizeOverflow, StackReq};

/// Factors of a sparse QR decomposition.
#[derive(Clone, Debug)]
pub struct QrFactors<I: Index, E: ComplexField> {
    householder: SparseColMat<I, E>,
    tau: Vec<E::Real>,
    r: SparseColMat<I, E>,
    col_perm: Perm<I>,
}

/// Applies the reflection `I - v v^H / tau` to `x`, where `v` is stored in `(hi, hx)`.
#[inline]
fn apply_reflection<I: Index, E: ComplexField>(hi: &[I], hx: &[E], tau: E::Real, x: &mut [E]) {
    let mut dot = E::zero();
    for (&i, &v) in zip(hi, hx) {
        dot += v.conj() * x[i.zx()];
    }
    let k = dot.scale(tau.inv());
    for (&i, &v) in zip(hi, hx) {
        x[i.zx()] -= v * k;
    }
}

impl<I: Index, E: ComplexField> QrFactors<I, E> {
    /// Returns the number of rows of the decomposed matrix.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.householder.nrows()
    }

    /// Returns the number of columns of the decomposed matrix.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.householder.ncols()
    }

    /// Returns the Householder vectors, one per column. The first stored entry of each column is
    /// the leading row of the reflection, and is equal to one.
    ///
    /// # Note
    /// The returned matrix is unsorted.
    #[inline]
    pub fn householder_factor(&self) -> SparseColMatRef<'_, I, E> {
        self.householder.as_ref()
    }

    /// Returns the `tau` coefficients of the reflections `I - v v^H / tau`.
    #[inline]
    pub fn tau_values(&self) -> &[E::Real] {
        &self.tau
    }

    /// Returns the upper triangular factor `R`.
    #[inline]
    pub fn r_factor(&self) -> SparseColMatRef<'_, I, E> {
        self.r.as_ref()
    }

    /// Returns the column permutation `P`.
    #[inline]
    pub fn col_perm(&self) -> PermRef<'_, I> {
        self.col_perm.as_ref()
    }

    /// Returns the row of `A` that holds row `j` of `R` once `Q^H` is applied.
    #[inline]
    pub fn leading_row(&self, j: usize) -> usize {
        self.householder.row_indices_of_col_raw(j)[0].zx()
    }

    /// Applies `Q^H` to the columns of `rhs` in place.
    ///
    /// # Panics
    ///
    /// Panics if `rhs.nrows() != self.nrows()`.
    #[track_caller]
    pub fn apply_q_adjoint_in_place(&self, rhs: MatMut<'_, E>) {
        let m = self.nrows();
        assert!(rhs.nrows() == m);
        let mut rhs = rhs;
        let h = self.householder.as_ref();
        let mut work = vec![E::zero(); m];
        for k in 0..rhs.ncols() {
            for (i, w) in work.iter_mut().enumerate() {
                *w = rhs.read(i, k);
            }
            for j in 0..self.ncols() {
                apply_reflection(
                    h.row_indices_of_col_raw(j),
                    h.values_of_col(j),
                    self.tau[j],
                    &mut work,
                );
            }
            for (i, &w) in work.iter().enumerate() {
                rhs.write(i, k, w);
            }
        }
    }

    /// Solves the least squares problem `min ‖A × X - rhs‖`, and stores `X` in the first
    /// `self.ncols()` rows of `rhs`. The remaining rows are set to zero.
    ///
    /// # Panics
    ///
    /// Panics if `rhs.nrows() != self.nrows()`.
    #[track_caller]
    pub fn solve_in_place(&self, rhs: MatMut<'_, E>) {
        let n = self.ncols();
        let mut x = rhs;
        self.apply_q_adjoint_in_place(x.rb_mut());

        let mut top = Mat::from_fn(n, x.ncols(), |j, k| x.read(self.leading_row(j), k));
        triangular_solve::solve_upper_triangular_in_place(
            self.r_factor(),
            Diag::NonUnit,
            top.as_mut(),
        );
        let mut work = vec![E::zero(); n];
        perm::permute_rows_in_place(top.as_mut(), self.col_perm().inverse(), &mut work);

        x.fill_zero();
        for k in 0..x.ncols() {
            for j in 0..n {
                x.write(j, k, top.read(j, k));
            }
        }
    }

    /// Solves the least squares problem `min ‖A × X - rhs‖` and returns `X`.
    ///
    /// # Panics
    ///
    /// Panics if `rhs.nrows() != self.nrows()`.
    #[track_caller]
    pub fn solve(&self, rhs: MatRef<'_, E>) -> Mat<E> {
        let mut x = rhs.to_owned();
        self.solve_in_place(x.as_mut());
        Mat::from_fn(self.ncols(), rhs.ncols(), |i, j| x.read(i, j))
    }
}

/// Computes the size and alignment of the workspace required to factorize a matrix with `nrows`
/// rows.
pub fn factorize_qr_req<I: Index, E: ComplexField>(
    nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    let idx = StackReq::try_new::<I>(nrows)?;
    let val = StackReq::try_new::<E>(nrows)?;
    StackReq::try_all_of([val, idx, idx, idx])
}

/// Computes the QR decomposition of the matrix `A`, whose columns are first permuted by
/// `col_perm`.
///
/// # Note
/// Allows unsorted matrices. `R` is sorted, the Householder factor is not.
///
/// # Panics
///
/// Panics if `A` has fewer rows than columns, or if `col_perm.len() != A.ncols()`.
#[track_caller]
pub fn factorize_qr<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    col_perm: PermRef<'_, I>,
    stack: PodStack<'_>,
) -> Result<QrFactors<I, E>, QrError> {
    let I = I::truncate;

    assert!(all(A.nrows() >= A.ncols(), col_perm.len() == A.ncols()));
    let m = A.nrows();
    let n = A.ncols();

    let (x, stack) = stack.make_raw::<E>(m);
    let (marked, stack) = stack.make_raw::<I>(m);
    let (pattern, stack) = stack.make_raw::<I>(m);
    let (r_idx, _) = stack.make_raw::<I>(m);
    mem::fill_zero(x);
    mem::fill_none(marked);
    // step at which each row became the leading row of a reflection
    mem::fill_none(r_idx);

    let mut h_col_ptr = try_zeroed::<I>(n + 1)?;
    let mut r_col_ptr = try_zeroed::<I>(n + 1)?;
    let mut h_row_ind = Vec::<I>::new();
    let mut r_row_ind = Vec::<I>::new();
    let mut h_val = Vec::<E>::new();
    let mut r_val = Vec::<E>::new();
    let mut tau = try_filled(n, <E::Real as ComplexField>::zero())?;
    let mut diag = try_filled(n, <E::Real as ComplexField>::zero())?;

    let col_perm_inv = col_perm.arrays().1;

    for j in 0..n {
        let mark = I(j);
        let pj = col_perm_inv[j].zx();

        let mut len = 0usize;
        for (i, &v) in zip(A.row_indices_of_col(pj), A.values_of_col(pj)) {
            if marked[i] != mark {
                marked[i] = mark;
                pattern[len] = I(i);
                len += 1;
            }
            x[i] += v;
        }

        // a reflection leaves `x` untouched unless its pattern meets the current one
        for d in 0..j {
            let range = h_col_ptr[d].zx()..h_col_ptr[d + 1].zx();
            let hi = &h_row_ind[range.clone()];
            if !hi.iter().any(|&i| marked[i.zx()] == mark) {
                continue;
            }
            for &i in hi {
                let i = i.zx();
                if marked[i] != mark {
                    marked[i] = mark;
                    pattern[len] = I(i);
                    len += 1;
                }
            }
            apply_reflection(hi, &h_val[range], tau[d], x);
        }
        let pattern = &pattern[..len];

        check_index::<I>(h_row_ind.len() + len)?;
        check_index::<I>(r_row_ind.len() + len + 1)?;
        try_reserve(&mut h_row_ind, len)?;
        try_reserve(&mut h_val, len)?;
        try_reserve(&mut r_row_ind, len + 1)?;
        try_reserve(&mut r_val, len + 1)?;

        let h_begin = h_row_ind.len();
        for &i in pattern {
            let i = i.zx();
            if r_idx[i] != none::<I>() {
                r_row_ind.push(r_idx[i]);
                r_val.push(x[i]);
            } else {
                h_row_ind.push(I(i));
                h_val.push(x[i]);
            }
            x[i] = E::zero();
        }

        if h_begin == h_row_ind.len() {
            log::debug!(target: "colsparse", "sparse QR: column {j} has no entry left to reflect");
            return Err(QrError::RankDeficient(j));
        }

        let h = &mut h_val[h_begin..];
        let head = h[0];
        let tail_norm = norm_l2(&h[1..]);
        let (tau_j, beta) = make_householder_in_place(&mut h[1..], head, tail_norm);
        h[0] = E::one();

        tau[j] = tau_j;
        diag[j] = beta.abs();
        r_idx[h_row_ind[h_begin].zx()] = I(j);
        r_row_ind.push(I(j));
        r_val.push(beta);

        h_col_ptr[j + 1] = I(h_row_ind.len());
        r_col_ptr[j + 1] = I(r_row_ind.len());
    }

    let mut max_diag = <E::Real as ComplexField>::zero();
    for &d in &diag {
        if d > max_diag {
            max_diag = d;
        }
    }
    let threshold = max_diag
        * <E::Real as RealField>::epsilon()
        * <E::Real as ComplexField>::from_f64((10 * m * n) as f64);
    for (j, &d) in diag.iter().enumerate() {
        if !(d > threshold) {
            log::debug!(target: "colsparse", "sparse QR: negligible diagonal element in column {j}");
            return Err(QrError::RankDeficient(j));
        }
    }

    utils::sort_indices(&r_col_ptr, &mut r_row_ind, &mut r_val);

    Ok(QrFactors {
        householder: SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(m, n, h_col_ptr, h_row_ind, false),
            h_val,
        ),
        tau,
        r: SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(n, n, r_col_ptr, r_row_ind, true),
            r_val,
        ),
        col_perm: col_perm.to_owned(),
    })
}

/// Sparse QR decomposition with a fill-reducing column ordering, used to solve full rank least
/// squares problems.
#[derive(Clone, Debug)]
pub struct SparseQr<I: Index, E: ComplexField, O = ColumnCountOrdering> {
    ordering: O,
    factors: Option<QrFactors<I, E>>,
}

impl<I: Index, E: ComplexField, O: Default> Default for SparseQr<I, E, O> {
    #[inline]
    fn default() -> Self {
        Self::with_ordering(O::default())
    }
}

impl<I: Index, E: ComplexField> SparseQr<I, E> {
    /// Creates an empty decomposition that uses the default column ordering.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: Index, E: ComplexField, O> SparseQr<I, E, O> {
    /// Creates an empty decomposition that uses the given column ordering.
    #[inline]
    pub fn with_ordering(ordering: O) -> Self {
        Self {
            ordering,
            factors: None,
        }
    }

    /// Returns the stored factors, if a successful decomposition is stored.
    #[inline]
    pub fn factors(&self) -> Option<&QrFactors<I, E>> {
        self.factors.as_ref()
    }

    /// Returns `true` if a successful decomposition is currently stored.
    #[inline]
    pub fn is_decomposed(&self) -> bool {
        self.factors.is_some()
    }

    /// Solves the least squares problem `min ‖A × X - rhs‖` and returns `X`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored, or if the dimensions don't match.
    #[track_caller]
    pub fn solve(&self, rhs: MatRef<'_, E>) -> Mat<E> {
        match &self.factors {
            Some(factors) => factors.solve(rhs),
            None => panic!("no decomposition is stored"),
        }
    }

    /// Computes the decomposition of `A`, replacing any previously stored decomposition.
    ///
    /// On failure, no decomposition is stored.
    ///
    /// # Panics
    ///
    /// Panics if `A` has fewer rows than columns.
    #[track_caller]
    pub fn try_decompose(&mut self, A: SparseColMatRef<'_, I, E>) -> Result<(), QrError>
    where
        O: FillReducingOrdering<I>,
    {
        assert!(A.nrows() >= A.ncols());
        self.factors = None;

        let col_perm = self.ordering.order(A.symbolic())?;
        let mut mem = GlobalPodBuffer::try_new(factorize_qr_req::<I, E>(A.nrows()).map_err(oom)?)
            .map_err(oom)?;
        let factors = factorize_qr(A, col_perm.as_ref(), PodStack::new(&mut mem))?;
        self.factors = Some(factors);
        Ok(())
    }

    /// Computes the decomposition of `A`, and returns `false` if `A` does not have full column
    /// rank.
    ///
    /// # Panics
    ///
    /// Panics if `A` has fewer rows than columns.
    #[track_caller]
    pub fn decompose(&mut self, A: SparseColMatRef<'_, I, E>) -> bool
    where
        O: FillReducingOrdering<I>,
    {
        self.try_decompose(A).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert, c64,
        linalg::matmul::matmul as dense_matmul,
        mat,
        sparse::{
            linalg::{lu::SparseLu, ordering::NaturalOrdering},
            ops,
        },
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Returns a tall matrix with full column rank.
    fn random_tall<I: Index>(rng: &mut StdRng, nrows: usize, ncols: usize) -> SparseColMat<I, f64> {
        let top = test_utils::random_nonsingular::<I>(rng, ncols, 0.2);
        let bottom = test_utils::random_sparse::<I>(rng, nrows - ncols, ncols, 0.3);
        ops::concat_rows(top.as_ref(), bottom.as_ref()).unwrap()
    }

    fn q_adjoint_maps_a_to_r<I: Index>() {
        let mut rng = StdRng::seed_from_u64(0);
        let (m, n) = (18, 7);
        let A = random_tall::<I>(&mut rng, m, n);
        let A = test_utils::shuffle_columns(&mut rng, A.as_ref());

        let mut qr = SparseQr::<I, f64>::new();
        assert!(qr.decompose(A.as_ref()));
        let factors = qr.factors().unwrap();
        test_utils::assert_valid(factors.r_factor());
        test_utils::assert_valid(factors.householder_factor());
        for j in 0..n {
            assert!(factors.r_factor().row_indices_of_col(j).all(|i| i <= j));
            assert!(factors.householder_factor().values_of_col(j)[0] == 1.0);
        }

        // Qᴴ × A × Pᵀ has R in its leading rows and zeros elsewhere
        let col_perm_inv = factors.col_perm().arrays().1;
        let A_dense = A.to_dense();
        let mut C = Mat::from_fn(m, n, |i, j| A_dense.read(i, col_perm_inv[j].zx()));
        factors.apply_q_adjoint_in_place(C.as_mut());

        let R = factors.r_factor().to_dense();
        let mut leading = vec![false; m];
        for k in 0..n {
            let row = factors.leading_row(k);
            leading[row] = true;
            for j in 0..n {
                assert!((C.read(row, j) - R.read(k, j)).abs() < 1e-12);
            }
        }
        for i in (0..m).filter(|&i| !leading[i]) {
            for j in 0..n {
                assert!(C.read(i, j).abs() < 1e-12);
            }
        }
    }
    monomorphize_test!(q_adjoint_maps_a_to_r);

    fn least_squares_matches_normal_equations<I: Index>() {
        let mut rng = StdRng::seed_from_u64(1);
        let (m, n) = (25, 9);
        let A = random_tall::<I>(&mut rng, m, n);
        let A_dense = A.to_dense();
        let b = Mat::from_fn(m, 2, |_, _| rng.gen::<f64>());

        let mut qr = SparseQr::<I, f64, NaturalOrdering>::default();
        assert!(qr.decompose(A.as_ref()));
        let x = qr.solve(b.as_ref());
        assert!(x.nrows() == n);

        // Aᵀ × (A × x - b) vanishes at the minimizer
        let mut residual = b.clone();
        dense_matmul(residual.as_mut(), A_dense.as_ref(), x.as_ref(), Some(-1.0), 1.0);
        let normal = &A_dense.transpose() * &residual;
        assert!(normal.norm_max() < 1e-12);

        // the normal equations Aᵀ × A × x = Aᵀ × b give the same solution
        let AtA = &A_dense.transpose() * &A_dense;
        let Atb = &A_dense.transpose() * &b;
        let AtA = SparseColMat::<I, f64>::from_dense(AtA.as_ref(), 0.0).unwrap();
        let mut lu = SparseLu::<I, f64>::new();
        assert!(lu.try_decompose(AtA.as_ref()).is_ok());
        let expected = lu.solve(Atb.as_ref());
        assert!((&x - &expected).norm_max() < 1e-10);
    }
    monomorphize_test!(least_squares_matches_normal_equations);

    #[test]
    fn rank_deficient_is_reported() {
        // the third column is twice the first
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 0.0, 2.0], [0.0, 1.0, 0.0], [3.0, 0.0, 6.0], [1.0, 1.0, 2.0]].as_ref(),
            0.0,
        )
        .unwrap();
        let mut qr = SparseQr::<u32, f64, NaturalOrdering>::default();
        assert!(qr.try_decompose(A.as_ref()) == Err(QrError::RankDeficient(2)));
        assert!(!qr.is_decomposed());

        // an empty column has nothing to reflect
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]].as_ref(),
            0.0,
        )
        .unwrap();
        assert!(qr.try_decompose(A.as_ref()) == Err(QrError::RankDeficient(1)));
    }

    #[test]
    fn complex_consistent_system() {
        let A = SparseColMat::<usize, c64>::try_new_from_triplets(
            3,
            2,
            &[
                (0, 0, c64::new(1.0, 1.0)),
                (2, 0, c64::new(0.0, 2.0)),
                (1, 1, c64::new(3.0, -1.0)),
                (2, 1, c64::new(1.0, 0.0)),
            ],
        )
        .unwrap();
        let x = Mat::from_fn(2, 1, |i, _| c64::new(1.0 + i as f64, -0.5));
        let b = &A.to_dense() * &x;

        let mut qr = SparseQr::<usize, c64>::new();
        assert!(qr.decompose(A.as_ref()));
        let sol = qr.solve(b.as_ref());
        assert!((&sol - &x).norm_max() < 1e-12);
    }
}
