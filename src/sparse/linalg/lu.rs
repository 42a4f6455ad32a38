//! Sparse LU decomposition.
//!
//! The decomposition of a square matrix `A` is `P × A × Qᵀ = L × U`, where `Q` is a fill-reducing
//! column permutation computed ahead of time, `P` is the row permutation selected by pivoting
//! during the factorization, `L` is unit lower triangular and `U` is upper triangular.
//!
//! The factorization is left-looking: column `j` of `L` and `U` is computed by solving a sparse
//! triangular system with the first `j` columns of `L`, where the right-hand side is column `j`
//! of the column-permuted matrix.

use super::{
    ordering::{ColumnCountOrdering, FillReducingOrdering},
    triangular_solve::{self, Diag},
    *,
};
use crate::{
    assert,
    perm::{self, Perm, PermRef},
    MatMut, MatRef,
};
use dyn_stack::{GlobalPodBuffer, PodStack, SizeOverflow, StackReq};

/// Tuning parameters for the sparse LU decomposition.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LuParams {
    /// Threshold in `(0, 1]` for threshold partial pivoting.
    ///
    /// The diagonal candidate of a column is selected as the pivot if its magnitude is at least
    /// `pivot_threshold` times the largest magnitude among the candidates. Otherwise the candidate
    /// with the largest magnitude is selected. A value of `1.0` is standard partial pivoting.
    pub pivot_threshold: f64,
}

impl Default for LuParams {
    #[inline]
    fn default() -> Self {
        Self {
            pivot_threshold: 1.0,
        }
    }
}

/// Factors of a sparse LU decomposition.
#[derive(Clone, Debug)]
pub struct LuFactors<I: Index, E: ComplexField> {
    l: SparseColMat<I, E>,
    u: SparseColMat<I, E>,
    row_perm: Perm<I>,
    col_perm: Perm<I>,
}

impl<I: Index, E: ComplexField> LuFactors<I, E> {
    /// Returns the dimension of the decomposed matrix.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.l.nrows()
    }

    /// Returns the unit lower triangular factor `L`. The unit diagonal is stored explicitly.
    #[inline]
    pub fn l_factor(&self) -> SparseColMatRef<'_, I, E> {
        self.l.as_ref()
    }

    /// Returns the upper triangular factor `U`.
    #[inline]
    pub fn u_factor(&self) -> SparseColMatRef<'_, I, E> {
        self.u.as_ref()
    }

    /// Returns the row permutation `P`.
    #[inline]
    pub fn row_perm(&self) -> PermRef<'_, I> {
        self.row_perm.as_ref()
    }

    /// Returns the column permutation `Q`.
    #[inline]
    pub fn col_perm(&self) -> PermRef<'_, I> {
        self.col_perm.as_ref()
    }

    /// Solves the equation `A × X = rhs`, and stores the result in `rhs`.
    ///
    /// # Panics
    ///
    /// Panics if `rhs.nrows() != self.nrows()`.
    #[track_caller]
    pub fn solve_in_place(&self, rhs: MatMut<'_, E>) {
        let n = self.nrows();
        assert!(rhs.nrows() == n);
        let mut x = rhs;
        let mut work = vec![E::zero(); n];

        perm::permute_rows_in_place(x.rb_mut(), self.row_perm(), &mut work);
        triangular_solve::solve_lower_triangular_in_place(self.l_factor(), Diag::Unit, x.rb_mut());
        triangular_solve::solve_upper_triangular_in_place(
            self.u_factor(),
            Diag::NonUnit,
            x.rb_mut(),
        );
        perm::permute_rows_in_place(x.rb_mut(), self.col_perm().inverse(), &mut work);
    }

    /// Solves the equation `A.transpose() × X = rhs`, and stores the result in `rhs`.
    ///
    /// # Panics
    ///
    /// Panics if `rhs.nrows() != self.nrows()`.
    #[track_caller]
    pub fn solve_transpose_in_place(&self, rhs: MatMut<'_, E>) {
        let n = self.nrows();
        assert!(rhs.nrows() == n);
        let mut x = rhs;
        let mut work = vec![E::zero(); n];

        perm::permute_rows_in_place(x.rb_mut(), self.col_perm(), &mut work);
        triangular_solve::solve_upper_triangular_transpose_in_place(
            self.u_factor(),
            Diag::NonUnit,
            x.rb_mut(),
        );
        triangular_solve::solve_lower_triangular_transpose_in_place(
            self.l_factor(),
            Diag::Unit,
            x.rb_mut(),
        );
        perm::permute_rows_in_place(x.rb_mut(), self.row_perm().inverse(), &mut work);
    }

    /// Solves the equation `A × X = B` where `B` is sparse, and returns `X`.
    ///
    /// # Note
    /// Produces an unsorted output.
    ///
    /// # Panics
    ///
    /// Panics if `B.nrows() != self.nrows()`.
    #[track_caller]
    pub fn solve_sparse(
        &self,
        B: SparseColMatRef<'_, I, E>,
    ) -> Result<SparseColMat<I, E>, SparseError> {
        let n = self.nrows();
        assert!(B.nrows() == n);

        let mut mem = GlobalPodBuffer::try_new(
            triangular_solve::solve_sparse_rhs_req::<I, E>(n).map_err(oom)?,
        )
        .map_err(oom)?;
        let mut stack = PodStack::new(&mut mem);

        let PB = permute::permute_rows(B, self.row_perm())?;
        let Y = triangular_solve::solve_sparse_rhs(
            self.l_factor(),
            Diag::Unit,
            PB.as_ref(),
            stack.rb_mut(),
        )?;
        let Z = triangular_solve::solve_sparse_rhs(
            self.u_factor(),
            Diag::NonUnit,
            Y.as_ref(),
            stack.rb_mut(),
        )?;
        permute::permute_rows_inverse(Z.as_ref(), self.col_perm())
    }

    /// Returns the determinant of the decomposed matrix.
    pub fn determinant(&self) -> E {
        let mut det = self.row_perm().sign::<E>() * self.col_perm().sign::<E>();
        for j in 0..self.nrows() {
            det *= self.u.read(j, j);
        }
        det
    }
}

/// Computes the size and alignment of the workspace required to factorize a matrix with `nrows`
/// rows.
pub fn factorize_lu_req<I: Index, E: ComplexField>(
    nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    let idx = StackReq::try_new::<I>(nrows)?;
    let val = StackReq::try_new::<E>(nrows)?;
    StackReq::try_all_of([val, idx, idx, idx])
}

/// Depth-first search in the graph of the partial factor `l`, starting from the original row `b`.
///
/// `xi[..head]` is used as the search stack, and the visited rows are written to the tail of `xi`
/// in reverse post-order. Returns the new start of the tail.
fn depth_first_search<I: Index>(
    marked: &mut [I],
    mark: I,
    xi: &mut [I],
    l: SymbolicSparseColMatRef<'_, I>,
    row_perm_inv: &[I],
    b: usize,
    pos: &mut [I],
) -> usize {
    let I = I::truncate;

    let mut tail_start = xi.len();
    let mut head_len = 1usize;
    xi[0] = I(b);

    let li = l.row_indices();

    'dfs_loop: while head_len > 0 {
        let b = xi[head_len - 1].zx();
        let pb = row_perm_inv[b];

        let range = if pb == none::<I>() {
            0..0
        } else {
            l.col_range(pb.zx())
        };
        if marked[b] != mark {
            marked[b] = mark;
            pos[head_len - 1] = I(range.start);
        }

        let start = pos[head_len - 1].zx();
        for ptr in start..range.end {
            let i = li[ptr].zx();
            if marked[i] == mark {
                continue;
            }
            pos[head_len - 1] = I(ptr);
            xi[head_len] = I(i);
            head_len += 1;
            continue 'dfs_loop;
        }

        head_len -= 1;
        tail_start -= 1;
        xi[tail_start] = I(b);
    }

    tail_start
}

/// Solves `L × x = b` with the first columns of `L`, where `b` is sparse, and returns the start of
/// the nonzero pattern of `x` in `xi`.
///
/// `L` is indexed by original rows, and rows that are not pivoted yet are left untouched.
#[allow(clippy::too_many_arguments)]
fn l_incomplete_solve_sparse<I: Index, E: ComplexField>(
    marked: &mut [I],
    mark: I,
    xi: &mut [I],
    x: &mut [E],
    l: SparseColMatRef<'_, I, E>,
    row_perm_inv: &[I],
    bi: &[I],
    bx: &[E],
    pos: &mut [I],
) -> usize {
    let mut tail_start = xi.len();
    for &b in bi {
        let b = b.zx();
        if marked[b] != mark {
            tail_start = depth_first_search(
                marked,
                mark,
                &mut xi[..tail_start],
                l.symbolic(),
                row_perm_inv,
                b,
                pos,
            );
        }
    }

    for (&i, &b) in zip(bi, bx) {
        x[i.zx()] += b;
    }

    for &i in &xi[tail_start..] {
        let i = i.zx();
        let pi = row_perm_inv[i];
        if pi == none::<I>() {
            continue;
        }

        // the pivot is the first element of each column
        let li = l.row_indices_of_col_raw(pi.zx());
        let lx = l.values_of_col(pi.zx());
        let xi = x[i];
        for (&li, &lx) in zip(&li[1..], &lx[1..]) {
            x[li.zx()] -= lx * xi;
        }
    }

    tail_start
}

/// Computes the LU decomposition of the matrix `A`, whose columns are first permuted by
/// `col_perm`.
///
/// # Note
/// Allows unsorted matrices. The factors are sorted.
///
/// # Panics
///
/// Panics if `A` is not square, or if `col_perm.len() != A.ncols()`.
#[track_caller]
pub fn factorize_lu<I: Index, E: ComplexField>(
    A: SparseColMatRef<'_, I, E>,
    col_perm: PermRef<'_, I>,
    params: LuParams,
    stack: PodStack<'_>,
) -> Result<LuFactors<I, E>, LuError> {
    let I = I::truncate;

    assert!(all(A.nrows() == A.ncols(), col_perm.len() == A.ncols()));
    let n = A.ncols();
    let threshold = <E::Real as ComplexField>::from_f64(params.pivot_threshold);

    let (x, stack) = stack.make_raw::<E>(n);
    let (marked, stack) = stack.make_raw::<I>(n);
    let (xj, stack) = stack.make_raw::<I>(n);
    let (pos, _) = stack.make_raw::<I>(n);

    mem::fill_zero(x);
    mem::fill_none(marked);

    // step at which each original row was pivoted
    let mut row_perm_inv = try_filled(n, none::<I>())?;

    let mut l_col_ptr = try_zeroed::<I>(n + 1)?;
    let mut u_col_ptr = try_zeroed::<I>(n + 1)?;
    let mut l_row_ind = Vec::<I>::new();
    let mut u_row_ind = Vec::<I>::new();
    let mut l_val = Vec::<E>::new();
    let mut u_val = Vec::<E>::new();

    let col_perm_inv = col_perm.arrays().1;

    for j in 0..n {
        let l = SparseColMatRef::new(
            SymbolicSparseColMatRef::new_unchecked(n, j, &l_col_ptr[..j + 1], &l_row_ind, false),
            &l_val,
        );

        let pj = col_perm_inv[j].zx();
        let tail_start = l_incomplete_solve_sparse(
            marked,
            I(j),
            xj,
            x,
            l,
            &row_perm_inv,
            A.row_indices_of_col_raw(pj),
            A.values_of_col(pj),
            pos,
        );
        let pattern = &xj[tail_start..];

        let l_pos = l_row_ind.len();
        let u_pos = u_row_ind.len();
        check_index::<I>(l_pos + pattern.len() + 1)?;
        check_index::<I>(u_pos + pattern.len() + 1)?;
        try_reserve(&mut l_row_ind, pattern.len() + 1)?;
        try_reserve(&mut l_val, pattern.len() + 1)?;
        try_reserve(&mut u_row_ind, pattern.len() + 1)?;
        try_reserve(&mut u_val, pattern.len() + 1)?;

        let mut pivot_idx = None;
        let mut pivot_val = <E::Real as ComplexField>::zero();
        let mut diag_val = None;
        for &i in pattern {
            let i = i.zx();
            let xi = x[i];
            if row_perm_inv[i] == none::<I>() {
                let val = xi.abs();
                if pivot_idx.is_none() || val > pivot_val || !val.is_finite() {
                    pivot_idx = Some(i);
                    pivot_val = val;
                }
                if i == pj {
                    diag_val = Some(val);
                }
            } else {
                u_row_ind.push(row_perm_inv[i]);
                u_val.push(xi);
            }
        }

        let Some(mut pivot_idx) = pivot_idx else {
            log::debug!(target: "colsparse", "sparse LU: no pivot candidate in column {j}");
            return Err(LuError::SymbolicSingular(j));
        };
        if let Some(diag_val) = diag_val {
            if diag_val >= threshold * pivot_val {
                pivot_idx = pj;
            }
        }

        let x_piv = x[pivot_idx];
        if x_piv == E::zero() || !x_piv.is_finite() {
            log::debug!(target: "colsparse", "sparse LU: zero pivot in column {j}");
            return Err(LuError::ZeroPivot(j));
        }
        row_perm_inv[pivot_idx] = I(j);

        u_row_ind.push(I(j));
        u_val.push(x_piv);
        u_col_ptr[j + 1] = I(u_row_ind.len());

        l_row_ind.push(I(pivot_idx));
        l_val.push(E::one());

        let x_piv_inv = x_piv.inv();
        for &i in pattern {
            let i = i.zx();
            if row_perm_inv[i] == none::<I>() {
                l_row_ind.push(I(i));
                l_val.push(x[i] * x_piv_inv);
            }
            x[i] = E::zero();
        }
        l_col_ptr[j + 1] = I(l_row_ind.len());
    }

    for i in &mut l_row_ind {
        *i = row_perm_inv[i.zx()];
    }

    utils::sort_indices(&l_col_ptr, &mut l_row_ind, &mut l_val);
    utils::sort_indices(&u_col_ptr, &mut u_row_ind, &mut u_val);

    let mut row_perm_fwd = try_zeroed::<I>(n)?;
    for (old, &new) in row_perm_inv.iter().enumerate() {
        row_perm_fwd[new.zx()] = I(old);
    }
    // `row_perm_inv` maps each original row to its step, which is the forward permutation
    let row_perm = Perm::new_checked(row_perm_inv, row_perm_fwd);

    Ok(LuFactors {
        l: SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(n, n, l_col_ptr, l_row_ind, true),
            l_val,
        ),
        u: SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(n, n, u_col_ptr, u_row_ind, true),
            u_val,
        ),
        row_perm,
        col_perm: col_perm.to_owned(),
    })
}

/// A sparse matrix decomposition that can be used to solve linear systems.
pub trait SparseLuDecomposition<I: Index, E: ComplexField> {
    /// Computes the decomposition of `A`, replacing any previously stored decomposition.
    ///
    /// Returns `false` if the matrix could not be decomposed, e.g. because it is singular.
    fn decompose(&mut self, A: SparseColMatRef<'_, I, E>) -> bool;

    /// Returns `true` if a successful decomposition is currently stored.
    fn is_decomposed(&self) -> bool;

    /// Solves the system `A × X = rhs` in place, where `A` is the last matrix passed to
    /// [`Self::decompose`].
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored, or if the dimensions don't match.
    fn solve_in_place(&self, rhs: MatMut<'_, E>);

    /// Returns the determinant of the decomposed matrix.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored.
    fn determinant(&self) -> E;
}

/// Sparse LU decomposition with a fill-reducing column ordering and threshold partial pivoting.
#[derive(Clone, Debug)]
pub struct SparseLu<I: Index, E: ComplexField, O = ColumnCountOrdering> {
    ordering: O,
    params: LuParams,
    factors: Option<LuFactors<I, E>>,
}

impl<I: Index, E: ComplexField, O: Default> Default for SparseLu<I, E, O> {
    #[inline]
    fn default() -> Self {
        Self::with_ordering(O::default(), LuParams::default())
    }
}

impl<I: Index, E: ComplexField> SparseLu<I, E> {
    /// Creates an empty decomposition that uses the default column ordering and parameters.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: Index, E: ComplexField, O> SparseLu<I, E, O> {
    /// Creates an empty decomposition that uses the given column ordering and parameters.
    #[inline]
    pub fn with_ordering(ordering: O, params: LuParams) -> Self {
        Self {
            ordering,
            params,
            factors: None,
        }
    }

    /// Returns the parameters of the decomposition.
    #[inline]
    pub fn params(&self) -> LuParams {
        self.params
    }

    /// Returns the stored factors, if a successful decomposition is stored.
    #[inline]
    pub fn factors(&self) -> Option<&LuFactors<I, E>> {
        self.factors.as_ref()
    }

    #[inline]
    #[track_caller]
    fn decomposed(&self) -> &LuFactors<I, E> {
        match &self.factors {
            Some(factors) => factors,
            None => panic!("no decomposition is stored"),
        }
    }

    /// Returns the unit lower triangular factor `L`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored.
    #[track_caller]
    pub fn l_factor(&self) -> SparseColMatRef<'_, I, E> {
        self.decomposed().l_factor()
    }

    /// Returns the upper triangular factor `U`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored.
    #[track_caller]
    pub fn u_factor(&self) -> SparseColMatRef<'_, I, E> {
        self.decomposed().u_factor()
    }

    /// Returns the row permutation `P`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored.
    #[track_caller]
    pub fn row_perm(&self) -> PermRef<'_, I> {
        self.decomposed().row_perm()
    }

    /// Returns the column permutation `Q`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored.
    #[track_caller]
    pub fn col_perm(&self) -> PermRef<'_, I> {
        self.decomposed().col_perm()
    }

    /// Solves the equation `A.transpose() × X = rhs`, and stores the result in `rhs`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored, or if the dimensions don't match.
    #[track_caller]
    pub fn solve_transpose_in_place(&self, rhs: MatMut<'_, E>) {
        self.decomposed().solve_transpose_in_place(rhs)
    }

    /// Solves the equation `A × X = rhs` and returns `X`.
    ///
    /// # Panics
    ///
    /// Panics if no decomposition is stored, or if the dimensions don't match.
    #[track_caller]
    pub fn solve(&self, rhs: MatRef<'_, E>) -> Mat<E> {
        let mut x = rhs.to_owned();
        self.decomposed().solve_in_place(x.as_mut());
        x
    }

    /// Computes the decomposition of `A`, replacing any previously stored decomposition.
    ///
    /// On failure, no decomposition is stored.
    ///
    /// # Panics
    ///
    /// Panics if `A` is not square.
    #[track_caller]
    pub fn try_decompose(&mut self, A: SparseColMatRef<'_, I, E>) -> Result<(), LuError>
    where
        O: FillReducingOrdering<I>,
    {
        assert!(A.nrows() == A.ncols());
        self.factors = None;

        let col_perm = self.ordering.order(A.symbolic())?;
        let mut mem = GlobalPodBuffer::try_new(factorize_lu_req::<I, E>(A.nrows()).map_err(oom)?)
            .map_err(oom)?;
        let factors = factorize_lu(
            A,
            col_perm.as_ref(),
            self.params,
            PodStack::new(&mut mem),
        )?;
        self.factors = Some(factors);
        Ok(())
    }
}

impl<I: Index, E: ComplexField, O: FillReducingOrdering<I>> SparseLuDecomposition<I, E>
    for SparseLu<I, E, O>
{
    #[track_caller]
    fn decompose(&mut self, A: SparseColMatRef<'_, I, E>) -> bool {
        self.try_decompose(A).is_ok()
    }

    #[inline]
    fn is_decomposed(&self) -> bool {
        self.factors.is_some()
    }

    #[track_caller]
    fn solve_in_place(&self, rhs: MatMut<'_, E>) {
        self.decomposed().solve_in_place(rhs)
    }

    #[track_caller]
    fn determinant(&self) -> E {
        self.decomposed().determinant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert, c64, linalg::matmul::matmul as dense_matmul, mat,
        sparse::linalg::ordering::NaturalOrdering, Mat,
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn reconstruct<I: Index>(lu: &LuFactors<I, f64>) -> Mat<f64> {
        let n = lu.nrows();
        let mut LU = Mat::zeros(n, n);
        dense_matmul(
            LU.as_mut(),
            lu.l_factor().to_dense().as_ref(),
            lu.u_factor().to_dense().as_ref(),
            None,
            1.0,
        );
        // A = Pᵀ × L × U × Q
        let mut tmp = Mat::zeros(n, n);
        perm::permute_rows_inverse(tmp.as_mut(), LU.as_ref(), lu.row_perm());
        let tmp_t = tmp.transpose();
        let mut A_t = Mat::zeros(n, n);
        perm::permute_rows_inverse(A_t.as_mut(), tmp_t.as_ref(), lu.col_perm());
        A_t.transpose()
    }

    fn factors_reconstruct_the_matrix<I: Index>() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [1, 5, 20] {
            let A = test_utils::random_nonsingular::<I>(&mut rng, n, 0.2);
            let A = test_utils::shuffle_columns(&mut rng, A.as_ref());
            let mut lu = SparseLu::<I, f64>::new();
            assert!(lu.decompose(A.as_ref()));

            let factors = lu.factors().unwrap();
            test_utils::assert_valid(factors.l_factor());
            test_utils::assert_valid(factors.u_factor());
            assert!(all(factors.l_factor().is_sorted(), factors.u_factor().is_sorted()));
            for j in 0..n {
                assert!(factors.l_factor().row_indices_of_col(j).all(|i| i >= j));
                assert!(factors.u_factor().row_indices_of_col(j).all(|i| i <= j));
                assert!(factors.l_factor().read(j, j) == 1.0);
            }
            assert!((&reconstruct(factors) - &A.to_dense()).norm_max() < 1e-12);
        }
    }
    monomorphize_test!(factors_reconstruct_the_matrix);

    fn solves_match_dense<I: Index>() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 15;
        let A = test_utils::random_nonsingular::<I>(&mut rng, n, 0.15);
        let A_dense = A.to_dense();
        let b = Mat::from_fn(n, 2, |_, _| rng.gen::<f64>());

        let mut lu = SparseLu::<I, f64, NaturalOrdering>::default();
        assert!(lu.decompose(A.as_ref()));

        let x = lu.solve(b.as_ref());
        let mut Ax = Mat::zeros(n, 2);
        dense_matmul(Ax.as_mut(), A_dense.as_ref(), x.as_ref(), None, 1.0);
        assert!((&Ax - &b).norm_max() < 1e-12);

        let mut x = b.clone();
        lu.solve_transpose_in_place(x.as_mut());
        let mut Atx = Mat::zeros(n, 2);
        dense_matmul(Atx.as_mut(), A_dense.transpose().as_ref(), x.as_ref(), None, 1.0);
        assert!((&Atx - &b).norm_max() < 1e-12);

        let B = test_utils::random_sparse::<I>(&mut rng, n, 3, 0.2);
        let X = lu.factors().unwrap().solve_sparse(B.as_ref()).unwrap();
        test_utils::assert_valid(X.as_ref());
        let mut AX = Mat::zeros(n, 3);
        dense_matmul(AX.as_mut(), A_dense.as_ref(), X.to_dense().as_ref(), None, 1.0);
        assert!((&AX - &B.to_dense()).norm_max() < 1e-12);
    }
    monomorphize_test!(solves_match_dense);

    #[test]
    fn determinant_includes_permutation_signs() {
        let A = SparseColMat::<usize, f64>::from_dense(
            mat![[7.0, 2.0, 3.0], [0.0, 2.0, 0.0], [6.0, 3.0, 9.0]].as_ref(),
            0.0,
        )
        .unwrap();
        let mut lu = SparseLu::<usize, f64>::new();
        assert!(lu.decompose(A.as_ref()));
        assert!((lu.determinant() - 90.0).abs() < 1e-12);

        // swapping two rows flips the sign
        let B = SparseColMat::<usize, f64>::from_dense(
            mat![[0.0, 2.0, 0.0], [7.0, 2.0, 3.0], [6.0, 3.0, 9.0]].as_ref(),
            0.0,
        )
        .unwrap();
        assert!(lu.decompose(B.as_ref()));
        assert!((lu.determinant() + 90.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrices_are_reported() {
        // the second column is empty
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 0.0, 2.0], [3.0, 0.0, 4.0], [5.0, 0.0, 6.0]].as_ref(),
            0.0,
        )
        .unwrap();
        let mut lu = SparseLu::<u32, f64, NaturalOrdering>::default();
        assert!(lu.try_decompose(A.as_ref()) == Err(LuError::SymbolicSingular(1)));
        assert!(!lu.is_decomposed());

        // numerically singular: the second column is twice the first
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 2.0], [2.0, 4.0]].as_ref(),
            0.0,
        )
        .unwrap();
        assert!(lu.try_decompose(A.as_ref()) == Err(LuError::ZeroPivot(1)));
    }

    #[test]
    fn threshold_prefers_the_diagonal() {
        let A = SparseColMat::<usize, f64>::from_dense(
            mat![[0.6, 1.0], [1.0, 1.0]].as_ref(),
            0.0,
        )
        .unwrap();

        let mut lu = SparseLu::<usize, f64, NaturalOrdering>::default();
        assert!(lu.decompose(A.as_ref()));
        assert!(lu.row_perm().arrays().0 == &[1, 0]);

        let mut lu = SparseLu::<usize, f64, NaturalOrdering>::with_ordering(
            NaturalOrdering,
            LuParams {
                pivot_threshold: 0.5,
            },
        );
        assert!(lu.decompose(A.as_ref()));
        assert!(lu.row_perm().arrays().0 == &[0, 1]);
        assert!((lu.determinant() - (0.6 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn complex_lu() {
        let A = SparseColMat::<usize, c64>::try_new_from_triplets(
            2,
            2,
            &[
                (0, 0, c64::new(1.0, 1.0)),
                (1, 0, c64::new(0.0, 2.0)),
                (0, 1, c64::new(3.0, 0.0)),
                (1, 1, c64::new(1.0, -1.0)),
            ],
        )
        .unwrap();
        let mut lu = SparseLu::<usize, c64>::new();
        assert!(lu.decompose(A.as_ref()));
        // (1 + i)(1 - i) - 3 × 2i
        let expected = c64::new(2.0, -6.0);
        assert!((lu.determinant() - expected).abs() < 1e-12);
    }
}
