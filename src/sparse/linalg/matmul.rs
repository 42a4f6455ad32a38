use super::*;
use crate::{assert, debug_assert, MatMut};
use dyn_stack::{GlobalPodBuffer, PodStack, SizeOverflow, StackReq};

/// Computes the size and alignment of the workspace required to compute the symbolic product of
/// a matrix with `lhs_nrows` rows by another matrix.
#[inline]
pub fn sparse_sparse_matmul_symbolic_req<I: Index>(
    lhs_nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<I>(lhs_nrows)
}

/// Computes the symbolic structure of the product `lhs × rhs`.
///
/// The first pass counts the distinct row indices of each output column to compute the column
/// pointers, and the second pass fills the row indices.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `lhs.ncols() != rhs.nrows()`.
#[track_caller]
pub fn sparse_sparse_matmul_symbolic<I: Index>(
    lhs: SymbolicSparseColMatRef<'_, I>,
    rhs: SymbolicSparseColMatRef<'_, I>,
    stack: PodStack<'_>,
) -> Result<SymbolicSparseColMat<I>, SparseError> {
    assert!(lhs.ncols() == rhs.nrows());

    let m = lhs.nrows();
    let n = rhs.ncols();

    let (marker, _) = stack.make_raw::<I>(m);
    mem::fill_none(marker);

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    let mut nnz = 0usize;
    for j in 0..n {
        let j_ = I::truncate(j);
        for k in rhs.row_indices_of_col(j) {
            for i in lhs.row_indices_of_col(k) {
                if marker[i] != j_ {
                    marker[i] = j_;
                    nnz += 1;
                }
            }
        }
        col_ptrs[j + 1] = check_index(nnz)?;
    }

    mem::fill_none(marker);
    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut pos = 0usize;
    for j in 0..n {
        let j_ = I::truncate(j);
        for k in rhs.row_indices_of_col(j) {
            for &i in lhs.row_indices_of_col_raw(k) {
                if marker[i.zx()] != j_ {
                    marker[i.zx()] = j_;
                    row_indices[pos] = i;
                    pos += 1;
                }
            }
        }
    }
    debug_assert!(pos == nnz);

    Ok(SymbolicSparseColMat::new_unchecked(
        m,
        n,
        col_ptrs,
        row_indices,
        false,
    ))
}

/// Computes the size and alignment of the workspace required to compute the numeric product
/// into a matrix with `dst_nrows` rows.
#[inline]
pub fn sparse_sparse_matmul_numeric_req<E: ComplexField>(
    dst_nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<E>(dst_nrows)
}

/// Computes `alpha × lhs × rhs` and stores the result in the values of `dst`.
///
/// The structure of `dst` must contain the structure of the product, e.g. as computed by
/// [`sparse_sparse_matmul_symbolic`]. Entries of `dst` that are not part of the product are set
/// to zero.
///
/// # Note
/// Allows unsorted matrices.
///
/// # Panics
///
/// Panics if the dimensions of `dst`, `lhs` and `rhs` don't match.
#[track_caller]
pub fn sparse_sparse_matmul_numeric<I: Index, E: ComplexField>(
    dst: SparseColMatMut<'_, I, E>,
    alpha: E,
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) {
    let (dst_symbolic, dst_values) = dst.parts_mut();
    assert!(all(
        lhs.nrows() == dst_symbolic.nrows(),
        rhs.ncols() == dst_symbolic.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    let m = lhs.nrows();
    let n = rhs.ncols();

    let (work, _) = stack.make_raw::<E>(m);
    mem::fill_zero(work);

    for j in 0..n {
        for (k, &b_kj) in zip(rhs.row_indices_of_col(j), rhs.values_of_col(j)) {
            let b_kj = b_kj * alpha;
            for (i, &a_ik) in zip(lhs.row_indices_of_col(k), lhs.values_of_col(k)) {
                work[i] += a_ik * b_kj;
            }
        }

        let range = dst_symbolic.col_range(j);
        for (i, dst) in zip(
            dst_symbolic.row_indices_of_col(j),
            &mut dst_values[range],
        ) {
            *dst = work[i];
        }

        for k in rhs.row_indices_of_col(j) {
            for i in lhs.row_indices_of_col(k) {
                work[i] = E::zero();
            }
        }
    }
}

/// Computes the size and alignment of the workspace required to compute the product of a
/// matrix with `lhs_nrows` rows by another matrix.
#[inline]
pub fn sparse_sparse_matmul_req<I: Index, E: ComplexField>(
    lhs_nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_any_of([
        sparse_sparse_matmul_symbolic_req::<I>(lhs_nrows)?,
        sparse_sparse_matmul_numeric_req::<E>(lhs_nrows)?,
    ])
}

/// Computes `alpha × lhs × rhs`, and returns the result.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `lhs.ncols() != rhs.nrows()`.
#[track_caller]
pub fn sparse_sparse_matmul<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    alpha: E,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    let mut stack = stack;
    let symbolic = sparse_sparse_matmul_symbolic(lhs.symbolic(), rhs.symbolic(), stack.rb_mut())?;
    let mut values = try_filled(symbolic.nnz(), E::zero())?;
    sparse_sparse_matmul_numeric(
        SparseColMatMut::new(symbolic.as_ref(), &mut values),
        alpha,
        lhs,
        rhs,
        stack,
    );
    Ok(SparseColMat::new(symbolic, values))
}

fn transposed<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    let nnz = mat.nnz();
    let mut col_ptrs = try_zeroed::<I>(mat.nrows() + 1)?;
    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut values = try_filled(nnz, E::zero())?;
    utils::transpose(&mut col_ptrs, &mut row_indices, &mut values, mat, stack);
    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(mat.ncols(), mat.nrows(), col_ptrs, row_indices, true),
        values,
    ))
}

/// Computes the size and alignment of the workspace required by
/// [`sparse_sparse_matmul_transpose_lhs`].
#[inline]
pub fn sparse_sparse_matmul_transpose_lhs_req<I: Index, E: ComplexField>(
    lhs_nrows: usize,
    lhs_ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_any_of([
        utils::transpose_req::<I>(lhs_nrows)?,
        sparse_sparse_matmul_req::<I, E>(lhs_ncols)?,
    ])
}

/// Computes `alpha × lhsᵀ × rhs`, and returns the result.
///
/// The transpose of `lhs` is materialized first.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `lhs.nrows() != rhs.nrows()`.
#[track_caller]
pub fn sparse_sparse_matmul_transpose_lhs<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    alpha: E,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(lhs.nrows() == rhs.nrows());
    let mut stack = stack;
    let lhs_t = transposed(lhs, stack.rb_mut())?;
    sparse_sparse_matmul(lhs_t.as_ref(), rhs, alpha, stack)
}

/// Computes the size and alignment of the workspace required by
/// [`sparse_sparse_matmul_transpose_rhs`].
#[inline]
pub fn sparse_sparse_matmul_transpose_rhs_req<I: Index, E: ComplexField>(
    lhs_nrows: usize,
    rhs_nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_any_of([
        utils::transpose_req::<I>(rhs_nrows)?,
        sparse_sparse_matmul_req::<I, E>(lhs_nrows)?,
    ])
}

/// Computes `alpha × lhs × rhsᵀ`, and returns the result.
///
/// The transpose of `rhs` is materialized first.
///
/// # Note
/// Allows unsorted matrices, and produces an unsorted output.
///
/// # Panics
///
/// Panics if `lhs.ncols() != rhs.ncols()`.
#[track_caller]
pub fn sparse_sparse_matmul_transpose_rhs<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    alpha: E,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(lhs.ncols() == rhs.ncols());
    let mut stack = stack;
    let rhs_t = transposed(rhs, stack.rb_mut())?;
    sparse_sparse_matmul(lhs, rhs_t.as_ref(), alpha, stack)
}

/// Computes the size and alignment of the workspace required by
/// [`sparse_sparse_matmul_transpose_both`].
#[inline]
pub fn sparse_sparse_matmul_transpose_both_req<I: Index, E: ComplexField>(
    rhs_nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_any_of([
        sparse_sparse_matmul_req::<I, E>(rhs_nrows)?,
        utils::transpose_req::<I>(rhs_nrows)?,
    ])
}

/// Computes `alpha × lhsᵀ × rhsᵀ`, and returns the result.
///
/// The product is computed as `(alpha × rhs × lhs)ᵀ`.
///
/// # Note
/// Allows unsorted matrices, and produces a sorted output.
///
/// # Panics
///
/// Panics if `lhs.nrows() != rhs.ncols()`.
#[track_caller]
pub fn sparse_sparse_matmul_transpose_both<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    alpha: E,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(lhs.nrows() == rhs.ncols());
    let mut stack = stack;
    let prod = sparse_sparse_matmul(rhs, lhs, alpha, stack.rb_mut())?;
    transposed(prod.as_ref(), stack)
}

#[inline]
fn scale_or_clear<E: ComplexField>(acc: &mut MatMut<'_, E>, alpha: Option<E>) {
    match alpha {
        Some(alpha) => {
            if alpha != E::one() {
                for j in 0..acc.ncols() {
                    for i in 0..acc.nrows() {
                        let value = acc.read(i, j);
                        acc.write(i, j, value * alpha);
                    }
                }
            }
        }
        None => acc.fill_zero(),
    }
}

/// Multiplies a sparse matrix `lhs` by a dense matrix `rhs`, and stores the result in `acc`.
///
/// Computes `acc = alpha × acc + beta × lhs × rhs` if `alpha` is `Some`, and
/// `acc = beta × lhs × rhs` otherwise.
///
/// # Note
/// Allows unsorted matrices.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible.
#[track_caller]
pub fn sparse_dense_matmul<I: Index, E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: SparseColMatRef<'_, I, E>,
    rhs: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
) {
    assert!(all(
        acc.nrows() == lhs.nrows(),
        acc.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    let mut acc = acc;
    scale_or_clear(&mut acc, alpha);

    for j in 0..rhs.ncols() {
        for depth in 0..lhs.ncols() {
            let rhs_kj = rhs.read(depth, j) * beta;
            for (i, &lhs_ik) in zip(lhs.row_indices_of_col(depth), lhs.values_of_col(depth)) {
                let value = acc.read(i, j);
                acc.write(i, j, value + lhs_ik * rhs_kj);
            }
        }
    }
}

/// Multiplies the transpose of a sparse matrix `lhs` by a dense matrix `rhs`, and stores the
/// result in `acc`.
///
/// Computes `acc = alpha × acc + beta × lhsᵀ × rhs` if `alpha` is `Some`, and
/// `acc = beta × lhsᵀ × rhs` otherwise.
///
/// # Note
/// Allows unsorted matrices.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible.
#[track_caller]
pub fn sparse_transpose_dense_matmul<I: Index, E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: SparseColMatRef<'_, I, E>,
    rhs: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
) {
    assert!(all(
        acc.nrows() == lhs.ncols(),
        acc.ncols() == rhs.ncols(),
        lhs.nrows() == rhs.nrows(),
    ));

    let mut acc = acc;
    scale_or_clear(&mut acc, alpha);

    for j in 0..rhs.ncols() {
        for i in 0..lhs.ncols() {
            let mut sum = E::zero();
            for (k, &lhs_ki) in zip(lhs.row_indices_of_col(i), lhs.values_of_col(i)) {
                sum += lhs_ki * rhs.read(k, j);
            }
            let value = acc.read(i, j);
            acc.write(i, j, value + sum * beta);
        }
    }
}

/// Multiplies a dense matrix `lhs` by a sparse matrix `rhs`, and stores the result in `acc`.
///
/// Computes `acc = alpha × acc + beta × lhs × rhs` if `alpha` is `Some`, and
/// `acc = beta × lhs × rhs` otherwise.
///
/// # Note
/// Allows unsorted matrices.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible.
#[track_caller]
pub fn dense_sparse_matmul<I: Index, E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    rhs: SparseColMatRef<'_, I, E>,
    alpha: Option<E>,
    beta: E,
) {
    assert!(all(
        acc.nrows() == lhs.nrows(),
        acc.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    let mut acc = acc;
    scale_or_clear(&mut acc, alpha);

    for j in 0..rhs.ncols() {
        for (depth, &rhs_kj) in zip(rhs.row_indices_of_col(j), rhs.values_of_col(j)) {
            let rhs_kj = rhs_kj * beta;
            for i in 0..lhs.nrows() {
                let value = acc.read(i, j);
                acc.write(i, j, value + lhs.read(i, depth) * rhs_kj);
            }
        }
    }
}

/// Computes the size and alignment of the workspace required by [`dot_inner_columns`].
#[inline]
pub fn dot_inner_columns_req<I: Index>(nrows: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<I>(nrows)
}

/// Computes the inner product of the column `col_a` of `a` with the column `col_b` of `b`,
/// without conjugation.
///
/// Sorted columns are merged directly, otherwise the column of `a` is scattered into the
/// workspace.
///
/// # Panics
///
/// Panics if `a.nrows() != b.nrows()`, or if the column indices are out of bounds.
#[track_caller]
pub fn dot_inner_columns<I: Index, E: ComplexField>(
    a: SparseColMatRef<'_, I, E>,
    col_a: usize,
    b: SparseColMatRef<'_, I, E>,
    col_b: usize,
    stack: PodStack<'_>,
) -> E {
    assert!(all(a.nrows() == b.nrows(), col_a < a.ncols(), col_b < b.ncols()));

    let a_rows = a.row_indices_of_col_raw(col_a);
    let a_values = a.values_of_col(col_a);
    let b_rows = b.row_indices_of_col_raw(col_b);
    let b_values = b.values_of_col(col_b);

    let mut sum = E::zero();
    if a.is_sorted() && b.is_sorted() {
        let (mut pa, mut pb) = (0usize, 0usize);
        while pa < a_rows.len() && pb < b_rows.len() {
            let (ia, ib) = (a_rows[pa], b_rows[pb]);
            if ia == ib {
                sum += a_values[pa] * b_values[pb];
            }
            pa += (ia <= ib) as usize;
            pb += (ib <= ia) as usize;
        }
    } else {
        let (position, _) = stack.make_raw::<I>(a.nrows());
        mem::fill_none(position);
        for (k, &i) in a_rows.iter().enumerate() {
            position[i.zx()] = I::truncate(k);
        }
        for (&i, &b_i) in zip(b_rows, b_values) {
            let k = position[i.zx()];
            if k != none::<I>() {
                sum += a_values[k.zx()] * b_i;
            }
        }
    }
    sum
}

/// Computes `alpha × lhs × rhs` with an internally allocated workspace.
pub(crate) fn sparse_sparse_matmul_alloc<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    alpha: E,
) -> Result<SparseColMat<I, E>, SparseError> {
    let mut mem = GlobalPodBuffer::try_new(
        sparse_sparse_matmul_req::<I, E>(lhs.nrows()).map_err(oom)?,
    )
    .map_err(oom)?;
    sparse_sparse_matmul(lhs, rhs, alpha, PodStack::new(&mut mem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, linalg::matmul::matmul, Mat};
    use rand::{rngs::StdRng, SeedableRng};

    fn stack_for<I: Index>(m: usize, n: usize, k: usize) -> GlobalPodBuffer {
        let req = StackReq::try_any_of([
            sparse_sparse_matmul_transpose_lhs_req::<I, f64>(k, m).unwrap(),
            sparse_sparse_matmul_transpose_rhs_req::<I, f64>(m, n).unwrap(),
            sparse_sparse_matmul_transpose_both_req::<I, f64>(n).unwrap(),
        ])
        .unwrap();
        GlobalPodBuffer::new(req)
    }

    fn dense_product(a: &Mat<f64>, b: &Mat<f64>, alpha: f64) -> Mat<f64> {
        let mut c = Mat::zeros(a.nrows(), b.ncols());
        matmul(c.as_mut(), a.as_ref(), b.as_ref(), None, alpha);
        c
    }

    fn products_match_dense<I: Index>() {
        let mut rng = StdRng::seed_from_u64(0);
        for (m, k, n) in [(5, 7, 4), (1, 1, 1), (8, 3, 9), (0, 3, 2), (3, 0, 2), (3, 2, 0)] {
            let mut mem = stack_for::<I>(m, n, k);
            let mut stack = PodStack::new(&mut mem);

            let A = test_utils::random_sparse::<I>(&mut rng, m, k, 0.4);
            let A = test_utils::shuffle_columns(&mut rng, A.as_ref());
            let B = test_utils::random_sparse::<I>(&mut rng, k, n, 0.4);
            let At = A.to_transposed().unwrap();
            let Bt = B.to_transposed().unwrap();
            let expected = dense_product(&A.to_dense(), &B.to_dense(), 2.0);

            let C = sparse_sparse_matmul(A.as_ref(), B.as_ref(), 2.0, stack.rb_mut()).unwrap();
            test_utils::assert_valid(C.as_ref());
            assert!(C.shape() == (m, n));
            assert!(test_utils::dist(C.as_ref(), &expected) < 1e-14);

            let C = sparse_sparse_matmul_transpose_lhs(At.as_ref(), B.as_ref(), 2.0, stack.rb_mut())
                .unwrap();
            test_utils::assert_valid(C.as_ref());
            assert!(test_utils::dist(C.as_ref(), &expected) < 1e-14);

            let C = sparse_sparse_matmul_transpose_rhs(A.as_ref(), Bt.as_ref(), 2.0, stack.rb_mut())
                .unwrap();
            test_utils::assert_valid(C.as_ref());
            assert!(test_utils::dist(C.as_ref(), &expected) < 1e-14);

            let C =
                sparse_sparse_matmul_transpose_both(At.as_ref(), Bt.as_ref(), 2.0, stack.rb_mut())
                    .unwrap();
            test_utils::assert_valid(C.as_ref());
            assert!(C.is_sorted());
            assert!(test_utils::dist(C.as_ref(), &expected) < 1e-14);
        }
    }
    monomorphize_test!(products_match_dense);

    #[test]
    fn workspace_is_reusable() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut mem = GlobalPodBuffer::new(sparse_sparse_matmul_req::<u32, f64>(10).unwrap());
        let mut stack = PodStack::new(&mut mem);
        let A = test_utils::random_sparse::<u32>(&mut rng, 10, 10, 0.3);
        let first = sparse_sparse_matmul(A.as_ref(), A.as_ref(), 1.0, stack.rb_mut()).unwrap();
        let B = test_utils::random_sparse::<u32>(&mut rng, 10, 6, 0.5);
        let _ = sparse_sparse_matmul(A.as_ref(), B.as_ref(), 1.0, stack.rb_mut()).unwrap();
        let second = sparse_sparse_matmul(A.as_ref(), A.as_ref(), 1.0, stack.rb_mut()).unwrap();
        assert!(first.col_ptrs() == second.col_ptrs());
        assert!(first.row_indices() == second.row_indices());
        assert!(first.values() == second.values());
    }

    #[test]
    fn numeric_into_wider_pattern() {
        let A = SparseColMat::<usize, f64>::try_new_from_triplets(
            2,
            2,
            &[(0, 0, 1.0), (1, 1, 2.0)],
        )
        .unwrap();
        let pattern = SymbolicSparseColMat::new_checked(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1]);
        let mut values = vec![7.0; 4];
        let mut mem = GlobalPodBuffer::new(sparse_sparse_matmul_numeric_req::<f64>(2).unwrap());
        sparse_sparse_matmul_numeric(
            SparseColMatMut::new(pattern.as_ref(), &mut values),
            1.0,
            A.as_ref(),
            A.as_ref(),
            PodStack::new(&mut mem),
        );
        assert!(values == vec![1.0, 0.0, 0.0, 4.0]);
    }

    fn sparse_dense_products<I: Index>() {
        let mut rng = StdRng::seed_from_u64(2);
        let A = test_utils::random_sparse::<I>(&mut rng, 6, 4, 0.5);
        let A_dense = A.to_dense();
        let B = Mat::from_fn(4, 3, |i, j| (i + 2 * j) as f64 - 2.0);
        let D = Mat::from_fn(3, 6, |i, j| (i * j) as f64 - 1.0);

        let mut acc = Mat::from_fn(6, 3, |_, _| 1.0);
        sparse_dense_matmul(acc.as_mut(), A.as_ref(), B.as_ref(), Some(2.0), 3.0);
        let mut expected = Mat::from_fn(6, 3, |_, _| 1.0);
        matmul(expected.as_mut(), A_dense.as_ref(), B.as_ref(), Some(2.0), 3.0);
        assert!((&acc - &expected).norm_max() < 1e-13);

        let mut acc = Mat::zeros(4, 3);
        let C = Mat::from_fn(6, 3, |i, j| (i + j) as f64);
        sparse_transpose_dense_matmul(acc.as_mut(), A.as_ref(), C.as_ref(), None, 1.0);
        let expected = dense_product(&A_dense.transpose(), &C, 1.0);
        assert!((&acc - &expected).norm_max() < 1e-13);

        let mut acc = Mat::zeros(3, 4);
        dense_sparse_matmul(acc.as_mut(), D.as_ref(), A.as_ref(), None, 1.0);
        let expected = dense_product(&D, &A_dense, 1.0);
        assert!((&acc - &expected).norm_max() < 1e-13);

        // A × Dᵀ through the transposed view of the dense operand
        let mut acc = Mat::zeros(6, 3);
        let E = Mat::from_fn(3, 4, |i, j| (i + j) as f64 - 3.0);
        sparse_dense_matmul(acc.as_mut(), A.as_ref(), E.as_ref().transpose(), None, 1.0);
        let expected = dense_product(&A_dense, &E.transpose(), 1.0);
        assert!((&acc - &expected).norm_max() < 1e-13);
    }
    monomorphize_test!(sparse_dense_products);

    #[test]
    fn dot_of_columns() {
        let mut rng = StdRng::seed_from_u64(3);
        let A = test_utils::random_sparse::<u32>(&mut rng, 20, 3, 0.5);
        let B = test_utils::random_sparse::<u32>(&mut rng, 20, 2, 0.5);
        let Bu = test_utils::shuffle_columns(&mut rng, B.as_ref());
        let (Ad, Bd) = (A.to_dense(), B.to_dense());

        let mut mem = GlobalPodBuffer::new(dot_inner_columns_req::<u32>(20).unwrap());
        let mut stack = PodStack::new(&mut mem);
        for ca in 0..3 {
            for cb in 0..2 {
                let expected: f64 = (0..20).map(|i| Ad.read(i, ca) * Bd.read(i, cb)).sum();
                let sorted = dot_inner_columns(A.as_ref(), ca, B.as_ref(), cb, stack.rb_mut());
                let unsorted = dot_inner_columns(A.as_ref(), ca, Bu.as_ref(), cb, stack.rb_mut());
                assert!((sorted - expected).abs() < 1e-14);
                assert!((unsorted - expected).abs() < 1e-14);
            }
        }
    }
}
