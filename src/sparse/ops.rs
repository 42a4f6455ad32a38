use super::*;
use crate::{
    assert, debug_assert,
    sparse::linalg::matmul::{sparse_dense_matmul, sparse_sparse_matmul_alloc},
};
use core::ops::{Add, Mul, Sub};
use dyn_stack::{GlobalPodBuffer, PodStack, SizeOverflow, StackReq};

/// Computes the size and alignment of the workspace required to compute the union of the
/// structures of two matrices with `nrows` rows.
#[inline]
pub fn union_symbolic_req<I: Index>(nrows: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<I>(nrows)
}

/// Computes the union of the structures of `lhs` and `rhs`.
///
/// # Note
/// Allows unsorted matrices. If both inputs are sorted, their columns are merged and the output
/// is sorted. Otherwise the output is unsorted.
///
/// # Panics
///
/// Panics if `lhs` and `rhs` don't have matching dimensions.
#[track_caller]
pub fn union_symbolic<I: Index>(
    lhs: SymbolicSparseColMatRef<'_, I>,
    rhs: SymbolicSparseColMatRef<'_, I>,
    stack: PodStack<'_>,
) -> Result<SymbolicSparseColMat<I>, SparseError> {
    assert!(all(lhs.nrows() == rhs.nrows(), lhs.ncols() == rhs.ncols()));
    let m = lhs.nrows();
    let n = lhs.ncols();

    if lhs.is_sorted() && rhs.is_sorted() {
        let mut col_ptrs = try_zeroed::<I>(n + 1)?;
        let mut nnz = 0usize;
        for j in 0..n {
            let lhs = lhs.row_indices_of_col_raw(j);
            let rhs = rhs.row_indices_of_col_raw(j);

            let mut lhs_pos = 0usize;
            let mut rhs_pos = 0usize;
            while lhs_pos < lhs.len() && rhs_pos < rhs.len() {
                let lhs = lhs[lhs_pos];
                let rhs = rhs[rhs_pos];

                lhs_pos += (lhs <= rhs) as usize;
                rhs_pos += (rhs <= lhs) as usize;
                nnz += 1;
            }
            nnz += lhs.len() - lhs_pos;
            nnz += rhs.len() - rhs_pos;
            col_ptrs[j + 1] = check_index(nnz)?;
        }

        let mut row_indices = try_zeroed::<I>(nnz)?;
        let mut pos = 0usize;
        for j in 0..n {
            let lhs = lhs.row_indices_of_col_raw(j);
            let rhs = rhs.row_indices_of_col_raw(j);

            let mut lhs_pos = 0usize;
            let mut rhs_pos = 0usize;
            while lhs_pos < lhs.len() && rhs_pos < rhs.len() {
                let lhs = lhs[lhs_pos];
                let rhs = rhs[rhs_pos];

                row_indices[pos] = Ord::min(lhs, rhs);
                lhs_pos += (lhs <= rhs) as usize;
                rhs_pos += (rhs <= lhs) as usize;
                pos += 1;
            }
            for &i in lhs[lhs_pos..].iter().chain(&rhs[rhs_pos..]) {
                row_indices[pos] = i;
                pos += 1;
            }
        }
        debug_assert!(pos == nnz);

        return Ok(SymbolicSparseColMat::new_unchecked(
            m,
            n,
            col_ptrs,
            row_indices,
            true,
        ));
    }

    let (marker, _) = stack.make_raw::<I>(m);
    mem::fill_none(marker);

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    let mut nnz = 0usize;
    for j in 0..n {
        let j_ = I::truncate(j);
        for &i in lhs
            .row_indices_of_col_raw(j)
            .iter()
            .chain(rhs.row_indices_of_col_raw(j))
        {
            if marker[i.zx()] != j_ {
                marker[i.zx()] = j_;
                nnz += 1;
            }
        }
        col_ptrs[j + 1] = check_index(nnz)?;
    }

    mem::fill_none(marker);
    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut pos = 0usize;
    for j in 0..n {
        let j_ = I::truncate(j);
        for &i in lhs
            .row_indices_of_col_raw(j)
            .iter()
            .chain(rhs.row_indices_of_col_raw(j))
        {
            if marker[i.zx()] != j_ {
                marker[i.zx()] = j_;
                row_indices[pos] = i;
                pos += 1;
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

/// Computes the size and alignment of the workspace required to compute the numeric sum into a
/// matrix with `nrows` rows.
#[inline]
pub fn add_numeric_req<E: ComplexField>(nrows: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<E>(nrows)
}

/// Computes `alpha × lhs + beta × rhs` and stores the result in the values of `dst`.
///
/// The structure of `dst` must contain the union of the structures of `lhs` and `rhs`, e.g. as
/// computed by [`union_symbolic`]. Entries of `dst` that are in neither input are set to zero.
/// Entries that cancel out are kept as explicit zeros.
///
/// # Note
/// Allows unsorted matrices.
///
/// # Panics
///
/// Panics if `dst`, `lhs` and `rhs` don't have matching dimensions.
#[track_caller]
pub fn add_numeric<I: Index, E: ComplexField>(
    dst: SparseColMatMut<'_, I, E>,
    alpha: E,
    lhs: SparseColMatRef<'_, I, E>,
    beta: E,
    rhs: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) {
    let (dst_symbolic, dst_values) = dst.parts_mut();
    assert!(all(
        lhs.nrows() == rhs.nrows(),
        lhs.ncols() == rhs.ncols(),
        dst_symbolic.nrows() == lhs.nrows(),
        dst_symbolic.ncols() == lhs.ncols(),
    ));

    let (work, _) = stack.make_raw::<E>(lhs.nrows());
    mem::fill_zero(work);

    for j in 0..lhs.ncols() {
        for (i, &v) in zip(lhs.row_indices_of_col(j), lhs.values_of_col(j)) {
            work[i] += alpha * v;
        }
        for (i, &v) in zip(rhs.row_indices_of_col(j), rhs.values_of_col(j)) {
            work[i] += beta * v;
        }

        let range = dst_symbolic.col_range(j);
        for (i, dst) in zip(dst_symbolic.row_indices_of_col(j), &mut dst_values[range]) {
            *dst = work[i];
        }

        for i in lhs.row_indices_of_col(j).chain(rhs.row_indices_of_col(j)) {
            work[i] = E::zero();
        }
    }
}

/// Computes the size and alignment of the workspace required to compute the sum of two matrices
/// with `nrows` rows.
#[inline]
pub fn add_req<I: Index, E: ComplexField>(nrows: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_any_of([union_symbolic_req::<I>(nrows)?, add_numeric_req::<E>(nrows)?])
}

/// Computes `alpha × lhs + beta × rhs`, and returns the result.
///
/// # Note
/// Allows unsorted matrices. The output is sorted if both inputs are sorted.
///
/// # Panics
///
/// Panics if `lhs` and `rhs` don't have matching dimensions.
#[track_caller]
pub fn add<I: Index, E: ComplexField>(
    alpha: E,
    lhs: SparseColMatRef<'_, I, E>,
    beta: E,
    rhs: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    let mut stack = stack;
    let symbolic = union_symbolic(lhs.symbolic(), rhs.symbolic(), stack.rb_mut())?;
    let mut values = try_filled(symbolic.nnz(), E::zero())?;
    add_numeric(
        SparseColMatMut::new(symbolic.as_ref(), &mut values),
        alpha,
        lhs,
        beta,
        rhs,
        stack,
    );
    Ok(SparseColMat::new(symbolic, values))
}

/// Computes `alpha × lhs + beta × rhs`, and stores the result in `dst`.
///
/// `dst` is only modified if the computation succeeds.
///
/// # Panics
///
/// Panics if `dst`, `lhs` and `rhs` don't have matching dimensions.
#[track_caller]
pub fn add_into<I: Index, E: ComplexField>(
    dst: &mut SparseColMat<I, E>,
    alpha: E,
    lhs: SparseColMatRef<'_, I, E>,
    beta: E,
    rhs: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> Result<(), SparseError> {
    assert!(dst.shape() == lhs.shape());
    *dst = add(alpha, lhs, beta, rhs, stack)?;
    Ok(())
}

/// Computes the size and alignment of the workspace required to compute the elementwise product
/// of two matrices with `nrows` rows.
#[inline]
pub fn element_mult_req<I: Index, E: ComplexField>(
    nrows: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([StackReq::try_new::<I>(nrows)?, StackReq::try_new::<E>(nrows)?])
}

/// Computes the elementwise product of `lhs` and `rhs`, whose structure is the intersection of
/// the structures of the inputs.
///
/// # Note
/// Allows unsorted matrices. The entries of each column are in the order of `lhs`, so the output
/// is sorted if `lhs` is sorted.
///
/// # Panics
///
/// Panics if `lhs` and `rhs` don't have matching dimensions.
#[track_caller]
pub fn element_mult<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    rhs: SparseColMatRef<'_, I, E>,
    stack: PodStack<'_>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(lhs.nrows() == rhs.nrows(), lhs.ncols() == rhs.ncols()));
    let m = lhs.nrows();
    let n = lhs.ncols();

    let (marker, stack) = stack.make_raw::<I>(m);
    let (work, _) = stack.make_raw::<E>(m);
    mem::fill_none(marker);

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    let mut row_indices = Vec::new();
    let mut values = Vec::new();
    let capacity = Ord::min(lhs.nnz(), rhs.nnz());
    row_indices.try_reserve_exact(capacity).map_err(oom)?;
    values.try_reserve_exact(capacity).map_err(oom)?;

    for j in 0..n {
        let j_ = I::truncate(j);
        for (i, &v) in zip(rhs.row_indices_of_col(j), rhs.values_of_col(j)) {
            marker[i] = j_;
            work[i] = v;
        }
        for (&i, &v) in zip(lhs.row_indices_of_col_raw(j), lhs.values_of_col(j)) {
            if marker[i.zx()] == j_ {
                row_indices.push(i);
                values.push(v * work[i.zx()]);
            }
        }
        col_ptrs[j + 1] = I::truncate(row_indices.len());
    }

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(m, n, col_ptrs, row_indices, lhs.is_sorted()),
        values,
    ))
}

/// Returns the matrix `[top; bottom]`, where `bottom` is placed below `top`.
///
/// # Note
/// The output is sorted if both inputs are sorted.
///
/// # Panics
///
/// Panics if `top.ncols() != bottom.ncols()`.
#[track_caller]
pub fn concat_rows<I: Index, E: ComplexField>(
    top: SparseColMatRef<'_, I, E>,
    bottom: SparseColMatRef<'_, I, E>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(top.ncols() == bottom.ncols());
    let m = top.nrows() + bottom.nrows();
    let n = top.ncols();
    check_index::<I>(m)?;
    let nnz = top.nnz() + bottom.nnz();
    check_index::<I>(nnz)?;

    let offset = I::truncate(top.nrows());
    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut values = try_filled(nnz, E::zero())?;

    let mut pos = 0usize;
    for j in 0..n {
        for (&i, &v) in zip(top.row_indices_of_col_raw(j), top.values_of_col(j)) {
            row_indices[pos] = i;
            values[pos] = v;
            pos += 1;
        }
        for (&i, &v) in zip(bottom.row_indices_of_col_raw(j), bottom.values_of_col(j)) {
            row_indices[pos] = i + offset;
            values[pos] = v;
            pos += 1;
        }
        col_ptrs[j + 1] = I::truncate(pos);
    }

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(
            m,
            n,
            col_ptrs,
            row_indices,
            top.is_sorted() && bottom.is_sorted(),
        ),
        values,
    ))
}

/// Returns the matrix `[left, right]`, where `right` is placed to the right of `left`.
///
/// # Note
/// The output is sorted if both inputs are sorted.
///
/// # Panics
///
/// Panics if `left.nrows() != right.nrows()`.
#[track_caller]
pub fn concat_cols<I: Index, E: ComplexField>(
    left: SparseColMatRef<'_, I, E>,
    right: SparseColMatRef<'_, I, E>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(left.nrows() == right.nrows());
    let n = left.ncols() + right.ncols();
    check_index::<I>(n)?;
    let nnz = left.nnz() + right.nnz();
    check_index::<I>(nnz)?;

    let left_nnz = I::truncate(left.nnz());
    let col_ptrs = try_collect(
        left.col_ptrs()
            .iter()
            .copied()
            .chain(right.col_ptrs()[1..].iter().map(|&p| p + left_nnz)),
    )?;
    let row_indices = try_collect(left.row_indices().iter().chain(right.row_indices()).copied())?;
    let values = try_collect(left.values()[..left.nnz()].iter().chain(&right.values()[..right.nnz()]).copied())?;

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(
            left.nrows(),
            n,
            col_ptrs,
            row_indices,
            left.is_sorted() && right.is_sorted(),
        ),
        values,
    ))
}

/// Returns the submatrix of `mat` with the given rows and columns.
///
/// # Note
/// Preserves sortedness.
///
/// # Panics
///
/// Panics if `rows` or `cols` is out of bounds.
#[track_caller]
pub fn submatrix<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    rows: Range<usize>,
    cols: Range<usize>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(
        rows.start <= rows.end,
        rows.end <= mat.nrows(),
        cols.start <= cols.end,
        cols.end <= mat.ncols(),
    ));
    let m = rows.len();
    let n = cols.len();

    let mut col_ptrs = try_zeroed::<I>(n + 1)?;
    let mut nnz = 0usize;
    for (k, j) in cols.clone().enumerate() {
        nnz += mat
            .row_indices_of_col(j)
            .filter(|i| rows.contains(i))
            .count();
        col_ptrs[k + 1] = I::truncate(nnz);
    }

    let mut row_indices = try_zeroed::<I>(nnz)?;
    let mut values = try_filled(nnz, E::zero())?;
    let mut pos = 0usize;
    for j in cols {
        for (i, &v) in zip(mat.row_indices_of_col(j), mat.values_of_col(j)) {
            if rows.contains(&i) {
                row_indices[pos] = I::truncate(i - rows.start);
                values[pos] = v;
                pos += 1;
            }
        }
    }
    debug_assert!(pos == nnz);

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(m, n, col_ptrs, row_indices, mat.is_sorted()),
        values,
    ))
}

/// Returns the rows of `mat` in the range `rows`.
///
/// # Note
/// Preserves sortedness.
///
/// # Panics
///
/// Panics if `rows` is out of bounds.
#[track_caller]
pub fn extract_rows<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    rows: Range<usize>,
) -> Result<SparseColMat<I, E>, SparseError> {
    submatrix(mat, rows, 0..mat.ncols())
}

/// Returns the columns of `mat` in the range `cols`.
///
/// # Note
/// Preserves sortedness.
///
/// # Panics
///
/// Panics if `cols` is out of bounds.
#[track_caller]
pub fn extract_cols<I: Index, E: ComplexField>(
    mat: SparseColMatRef<'_, I, E>,
    cols: Range<usize>,
) -> Result<SparseColMat<I, E>, SparseError> {
    assert!(all(cols.start <= cols.end, cols.end <= mat.ncols()));
    let start = mat.col_ptrs()[cols.start];
    let range = start.zx()..mat.col_ptrs()[cols.end].zx();

    let col_ptrs = try_collect(mat.col_ptrs()[cols.start..cols.end + 1].iter().map(|&p| p - start))?;
    let row_indices = try_collect(mat.row_indices()[range.clone()].iter().copied())?;
    let values = try_collect(mat.values()[range].iter().copied())?;

    Ok(SparseColMat::new(
        SymbolicSparseColMat::new_unchecked(
            mat.nrows(),
            cols.len(),
            col_ptrs,
            row_indices,
            mat.is_sorted(),
        ),
        values,
    ))
}

#[track_caller]
fn add_alloc<I: Index, E: ComplexField>(
    lhs: SparseColMatRef<'_, I, E>,
    beta: E,
    rhs: SparseColMatRef<'_, I, E>,
) -> Result<SparseColMat<I, E>, SparseError> {
    let mut mem =
        GlobalPodBuffer::try_new(add_req::<I, E>(lhs.nrows()).map_err(oom)?).map_err(oom)?;
    add(E::one(), lhs, beta, rhs, PodStack::new(&mut mem))
}

#[track_caller]
fn or_panic<T>(result: Result<T, SparseError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("sparse operation failed: {err}"),
    }
}

macro_rules! impl_sparse_binop {
    ($lhs: ty, $rhs: ty) => {
        impl<I: Index, E: ComplexField> Add<$rhs> for $lhs {
            type Output = SparseColMat<I, E>;

            #[track_caller]
            fn add(self, rhs: $rhs) -> Self::Output {
                or_panic(add_alloc(self.as_ref(), E::one(), rhs.as_ref()))
            }
        }

        impl<I: Index, E: ComplexField> Sub<$rhs> for $lhs {
            type Output = SparseColMat<I, E>;

            #[track_caller]
            fn sub(self, rhs: $rhs) -> Self::Output {
                or_panic(add_alloc(self.as_ref(), -E::one(), rhs.as_ref()))
            }
        }

        impl<I: Index, E: ComplexField> Mul<$rhs> for $lhs {
            type Output = SparseColMat<I, E>;

            #[track_caller]
            fn mul(self, rhs: $rhs) -> Self::Output {
                or_panic(sparse_sparse_matmul_alloc(
                    self.as_ref(),
                    rhs.as_ref(),
                    E::one(),
                ))
            }
        }
    };
}

impl_sparse_binop!(SparseColMatRef<'_, I, E>, SparseColMatRef<'_, I, E>);
impl_sparse_binop!(&SparseColMat<I, E>, &SparseColMat<I, E>);

macro_rules! impl_sparse_dense_mul {
    ($lhs: ty, $rhs: ty) => {
        impl<I: Index, E: ComplexField> Mul<$rhs> for $lhs {
            type Output = Mat<E>;

            #[track_caller]
            fn mul(self, rhs: $rhs) -> Self::Output {
                let lhs = self.as_ref();
                let mut out = Mat::zeros(lhs.nrows(), rhs.ncols());
                sparse_dense_matmul(out.as_mut(), lhs, rhs.as_ref(), None, E::one());
                out
            }
        }
    };
}

impl_sparse_dense_mul!(SparseColMatRef<'_, I, E>, MatRef<'_, E>);
impl_sparse_dense_mul!(&SparseColMat<I, E>, &Mat<E>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat};
    use rand::{rngs::StdRng, SeedableRng};

    fn add_matches_dense<I: Index>() {
        let mut rng = StdRng::seed_from_u64(0);
        let A = test_utils::random_sparse::<I>(&mut rng, 6, 5, 0.4);
        let B = test_utils::random_sparse::<I>(&mut rng, 6, 5, 0.4);
        let (A_dense, B_dense) = (A.to_dense(), B.to_dense());
        let expected = Mat::from_fn(6, 5, |i, j| 2.0 * A_dense.read(i, j) - B_dense.read(i, j));

        let mut mem = GlobalPodBuffer::new(add_req::<I, f64>(6).unwrap());
        let mut stack = PodStack::new(&mut mem);

        let C = add(2.0, A.as_ref(), -1.0, B.as_ref(), stack.rb_mut()).unwrap();
        test_utils::assert_valid(C.as_ref());
        assert!(C.is_sorted());
        assert!(test_utils::dist(C.as_ref(), &expected) < 1e-15);

        let A_unsorted = test_utils::shuffle_columns(&mut rng, A.as_ref());
        let C = add(2.0, A_unsorted.as_ref(), -1.0, B.as_ref(), stack.rb_mut()).unwrap();
        test_utils::assert_valid(C.as_ref());
        assert!(!C.is_sorted());
        assert!(test_utils::dist(C.as_ref(), &expected) < 1e-15);

        let mut D = SparseColMat::zeros(6, 5);
        add_into(&mut D, 2.0, A.as_ref(), -1.0, B.as_ref(), stack.rb_mut()).unwrap();
        assert!(test_utils::dist(D.as_ref(), &expected) < 1e-15);

        assert!(test_utils::dist((&A + &B).as_ref(), &(&A_dense + &B_dense)) < 1e-15);
        assert!(test_utils::dist((&A - &B).as_ref(), &(&A_dense - &B_dense)) < 1e-15);
    }
    monomorphize_test!(add_matches_dense);

    #[test]
    fn cancellation_keeps_explicit_zeros() {
        let A = SparseColMat::<u32, f64>::from_dense(
            mat![[1.0, 0.0, 0.0], [2.0, 3.0, 0.0]].as_ref(),
            0.0,
        )
        .unwrap();
        // the last column of both operands is empty
        assert!(A.col_range(2).is_empty());

        let C = &A - &A;
        test_utils::assert_valid(C.as_ref());
        assert!(C.nnz() == 3);
        assert!(C.col_ptrs() == &[0, 2, 3, 3]);
        assert!(C.values().iter().all(|&v| v == 0.0));

        let mut C = C;
        C.remove_zeros(0.0);
        assert!(C.nnz() == 0);
        assert!(C.col_ptrs() == &[0, 0, 0, 0]);
    }

    #[test]
    fn union_of_unsorted_patterns() {
        let lhs = SymbolicSparseColMat::<usize>::new_unsorted_checked(4, 2, vec![0, 2, 3], vec![3, 0, 1]);
        let rhs = SymbolicSparseColMat::<usize>::new_checked(4, 2, vec![0, 2, 2], vec![0, 2]);
        let mut mem = GlobalPodBuffer::new(union_symbolic_req::<usize>(4).unwrap());
        let union = union_symbolic(lhs.as_ref(), rhs.as_ref(), PodStack::new(&mut mem)).unwrap();
        assert!(!union.is_sorted());
        assert!(union.check_structure() == Ok(()));
        assert!(union.col_ptrs() == &[0, 3, 4]);
        let mut col0: Vec<usize> = union.row_indices_of_col(0).collect();
        col0.sort();
        assert!(col0 == [0, 2, 3]);
    }

    fn element_mult_is_intersection<I: Index>() {
        let mut rng = StdRng::seed_from_u64(1);
        let A = test_utils::random_sparse::<I>(&mut rng, 7, 4, 0.5);
        let B = test_utils::random_sparse::<I>(&mut rng, 7, 4, 0.5);
        let mut mem = GlobalPodBuffer::new(element_mult_req::<I, f64>(7).unwrap());
        let C = element_mult(A.as_ref(), B.as_ref(), PodStack::new(&mut mem)).unwrap();
        test_utils::assert_valid(C.as_ref());
        for j in 0..4 {
            for i in 0..7 {
                assert!(C.is_assigned(i, j) == (A.is_assigned(i, j) && B.is_assigned(i, j)));
                assert!(C.read(i, j) == A.read(i, j) * B.read(i, j));
            }
        }
    }
    monomorphize_test!(element_mult_is_intersection);

    fn concat_and_extract<I: Index>() {
        let mut rng = StdRng::seed_from_u64(2);
        let A = test_utils::random_sparse::<I>(&mut rng, 4, 3, 0.5);
        let B = test_utils::random_sparse::<I>(&mut rng, 2, 3, 0.5);
        let C = test_utils::random_sparse::<I>(&mut rng, 4, 5, 0.5);

        let AB = concat_rows(A.as_ref(), B.as_ref()).unwrap();
        test_utils::assert_valid(AB.as_ref());
        assert!(AB.shape() == (6, 3));
        assert!(extract_rows(AB.as_ref(), 0..4).unwrap().to_dense() == A.to_dense());
        assert!(extract_rows(AB.as_ref(), 4..6).unwrap().to_dense() == B.to_dense());

        let AC = concat_cols(A.as_ref(), C.as_ref()).unwrap();
        test_utils::assert_valid(AC.as_ref());
        assert!(AC.shape() == (4, 8));
        assert!(extract_cols(AC.as_ref(), 0..3).unwrap().to_dense() == A.to_dense());
        let tail = extract_cols(AC.as_ref(), 3..8).unwrap();
        test_utils::assert_valid(tail.as_ref());
        assert!(tail.to_dense() == C.to_dense());

        let sub = submatrix(AC.as_ref(), 1..3, 2..6).unwrap();
        test_utils::assert_valid(sub.as_ref());
        assert!(sub.to_dense() == AC.to_dense().as_ref().submatrix(1, 2, 2, 4).to_owned());

        let empty = extract_cols(AC.as_ref(), 5..5).unwrap();
        assert!(all(empty.shape() == (4, 0), empty.nnz() == 0));
    }
    monomorphize_test!(concat_and_extract);

    #[test]
    fn operators_match_kernels() {
        let mut rng = StdRng::seed_from_u64(3);
        let A = test_utils::random_sparse::<u64>(&mut rng, 5, 4, 0.5);
        let B = test_utils::random_sparse::<u64>(&mut rng, 4, 3, 0.5);
        let x = Mat::from_fn(4, 2, |i, j| (i + j) as f64);

        let AB = &A * &B;
        assert!((&AB.to_dense() - &(&A.to_dense() * &B.to_dense())).norm_max() < 1e-15);

        let Ax = &A * &x;
        assert!((&Ax - &(&A.to_dense() * &x)).norm_max() < 1e-15);

        let Ax_view = A.as_ref() * x.as_ref();
        assert!(Ax_view == Ax);
    }
}
