//! Dense matrix multiplication.
//!
//! Products of `f32`, `f64`, `c32` and `c64` matrices are computed by the `gemm` crate, on the
//! calling thread. Other element types fall back to a column-oriented triple loop.

use crate::{assert, c32, c64, ComplexField, MatMut, MatRef};

/// Computes `[alpha * acc] + beta * lhs * rhs` with `gemm`.
///
/// # Safety
/// `E` and `T` must be the same type, and `acc` must not alias `lhs` or `rhs`.
#[inline]
unsafe fn gemm_as<E: ComplexField, T: 'static>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    rhs: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
) {
    let mut acc = acc;
    gemm::gemm(
        acc.nrows(),
        acc.ncols(),
        lhs.ncols(),
        acc.as_ptr_mut() as *mut T,
        acc.col_stride() as isize,
        acc.row_stride() as isize,
        alpha.is_some(),
        lhs.as_ptr() as *const T,
        lhs.col_stride() as isize,
        lhs.row_stride() as isize,
        rhs.as_ptr() as *const T,
        rhs.col_stride() as isize,
        rhs.row_stride() as isize,
        coe::coerce_static::<E, T>(alpha.unwrap_or(E::zero())),
        coe::coerce_static::<E, T>(beta),
        false,
        false,
        false,
        gemm::Parallelism::None,
    );
}

fn matmul_fallback<E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    rhs: MatRef<'_, E>,
    beta: E,
) {
    let mut acc = acc;
    for j in 0..rhs.ncols() {
        for k in 0..lhs.ncols() {
            let b = beta * rhs.read(k, j);
            for i in 0..lhs.nrows() {
                let v = acc.read(i, j);
                acc.write(i, j, v + lhs.read(i, k) * b);
            }
        }
    }
}

/// Computes the matrix product `[alpha * acc] + beta * lhs * rhs` and stores the result in `acc`.
///
/// If `alpha` is `None`, `acc` is overwritten instead of being read.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible for matrix multiplication.
#[track_caller]
pub fn matmul<E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
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
    if acc.nrows() == 0 || acc.ncols() == 0 {
        return;
    }

    if lhs.ncols() != 0 {
        // the element type is checked before each call, and `acc` is borrowed mutably
        unsafe {
            if coe::is_same::<E, f32>() {
                return gemm_as::<E, f32>(acc, lhs, rhs, alpha, beta);
            }
            if coe::is_same::<E, f64>() {
                return gemm_as::<E, f64>(acc, lhs, rhs, alpha, beta);
            }
            if coe::is_same::<E, c32>() {
                return gemm_as::<E, c32>(acc, lhs, rhs, alpha, beta);
            }
            if coe::is_same::<E, c64>() {
                return gemm_as::<E, c64>(acc, lhs, rhs, alpha, beta);
            }
        }
    }

    match alpha {
        Some(alpha) => {
            for j in 0..acc.ncols() {
                for i in 0..acc.nrows() {
                    let v = acc.read(i, j);
                    acc.write(i, j, alpha * v);
                }
            }
        }
        None => acc.fill_zero(),
    }
    matmul_fallback(acc, lhs, rhs, beta);
}
