//! Dense column-major matrices.
//!
//! [`Mat`] owns its storage, while [`MatRef`] and [`MatMut`] are strided views. Transposing a view
//! swaps its strides and does not move any data.

use crate::{assert, ComplexField};
use core::ops::{Add, Mul, Neg, Sub};
use reborrow::*;

mod matmut;
mod matown;
mod matref;

pub use matmut::MatMut;
pub use matown::Mat;
pub use matref::MatRef;

#[inline(always)]
fn offset(row: usize, col: usize, row_stride: usize, col_stride: usize) -> usize {
    row * row_stride + col * col_stride
}

#[inline]
#[track_caller]
fn required_len(nrows: usize, ncols: usize, row_stride: usize, col_stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        offset(nrows - 1, ncols - 1, row_stride, col_stride) + 1
    }
}

impl<E: ComplexField> Mul<&Mat<E>> for &Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn mul(self, rhs: &Mat<E>) -> Self::Output {
        let mut out = Mat::zeros(self.nrows(), rhs.ncols());
        crate::linalg::matmul::matmul(out.as_mut(), self.as_ref(), rhs.as_ref(), None, E::one());
        out
    }
}

impl<E: ComplexField> Add<&Mat<E>> for &Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn add(self, rhs: &Mat<E>) -> Self::Output {
        assert!(all(self.nrows() == rhs.nrows(), self.ncols() == rhs.ncols()));
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| {
            self.read(i, j) + rhs.read(i, j)
        })
    }
}

impl<E: ComplexField> Sub<&Mat<E>> for &Mat<E> {
    type Output = Mat<E>;

    #[track_caller]
    fn sub(self, rhs: &Mat<E>) -> Self::Output {
        assert!(all(self.nrows() == rhs.nrows(), self.ncols() == rhs.ncols()));
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| {
            self.read(i, j) - rhs.read(i, j)
        })
    }
}

impl<E: ComplexField> Neg for &Mat<E> {
    type Output = Mat<E>;

    fn neg(self) -> Self::Output {
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| -self.read(i, j))
    }
}

impl<E: ComplexField> PartialEq for Mat<E> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl<E: ComplexField> PartialEq for MatRef<'_, E> {
    fn eq(&self, other: &Self) -> bool {
        if self.nrows() != other.nrows() || self.ncols() != other.ncols() {
            return false;
        }
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                if self.read(i, j) != other.read(i, j) {
                    return false;
                }
            }
        }
        true
    }
}

impl<E: ComplexField> core::fmt::Debug for MatRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct DebugRow<'a, E: ComplexField>(MatRef<'a, E>, usize);

        impl<E: ComplexField> core::fmt::Debug for DebugRow<'_, E> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut list = f.debug_list();
                for j in 0..self.0.ncols() {
                    list.entry(&self.0.read(self.1, j));
                }
                list.finish()
            }
        }

        let mut list = f.debug_list();
        for i in 0..self.nrows() {
            list.entry(&DebugRow(*self, i));
        }
        list.finish()
    }
}

impl<E: ComplexField> core::fmt::Debug for MatMut<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}

impl<E: ComplexField> core::fmt::Debug for Mat<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.as_ref(), f)
    }
}
