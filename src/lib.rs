//! `colsparse` is a matrix algebra crate built around compressed sparse column (CSC) kernels.
//!
//! The crate provides:
//! - sparse matrix structures ([`sparse::SparseColMat`], [`sparse::SparseColMatRef`], etc.) that
//!   track whether their row indices are sorted within each column,
//! - symbolic and numeric sparse matrix products and sums,
//! - row, column and symmetric permutations,
//! - a sparse LU based solve/invert/determinant pipeline, and a sparse QR decomposition for
//!   least squares problems,
//! - elementwise maps and reductions over the stored entries.
//!
//! A small dense column-major matrix type ([`Mat`]) is provided as the dense operand of the
//! sparse kernels. Dense products are computed with `gemm`.
//!
//! Kernels that need temporary memory take a [`dyn_stack::PodStack`] and come with a matching
//! `*_req` function returning the required [`dyn_stack::StackReq`]. A single buffer can be reused
//! across any number of calls.

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(non_snake_case)]

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use equator::{assert, debug_assert};

pub use dyn_stack;
pub use reborrow;

pub mod linalg;
pub mod mat;
pub mod perm;
pub mod sparse;

mod seal;

pub use mat::{Mat, MatMut, MatRef};

/// 32-bit complex floating point number.
#[allow(non_camel_case_types)]
pub type c32 = num_complex::Complex<f32>;
/// 64-bit complex floating point number.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;

/// Specifies whether the triangular lower or upper part of a matrix should be accessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Lower half should be accessed.
    Lower,
    /// Upper half should be accessed.
    Upper,
}

/// Unstable trait containing the operations that a number type needs to implement.
pub trait ComplexField:
    Copy
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + Send
    + Sync
    + Debug
    + bytemuck::Pod
    + 'static
{
    type Real: RealField;

    /// Returns a complex number whose real part is equal to `real`, and a zero imaginary part.
    fn from_real(real: Self::Real) -> Self;
    /// Returns the number closest to `value`, with a zero imaginary part.
    fn from_f64(value: f64) -> Self;
    /// Returns the real and imaginary part.
    fn into_real_imag(self) -> (Self::Real, Self::Real);
    /// Returns the real part.
    #[inline(always)]
    fn real(self) -> Self::Real {
        self.into_real_imag().0
    }
    /// Returns the imaginary part.
    #[inline(always)]
    fn imag(self) -> Self::Real {
        self.into_real_imag().1
    }

    /// Returns the value representing `0.0`.
    fn zero() -> Self;
    /// Returns the value representing `1.0`.
    fn one() -> Self;

    /// Returns the inverse of the number.
    fn inv(self) -> Self;
    /// Returns the conjugate of the number.
    fn conj(self) -> Self;
    /// Returns the square root of the number.
    fn sqrt(self) -> Self;
    /// Returns the input, scaled by `factor`.
    #[inline(always)]
    fn scale(self, factor: Self::Real) -> Self {
        self * Self::from_real(factor)
    }
    /// Returns the squared norm of the number.
    fn abs2(self) -> Self::Real;
    /// Returns the norm of the number.
    fn abs(self) -> Self::Real;
    /// Returns `true` if neither part of the number is infinite or NaN.
    fn is_finite(self) -> bool;
}

/// Unstable trait containing the operations that a real number type needs to implement.
pub trait RealField: ComplexField<Real = Self> + PartialOrd {
    /// Returns the machine epsilon.
    fn epsilon() -> Self;
}

macro_rules! impl_real {
    ($ty: ty) => {
        impl RealField for $ty {
            #[inline(always)]
            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
        }

        impl ComplexField for $ty {
            type Real = $ty;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                real
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn into_real_imag(self) -> (Self::Real, Self::Real) {
                (self, 0.0)
            }

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[inline(always)]
            fn one() -> Self {
                1.0
            }

            #[inline(always)]
            fn inv(self) -> Self {
                1.0 / self
            }

            #[inline(always)]
            fn conj(self) -> Self {
                self
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                self.sqrt()
            }

            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self * self
            }

            #[inline(always)]
            fn abs(self) -> Self::Real {
                self.abs()
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                self.is_finite()
            }
        }
    };
}

macro_rules! impl_complex {
    ($ty: ty, $real: ty) => {
        impl ComplexField for $ty {
            type Real = $real;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                Self { re: real, im: 0.0 }
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                Self {
                    re: value as $real,
                    im: 0.0,
                }
            }

            #[inline(always)]
            fn into_real_imag(self) -> (Self::Real, Self::Real) {
                (self.re, self.im)
            }

            #[inline(always)]
            fn zero() -> Self {
                Self { re: 0.0, im: 0.0 }
            }

            #[inline(always)]
            fn one() -> Self {
                Self { re: 1.0, im: 0.0 }
            }

            #[inline(always)]
            fn inv(self) -> Self {
                let norm2 = self.re * self.re + self.im * self.im;
                Self {
                    re: self.re / norm2,
                    im: -self.im / norm2,
                }
            }

            #[inline(always)]
            fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                num_complex::Complex::<$real>::sqrt(self)
            }

            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self.re * self.re + self.im * self.im
            }

            #[inline(always)]
            fn abs(self) -> Self::Real {
                self.re.hypot(self.im)
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                self.re.is_finite() && self.im.is_finite()
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);
impl_complex!(c32, f32);
impl_complex!(c64, f64);

/// Trait for unsigned integers that can be used as sparse matrix indices.
///
/// Values of this type are assumed to be strictly less than `Self::MAX`, which is reserved as a
/// sentinel by the sparse kernels.
pub trait Index:
    seal::Seal
    + Copy
    + Eq
    + Ord
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + bytemuck::Pod
    + 'static
{
    /// Maximum representable value.
    const MAX: Self;

    /// Truncate `value` to type [`Self`].
    fn truncate(value: usize) -> Self;

    /// Zero extend `self`.
    fn zx(self) -> usize;
}

macro_rules! impl_index {
    ($ty: ty) => {
        impl Index for $ty {
            const MAX: Self = <$ty>::MAX;

            #[inline(always)]
            fn truncate(value: usize) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn zx(self) -> usize {
                self as usize
            }
        }
    };
}

impl_index!(u32);
impl_index!(u64);
impl_index!(usize);

#[macro_export]
#[doc(hidden)]
macro_rules! __transpose_impl {
    ([$([$($col:expr),*])*] $($v:expr;)* ) => {
        [$([$($col,)*],)* [$($v,)*]]
    };
    ([$([$($col:expr),*])*] $($v0:expr, $($v:expr),* ;)*) => {
        $crate::__transpose_impl!([$([$($col),*])* [$($v0),*]] $($($v),* ;)*)
    };
}

/// Creates a [`Mat`] containing the arguments, given row by row.
///
/// ```
/// use colsparse::mat;
///
/// let matrix = mat![
///     [1.0, 5.0, 9.0],
///     [2.0, 6.0, 10.0f64],
/// ];
///
/// assert_eq!(matrix.read(0, 0), 1.0);
/// assert_eq!(matrix.read(1, 0), 2.0);
/// assert_eq!(matrix.read(0, 2), 9.0);
/// assert_eq!(matrix.read(1, 2), 10.0);
/// ```
#[macro_export]
macro_rules! mat {
    () => {
        {
            compile_error!("number of columns in the matrix is ambiguous");
        }
    };

    ($([$($v:expr),* $(,)?] ),* $(,)?) => {
        {
            let data = $crate::__transpose_impl!([] $($($v),* ;)*);
            let ncols = data.len();
            let nrows = data[0].len();
            $crate::mat::Mat::<_>::from_fn(nrows, ncols, |i, j| data[j][i])
        }
    };
}

#[cfg(feature = "perf-warn")]
#[macro_export]
#[doc(hidden)]
macro_rules! __perf_warn {
    ($name: ident) => {{
        #[inline(always)]
        #[allow(non_snake_case)]
        fn $name() -> &'static ::core::sync::atomic::AtomicBool {
            static $name: ::core::sync::atomic::AtomicBool =
                ::core::sync::atomic::AtomicBool::new(false);
            &$name
        }
        ::core::matches!(
            $name().compare_exchange(
                false,
                true,
                ::core::sync::atomic::Ordering::Relaxed,
                ::core::sync::atomic::Ordering::Relaxed,
            ),
            Ok(_)
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn complex_field_basics() {
        let z = c64 { re: 3.0, im: 4.0 };
        assert!(z.abs() == 5.0);
        assert!(z.abs2() == 25.0);
        assert!(z.conj() == c64 { re: 3.0, im: -4.0 });
        let w = z * z.inv();
        assert!((w - c64::one()).abs() < 1e-15);
        assert!(<f64 as ComplexField>::sqrt(4.0) == 2.0);
        assert!(!ComplexField::is_finite(f64::NAN));
    }

    #[test]
    fn mat_macro_is_row_major() {
        let m = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
        assert!(all(m.nrows() == 2, m.ncols() == 3));
        assert!(m.read(1, 0) == 4.0);
        assert!(m.read(0, 2) == 3.0);
    }
}
