//! Dense building blocks used by the sparse kernels: the matrix product behind the [`Mat`]
//! operators, and the Householder reflections of the sparse QR decomposition.
//!
//! [`Mat`]: crate::Mat

pub mod matmul;

pub(crate) mod householder;
