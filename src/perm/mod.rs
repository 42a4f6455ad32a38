//! Permutation matrices.
//!
//! A permutation of dimension `n` is stored as two arrays: `forward`, where `forward[i]` is the
//! position that index `i` is moved to, and its inverse. Applying a permutation `p` to the rows of
//! a matrix `A` produces `B` such that `B[p[i], :] = A[i, :]`.

use crate::{assert, mat::*, ComplexField, Index};
use reborrow::*;

mod permown;
mod permref;

pub use permown::Perm;
pub use permref::PermRef;

/// Computes the permutation product `dst = P × src`, i.e. moves the row `i` of `src` to the row
/// `perm[i]` of `dst`.
///
/// # Panics
///
/// Panics if the dimensions of `dst`, `src` and `perm` don't match.
///
/// # Example
///
/// ```
/// use colsparse::{mat, perm::{permute_rows, Perm}, Mat};
///
/// let src = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0f64]];
/// let perm = Perm::<usize>::from_forward(vec![2, 0, 1]);
///
/// let mut dst = Mat::zeros(3, 2);
/// permute_rows(dst.as_mut(), src.as_ref(), perm.as_ref());
///
/// assert_eq!(dst, mat![[3.0, 4.0], [5.0, 6.0], [1.0, 2.0]]);
/// ```
#[track_caller]
pub fn permute_rows<I: Index, E: ComplexField>(
    dst: MatMut<'_, E>,
    src: MatRef<'_, E>,
    perm: PermRef<'_, I>,
) {
    assert!(all(
        src.nrows() == dst.nrows(),
        src.ncols() == dst.ncols(),
        perm.len() == src.nrows(),
    ));
    let mut dst = dst;
    let fwd = perm.arrays().0;
    for j in 0..src.ncols() {
        for (i, &p) in fwd.iter().enumerate() {
            dst.write(p.zx(), j, src.read(i, j));
        }
    }
}

/// Computes the permutation product `dst = P^-1 × src`, i.e. the row `i` of `dst` is the row
/// `perm[i]` of `src`.
///
/// # Panics
///
/// Panics if the dimensions of `dst`, `src` and `perm` don't match.
#[track_caller]
pub fn permute_rows_inverse<I: Index, E: ComplexField>(
    dst: MatMut<'_, E>,
    src: MatRef<'_, E>,
    perm: PermRef<'_, I>,
) {
    permute_rows(dst, src, perm.inverse())
}

/// Computes the permutation product `dst = P × rhs` in place, using `work` as scratch space.
///
/// # Panics
///
/// Panics if the dimensions of `rhs`, `work` and `perm` don't match.
#[track_caller]
pub(crate) fn permute_rows_in_place<I: Index, E: ComplexField>(
    rhs: MatMut<'_, E>,
    perm: PermRef<'_, I>,
    work: &mut [E],
) {
    assert!(all(perm.len() == rhs.nrows(), work.len() == rhs.nrows()));
    let mut rhs = rhs;
    let fwd = perm.arrays().0;
    for j in 0..rhs.ncols() {
        for (i, &p) in fwd.iter().enumerate() {
            work[p.zx()] = rhs.read(i, j);
        }
        for (i, &w) in work.iter().enumerate() {
            rhs.write(i, j, w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat, Mat};

    #[test]
    fn permute_rows_round_trip() {
        let src = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0f64]];
        let perm = Perm::<u32>::from_forward(vec![3, 1, 0, 2]);

        let mut dst = Mat::zeros(4, 2);
        permute_rows(dst.as_mut(), src.as_ref(), perm.as_ref());
        assert!(dst.read(3, 0) == 1.0);
        assert!(dst.read(0, 1) == 6.0);

        let mut back = Mat::zeros(4, 2);
        permute_rows_inverse(back.as_mut(), dst.as_ref(), perm.as_ref());
        assert!(back == src);

        let mut in_place = src.clone();
        let mut work = vec![0.0; 4];
        permute_rows_in_place(in_place.as_mut(), perm.as_ref(), &mut work);
        assert!(in_place == dst);
    }

    #[test]
    fn parity() {
        assert!(!Perm::<usize>::identity(5).as_ref().is_odd());
        assert!(Perm::<usize>::from_forward(vec![1, 0, 2]).as_ref().is_odd());
        assert!(!Perm::<usize>::from_forward(vec![1, 2, 0]).as_ref().is_odd());
        assert!(Perm::<u64>::from_forward(vec![3, 2, 1, 0, 4, 6, 5]).as_ref().is_odd());
    }
}
