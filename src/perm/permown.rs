use super::*;
use crate::assert;

/// Permutation matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perm<I: Index> {
    pub(super) forward: Vec<I>,
    pub(super) inverse: Vec<I>,
}

impl<I: Index> Perm<I> {
    /// Convert `self` to a permutation view.
    #[inline]
    pub fn as_ref(&self) -> PermRef<'_, I> {
        PermRef {
            forward: &self.forward,
            inverse: &self.inverse,
        }
    }

    /// Creates a new permutation, by checking the validity of the inputs.
    ///
    /// # Panics
    ///
    /// See [`PermRef::new_checked`].
    #[inline]
    #[track_caller]
    pub fn new_checked(forward: Vec<I>, inverse: Vec<I>) -> Self {
        PermRef::new_checked(&forward, &inverse);
        Self { forward, inverse }
    }

    /// Creates a new permutation from its forward array, computing the inverse.
    ///
    /// # Panics
    ///
    /// Panics if `forward` is not a permutation of `0..forward.len()`.
    #[track_caller]
    pub fn from_forward(forward: Vec<I>) -> Self {
        let n = forward.len();
        assert!(n < I::MAX.zx());
        let none = I::MAX;
        let mut inverse = vec![none; n];
        for (i, &p) in forward.iter().enumerate() {
            let p = p.zx();
            assert!(p < n);
            assert!(inverse[p] == none);
            inverse[p] = I::truncate(i);
        }
        Self { forward, inverse }
    }

    /// Returns the identity permutation of dimension `n`.
    #[inline]
    pub fn identity(n: usize) -> Self {
        let forward: Vec<I> = (0..n).map(I::truncate).collect();
        Self {
            inverse: forward.clone(),
            forward,
        }
    }

    /// Returns the dimension of the permutation.
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns `true` if the permutation has dimension zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Returns the inverse permutation.
    #[inline]
    pub fn inverse(self) -> Self {
        Self {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    /// Returns the forward and inverse permutation arrays.
    #[inline]
    pub fn into_arrays(self) -> (Vec<I>, Vec<I>) {
        (self.forward, self.inverse)
    }
}
