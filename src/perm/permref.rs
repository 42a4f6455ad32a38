use super::*;
use crate::assert;

/// Immutable permutation matrix view.
#[derive(Debug)]
pub struct PermRef<'a, I: Index> {
    pub(super) forward: &'a [I],
    pub(super) inverse: &'a [I],
}

impl<I: Index> Copy for PermRef<'_, I> {}
impl<I: Index> Clone for PermRef<'_, I> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'short, I: Index> Reborrow<'short> for PermRef<'_, I> {
    type Target = PermRef<'short, I>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'a, I: Index> PermRef<'a, I> {
    /// Creates a new permutation, by checking the validity of the inputs.
    ///
    /// # Panics
    ///
    /// The function panics if any of the following conditions are violated:
    /// `forward` and `inverse` must have the same length which must be less than `I::MAX`, be
    /// valid permutations, and be inverse permutations of each other.
    #[inline]
    #[track_caller]
    pub fn new_checked(forward: &'a [I], inverse: &'a [I]) -> Self {
        let n = forward.len();
        assert!(all(forward.len() == inverse.len(), n < I::MAX.zx()));
        for (i, &p) in forward.iter().enumerate() {
            let p = p.zx();
            assert!(p < n);
            assert!(inverse[p].zx() == i);
        }
        Self { forward, inverse }
    }

    /// Returns the forward and inverse permutation arrays.
    #[inline]
    pub fn arrays(self) -> (&'a [I], &'a [I]) {
        (self.forward, self.inverse)
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

    /// Returns an owned copy of the permutation.
    #[inline]
    pub fn to_owned(self) -> Perm<I> {
        Perm {
            forward: self.forward.to_vec(),
            inverse: self.inverse.to_vec(),
        }
    }

    /// Returns `true` if the permutation is odd, i.e. if it decomposes into an odd number of
    /// transpositions.
    ///
    /// The determinant of the corresponding permutation matrix is `-1` if the permutation is odd,
    /// and `1` otherwise.
    pub fn is_odd(self) -> bool {
        let n = self.len();
        let mut visited = vec![false; n];
        let mut transpositions = 0usize;
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut cycle_len = 0usize;
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                i = self.forward[i].zx();
                cycle_len += 1;
            }
            transpositions += cycle_len - 1;
        }
        transpositions % 2 == 1
    }

    /// Returns `-1` if the permutation is odd, and `1` otherwise.
    #[inline]
    pub fn sign<E: ComplexField>(self) -> E {
        if self.is_odd() {
            -E::one()
        } else {
            E::one()
        }
    }
}
