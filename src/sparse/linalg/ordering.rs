//! A good column ordering reduces the number of nonzeros created while factorizing a sparse matrix.
//!
//! Orderings are computed from the structure of the matrix alone, and are returned as a
//! permutation `q` where column `j` of the matrix becomes column `q[j]` of the reordered matrix.

use super::*;
use crate::perm::Perm;

/// Computes a column ordering of a sparse matrix, to be used before factorizing it.
pub trait FillReducingOrdering<I: Index> {
    /// Returns the column permutation to apply to `A`.
    fn order(&mut self, A: SymbolicSparseColMatRef<'_, I>) -> Result<Perm<I>, SparseError>;
}

/// Keeps the columns in their original order.
#[derive(Copy, Clone, Debug, Default)]
pub struct NaturalOrdering;

/// Orders the columns by increasing number of stored entries, keeping the relative order of
/// columns with the same count.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColumnCountOrdering;

impl<I: Index> FillReducingOrdering<I> for NaturalOrdering {
    fn order(&mut self, A: SymbolicSparseColMatRef<'_, I>) -> Result<Perm<I>, SparseError> {
        let n = A.ncols();
        let forward = try_collect((0..n).map(I::truncate))?;
        let inverse = try_collect((0..n).map(I::truncate))?;
        Ok(Perm::new_checked(forward, inverse))
    }
}

impl<I: Index> FillReducingOrdering<I> for ColumnCountOrdering {
    fn order(&mut self, A: SymbolicSparseColMatRef<'_, I>) -> Result<Perm<I>, SparseError> {
        let n = A.ncols();
        let mut inverse = try_collect((0..n).map(I::truncate))?;
        inverse.sort_by_key(|&j| A.col_range(j.zx()).len());

        let mut forward = try_zeroed::<I>(n)?;
        for (new, &old) in inverse.iter().enumerate() {
            forward[old.zx()] = I::truncate(new);
        }
        Ok(Perm::new_checked(forward, inverse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    fn column_count_is_stable<I: Index>() {
        // column nnz counts: 3, 1, 0, 1
        let (zero, one, two) = (I::truncate(0), I::truncate(1), I::truncate(2));
        let A = SparseColMat::<I, f64>::try_new_from_triplets(
            3,
            4,
            &[
                (zero, zero, 1.0),
                (one, zero, 1.0),
                (two, zero, 1.0),
                (two, one, 1.0),
                (zero, I::truncate(3), 1.0),
            ],
        )
        .unwrap();

        let perm = ColumnCountOrdering.order(A.symbolic()).unwrap();
        let (forward, inverse) = perm.into_arrays();
        let inverse: Vec<usize> = inverse.iter().map(|&j| j.zx()).collect();
        let forward: Vec<usize> = forward.iter().map(|&j| j.zx()).collect();
        assert!(inverse == [2, 1, 3, 0]);
        assert!(forward == [3, 1, 0, 2]);

        let natural = NaturalOrdering.order(A.symbolic()).unwrap();
        assert!(natural == Perm::identity(4));
    }
    monomorphize_test!(column_count_is_stable);
}
