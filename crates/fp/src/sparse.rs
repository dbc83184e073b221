use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

use crate::vector::FpVector;

/// A vector over $\mathbb{F}_2$ stored as the strictly increasing list of the indices of its
/// non-zero entries.
///
/// This is the column representation used for (co)boundary matrices. Addition is a symmetric
/// difference of the two index lists and only touches non-zero entries, so a column with a handful
/// of entries costs a handful of operations regardless of the ambient dimension.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector {
    entries: Vec<usize>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a list of indices that is already strictly increasing.
    pub fn from_sorted(entries: Vec<usize>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0] < w[1]));
        Self { entries }
    }

    /// Build a vector from arbitrary indices. Repeated indices cancel in pairs, so an index that
    /// occurs an even number of times does not appear in the result.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut entries: Vec<usize> = indices.into_iter().collect();
        entries.sort_unstable();
        let entries = entries
            .into_iter()
            .dedup_with_count()
            .filter(|(count, _)| count % 2 == 1)
            .map(|(_, x)| x)
            .collect();
        Self { entries }
    }

    pub fn from_dense(v: &FpVector) -> Self {
        Self {
            entries: v.iter_nonzero().collect(),
        }
    }

    pub fn to_dense(&self, len: usize) -> FpVector {
        FpVector::from_indices(len, self.entries.iter().copied())
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn num_nonzero(&self) -> usize {
        self.entries.len()
    }

    /// The largest index of a non-zero entry. This is the "low" of the column in the persistence
    /// literature.
    pub fn pivot(&self) -> Option<usize> {
        self.entries.last().copied()
    }

    pub fn entry(&self, index: usize) -> u32 {
        u32::from(self.entries.binary_search(&index).is_ok())
    }

    /// Flip the entry at `index`.
    pub fn add_basis_element(&mut self, index: usize) {
        match self.entries.binary_search(&index) {
            Ok(pos) => {
                self.entries.remove(pos);
            }
            Err(pos) => self.entries.insert(pos, index),
        }
    }

    /// Add `other` to `self`.
    pub fn add(&mut self, other: &SparseVector) {
        if other.is_zero() {
            return;
        }
        if self.is_zero() {
            self.entries.clone_from(&other.entries);
            return;
        }
        self.entries = self
            .entries
            .iter()
            .merge_join_by(&other.entries, |a, b| a.cmp(b))
            .filter_map(|x| match x {
                EitherOrBoth::Left(&i) | EitherOrBoth::Right(&i) => Some(i),
                EitherOrBoth::Both(..) => None,
            })
            .collect();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator + '_ {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.entries
    }
}

impl std::ops::AddAssign<&SparseVector> for SparseVector {
    fn add_assign(&mut self, other: &SparseVector) {
        self.add(other);
    }
}

impl FromIterator<usize> for SparseVector {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self::from_indices(iter)
    }
}

impl std::fmt::Display for SparseVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{{{}}}", self.entries.iter().format(", "))
    }
}

impl std::fmt::Debug for SparseVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
