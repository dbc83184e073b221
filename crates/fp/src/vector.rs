use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::limb::{self, Limb, BITS_PER_LIMB};

/// A dense vector over $\mathbb{F}_2$, with entries packed into limbs.
///
/// Bits beyond `len` in the last limb are always zero, so equality and hashing can work on the
/// limbs directly.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FpVector {
    len: usize,
    limbs: Vec<Limb>,
}

impl FpVector {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            limbs: vec![0; limb::number(len)],
        }
    }

    /// Build a vector from a slice of entries, each of which is reduced mod 2.
    pub fn from_slice(slice: &[u32]) -> Self {
        let mut result = Self::new(slice.len());
        for (i, &x) in slice.iter().enumerate() {
            result.set_entry(i, x);
        }
        result
    }

    /// Build a vector of length `len` whose non-zero entries are at `indices`. Repeated indices
    /// cancel in pairs.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut result = Self::new(len);
        for i in indices {
            result.add_basis_element(i);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entry(&self, index: usize) -> u32 {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        let pair = limb::limb_bit_index_pair(index);
        ((self.limbs[pair.limb] >> pair.bit_index) & 1) as u32
    }

    pub fn set_entry(&mut self, index: usize, value: u32) {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        let pair = limb::limb_bit_index_pair(index);
        let mask = 1 << pair.bit_index;
        if value % 2 == 1 {
            self.limbs[pair.limb] |= mask;
        } else {
            self.limbs[pair.limb] &= !mask;
        }
    }

    /// Add the `index`th basis vector, i.e. flip the entry at `index`.
    pub fn add_basis_element(&mut self, index: usize) {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        let pair = limb::limb_bit_index_pair(index);
        self.limbs[pair.limb] ^= 1 << pair.bit_index;
    }

    /// Add `other` to `self`. Both vectors must have the same length.
    pub fn add(&mut self, other: &FpVector) {
        assert_eq!(self.len, other.len);
        for (a, b) in self.limbs.iter_mut().zip(&other.limbs) {
            *a ^= *b;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&x| x == 0)
    }

    /// The dot product of `self` and `other`, i.e. the parity of their common support.
    pub fn dot(&self, other: &FpVector) -> u32 {
        assert_eq!(self.len, other.len);
        self.limbs
            .iter()
            .zip(&other.limbs)
            .map(|(a, b)| (a & b).count_ones())
            .sum::<u32>()
            % 2
    }

    pub fn num_nonzero(&self) -> usize {
        self.limbs.iter().map(|x| x.count_ones() as usize).sum()
    }

    pub fn first_nonzero(&self) -> Option<usize> {
        self.limbs
            .iter()
            .enumerate()
            .find(|(_, &x)| x != 0)
            .map(|(i, x)| i * BITS_PER_LIMB + x.trailing_zeros() as usize)
    }

    pub fn last_nonzero(&self) -> Option<usize> {
        self.limbs
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &x)| x != 0)
            .map(|(i, x)| i * BITS_PER_LIMB + (BITS_PER_LIMB - 1 - x.leading_zeros() as usize))
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |i| self.entry(i))
    }

    /// Iterate over the indices of the non-zero entries, in increasing order.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = usize> + '_ {
        self.limbs
            .iter()
            .enumerate()
            .flat_map(|(i, &x)| limb::set_bits(x).map(move |b| i * BITS_PER_LIMB + b))
    }

    #[cfg(test)]
    pub(crate) fn debug_check_tail(&self) -> bool {
        match self.limbs.last() {
            Some(&x) => x & !limb::tail_mask(self.len) == 0,
            None => true,
        }
    }
}

impl std::fmt::Display for FpVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if f.alternate() {
            for v in self.iter() {
                write!(f, "{v}")?;
            }
            Ok(())
        } else {
            write!(f, "[{}]", self.iter().format(", "))
        }
    }
}

impl std::fmt::Debug for FpVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl std::ops::AddAssign<&FpVector> for FpVector {
    fn add_assign(&mut self, other: &FpVector) {
        self.add(other);
    }
}

impl From<&FpVector> for Vec<u32> {
    fn from(v: &FpVector) -> Vec<u32> {
        v.iter().collect()
    }
}

impl Serialize for FpVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Vec::<u32>::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FpVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<u32>::deserialize(deserializer)?;
        Ok(Self::from_slice(&entries))
    }
}
