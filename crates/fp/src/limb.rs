pub type Limb = u64;

pub const BITS_PER_LIMB: usize = Limb::BITS as usize;

/// A struct containing the information required to access a specific entry in an array of `Limb`s.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LimbBitIndexPair {
    pub(crate) limb: usize,
    pub(crate) bit_index: usize,
}

pub(crate) const fn limb_bit_index_pair(idx: usize) -> LimbBitIndexPair {
    LimbBitIndexPair {
        limb: idx / BITS_PER_LIMB,
        bit_index: idx % BITS_PER_LIMB,
    }
}

/// Return the number of limbs required to hold `dim` entries.
pub(crate) const fn number(dim: usize) -> usize {
    if dim == 0 {
        0
    } else {
        limb_bit_index_pair(dim - 1).limb + 1
    }
}

/// A mask selecting the entries of the last limb that lie within a vector of length `len`.
pub(crate) const fn tail_mask(len: usize) -> Limb {
    match len % BITS_PER_LIMB {
        0 => !0,
        r => (1 << r) - 1,
    }
}

/// Iterate over the positions of the set bits of `limb`, lowest first.
pub(crate) fn set_bits(mut limb: Limb) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if limb == 0 {
            None
        } else {
            let bit = limb.trailing_zeros() as usize;
            limb &= limb - 1;
            Some(bit)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number(0), 0);
        assert_eq!(number(1), 1);
        assert_eq!(number(64), 1);
        assert_eq!(number(65), 2);
    }

    #[test]
    fn test_set_bits() {
        let bits: Vec<usize> = set_bits(0b1010_0001).collect();
        assert_eq!(bits, vec![0, 5, 7]);
        assert_eq!(set_bits(0).count(), 0);
    }

    #[test]
    fn test_tail_mask() {
        assert_eq!(tail_mask(64), !0);
        assert_eq!(tail_mask(3), 0b111);
    }
}
