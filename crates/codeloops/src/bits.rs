//! Bit-weight helpers over machine words.
//!
//! Code vectors live in the low bits of a `u64`; bit `i` is coordinate `i`
//! of the ambient space. Addition is XOR, intersection is AND, and the
//! cocycle identities are all phrased in terms of Hamming weights of these.
//!
//! # Example
//!
//! ```
//! use codeloops::bits;
//!
//! assert_eq!(bits::weight(0x87), 4);
//! assert_eq!(bits::parity(0x87), 0);
//! // |0x87 & 0x4b| = |0x03| = 2, so sigma is 1
//! assert_eq!(bits::sigma(0x87, 0x4b), 1);
//! ```

/// Hamming weight (number of set bits).
#[inline]
#[must_use]
pub const fn weight(x: u64) -> u32 {
    x.count_ones()
}

/// Parity of the Hamming weight: 0 for even, 1 for odd.
#[inline]
#[must_use]
pub const fn parity(x: u64) -> u8 {
    (x.count_ones() & 1) as u8
}

/// `(|x| / 4) mod 2`, the diagonal value of the cocycle.
#[inline]
#[must_use]
pub const fn quarter_weight_bit(x: u64) -> u8 {
    ((x.count_ones() / 4) & 1) as u8
}

/// `(|x ∧ y| / 2) mod 2`, the commutator defect of the cocycle.
#[inline]
#[must_use]
pub const fn half_meet_bit(x: u64, y: u64) -> u8 {
    (((x & y).count_ones() / 2) & 1) as u8
}

/// σ(x, y) = `(|x ∧ y| >> 1) & 1`.
///
/// Same value as [`half_meet_bit`]; named separately because the
/// weight-form Moufang identity is written in terms of σ.
#[inline]
#[must_use]
pub const fn sigma(x: u64, y: u64) -> u8 {
    (((x & y).count_ones() >> 1) & 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_examples() {
        let tests = [
            0x0u64,
            0x1,
            0x87,
            0xff,
            0xffff_ffff,
            0xdead_beef,
            0xffff_ffff_dead_beef,
        ];
        let expect = [0u32, 1, 4, 8, 32, 24, 56];
        for (x, e) in tests.iter().zip(expect) {
            assert_eq!(weight(*x), e, "weight of {x:#x}");
        }
    }

    #[test]
    fn parity_examples() {
        let tests = [
            0x0u64,
            0x1,
            0x87,
            0xff,
            0xffff_ffff,
            0xdead_beef,
            0xefff_ffff_dead_beef,
        ];
        let expect = [0u8, 1, 0, 0, 0, 0, 1];
        for (x, e) in tests.iter().zip(expect) {
            assert_eq!(parity(*x), e, "parity of {x:#x}");
        }
    }

    #[test]
    fn cocycle_weight_terms() {
        // weight 4 -> 1, weight 8 -> 0, weight 12 -> 1
        assert_eq!(quarter_weight_bit(0x0f), 1);
        assert_eq!(quarter_weight_bit(0xff), 0);
        assert_eq!(quarter_weight_bit(0xfff), 1);
        // meet of weight 2 -> 1, weight 4 -> 0
        assert_eq!(half_meet_bit(0x87, 0x4b), 1);
        assert_eq!(half_meet_bit(0x87, 0x87), 0);
    }

    #[test]
    fn sigma_matches_half_meet() {
        for x in [0u64, 0x87, 0x4b, 0x2d, 0x1e, 0xff, 0x8009f1] {
            for y in [0u64, 0x87, 0x4b, 0x2d, 0x1e, 0xff, 0x4004fa] {
                assert_eq!(sigma(x, y), half_meet_bit(x, y));
            }
        }
    }
}
