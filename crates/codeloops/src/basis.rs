//! Ordered bases of doubly-even binary codes.
//!
//! A basis is an ordered list of k generator words. Every code vector is the
//! XOR of the generators selected by the bits of a k-bit index:
//!
//! ```text
//! index 0b0101  →  basis[0] ^ basis[2]
//! ```
//!
//! The ordering matters: the cocycle builder walks the basis front to back,
//! and the vector space is indexed by the natural binary encoding above.
//!
//! # Canonical Bases
//!
//! | Constant | Code | k | Vectors |
//! |----------|------|---|---------|
//! | [`HAMMING_BASIS`] | [8,4] extended Hamming | 4 | 16 |
//! | [`GOLAY_BASIS`] | [24,12] binary Golay | 12 | 4096 |
//! | [`GOLAY_SPLIT_BASIS`] | [24,12] Golay, split ordering | 12 | 4096 |
//!
//! # Example
//!
//! ```
//! use codeloops::{Basis, HAMMING_BASIS};
//!
//! let b = Basis::new(HAMMING_BASIS.to_vec()).unwrap();
//! assert_eq!(b.len(), 4);
//! // 0b0011 selects the first two generators
//! assert_eq!(b.combine(0b0011), 0x87 ^ 0x4b);
//! ```

use crate::error::{CodeLoopError, Result};

/// Largest supported basis length.
///
/// The cocycle table holds 2^(2k) bits, 512 MiB at k = 16.
pub const MAX_BASIS_LEN: usize = 16;

/// Basis for the [8,4] extended Hamming code (16 codewords).
pub const HAMMING_BASIS: [u64; 4] = [
    0x87, // 1000 | 0111
    0x4b, // 0100 | 1011
    0x2d, // 0010 | 1101
    0x1e, // 0001 | 1110
];

/// Standard basis for the [24,12] binary Golay code (4096 codewords).
///
/// ```text
/// 100000000000100111110001 = 0x8009f1
/// 010000000000010011111010 = 0x4004fa
/// 001000000000001001111101 = 0x20027d
/// 000100000000100100111110 = 0x10093e
/// 000010000000110010011101 = 0x080c9d
/// 000001000000111001001110 = 0x040e4e
/// 000000100000111100100101 = 0x020f25
/// 000000010000111110010010 = 0x010f92
/// 000000001000011111001001 = 0x0087c9
/// 000000000100001111100110 = 0x0043e6
/// 000000000010010101010111 = 0x002557
/// 000000000001101010101011 = 0x001aab
/// ```
pub const GOLAY_BASIS: [u64; 12] = [
    0x8009f1, 0x4004fa, 0x20027d, 0x10093e, 0x80c9d, 0x40e4e, 0x20f25, 0x10f92, 0x87c9, 0x43e6,
    0x2557, 0x1aab,
];

/// A Golay basis whose first six vectors and next five vectors span
/// subspaces meeting only in zero, each of which is associative under the
/// cocycle. The last vector completes the span to 4096.
pub const GOLAY_SPLIT_BASIS: [u64; 12] = [
    0x8009f1, 0x4004fa, 0x10093e, 0x80c9d, 0x2557, 0x27d200, 0x20027d, 0x40e4e, 0x810663,
    0x808e38, 0x804a17, 0x6c1eff,
];

/// An ordered, non-empty list of generator words.
///
/// Linear independence and double evenness are *not* checked here; see
/// [`CodeLoop::verify_basis`](crate::CodeLoop::verify_basis).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Basis(Vec<u64>);

impl Basis {
    /// Wrap a list of generators.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::EmptyBasis`] for an empty list,
    /// [`CodeLoopError::BasisTooLarge`] past [`MAX_BASIS_LEN`].
    pub fn new(vectors: Vec<u64>) -> Result<Self> {
        if vectors.is_empty() {
            return Err(CodeLoopError::EmptyBasis);
        }
        if vectors.len() > MAX_BASIS_LEN {
            return Err(CodeLoopError::BasisTooLarge {
                len: vectors.len(),
                max: MAX_BASIS_LEN,
            });
        }
        Ok(Self(vectors))
    }

    /// Number of generators, k.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The generators in order.
    #[inline]
    pub fn vectors(&self) -> &[u64] {
        &self.0
    }

    /// Generator `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<u64> {
        self.0.get(i).copied()
    }

    /// XOR of the generators selected by the bits of `index`.
    ///
    /// Bits at or above `len()` are ignored.
    #[inline]
    pub fn combine(&self, index: usize) -> u64 {
        fold(&self.0, index)
    }

    /// Split into the first `at` generators and the rest.
    ///
    /// Either half may be empty; the halves are plain slices because an
    /// empty basis is not a valid [`Basis`].
    pub fn split_at(&self, at: usize) -> (&[u64], &[u64]) {
        self.0.split_at(at.min(self.0.len()))
    }
}

impl AsRef<[u64]> for Basis {
    fn as_ref(&self) -> &[u64] {
        &self.0
    }
}

/// XOR-fold `generators` by the bits of `index`.
#[inline]
pub(crate) fn fold(generators: &[u64], mut index: usize) -> u64 {
    let mut vec = 0u64;
    for &g in generators {
        if index & 1 == 1 {
            vec ^= g;
        }
        index >>= 1;
    }
    vec
}
