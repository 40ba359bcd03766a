//! Inductive construction of the cocycle θ.
//!
//! θ is built over the chain of subspaces V0 ⊂ V1 ⊂ … ⊂ Vk, where V(i+1)
//! adds the basis vector b(i) to V(i). Writing W = {b ⊕ v : v ∈ V} for the
//! coset added at each step, the rules are (all sums mod 2):
//!
//! | Rule | Defines | From |
//! |------|---------|------|
//! | base | θ(b0, b0) | \|b0\|/4 |
//! | D1 | θ(b, v), θ(v, b) | a free bit x, and \|v∧b\|/2 + x |
//! | D2 | θ(b, w), θ(w, b) | \|b\|/4 + θ(b, v) |
//! | D3 | W × W | \|v∧w\|/2 + θ(v, b) + θ(v, b⊕w) + θ(w, b) |
//! | D4 | W × V, V × W | \|w\|/4 + θ(w, v⊕w) |
//!
//! Row 0 and column 0 are zero from the start (θ is normalized). The free
//! bit for v = 0 is forced to 0. Everything else follows from the choices
//! made in D1, which are recorded as a [`ThetaPath`].
//!
//! The builder works in index space: basis vector b(i) has index `1 << i`,
//! V(i) is indices `0..1 << i`, and coset element b ⊕ v is `b | v`. Weights
//! are always taken from the actual vectors.
//!
//! [Gri86] Griess Jr, Robert L. "Code loops." J. Algebra 100 (1986), 224-234.

use core::fmt;
use core::str::FromStr;

use rand::RngCore;
use tracing::debug;

use crate::basis::Basis;
use crate::bits::{half_meet_bit, quarter_weight_bit};
use crate::error::{CodeLoopError, Result};
use crate::matrix::PackedBitMatrix;
use crate::space::VectorSpace;

/// The finished cocycle: 2^k × 2^k bits, entry (i, j) at `(i << k) | j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThetaTable {
    dimension: usize,
    bits: PackedBitMatrix,
}

impl ThetaTable {
    /// Basis length k.
    #[inline]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Rows (and columns) in the table, 2^k.
    #[inline]
    pub const fn size(&self) -> usize {
        1 << self.dimension
    }

    /// θ at a pair of vector-space indices.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOverflow`] if either index is ≥ 2^k.
    pub fn by_idx(&self, i: usize, j: usize) -> Result<u8> {
        let size = self.size();
        if i >= size || j >= size {
            return Err(CodeLoopError::IndexOverflow {
                row: i,
                col: j,
                size,
            });
        }
        Ok(self.bit(i, j))
    }

    /// Unchecked lookup for the hot loops. Both indices must be < 2^k.
    #[inline]
    pub(crate) fn bit(&self, i: usize, j: usize) -> u8 {
        self.bits.bit((i << self.dimension) | j)
    }

    /// The backing bit matrix.
    pub fn matrix(&self) -> &PackedBitMatrix {
        &self.bits
    }
}

/// The sequence of free D1 bits taken while building θ.
///
/// Bit `i` is the i-th free choice, counting the forced zeros at v = 0, so a
/// full path for a k-vector basis has 2^k − 2 bits. The string form is a hex
/// number with bit 0 as the least significant bit; it drops high zero bits,
/// which replay as zero anyway.
///
/// ```
/// use codeloops::ThetaPath;
///
/// let p: ThetaPath = "0x6".parse().unwrap();
/// assert!(!p.bit(0));
/// assert!(p.bit(1));
/// assert!(p.bit(2));
/// assert!(!p.bit(100));
/// assert_eq!(p.to_string(), "0x6");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ThetaPath {
    bits: Vec<bool>,
}

impl ThetaPath {
    /// A path from explicit choices, first choice first.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Choice `i`; choices past the end read as 0.
    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        self.bits.get(i).copied().unwrap_or(false)
    }

    /// The recorded choices.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of recorded choices.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for a path with no recorded choices.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of 1 choices.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    fn push(&mut self, bit: u8) {
        self.bits.push(bit == 1);
    }
}

impl fmt::Display for ThetaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nibbles: Vec<u8> = self
            .bits
            .chunks(4)
            .map(|c| {
                c.iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &b)| acc | (u8::from(b) << i))
            })
            .collect();
        f.write_str("0x")?;
        let mut digits = nibbles.iter().rev().skip_while(|&&n| n == 0).peekable();
        if digits.peek().is_none() {
            return f.write_str("0");
        }
        for n in digits {
            write!(f, "{n:x}")?;
        }
        Ok(())
    }
}

impl FromStr for ThetaPath {
    type Err = CodeLoopError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(CodeLoopError::InvalidThetaPath(s.to_string()));
        }
        let mut bits = Vec::with_capacity(digits.len() * 4);
        for c in digits.chars().rev() {
            let n = c
                .to_digit(16)
                .ok_or_else(|| CodeLoopError::InvalidThetaPath(s.to_string()))?;
            bits.extend((0..4).map(|i| (n >> i) & 1 == 1));
        }
        Ok(Self { bits })
    }
}

impl TryFrom<String> for ThetaPath {
    type Error = CodeLoopError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ThetaPath> for String {
    fn from(p: ThetaPath) -> Self {
        p.to_string()
    }
}

/// Source of the free D1 bits.
pub enum FreeBits<'a> {
    /// Every free bit is 0.
    Zero,
    /// Replay a recorded path. A 1 at a forced position is ignored.
    Path(&'a ThetaPath),
    /// Draw each bit from a caller-owned generator.
    Random(&'a mut dyn RngCore),
}

impl FreeBits<'_> {
    fn next(&mut self, position: usize) -> u8 {
        match self {
            FreeBits::Zero => 0,
            FreeBits::Path(p) => u8::from(p.bit(position)),
            FreeBits::Random(rng) => (rng.next_u32() & 1) as u8,
        }
    }
}

impl fmt::Debug for FreeBits<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeBits::Zero => f.write_str("Zero"),
            FreeBits::Path(p) => f.debug_tuple("Path").field(p).finish(),
            FreeBits::Random(_) => f.write_str("Random(..)"),
        }
    }
}

/// Builds θ for one basis and its vector space.
#[derive(Debug, Clone, Copy)]
pub struct ThetaBuilder<'a> {
    basis: &'a Basis,
    space: &'a VectorSpace,
}

impl<'a> ThetaBuilder<'a> {
    /// `space` must be the span of `basis`.
    pub fn new(basis: &'a Basis, space: &'a VectorSpace) -> Self {
        Self { basis, space }
    }

    /// Run the induction, returning the table and the path actually taken.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::ThetaUnset`] if a rule reads an entry no earlier rule
    /// derived, or if any entry is still underived after the last step.
    /// Neither happens for a basis of the expected length; they guard the
    /// derivation order.
    pub fn build(&self, mut free: FreeBits<'_>) -> Result<(ThetaTable, ThetaPath)> {
        let k = self.basis.len();
        let vs = self.space.vectors();
        let mut draft = Draft::new(k);
        let mut path = ThetaPath::from_bits(Vec::with_capacity((1usize << k).saturating_sub(2)));

        draft.set(1, 1, quarter_weight_bit(vs[1]));

        for step in 1..k {
            let bk = 1usize << step;
            let b = vs[bk];

            // D1
            for v in 0..bk {
                let x = if v == 0 {
                    draft.set(0, bk, half_meet_bit(0, b));
                    0
                } else {
                    let x = free.next(path.len());
                    draft.set(bk, v, x);
                    draft.set(v, bk, (half_meet_bit(vs[v], b) + x) & 1);
                    x
                };
                path.push(x);
            }

            // D2
            for v in 0..bk {
                let w = bk | v;
                let d = (quarter_weight_bit(b) + draft.get(bk, v)?) & 1;
                draft.set(bk, w, d);
                draft.set(w, bk, (half_meet_bit(b, vs[w]) + d) & 1);
            }

            // D3
            for v in 0..bk {
                for v2 in 0..bk {
                    let w = bk | v2;
                    let a = draft.get(v, bk)?;
                    let b2 = draft.get(v, bk ^ w)?;
                    let c = draft.get(w, bk)?;
                    draft.set(w, bk | v, (half_meet_bit(vs[v], vs[w]) + a + b2 + c) & 1);
                }
            }

            // D4
            for v in 0..bk {
                for v2 in 0..bk {
                    let w = bk | v2;
                    let d = (quarter_weight_bit(vs[w]) + draft.get(w, v ^ w)?) & 1;
                    draft.set(w, v, d);
                    draft.set(v, w, (half_meet_bit(vs[v], vs[w]) + d) & 1);
                }
            }

            debug!(step, span = bk << 1, "theta step complete");
        }

        if let Some((row, col)) = draft.first_unwritten() {
            return Err(CodeLoopError::ThetaUnset { row, col });
        }
        debug!(dimension = k, path = %path, ones = draft.theta.count_ones(), "theta built");

        Ok((
            ThetaTable {
                dimension: k,
                bits: draft.theta,
            },
            path,
        ))
    }
}

/// θ under construction, with a shadow matrix of derived entries.
struct Draft {
    k: usize,
    theta: PackedBitMatrix,
    written: PackedBitMatrix,
}

impl Draft {
    fn new(k: usize) -> Self {
        let n = 1usize << k;
        let mut written = PackedBitMatrix::new(n, n);
        for i in 0..n {
            written.put(i);
            written.put(i << k);
        }
        Self {
            k,
            theta: PackedBitMatrix::new(n, n),
            written,
        }
    }

    // Only ever sets bits: a second derivation of an entry cannot clear it.
    #[inline]
    fn set(&mut self, i: usize, j: usize, val: u8) {
        let at = (i << self.k) | j;
        self.written.put(at);
        if val & 1 == 1 {
            self.theta.put(at);
        }
    }

    /// First entry, in row-major order, that no rule derived.
    fn first_unwritten(&self) -> Option<(usize, usize)> {
        if self.written.count_ones() == self.written.len() {
            return None;
        }
        let mask = (1usize << self.k) - 1;
        (0..self.written.len())
            .find(|&at| self.written.bit(at) == 0)
            .map(|at| (at >> self.k, at & mask))
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Result<u8> {
        let at = (i << self.k) | j;
        if self.written.bit(at) == 0 {
            return Err(CodeLoopError::ThetaUnset { row: i, col: j });
        }
        Ok(self.theta.bit(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::HAMMING_BASIS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hamming() -> (Basis, VectorSpace) {
        let b = Basis::new(HAMMING_BASIS.to_vec()).unwrap();
        let vs = VectorSpace::build(&b);
        (b, vs)
    }

    #[test]
    fn zero_path_has_expected_length() {
        let (b, vs) = hamming();
        let (theta, path) = ThetaBuilder::new(&b, &vs).build(FreeBits::Zero).unwrap();
        assert_eq!(theta.size(), 16);
        assert_eq!(path.len(), 14);
        assert_eq!(path.count_ones(), 0);
        assert_eq!(path.to_string(), "0x0");
    }

    #[test]
    fn normalized_and_diagonal() {
        let (b, vs) = hamming();
        let mut rng = StdRng::seed_from_u64(11);
        let (theta, _) = ThetaBuilder::new(&b, &vs)
            .build(FreeBits::Random(&mut rng))
            .unwrap();
        for (i, &v) in vs.vectors().iter().enumerate() {
            assert_eq!(theta.by_idx(0, i).unwrap(), 0);
            assert_eq!(theta.by_idx(i, 0).unwrap(), 0);
            assert_eq!(theta.by_idx(i, i).unwrap(), quarter_weight_bit(v));
        }
    }

    #[test]
    fn forced_positions_ignore_requested_ones() {
        let (b, vs) = hamming();
        // all ones requested; positions 0, 2 and 6 are the v = 0 slots
        let all = ThetaPath::from_bits(vec![true; 14]);
        let (_, taken) = ThetaBuilder::new(&b, &vs)
            .build(FreeBits::Path(&all))
            .unwrap();
        for (i, &bit) in taken.bits().iter().enumerate() {
            assert_eq!(bit, !matches!(i, 0 | 2 | 6), "position {i}");
        }
    }

    #[test]
    fn replaying_a_path_reproduces_theta() {
        let (b, vs) = hamming();
        let mut rng = StdRng::seed_from_u64(0xc0de);
        let builder = ThetaBuilder::new(&b, &vs);
        let (first, path) = builder.build(FreeBits::Random(&mut rng)).unwrap();
        let (again, same) = builder.build(FreeBits::Path(&path)).unwrap();
        assert_eq!(first, again);
        assert_eq!(path, same);

        let parsed: ThetaPath = path.to_string().parse().unwrap();
        let (from_str, _) = builder.build(FreeBits::Path(&parsed)).unwrap();
        assert_eq!(first, from_str);
    }

    #[test]
    fn single_vector_basis() {
        let b = Basis::new(vec![0x0f]).unwrap();
        let vs = VectorSpace::build(&b);
        let (theta, path) = ThetaBuilder::new(&b, &vs).build(FreeBits::Zero).unwrap();
        assert!(path.is_empty());
        assert_eq!(theta.by_idx(1, 1).unwrap(), 1);
        assert_eq!(theta.by_idx(0, 1).unwrap(), 0);
    }

    #[test]
    fn by_idx_checks_bounds() {
        let (b, vs) = hamming();
        let (theta, _) = ThetaBuilder::new(&b, &vs).build(FreeBits::Zero).unwrap();
        assert_eq!(
            theta.by_idx(16, 0),
            Err(CodeLoopError::IndexOverflow {
                row: 16,
                col: 0,
                size: 16
            })
        );
        assert!(theta.by_idx(0, 16).is_err());
    }

    #[test]
    fn draft_rejects_reads_before_writes() {
        let mut draft = Draft::new(2);
        assert_eq!(draft.get(0, 3), Ok(0));
        assert_eq!(draft.get(1, 1), Err(CodeLoopError::ThetaUnset { row: 1, col: 1 }));
        assert_eq!(draft.first_unwritten(), Some((1, 1)));

        draft.set(1, 1, 1);
        assert_eq!(draft.get(1, 1), Ok(1));
        assert_eq!(draft.first_unwritten(), Some((1, 2)));

        for i in 1..4 {
            for j in 1..4 {
                draft.set(i, j, 0);
            }
        }
        assert_eq!(draft.first_unwritten(), None);
        // a later zero write never clears an earlier one
        assert_eq!(draft.get(1, 1), Ok(1));
    }

    #[test]
    fn every_entry_is_derived_for_golay() {
        let b = Basis::new(crate::basis::GOLAY_BASIS.to_vec()).unwrap();
        let vs = VectorSpace::build(&b);
        let (theta, path) = ThetaBuilder::new(&b, &vs).build(FreeBits::Zero).unwrap();
        assert_eq!(theta.size(), 4096);
        assert_eq!(path.len(), 4094);
    }

    #[test]
    fn path_strings() {
        let p = ThetaPath::from_bits(vec![true, false, false, false, true]);
        assert_eq!(p.to_string(), "0x11");
        assert!("11".parse::<ThetaPath>().unwrap().bit(4));
        assert!("0x".parse::<ThetaPath>().is_err());
        assert!("0xzz".parse::<ThetaPath>().is_err());
        assert_eq!(ThetaPath::default().to_string(), "0x0");
    }
}
