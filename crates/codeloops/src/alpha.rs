//! Compressed cocycle over a split basis.
//!
//! Split the basis at h = k/2 into V = span(b0..b(h−1)) and
//! W = span(bh..b(k−1)). Every code vector is uniquely x = v ⊕ w, and the
//! cocycle identities let θ on the full space be recovered from θ restricted
//! to V ∪ W, a table of (2^h + 2^(k−h))² bits instead of 4^k.
//!
//! Writing α for θ on that domain and x = v1 ⊕ w1, y = v2 ⊕ w2:
//!
//! ```text
//! θ(x, y) = α(v1, w1) + α(w1, w2) + α(w1⊕w2, v2) + α(w2, v2)
//!         + α(v1, v2) + α(v1⊕v2, w1⊕w2) + α(v2, w1⊕w2)
//!         + |v1∧w1∧y| + |w1∧w2∧v2| + |v1∧v2∧(w1⊕w2)|        (mod 2)
//! ```
//!
//! Each term comes from one application of the triple identity
//! θ(a,b) + θ(a⊕b,c) + θ(b,c) + θ(a,b⊕c) = |a∧b∧c|. For Golay this is a
//! 128 × 128 table standing in for 4096 × 4096.
//!
//! Domain layout: V in index order at `0..2^h`, then W in index order at
//! `2^h..2^h + 2^(k−h)`. Both halves include their zero vector.

use std::collections::HashMap;

use crate::bits::parity;
use crate::error::{CodeLoopError, Result};
use crate::matrix::PackedBitMatrix;
use crate::space::VectorSpace;
use crate::theta::ThetaTable;

/// θ restricted to V ∪ W, with reconstruction of the full cocycle.
#[derive(Debug, Clone)]
pub struct AlphaTable {
    half: usize,
    dimension: usize,
    vectors: Vec<u64>,
    index: HashMap<u64, usize>,
    shift: u32,
    bits: PackedBitMatrix,
}

impl AlphaTable {
    /// Sample `theta` on the split domain of `space`.
    pub fn build(space: &VectorSpace, theta: &ThetaTable) -> Self {
        let dimension = theta.dimension();
        let half = dimension / 2;
        let v_len = 1usize << half;
        let w_len = 1usize << (dimension - half);

        // space index of each domain entry
        let rows: Vec<usize> = (0..v_len).chain((0..w_len).map(|m| m << half)).collect();
        let vectors: Vec<u64> = rows.iter().map(|&i| space.vectors()[i]).collect();

        let mut index = HashMap::with_capacity(vectors.len());
        for (i, &v) in vectors.iter().enumerate() {
            index.entry(v).or_insert(i);
        }

        let stride = rows.len().next_power_of_two();
        let shift = stride.trailing_zeros();
        let mut bits = PackedBitMatrix::new(stride, stride);
        for (a, &ra) in rows.iter().enumerate() {
            for (b, &rb) in rows.iter().enumerate() {
                if theta.bit(ra, rb) == 1 {
                    bits.put((a << shift) | b);
                }
            }
        }

        tracing::debug!(
            domain = vectors.len(),
            stride,
            ones = bits.count_ones(),
            "alpha table built"
        );

        Self {
            half,
            dimension,
            vectors,
            index,
            shift,
            bits,
        }
    }

    /// The domain vectors, V then W.
    pub fn vectors(&self) -> &[u64] {
        &self.vectors
    }

    /// Number of domain vectors, 2^h + 2^(k−h).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// The split point h.
    pub const fn half(&self) -> usize {
        self.half
    }

    /// The V half of the domain.
    pub fn v_half(&self) -> &[u64] {
        &self.vectors[..1 << self.half]
    }

    /// The W half of the domain.
    pub fn w_half(&self) -> &[u64] {
        &self.vectors[1 << self.half..]
    }

    /// α at a pair of domain indices.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOverflow`] if either index is past the domain.
    pub fn alpha_by_idx(&self, i: usize, j: usize) -> Result<u8> {
        let size = self.len();
        if i >= size || j >= size {
            return Err(CodeLoopError::IndexOverflow {
                row: i,
                col: j,
                size,
            });
        }
        Ok(self.alpha(i, j))
    }

    /// α at a pair of domain vectors.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::VectorNotInSpace`] if either vector is outside V ∪ W.
    pub fn alpha_by_vec(&self, x: u64, y: u64) -> Result<u8> {
        let i = self.domain_index(x)?;
        let j = self.domain_index(y)?;
        Ok(self.alpha(i, j))
    }

    /// θ at a pair of vector-space indices, rebuilt from α.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOverflow`] if either index is ≥ 2^k.
    pub fn theta_by_idx(&self, i: usize, j: usize) -> Result<u8> {
        let size = 1usize << self.dimension;
        if i >= size || j >= size {
            return Err(CodeLoopError::IndexOverflow {
                row: i,
                col: j,
                size,
            });
        }
        Ok(self.reconstruct(i, j))
    }

    /// θ at a pair of code vectors, rebuilt from α.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::VectorNotInSpace`] if either vector is outside
    /// `space`.
    pub fn theta_by_vec(&self, space: &VectorSpace, x: u64, y: u64) -> Result<u8> {
        let i = space.try_index_of(x)?;
        let j = space.try_index_of(y)?;
        Ok(self.reconstruct(i, j))
    }

    fn domain_index(&self, v: u64) -> Result<usize> {
        self.index
            .get(&v)
            .copied()
            .ok_or(CodeLoopError::VectorNotInSpace(v))
    }

    #[inline]
    fn alpha(&self, i: usize, j: usize) -> u8 {
        self.bits.bit((i << self.shift) | j)
    }

    fn reconstruct(&self, i: usize, j: usize) -> u8 {
        let lo = (1usize << self.half) - 1;
        let off = 1usize << self.half;
        let (v1, w1) = (i & lo, off + (i >> self.half));
        let (v2, w2) = (j & lo, off + (j >> self.half));
        let w12 = off + ((i ^ j) >> self.half);
        let v12 = (i ^ j) & lo;

        let a = self.alpha(v1, w1)
            ^ self.alpha(w1, w2)
            ^ self.alpha(w12, v2)
            ^ self.alpha(w2, v2)
            ^ self.alpha(v1, v2)
            ^ self.alpha(v12, w12)
            ^ self.alpha(v2, w12);

        let vec = |d: usize| self.vectors[d];
        let y = vec(v2) ^ vec(w2);
        let meets = (vec(v1) & vec(w1) & y)
            ^ (vec(w1) & vec(w2) & vec(v2))
            ^ (vec(v1) & vec(v2) & vec(w12));
        a ^ parity(meets)
    }
}
