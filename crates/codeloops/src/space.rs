//! The vector space spanned by a basis.
//!
//! Entry `i` of the space is the XOR of the generators selected by the bits
//! of `i`, so for an independent basis index XOR mirrors vector XOR:
//!
//! ```text
//! vector(i ^ j) == vector(i) ^ vector(j)
//! ```
//!
//! The reverse map (vector → index) is a `HashMap` built once alongside the
//! enumeration.

use std::collections::HashMap;

use crate::basis::{fold, Basis};
use crate::error::{CodeLoopError, Result};

/// All 2^k linear combinations of a basis, plus the reverse index.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    vectors: Vec<u64>,
    index: HashMap<u64, usize>,
}

impl VectorSpace {
    /// Enumerate the span of `basis` in index order.
    ///
    /// A dependent basis produces repeated vectors; the reverse map then
    /// points at the last index holding each one.
    pub fn build(basis: &Basis) -> Self {
        let vectors = span(basis.vectors());
        let index = vectors.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        Self { vectors, index }
    }

    /// The vectors in index order.
    #[inline]
    pub fn vectors(&self) -> &[u64] {
        &self.vectors
    }

    /// Vector at index `i`.
    #[inline]
    pub fn vector(&self, i: usize) -> Option<u64> {
        self.vectors.get(i).copied()
    }

    /// Number of vectors, 2^k.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether `v` lies in the space.
    #[inline]
    pub fn contains(&self, v: u64) -> bool {
        self.index.contains_key(&v)
    }

    /// Index of `v`, if it lies in the space.
    #[inline]
    pub fn index_of(&self, v: u64) -> Option<usize> {
        self.index.get(&v).copied()
    }

    /// Index of `v`.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::VectorNotInSpace`] if `v` is not a member.
    #[inline]
    pub fn try_index_of(&self, v: u64) -> Result<usize> {
        self.index_of(v).ok_or(CodeLoopError::VectorNotInSpace(v))
    }
}

/// Every XOR combination of `generators`, in index order.
///
/// `span(&[])` is `[0]`.
///
/// ```
/// use codeloops::span;
///
/// assert_eq!(span(&[0xf0, 0x0f]), vec![0x00, 0xf0, 0x0f, 0xff]);
/// ```
pub fn span(generators: &[u64]) -> Vec<u64> {
    (0..1usize << generators.len())
        .map(|i| fold(generators, i))
        .collect()
}
