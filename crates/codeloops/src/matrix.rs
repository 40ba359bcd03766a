//! Byte-packed bit matrix.
//!
//! Backing store for the cocycle table (2^k × 2^k bits) and the alpha table.
//! Bit `i` lives in byte `i / 8` at offset `i % 8`; a (row, col) pair is
//! flattened to `row * cols + col`. For the square power-of-two tables used
//! by the loop this is the same as `(row << k) | col`.
//!
//! # Memory
//!
//! | Basis length k | Entries | Bytes |
//! |----------------|---------|-------|
//! | 4 (Hamming)    | 2^8     | 32    |
//! | 12 (Golay)     | 2^24    | 2 MiB |
//! | 16 (max)       | 2^32    | 512 MiB |
//!
//! # Example
//!
//! ```
//! use codeloops::PackedBitMatrix;
//!
//! let mut m = PackedBitMatrix::new(4, 4);
//! let i = m.index(2, 3).unwrap();
//! m.set(i).unwrap();
//! assert_eq!(m.get(i).unwrap(), 1);
//! assert_eq!(m.count_ones(), 1);
//! assert!(m.get(16).is_err());
//! ```

use crate::error::{CodeLoopError, Result};

/// A fixed-size bit vector addressed by a flattened (row, col) pair.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedBitMatrix {
    rows: usize,
    cols: usize,
    bytes: Vec<u8>,
}

impl PackedBitMatrix {
    /// Allocate a zeroed `rows × cols` matrix.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let bits = rows * cols;
        Self {
            rows,
            cols,
            bytes: vec![0; bits.div_ceil(8)],
        }
    }

    /// Allocate a zeroed flat vector of `bits` bits (a single row).
    #[must_use]
    pub fn with_len(bits: usize) -> Self {
        Self::new(1, bits)
    }

    /// Number of rows.
    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of addressable bits.
    #[inline]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True when the matrix has no addressable bits.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten `(row, col)` to a bit address.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOutOfRange`] if either coordinate is past its
    /// dimension.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(CodeLoopError::IndexOutOfRange {
                index: row.saturating_mul(self.cols).saturating_add(col),
                len: self.len(),
            });
        }
        Ok(row * self.cols + col)
    }

    /// Set bit `i`.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOutOfRange`] if `i >= len()`.
    #[inline]
    pub fn set(&mut self, i: usize) -> Result<()> {
        self.check(i)?;
        self.bytes[i >> 3] |= 1 << (i & 7);
        Ok(())
    }

    /// Clear bit `i`.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOutOfRange`] if `i >= len()`.
    #[inline]
    pub fn clear(&mut self, i: usize) -> Result<()> {
        self.check(i)?;
        self.bytes[i >> 3] &= !(1 << (i & 7));
        Ok(())
    }

    /// Read bit `i` as 0 or 1.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOutOfRange`] if `i >= len()`.
    #[inline]
    pub fn get(&self, i: usize) -> Result<u8> {
        self.check(i)?;
        Ok(self.bit(i))
    }

    /// Read bit `i` without the range check.
    ///
    /// Callers hold the invariant `i < len()`; the slice index still panics
    /// on violation rather than reading foreign memory.
    #[inline]
    pub(crate) fn bit(&self, i: usize) -> u8 {
        debug_assert!(i < self.len(), "bit {i} out of range {}", self.len());
        (self.bytes[i >> 3] >> (i & 7)) & 1
    }

    /// Set bit `i` without the range check. Same invariant as [`Self::bit`].
    #[inline]
    pub(crate) fn put(&mut self, i: usize) {
        debug_assert!(i < self.len(), "bit {i} out of range {}", self.len());
        self.bytes[i >> 3] |= 1 << (i & 7);
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Raw backing bytes, bit `i` at byte `i / 8`, offset `i % 8`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn check(&self, i: usize) -> Result<()> {
        if i >= self.len() {
            return Err(CodeLoopError::IndexOutOfRange {
                index: i,
                len: self.len(),
            });
        }
        Ok(())
    }
}

impl core::fmt::Debug for PackedBitMatrix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "PackedBitMatrix({}x{}, {} set)",
            self.rows,
            self.cols,
            self.count_ones()
        )
    }
}
