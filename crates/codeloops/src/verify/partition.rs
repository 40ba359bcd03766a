//! Triple index space and its split into worker ranges.
//!
//! A triple (x, y, z) of b-bit indices is packed into one counter
//! `c = x << 2b | y << b | z`, so the whole search is the range
//! `0..2^(3b)` and a worker's share is a contiguous sub-range.

use core::ops::Range;

/// Iterations between checks of the shared cancel flag.
pub const CANCEL_POLL_INTERVAL: u64 = 4096;

/// All triples of `bits`-bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripleSpace {
    bits: u32,
    mask: u64,
}

impl TripleSpace {
    /// Triples of indices below `2^bits`. `bits` must be at most 21.
    pub const fn new(bits: u32) -> Self {
        Self {
            bits,
            mask: (1u64 << bits) - 1,
        }
    }

    /// Width of each index field.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of triples, `2^(3·bits)`.
    #[inline]
    pub const fn total(&self) -> u64 {
        1u64 << (3 * self.bits)
    }

    /// Unpack counter `c` into `(x, y, z)`.
    #[inline]
    pub const fn split(&self, c: u64) -> (usize, usize, usize) {
        (
            (c >> (2 * self.bits)) as usize,
            ((c >> self.bits) & self.mask) as usize,
            (c & self.mask) as usize,
        )
    }
}

/// Split `0..total` into at most `workers` contiguous, disjoint ranges that
/// cover it exactly.
///
/// The worker count is clamped to `1..=total`; the last range absorbs the
/// remainder. An empty total yields no ranges.
pub fn partition(total: u64, workers: usize) -> Vec<Range<u64>> {
    if total == 0 {
        return Vec::new();
    }
    let n = (workers as u64).clamp(1, total);
    let chunk = total / n;
    (0..n)
        .map(|w| {
            let start = w * chunk;
            let end = if w == n - 1 { total } else { start + chunk };
            start..end
        })
        .collect()
}
