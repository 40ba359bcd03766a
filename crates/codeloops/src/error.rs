//! Error type shared by every fallible operation in the crate.
//!
//! Identity *failures* found by the verifier are not errors; they are
//! reported as [`Verdict::Fails`](crate::verify::Verdict::Fails) values.
//! The variants here cover lookups that leave the vector space, malformed
//! arguments, and internal consistency checks of the cocycle builder.

use thiserror::Error;

/// Errors raised by code loop construction and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeLoopError {
    /// A vector of the generated code has weight not divisible by 4.
    ///
    /// Only raised by [`CodeLoop::verify_basis`](crate::CodeLoop::verify_basis),
    /// never during construction.
    #[error("bad vector {vector:#b}, bitweight {weight} not a multiple of 4")]
    InvalidBasisVector {
        /// The offending code vector.
        vector: u64,
        /// Its Hamming weight.
        weight: u32,
    },

    /// The vector is not a member of the space spanned by the basis.
    #[error("vector {0:#x} is not in the underlying space")]
    VectorNotInSpace(u64),

    /// An index pair lies outside a table of `size` rows and columns.
    #[error("index pair ({row}, {col}) overflows a table of {size} x {size}")]
    IndexOverflow {
        /// Row index supplied.
        row: usize,
        /// Column index supplied.
        col: usize,
        /// Number of rows (and columns) in the table.
        size: usize,
    },

    /// A raw sign value was neither 0 (`Pos`) nor 1 (`Neg`).
    #[error("bad sign value {0} (use Sign::Pos or Sign::Neg)")]
    InvalidSign(u8),

    /// A bit address lies past the end of a packed bit matrix.
    #[error("bit {index} is out of range for a matrix of {len} bits")]
    IndexOutOfRange {
        /// Bit address supplied.
        index: usize,
        /// Number of addressable bits.
        len: usize,
    },

    /// The cocycle builder read an entry before any rule derived it.
    #[error("theta({row}, {col}) was read before it was derived")]
    ThetaUnset {
        /// Row index of the entry.
        row: usize,
        /// Column index of the entry.
        col: usize,
    },

    /// A basis must contain at least one vector.
    #[error("basis is empty")]
    EmptyBasis,

    /// The basis is too long for the packed tables.
    #[error("basis of {len} vectors exceeds the supported maximum of {max}")]
    BasisTooLarge {
        /// Number of vectors supplied.
        len: usize,
        /// Largest supported basis length.
        max: usize,
    },

    /// An alpha lookup was made on a loop built without an alpha table.
    #[error("alpha table was not built for this loop")]
    AlphaUnavailable,

    /// A theta path string was not a hex number.
    #[error("bad theta path {0:?}, expected hex digits with an optional 0x prefix")]
    InvalidThetaPath(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodeLoopError>;
