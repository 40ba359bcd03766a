//! Signed loop elements.

use core::fmt;

use crate::error::CodeLoopError;

/// The sign half of a loop element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Sign {
    /// +1
    Pos = 0,
    /// −1
    Neg = 1,
}

impl Sign {
    /// 0 for `Pos`, 1 for `Neg`.
    #[inline]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Sign from the low bit of `b`.
    #[inline]
    pub const fn from_bit(b: u8) -> Self {
        if b & 1 == 0 {
            Sign::Pos
        } else {
            Sign::Neg
        }
    }

    /// Product of two signs twisted by a cocycle bit.
    #[inline]
    pub const fn twist(self, other: Sign, theta: u8) -> Self {
        Self::from_bit(self.bit() ^ other.bit() ^ theta)
    }
}

impl TryFrom<u8> for Sign {
    type Error = CodeLoopError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            0 => Ok(Sign::Pos),
            1 => Ok(Sign::Neg),
            other => Err(CodeLoopError::InvalidSign(other)),
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sign::Pos => "+",
            Sign::Neg => "-",
        })
    }
}

/// A signed code vector, tagged with its index in the vector space.
///
/// Elements are created by a [`CodeLoop`](crate::CodeLoop) and only
/// meaningful within it. Equality compares all three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopElement {
    sign: Sign,
    vector: u64,
    index: usize,
}

impl LoopElement {
    pub(crate) const fn new(sign: Sign, vector: u64, index: usize) -> Self {
        Self {
            sign,
            vector,
            index,
        }
    }

    /// The sign.
    #[inline]
    pub const fn sign(&self) -> Sign {
        self.sign
    }

    /// The code vector.
    #[inline]
    pub const fn vector(&self) -> u64 {
        self.vector
    }

    /// Position of the vector in the space.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The same vector with the opposite sign.
    #[inline]
    pub const fn negate(self) -> Self {
        Self::new(Sign::from_bit(self.sign.bit() ^ 1), self.vector, self.index)
    }
}

impl fmt::Display for LoopElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:#x}", self.sign, self.vector)
    }
}
