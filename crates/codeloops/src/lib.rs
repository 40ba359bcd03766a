//! Code loops from doubly-even binary codes.
//!
//! A *code loop* is a Moufang loop built on the signed codewords ±C of a
//! doubly-even binary code C. The product is
//!
//! ```text
//! (s1, x) · (s2, y) = (s1 ⊕ s2 ⊕ θ(x, y), x ⊕ y)
//! ```
//!
//! where θ : C × C → {0, 1} is a cocycle satisfying
//!
//! ```text
//! θ(x, x)               = |x| / 4          (mod 2)
//! θ(x, y) + θ(y, x)     = |x ∧ y| / 2      (mod 2)
//! θ(x, y) + θ(x⊕y, z)
//!   + θ(y, z) + θ(x, y⊕z) = |x ∧ y ∧ z|    (mod 2)
//! ```
//!
//! The resulting loop is Moufang but, for the interesting codes, not
//! associative. The [24,12] Golay code gives the Parker loop, of order 8192.
//!
//! # Pipeline
//!
//! ```text
//! Basis → VectorSpace → ThetaBuilder → CodeLoop::mul → Verifier
//!                             └──────→ AlphaTable (optional)
//! ```
//!
//! | Stage | Type | Cost |
//! |-------|------|------|
//! | enumerate 2^k codewords | [`VectorSpace`] | O(2^k) |
//! | build θ | [`ThetaBuilder`] | O(4^k) |
//! | verify an identity | [`verify::Verifier`] | O(8^k), parallel |
//! | compress θ | [`AlphaTable`] | O(2^k) bits per side |
//!
//! # Example
//!
//! ```
//! use codeloops::prelude::*;
//!
//! let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
//! cl.verify_basis().unwrap();
//!
//! let v = Verifier::new(&cl).strategy(VerificationStrategy::WeightShortcut);
//! assert!(v.check(Identity::Moufang).holds());
//! assert!(!v.check(Identity::Associativity).holds());
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (`debug` per θ step and worker range,
//! `info` per verdict) and never installs a subscriber.

#![deny(clippy::unwrap_used, clippy::expect_used, missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

// Leaf utilities
pub mod bits;
pub mod error;
pub mod matrix;

// Code and cocycle construction
pub mod basis;
pub mod space;
pub mod theta;

// The loop itself
pub mod code_loop;
pub mod element;

// Compression and verification
pub mod alpha;
pub mod verify;

pub use alpha::AlphaTable;
pub use basis::{Basis, GOLAY_BASIS, GOLAY_SPLIT_BASIS, HAMMING_BASIS, MAX_BASIS_LEN};
pub use code_loop::{CodeLoop, LoopParams, ThetaMode};
pub use element::{LoopElement, Sign};
pub use error::{CodeLoopError, Result};
pub use matrix::PackedBitMatrix;
pub use space::{span, VectorSpace};
pub use theta::{FreeBits, ThetaBuilder, ThetaPath, ThetaTable};

/// Everything needed to build a loop and check it.
pub mod prelude {
    pub use crate::basis::{Basis, GOLAY_BASIS, GOLAY_SPLIT_BASIS, HAMMING_BASIS};
    pub use crate::code_loop::{CodeLoop, LoopParams, ThetaMode};
    pub use crate::element::{LoopElement, Sign};
    pub use crate::error::{CodeLoopError, Result};
    pub use crate::theta::ThetaPath;
    pub use crate::verify::{Counterexample, Identity, Verdict, VerificationStrategy, Verifier};
}
