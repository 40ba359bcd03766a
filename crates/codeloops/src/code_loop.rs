//! The code loop: signed code vectors under the θ-twisted product.
//!
//! For a doubly-even code V with cocycle θ, the loop is the set ±V with
//!
//! ```text
//! (s1, x) · (s2, y) = (s1 ⊕ s2 ⊕ θ(x, y), x ⊕ y)
//! ```
//!
//! Everything is built once in the constructor: the vector space, θ, and
//! (optionally) the α table. The loop is immutable afterwards and safe to
//! share across verifier threads.
//!
//! # Example
//!
//! ```
//! use codeloops::{CodeLoop, Sign, HAMMING_BASIS};
//!
//! let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
//! assert_eq!(cl.order(), 32);
//!
//! let x = cl.new_element(0x87, Sign::Pos).unwrap();
//! let y = cl.new_element(0x4b, Sign::Neg).unwrap();
//! let xy = cl.mul(x, y).unwrap();
//! assert_eq!(xy.vector(), 0x87 ^ 0x4b);
//!
//! assert!(cl.is_moufang());
//! assert!(!cl.is_associative());
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::alpha::AlphaTable;
use crate::basis::Basis;
use crate::bits::weight;
use crate::element::{LoopElement, Sign};
use crate::error::{CodeLoopError, Result};
use crate::space::VectorSpace;
use crate::theta::{FreeBits, ThetaBuilder, ThetaPath, ThetaTable};
use crate::verify::{Identity, Verifier};

/// How the free bits of θ are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", tag = "mode")
)]
pub enum ThetaMode {
    /// All free bits 0.
    #[default]
    Zero,
    /// Seeded random bits. Seed 0 draws a fresh seed.
    Random {
        /// Generator seed.
        seed: u64,
    },
    /// Replay a recorded path.
    Path {
        /// The path to replay.
        path: ThetaPath,
    },
}

/// Construction parameters for [`CodeLoop::with_params`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopParams {
    /// Generators of the code, in order.
    pub basis: Vec<u64>,
    /// Free-bit choice for θ.
    #[cfg_attr(feature = "serde", serde(default))]
    pub theta: ThetaMode,
    /// Also build the α table.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alpha: bool,
}

impl LoopParams {
    /// Zero-path parameters for `basis`, no α.
    pub fn new(basis: &[u64]) -> Self {
        Self {
            basis: basis.to_vec(),
            theta: ThetaMode::Zero,
            alpha: false,
        }
    }
}

/// `seed`, or a fresh non-zero seed from the thread generator when it is 0.
pub(crate) fn resolve_seed(seed: u64) -> u64 {
    if seed == 0 {
        rand::thread_rng().gen_range(1..=u64::MAX)
    } else {
        seed
    }
}

/// A code loop over a fixed basis.
#[derive(Debug, Clone)]
pub struct CodeLoop {
    basis: Basis,
    space: VectorSpace,
    theta: ThetaTable,
    path: ThetaPath,
    seed: Option<u64>,
    alpha: Option<AlphaTable>,
}

impl CodeLoop {
    /// Build a loop with every free bit of θ set to 0.
    ///
    /// The basis is not checked; see [`CodeLoop::verify_basis`].
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::EmptyBasis`] or [`CodeLoopError::BasisTooLarge`].
    pub fn new(basis: &[u64]) -> Result<Self> {
        Self::with_params(LoopParams::new(basis))
    }

    /// Build a loop with free bits drawn from a generator seeded by `seed`.
    ///
    /// A seed of 0 draws a fresh seed from the thread generator; the seed
    /// actually used is available from [`CodeLoop::seed`].
    ///
    /// # Errors
    ///
    /// As for [`CodeLoop::new`].
    pub fn randomized(basis: &[u64], seed: u64) -> Result<Self> {
        Self::with_params(LoopParams {
            theta: ThetaMode::Random { seed },
            ..LoopParams::new(basis)
        })
    }

    /// Zero path when `randomize` is false, otherwise
    /// [`CodeLoop::randomized`] with `seed`.
    ///
    /// # Errors
    ///
    /// As for [`CodeLoop::new`].
    pub fn new_loop(basis: &[u64], randomize: bool, seed: u64) -> Result<Self> {
        if randomize {
            Self::randomized(basis, seed)
        } else {
            Self::new(basis)
        }
    }

    /// Build a loop from explicit parameters.
    ///
    /// # Errors
    ///
    /// As for [`CodeLoop::new`].
    pub fn with_params(params: LoopParams) -> Result<Self> {
        let basis = Basis::new(params.basis)?;
        let space = VectorSpace::build(&basis);
        let builder = ThetaBuilder::new(&basis, &space);

        let (seed, (theta, path)) = match &params.theta {
            ThetaMode::Zero => (None, builder.build(FreeBits::Zero)?),
            ThetaMode::Random { seed } => {
                let seed = resolve_seed(*seed);
                let mut rng = StdRng::seed_from_u64(seed);
                (Some(seed), builder.build(FreeBits::Random(&mut rng))?)
            }
            ThetaMode::Path { path } => (None, builder.build(FreeBits::Path(path))?),
        };

        let alpha = params.alpha.then(|| AlphaTable::build(&space, &theta));

        info!(
            dimension = basis.len(),
            vectors = space.len(),
            seed = ?seed,
            alpha = alpha.is_some(),
            "code loop built"
        );

        Ok(Self {
            basis,
            space,
            theta,
            path,
            seed,
            alpha,
        })
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// The element `(sign, vector)`.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::VectorNotInSpace`] if `vector` is not a codeword.
    pub fn new_element(&self, vector: u64, sign: Sign) -> Result<LoopElement> {
        let index = self.space.try_index_of(vector)?;
        Ok(LoopElement::new(sign, vector, index))
    }

    /// The element whose vector is the XOR of the generators selected by the
    /// bits of `index`.
    ///
    /// The vector is folded from the basis directly rather than read from the
    /// space table.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOverflow`] if `index >= 2^k`.
    pub fn new_element_from_index(&self, index: usize, sign: Sign) -> Result<LoopElement> {
        let size = self.vector_count();
        if index >= size {
            return Err(CodeLoopError::IndexOverflow {
                row: index,
                col: 0,
                size,
            });
        }
        Ok(LoopElement::new(sign, self.basis.combine(index), index))
    }

    /// Every element: all positive in space order, then all negative.
    ///
    /// Element `e` has sign `e >> k` and vector index `e & (2^k − 1)`.
    pub fn loop_elements(&self) -> Vec<LoopElement> {
        [Sign::Pos, Sign::Neg]
            .into_iter()
            .flat_map(|sign| {
                self.space
                    .vectors()
                    .iter()
                    .enumerate()
                    .map(move |(i, &v)| LoopElement::new(sign, v, i))
            })
            .collect()
    }

    /// Element by its position in [`CodeLoop::loop_elements`].
    pub(crate) fn element_at(&self, e: usize) -> LoopElement {
        let i = e & (self.vector_count() - 1);
        LoopElement::new(
            Sign::from_bit((e >> self.dimension()) as u8),
            self.space.vectors()[i],
            i,
        )
    }

    // ------------------------------------------------------------------
    // Product
    // ------------------------------------------------------------------

    /// The loop product `x · y`.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOverflow`] or [`CodeLoopError::VectorNotInSpace`]
    /// if either element does not belong to this loop.
    pub fn mul(&self, x: LoopElement, y: LoopElement) -> Result<LoopElement> {
        self.check_member(x, y)?;
        Ok(self.product(x, y))
    }

    /// Product of two members, no checks.
    #[inline]
    pub(crate) fn product(&self, x: LoopElement, y: LoopElement) -> LoopElement {
        let t = self.theta.bit(x.index(), y.index());
        LoopElement::new(
            x.sign().twist(y.sign(), t),
            x.vector() ^ y.vector(),
            x.index() ^ y.index(),
        )
    }

    fn check_member(&self, x: LoopElement, y: LoopElement) -> Result<()> {
        let size = self.vector_count();
        if x.index() >= size || y.index() >= size {
            return Err(CodeLoopError::IndexOverflow {
                row: x.index(),
                col: y.index(),
                size,
            });
        }
        for e in [x, y] {
            if self.space.vectors()[e.index()] != e.vector() {
                return Err(CodeLoopError::VectorNotInSpace(e.vector()));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cocycle lookups
    // ------------------------------------------------------------------

    /// θ(x, y) for two codewords.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::VectorNotInSpace`] if either is not a codeword.
    pub fn theta_by_vec(&self, x: u64, y: u64) -> Result<u8> {
        let i = self.space.try_index_of(x)?;
        let j = self.space.try_index_of(y)?;
        Ok(self.theta.bit(i, j))
    }

    /// θ at two vector-space indices.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::IndexOverflow`] if either index is ≥ 2^k.
    pub fn theta_by_idx(&self, i: usize, j: usize) -> Result<u8> {
        self.theta.by_idx(i, j)
    }

    /// θ(x, y) rebuilt from the α table.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::AlphaUnavailable`] if the loop was built without α,
    /// [`CodeLoopError::VectorNotInSpace`] if either vector is not a
    /// codeword.
    pub fn theta_alpha_by_vec(&self, x: u64, y: u64) -> Result<u8> {
        self.alpha
            .as_ref()
            .ok_or(CodeLoopError::AlphaUnavailable)?
            .theta_by_vec(&self.space, x, y)
    }

    // ------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------

    /// Check that every codeword has weight divisible by 4.
    ///
    /// # Errors
    ///
    /// [`CodeLoopError::InvalidBasisVector`] naming the first codeword, in
    /// space order, that is not doubly even.
    pub fn verify_basis(&self) -> Result<()> {
        match self.space.vectors().iter().find(|&&v| weight(v) % 4 != 0) {
            Some(&vector) => {
                debug!(vector, "basis is not doubly even");
                Err(CodeLoopError::InvalidBasisVector {
                    vector,
                    weight: weight(vector),
                })
            }
            None => Ok(()),
        }
    }

    /// Whether the loop satisfies the Moufang identity, checked exhaustively
    /// with the cocycle shortcut on all available cores.
    pub fn is_moufang(&self) -> bool {
        Verifier::new(self).check(Identity::Moufang).holds()
    }

    /// Whether the loop is associative, checked exhaustively with the
    /// cocycle shortcut on all available cores.
    pub fn is_associative(&self) -> bool {
        Verifier::new(self).check(Identity::Associativity).holds()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The basis.
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// The codewords in index order.
    pub fn vector_space(&self) -> &[u64] {
        self.space.vectors()
    }

    /// The vector space with its reverse index.
    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    /// The cocycle table.
    pub fn theta(&self) -> &ThetaTable {
        &self.theta
    }

    /// The free-bit path θ was built with.
    pub fn theta_path(&self) -> &ThetaPath {
        &self.path
    }

    /// The seed used for random free bits, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The α table, if it was requested.
    pub fn alpha(&self) -> Option<&AlphaTable> {
        self.alpha.as_ref()
    }

    /// Basis length k.
    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    /// Number of codewords, 2^k.
    pub fn vector_count(&self) -> usize {
        self.space.len()
    }

    /// Number of loop elements, 2^(k+1).
    pub fn order(&self) -> usize {
        2 * self.space.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::HAMMING_BASIS;

    #[test]
    fn hamming_sizes() {
        let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
        assert_eq!(cl.dimension(), 4);
        assert_eq!(cl.vector_count(), 16);
        assert_eq!(cl.order(), 32);
        assert_eq!(cl.loop_elements().len(), 32);
        assert_eq!(cl.theta_path().len(), 14);
        assert_eq!(cl.seed(), None);
        assert!(cl.alpha().is_none());
    }

    #[test]
    fn loop_elements_order() {
        let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
        let elems = cl.loop_elements();
        for (e, el) in elems.iter().enumerate() {
            assert_eq!(*el, cl.element_at(e));
            assert_eq!(el.sign(), if e < 16 { Sign::Pos } else { Sign::Neg });
            assert_eq!(el.vector(), cl.vector_space()[e % 16]);
        }
    }

    #[test]
    fn mul_twists_sign_by_theta() {
        let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
        for x in cl.loop_elements() {
            for y in cl.loop_elements() {
                let p = cl.mul(x, y).unwrap();
                let t = cl.theta_by_vec(x.vector(), y.vector()).unwrap();
                assert_eq!(p.vector(), x.vector() ^ y.vector());
                assert_eq!(p.sign().bit(), x.sign().bit() ^ y.sign().bit() ^ t);
                assert_eq!(cl.vector_space()[p.index()], p.vector());
            }
        }
    }

    #[test]
    fn identity_and_squares() {
        let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
        let one = cl.new_element(0, Sign::Pos).unwrap();
        for x in cl.loop_elements() {
            assert_eq!(cl.mul(one, x).unwrap(), x);
            assert_eq!(cl.mul(x, one).unwrap(), x);
            // x² = ±1 with sign |x|/4
            let sq = cl.mul(x, x).unwrap();
            assert_eq!(sq.vector(), 0);
            assert_eq!(sq.sign().bit(), (weight(x.vector()) / 4 % 2) as u8);
        }
    }

    #[test]
    fn foreign_elements_are_rejected() {
        let small = CodeLoop::new(&HAMMING_BASIS[..2]).unwrap();
        let big = CodeLoop::new(&HAMMING_BASIS).unwrap();
        let far = big.new_element_from_index(12, Sign::Pos).unwrap();
        let near = small.new_element_from_index(1, Sign::Pos).unwrap();
        assert_eq!(
            small.mul(near, far),
            Err(CodeLoopError::IndexOverflow {
                row: 1,
                col: 12,
                size: 4
            })
        );

        let other = CodeLoop::new(&[0x0f, 0xf0]).unwrap();
        let wrong = other.new_element(0xf0, Sign::Neg).unwrap();
        assert_eq!(
            small.mul(near, wrong),
            Err(CodeLoopError::VectorNotInSpace(0xf0))
        );
    }

    #[test]
    fn element_constructors() {
        let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
        assert_eq!(
            cl.new_element(0x01, Sign::Pos),
            Err(CodeLoopError::VectorNotInSpace(0x01))
        );
        assert_eq!(
            cl.new_element_from_index(16, Sign::Pos),
            Err(CodeLoopError::IndexOverflow {
                row: 16,
                col: 0,
                size: 16
            })
        );
        let e = cl.new_element_from_index(0b0011, Sign::Neg).unwrap();
        assert_eq!(e.vector(), 0x87 ^ 0x4b);
        assert_eq!(e.sign(), Sign::Neg);
    }

    #[test]
    fn verify_basis_reports_first_bad_vector() {
        assert!(CodeLoop::new(&HAMMING_BASIS).unwrap().verify_basis().is_ok());
        let bad = CodeLoop::new(&[0x87, 0x4b, 0x3d, 0x1e]).unwrap();
        assert_eq!(
            bad.verify_basis(),
            Err(CodeLoopError::InvalidBasisVector {
                vector: 0x3d,
                weight: 5,
            })
        );
    }

    #[test]
    fn seeds() {
        let a = CodeLoop::randomized(&HAMMING_BASIS, 99).unwrap();
        let b = CodeLoop::new_loop(&HAMMING_BASIS, true, 99).unwrap();
        assert_eq!(a.seed(), Some(99));
        assert_eq!(a.theta(), b.theta());
        assert_eq!(a.theta_path(), b.theta_path());

        let fresh = CodeLoop::randomized(&HAMMING_BASIS, 0).unwrap();
        assert!(matches!(fresh.seed(), Some(s) if s != 0));

        let plain = CodeLoop::new_loop(&HAMMING_BASIS, false, 99).unwrap();
        assert_eq!(plain.seed(), None);
    }

    #[test]
    fn alpha_on_request() {
        let cl = CodeLoop::with_params(LoopParams {
            alpha: true,
            ..LoopParams::new(&HAMMING_BASIS)
        })
        .unwrap();
        assert!(cl.alpha().is_some());
        for &x in cl.vector_space() {
            for &y in cl.vector_space() {
                assert_eq!(
                    cl.theta_alpha_by_vec(x, y).unwrap(),
                    cl.theta_by_vec(x, y).unwrap()
                );
            }
        }
        let plain = CodeLoop::new(&HAMMING_BASIS).unwrap();
        assert_eq!(
            plain.theta_alpha_by_vec(0, 0),
            Err(CodeLoopError::AlphaUnavailable)
        );
    }

    #[test]
    fn construction_errors() {
        assert_eq!(CodeLoop::new(&[]).unwrap_err(), CodeLoopError::EmptyBasis);
    }
}
