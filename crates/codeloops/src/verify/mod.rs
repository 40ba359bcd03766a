//! Brute-force identity verification.
//!
//! A [`Verifier`] checks one [`Identity`] over every triple of a loop, split
//! across a pool of scoped threads. Three strategies are available; on a
//! valid loop they all agree.
//!
//! | Strategy | Triples over | Per triple |
//! |----------|--------------|------------|
//! | [`Direct`](VerificationStrategy::Direct) | 2^(k+1) elements | six loop products |
//! | [`CocycleShortcut`](VerificationStrategy::CocycleShortcut) | 2^k vectors | six θ lookups |
//! | [`WeightShortcut`](VerificationStrategy::WeightShortcut) | 2^k vectors | six popcounts, no table |
//!
//! The shortcuts are 8× smaller searches. The weight form depends only on
//! the code, not on θ, so it also says whether *any* cocycle over the code
//! could work.
//!
//! # Example
//!
//! ```
//! use codeloops::{CodeLoop, HAMMING_BASIS};
//! use codeloops::verify::{Identity, VerificationStrategy, Verifier};
//!
//! let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
//! let v = Verifier::new(&cl)
//!     .strategy(VerificationStrategy::Direct)
//!     .workers(2);
//! assert!(v.check(Identity::Moufang).holds());
//! assert!(v.check(Identity::Associativity).counterexample().is_some());
//! ```

pub mod partition;
mod worker;

use core::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::code_loop::{resolve_seed, CodeLoop};
use crate::element::{LoopElement, Sign};
use worker::{
    CocycleAssociativity, CocycleMoufang, DirectAssociativity, DirectMoufang, Exhaustive,
    Sampled, Search, Triple, WeightAssociativity, WeightMoufang,
};

pub use partition::{partition, TripleSpace, CANCEL_POLL_INTERVAL};

/// How each triple is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum VerificationStrategy {
    /// Multiply real loop elements.
    Direct,
    /// Use the θ form of the identity on vectors.
    #[default]
    CocycleShortcut,
    /// Use the σ (weight) form of the identity on vectors.
    WeightShortcut,
}

impl VerificationStrategy {
    /// All strategies.
    pub const ALL: [VerificationStrategy; 3] = [
        VerificationStrategy::Direct,
        VerificationStrategy::CocycleShortcut,
        VerificationStrategy::WeightShortcut,
    ];
}

/// The identity to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Identity {
    /// z(x(zy)) = ((zx)z)y
    Moufang,
    /// (xy)z = x(yz)
    Associativity,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Identity::Moufang => "moufang",
            Identity::Associativity => "associativity",
        })
    }
}

/// A triple at which an identity fails.
///
/// Shortcut strategies work on bare vectors; their counterexamples carry
/// positive signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counterexample {
    /// First element.
    pub x: LoopElement,
    /// Second element.
    pub y: LoopElement,
    /// Third element.
    pub z: LoopElement,
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The identity holds on every triple searched.
    Holds,
    /// The identity fails at the given triple.
    Fails(Counterexample),
}

impl Verdict {
    /// True for [`Verdict::Holds`].
    pub const fn holds(&self) -> bool {
        matches!(self, Verdict::Holds)
    }

    /// The failing triple, if any.
    pub const fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            Verdict::Holds => None,
            Verdict::Fails(c) => Some(c),
        }
    }
}

/// Threads started per available core, at most.
pub const WORKERS_PER_CPU: usize = 4;

/// Upper bound on [`Verifier::workers`]: [`WORKERS_PER_CPU`] per core.
pub fn max_workers() -> usize {
    num_cpus::get().saturating_mul(WORKERS_PER_CPU).max(1)
}

/// Configured identity checker for one loop.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    cl: &'a CodeLoop,
    strategy: VerificationStrategy,
    workers: usize,
}

impl<'a> Verifier<'a> {
    /// Cocycle shortcut on one worker per available core.
    pub fn new(cl: &'a CodeLoop) -> Self {
        Self {
            cl,
            strategy: VerificationStrategy::default(),
            workers: num_cpus::get(),
        }
    }

    /// Select the strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: VerificationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Select the worker count, clamped to `1..=`[`max_workers`].
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, max_workers());
        self
    }

    /// Check `identity` on every triple.
    pub fn check(&self, identity: Identity) -> Verdict {
        let hit = self.dispatch(identity, &mut Exhaustive {
            workers: self.workers,
        });
        self.verdict(identity, hit, "exhaustive")
    }

    /// Check `identity` on `samples` triples drawn from a generator seeded
    /// with `seed`, on the calling thread. Seed 0 draws a fresh seed, which
    /// is logged with the verdict.
    ///
    /// [`Verdict::Holds`] here only means no failure was drawn.
    pub fn check_sampled(&self, identity: Identity, samples: u64, seed: u64) -> Verdict {
        let seed = resolve_seed(seed);
        debug!(%identity, samples, seed, "sampling triples");
        let hit = self.dispatch(identity, &mut Sampled {
            samples,
            rng: StdRng::seed_from_u64(seed),
        });
        self.verdict(identity, hit, "sampled")
    }

    fn dispatch<S: Search>(&self, identity: Identity, search: &mut S) -> Option<Triple> {
        let cl = self.cl;
        match (self.strategy, identity) {
            (VerificationStrategy::Direct, Identity::Moufang) => search.run(&DirectMoufang(cl)),
            (VerificationStrategy::Direct, Identity::Associativity) => {
                search.run(&DirectAssociativity(cl))
            }
            (VerificationStrategy::CocycleShortcut, Identity::Moufang) => {
                search.run(&CocycleMoufang(cl.theta()))
            }
            (VerificationStrategy::CocycleShortcut, Identity::Associativity) => {
                search.run(&CocycleAssociativity(cl.theta()))
            }
            (VerificationStrategy::WeightShortcut, Identity::Moufang) => {
                search.run(&WeightMoufang(cl.vector_space()))
            }
            (VerificationStrategy::WeightShortcut, Identity::Associativity) => {
                search.run(&WeightAssociativity(cl.vector_space()))
            }
        }
    }

    fn verdict(&self, identity: Identity, hit: Option<Triple>, mode: &str) -> Verdict {
        let verdict = match hit {
            None => Verdict::Holds,
            Some((x, y, z)) => Verdict::Fails(self.witness(x, y, z)),
        };
        match verdict.counterexample() {
            None => info!(%identity, strategy = ?self.strategy, mode, "identity holds"),
            Some(c) => info!(%identity, strategy = ?self.strategy, mode, at = %c, "identity fails"),
        }
        verdict
    }

    fn witness(&self, x: usize, y: usize, z: usize) -> Counterexample {
        let cl = self.cl;
        let el = |i: usize| match self.strategy {
            VerificationStrategy::Direct => cl.element_at(i),
            _ => LoopElement::new(Sign::Pos, cl.vector_space()[i], i),
        };
        Counterexample {
            x: el(x),
            y: el(y),
            z: el(z),
        }
    }
}
