//! Per-triple identity kernels and the scoped worker pool that runs them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use tracing::debug;

use super::partition::{partition, TripleSpace, CANCEL_POLL_INTERVAL};
use crate::bits::{parity, sigma};
use crate::code_loop::CodeLoop;
use crate::theta::ThetaTable;

/// Indices `(x, y, z)` of a failing triple.
pub(crate) type Triple = (usize, usize, usize);

/// One identity under one strategy, evaluated on a triple of indices.
pub(crate) trait TripleKernel: Sync {
    /// Width of each index in the triple.
    fn bits(&self) -> u32;

    /// True when the identity fails at `(x, y, z)`.
    fn fails(&self, x: usize, y: usize, z: usize) -> bool;

    /// Name for log output.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Direct: real loop products over element indices
// =============================================================================

/// z(x(zy)) against ((zx)z)y.
pub(crate) struct DirectMoufang<'a>(pub &'a CodeLoop);

impl TripleKernel for DirectMoufang<'_> {
    fn bits(&self) -> u32 {
        self.0.dimension() as u32 + 1
    }

    #[inline]
    fn fails(&self, x: usize, y: usize, z: usize) -> bool {
        let cl = self.0;
        let (x, y, z) = (cl.element_at(x), cl.element_at(y), cl.element_at(z));
        let lhs = cl.product(z, cl.product(x, cl.product(z, y)));
        let rhs = cl.product(cl.product(cl.product(z, x), z), y);
        // vectors always agree, only the sign can differ
        lhs.sign() != rhs.sign()
    }

    fn name(&self) -> &'static str {
        "direct-moufang"
    }
}

/// (xy)z against x(yz).
pub(crate) struct DirectAssociativity<'a>(pub &'a CodeLoop);

impl TripleKernel for DirectAssociativity<'_> {
    fn bits(&self) -> u32 {
        self.0.dimension() as u32 + 1
    }

    #[inline]
    fn fails(&self, x: usize, y: usize, z: usize) -> bool {
        let cl = self.0;
        let (x, y, z) = (cl.element_at(x), cl.element_at(y), cl.element_at(z));
        let lhs = cl.product(cl.product(x, y), z);
        let rhs = cl.product(x, cl.product(y, z));
        lhs.sign() != rhs.sign()
    }

    fn name(&self) -> &'static str {
        "direct-associativity"
    }
}

// =============================================================================
// Cocycle shortcut: θ identities over vector indices
// =============================================================================

/// θ(x,y) + θ(z,x) + θ(x+y, z+x) = θ(y,z) + θ(x, y+z) + θ(x+y+z, x).
pub(crate) struct CocycleMoufang<'a>(pub &'a ThetaTable);

impl TripleKernel for CocycleMoufang<'_> {
    fn bits(&self) -> u32 {
        self.0.dimension() as u32
    }

    #[inline]
    fn fails(&self, x: usize, y: usize, z: usize) -> bool {
        let t = |a, b| self.0.bit(a, b);
        t(x, y) ^ t(z, x) ^ t(x ^ y, z ^ x) ^ t(y, z) ^ t(x, y ^ z) ^ t(x ^ y ^ z, x) != 0
    }

    fn name(&self) -> &'static str {
        "cocycle-moufang"
    }
}

/// θ(x, y+z) + θ(y, z) = θ(x+y, z) + θ(x, y).
pub(crate) struct CocycleAssociativity<'a>(pub &'a ThetaTable);

impl TripleKernel for CocycleAssociativity<'_> {
    fn bits(&self) -> u32 {
        self.0.dimension() as u32
    }

    #[inline]
    fn fails(&self, x: usize, y: usize, z: usize) -> bool {
        let t = |a, b| self.0.bit(a, b);
        t(x, y ^ z) ^ t(y, z) ^ t(x ^ y, z) ^ t(x, y) != 0
    }

    fn name(&self) -> &'static str {
        "cocycle-associativity"
    }
}

// =============================================================================
// Weight shortcut: σ form, no θ table at all
// =============================================================================

/// σ(x,z) + σ(y,x+z) + σ(x,x+y+z) + σ(x,y) + σ(x+y,x) + σ(y,z) = 0.
pub(crate) struct WeightMoufang<'a>(pub &'a [u64]);

impl TripleKernel for WeightMoufang<'_> {
    fn bits(&self) -> u32 {
        self.0.len().trailing_zeros()
    }

    #[inline]
    fn fails(&self, x: usize, y: usize, z: usize) -> bool {
        let (x, y, z) = (self.0[x], self.0[y], self.0[z]);
        let lhs = sigma(x, z) ^ sigma(y, x ^ z) ^ sigma(x, x ^ y ^ z);
        let rhs = sigma(x, y) ^ sigma(x ^ y, x) ^ sigma(y, z);
        lhs != rhs
    }

    fn name(&self) -> &'static str {
        "weight-moufang"
    }
}

/// |x ∧ y ∧ z| even.
pub(crate) struct WeightAssociativity<'a>(pub &'a [u64]);

impl TripleKernel for WeightAssociativity<'_> {
    fn bits(&self) -> u32 {
        self.0.len().trailing_zeros()
    }

    #[inline]
    fn fails(&self, x: usize, y: usize, z: usize) -> bool {
        parity(self.0[x] & self.0[y] & self.0[z]) != 0
    }

    fn name(&self) -> &'static str {
        "weight-associativity"
    }
}

// =============================================================================
// Runners
// =============================================================================

/// Search every triple on `workers` threads, returning the first failure
/// any worker reports.
///
/// Workers share `kernel` read-only and report over one channel. On the first
/// report the coordinator raises the cancel flag; workers see it within
/// [`CANCEL_POLL_INTERVAL`] iterations.
pub(crate) fn run<K: TripleKernel>(kernel: &K, workers: usize) -> Option<Triple> {
    let space = TripleSpace::new(kernel.bits());
    let ranges = partition(space.total(), workers);
    let cancel = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel();

    debug!(
        kernel = kernel.name(),
        triples = space.total(),
        workers = ranges.len(),
        "starting search"
    );

    thread::scope(|s| {
        for (id, range) in ranges.into_iter().enumerate() {
            let tx = tx.clone();
            let cancel = &cancel;
            s.spawn(move || {
                debug!(worker = id, start = range.start, end = range.end, "worker started");
                for (n, c) in range.enumerate() {
                    if n as u64 % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                        debug!(worker = id, "worker cancelled");
                        return;
                    }
                    let (x, y, z) = space.split(c);
                    if kernel.fails(x, y, z) {
                        // the receiver may already be gone after an earlier report
                        let _ = tx.send((x, y, z));
                        return;
                    }
                }
                debug!(worker = id, "worker finished clean");
            });
        }
        drop(tx);

        let found = rx.recv().ok();
        if found.is_some() {
            cancel.store(true, Ordering::Relaxed);
        }
        found
    })
}

/// Check `samples` uniformly drawn triples on the calling thread.
pub(crate) fn sample<K: TripleKernel, R: Rng>(
    kernel: &K,
    samples: u64,
    rng: &mut R,
) -> Option<Triple> {
    let space = TripleSpace::new(kernel.bits());
    debug!(kernel = kernel.name(), samples, "starting sampled search");
    (0..samples)
        .map(|_| space.split(rng.gen_range(0..space.total())))
        .find(|&(x, y, z)| kernel.fails(x, y, z))
}

/// A way of walking the triple space with some kernel.
pub(crate) trait Search {
    fn run<K: TripleKernel>(&mut self, kernel: &K) -> Option<Triple>;
}

/// Every triple, on a worker pool.
pub(crate) struct Exhaustive {
    pub workers: usize,
}

impl Search for Exhaustive {
    fn run<K: TripleKernel>(&mut self, kernel: &K) -> Option<Triple> {
        run(kernel, self.workers)
    }
}

/// Random triples, on the calling thread.
pub(crate) struct Sampled<R> {
    pub samples: u64,
    pub rng: R,
}

impl<R: Rng> Search for Sampled<R> {
    fn run<K: TripleKernel>(&mut self, kernel: &K) -> Option<Triple> {
        sample(kernel, self.samples, &mut self.rng)
    }
}
