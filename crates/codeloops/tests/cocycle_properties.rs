//! Property-based tests for the cocycle θ.
//!
//! Every θ the builder produces from a doubly-even basis must satisfy the
//! code-loop identities, whatever free bits were chosen.

use codeloops::bits::{half_meet_bit, parity, quarter_weight_bit};
use codeloops::{CodeLoop, ThetaPath, GOLAY_BASIS, HAMMING_BASIS};
use proptest::prelude::*;
use std::sync::OnceLock;

fn golay() -> &'static CodeLoop {
    static LOOP: OnceLock<CodeLoop> = OnceLock::new();
    LOOP.get_or_init(|| CodeLoop::randomized(&GOLAY_BASIS, 0x5eed).unwrap())
}

/// All four axioms on every pair and triple of a small loop.
fn assert_axioms(cl: &CodeLoop) {
    let vs = cl.vector_space();
    let t = |x, y| cl.theta_by_vec(x, y).unwrap();
    for &x in vs {
        assert_eq!(t(x, 0), 0, "theta({x:#x}, 0)");
        assert_eq!(t(0, x), 0, "theta(0, {x:#x})");
        assert_eq!(t(x, x), quarter_weight_bit(x), "theta({x:#x}, {x:#x})");
        for &y in vs {
            assert_eq!(t(x, y) ^ t(y, x), half_meet_bit(x, y), "commutator at {x:#x}, {y:#x}");
            for &z in vs {
                assert_eq!(
                    t(x, y) ^ t(x ^ y, z) ^ t(y, z) ^ t(x, y ^ z),
                    parity(x & y & z),
                    "associator at {x:#x}, {y:#x}, {z:#x}"
                );
            }
        }
    }
}

// =============================================================================
// Hamming: exhaustive over seeds
// =============================================================================

#[test]
fn zero_path_hamming_satisfies_axioms() {
    assert_axioms(&CodeLoop::new(&HAMMING_BASIS).unwrap());
}

proptest! {
    /// Any seed gives a valid cocycle.
    #[test]
    fn prop_random_hamming_satisfies_axioms(seed in 1u64..) {
        let cl = CodeLoop::randomized(&HAMMING_BASIS, seed).unwrap();
        prop_assert_eq!(cl.seed(), Some(seed));
        assert_axioms(&cl);
    }

    /// Any path, including ones that ask for 1 at forced positions.
    #[test]
    fn prop_arbitrary_path_satisfies_axioms(bits in proptest::collection::vec(any::<bool>(), 0..20)) {
        let path = ThetaPath::from_bits(bits);
        let cl = CodeLoop::with_params(codeloops::LoopParams {
            theta: codeloops::ThetaMode::Path { path },
            ..codeloops::LoopParams::new(&HAMMING_BASIS)
        })
        .unwrap();
        prop_assert_eq!(cl.theta_path().len(), 14);
        assert_axioms(&cl);
    }

    /// Replaying a recorded path rebuilds θ bit for bit.
    #[test]
    fn prop_path_replay_reproduces_theta(seed in 1u64..) {
        let first = CodeLoop::randomized(&HAMMING_BASIS, seed).unwrap();
        let replay = CodeLoop::with_params(codeloops::LoopParams {
            theta: codeloops::ThetaMode::Path { path: first.theta_path().clone() },
            ..codeloops::LoopParams::new(&HAMMING_BASIS)
        })
        .unwrap();
        prop_assert_eq!(first.theta(), replay.theta());
        prop_assert_eq!(first.theta_path(), replay.theta_path());
    }

    /// The same seed gives the same path.
    #[test]
    fn prop_seed_is_deterministic(seed in 1u64..) {
        let a = CodeLoop::randomized(&HAMMING_BASIS, seed).unwrap();
        let b = CodeLoop::randomized(&HAMMING_BASIS, seed).unwrap();
        prop_assert_eq!(a.theta_path(), b.theta_path());
    }
}

// =============================================================================
// Golay: sampled
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn prop_golay_normalized_and_diagonal(i in 0usize..4096) {
        let cl = golay();
        let x = cl.vector_space()[i];
        prop_assert_eq!(cl.theta_by_idx(i, 0).unwrap(), 0);
        prop_assert_eq!(cl.theta_by_idx(0, i).unwrap(), 0);
        prop_assert_eq!(cl.theta_by_vec(x, x).unwrap(), quarter_weight_bit(x));
    }

    #[test]
    fn prop_golay_commutator(i in 0usize..4096, j in 0usize..4096) {
        let cl = golay();
        let (x, y) = (cl.vector_space()[i], cl.vector_space()[j]);
        let t = |a, b| cl.theta_by_vec(a, b).unwrap();
        prop_assert_eq!(t(x, y) ^ t(y, x), half_meet_bit(x, y));
    }

    #[test]
    fn prop_golay_associator(i in 0usize..4096, j in 0usize..4096, k in 0usize..4096) {
        let cl = golay();
        let vs = cl.vector_space();
        let (x, y, z) = (vs[i], vs[j], vs[k]);
        let t = |a, b| cl.theta_by_vec(a, b).unwrap();
        prop_assert_eq!(
            t(x, y) ^ t(x ^ y, z) ^ t(y, z) ^ t(x, y ^ z),
            parity(x & y & z)
        );
    }
}
