//! The three verification strategies must agree, on good loops and bad.

use codeloops::verify::{partition, Identity, Verdict, VerificationStrategy, Verifier};
use codeloops::{CodeLoop, CodeLoopError, Sign, GOLAY_BASIS, HAMMING_BASIS};
use proptest::prelude::*;

/// Hamming with the third generator's weight broken (0x2d → 0x3d).
const BAD_HAMMING: [u64; 4] = [0x87, 0x4b, 0x3d, 0x1e];

fn bad_golay() -> Vec<u64> {
    let mut b = GOLAY_BASIS.to_vec();
    b[3] = 0x11093e;
    b
}

fn check(cl: &CodeLoop, s: VerificationStrategy, id: Identity, workers: usize) -> Verdict {
    Verifier::new(cl).strategy(s).workers(workers).check(id)
}

// =============================================================================
// Valid Hamming loops
// =============================================================================

#[test]
fn strategies_agree_on_hamming() {
    for seed in [None, Some(1), Some(7), Some(1234)] {
        let cl = match seed {
            None => CodeLoop::new(&HAMMING_BASIS).unwrap(),
            Some(s) => CodeLoop::randomized(&HAMMING_BASIS, s).unwrap(),
        };
        for s in VerificationStrategy::ALL {
            for workers in [1, 3, 8] {
                assert!(
                    check(&cl, s, Identity::Moufang, workers).holds(),
                    "{s:?} Moufang, seed {seed:?}"
                );
                assert!(
                    !check(&cl, s, Identity::Associativity, workers).holds(),
                    "{s:?} associativity, seed {seed:?}"
                );
            }
        }
    }
}

#[test]
fn associativity_counterexamples_are_real() {
    let cl = CodeLoop::randomized(&HAMMING_BASIS, 77).unwrap();
    for s in VerificationStrategy::ALL {
        let v = check(&cl, s, Identity::Associativity, 4);
        let c = v.counterexample().unwrap();
        let lhs = cl.mul(cl.mul(c.x, c.y).unwrap(), c.z).unwrap();
        let rhs = cl.mul(c.x, cl.mul(c.y, c.z).unwrap()).unwrap();
        assert_eq!(lhs.vector(), rhs.vector());
        assert_ne!(lhs.sign(), rhs.sign(), "{s:?} at {c}");
    }
}

#[test]
fn shortcut_counterexamples_are_positive() {
    let cl = CodeLoop::new(&HAMMING_BASIS).unwrap();
    for s in [
        VerificationStrategy::CocycleShortcut,
        VerificationStrategy::WeightShortcut,
    ] {
        let v = check(&cl, s, Identity::Associativity, 2);
        let c = v.counterexample().unwrap();
        for e in [c.x, c.y, c.z] {
            assert_eq!(e.sign(), Sign::Pos);
        }
    }
}

// =============================================================================
// Corrupted bases
// =============================================================================

#[test]
fn bad_hamming_fails_everywhere() {
    let cl = CodeLoop::new(&BAD_HAMMING).unwrap();
    assert!(matches!(
        cl.verify_basis(),
        Err(CodeLoopError::InvalidBasisVector { vector: 0x3d, weight: 5 })
    ));
    for s in VerificationStrategy::ALL {
        for workers in [1, 4] {
            assert!(
                !check(&cl, s, Identity::Moufang, workers).holds(),
                "{s:?} accepted a bad basis"
            );
        }
    }
    assert!(!cl.is_moufang());
}

#[test]
fn bad_hamming_direct_counterexample() {
    let cl = CodeLoop::new(&BAD_HAMMING).unwrap();
    let v = check(&cl, VerificationStrategy::Direct, Identity::Moufang, 1);
    let c = v.counterexample().unwrap();
    assert_eq!(c.x, cl.new_element(0x3d, Sign::Pos).unwrap());
    assert_eq!(c.y, cl.new_element(0, Sign::Pos).unwrap());
    assert_eq!(c.z, cl.new_element(0x1e, Sign::Pos).unwrap());

    // the reported triple really breaks z(x(zy)) = ((zx)z)y
    let (x, y, z) = (c.x, c.y, c.z);
    let lhs = cl.mul(z, cl.mul(x, cl.mul(z, y).unwrap()).unwrap()).unwrap();
    let rhs = cl.mul(cl.mul(cl.mul(z, x).unwrap(), z).unwrap(), y).unwrap();
    assert_ne!(lhs, rhs);
}

#[test]
fn bad_golay_fails_early() {
    let cl = CodeLoop::new(&bad_golay()).unwrap();
    assert!(cl.verify_basis().is_err());

    // the corrupted generator breaks normalization, which both the element
    // and the θ search hit at (0, 0, 392)
    for s in [
        VerificationStrategy::Direct,
        VerificationStrategy::CocycleShortcut,
    ] {
        let v = check(&cl, s, Identity::Moufang, 1);
        let c = v.counterexample().unwrap();
        assert_eq!((c.x.index(), c.y.index(), c.z.index()), (0, 0, 392), "{s:?}");
        assert_eq!(c.z.sign(), Sign::Pos);
    }

    let v = check(&cl, VerificationStrategy::WeightShortcut, Identity::Moufang, 8);
    assert!(!v.holds());
}

// =============================================================================
// Partitioning
// =============================================================================

proptest! {
    /// Ranges are contiguous, disjoint, and cover the total exactly.
    #[test]
    fn prop_partition_covers_range(total in 1u64..1_000_000, workers in 0usize..256) {
        let parts = partition(total, workers);
        prop_assert_eq!(parts.len() as u64, (workers.max(1) as u64).min(total));
        prop_assert_eq!(parts[0].start, 0);
        prop_assert_eq!(parts[parts.len() - 1].end, total);
        for w in parts.windows(2) {
            prop_assert_eq!(w[0].end, w[1].start);
        }
        for r in &parts {
            prop_assert!(r.start < r.end);
        }
    }
}
