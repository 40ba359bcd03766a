//! Build a loop from a [`ClientConfig`] and run the requested checks.

use std::time::Instant;

use anyhow::{Context, Result};
use codeloops::verify::{Identity, Verdict, Verifier};
use codeloops::CodeLoop;
use serde::Serialize;
use tracing::info;

use crate::config::{Check, ClientConfig};

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Check name.
    pub check: String,
    /// True when the loop behaved as required.
    pub passed: bool,
    /// One-line explanation.
    pub message: String,
    /// Wall-clock time spent.
    pub elapsed_ms: u128,
}

/// Everything the client learned about one loop.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Basis as configured.
    pub basis: String,
    /// Number of generators.
    pub dimension: usize,
    /// Number of codewords.
    pub vectors: usize,
    /// Number of loop elements.
    pub order: usize,
    /// Recorded θ path, replayable with `--theta path --path`.
    pub theta_path: String,
    /// Seed actually used, when θ was randomized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Check outcomes, in the order they ran.
    pub outcomes: Vec<Outcome>,
}

impl Report {
    /// Number of failed checks.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }
}

/// Build the configured loop and run every requested check.
///
/// A failing check is recorded in the report, not returned as an error.
///
/// # Errors
///
/// Returns an error if the loop cannot be built.
pub fn run(config: &ClientConfig) -> Result<Report> {
    let params = config.loop_params()?;
    let started = Instant::now();
    let cl = CodeLoop::with_params(params)
        .with_context(|| format!("building code loop over {}", config.basis))?;
    info!(
        basis = %config.basis,
        order = cl.order(),
        elapsed_ms = started.elapsed().as_millis(),
        "loop ready"
    );

    let mut verifier = Verifier::new(&cl).strategy(config.strategy.into());
    if let Some(workers) = config.workers {
        verifier = verifier.workers(workers);
    }

    // a random θ's seed is reused for sampling, so seed 0 is drawn only once
    let sample_seed = cl.seed().unwrap_or(config.seed);

    let mut outcomes = Vec::with_capacity(config.checks.len() + 1);
    for &check in &config.checks {
        let started = Instant::now();
        let (passed, message) = match check {
            Check::Basis => match cl.verify_basis() {
                Ok(()) => (true, "every codeword has weight divisible by 4".to_string()),
                Err(e) => (false, e.to_string()),
            },
            Check::Moufang => match search(&verifier, Identity::Moufang, config, sample_seed) {
                Verdict::Holds => (true, scope(config, "Moufang identity holds")),
                Verdict::Fails(c) => (false, format!("Moufang identity fails at {c}")),
            },
            Check::NonAssociative => {
                match search(&verifier, Identity::Associativity, config, sample_seed) {
                    Verdict::Fails(c) => (true, format!("associativity fails at {c}")),
                    Verdict::Holds => (false, scope(config, "associativity holds")),
                }
            }
        };
        outcomes.push(Outcome {
            check: check.to_string(),
            passed,
            message,
            elapsed_ms: started.elapsed().as_millis(),
        });
    }

    if config.alpha {
        let started = Instant::now();
        let (passed, message) = check_alpha(&cl);
        outcomes.push(Outcome {
            check: "alpha".to_string(),
            passed,
            message,
            elapsed_ms: started.elapsed().as_millis(),
        });
    }

    Ok(Report {
        basis: config.basis.to_string(),
        dimension: cl.dimension(),
        vectors: cl.vector_count(),
        order: cl.order(),
        theta_path: cl.theta_path().to_string(),
        seed: cl.seed(),
        outcomes,
    })
}

fn search(
    verifier: &Verifier<'_>,
    identity: Identity,
    config: &ClientConfig,
    seed: u64,
) -> Verdict {
    match config.samples {
        Some(n) => verifier.check_sampled(identity, n, seed),
        None => verifier.check(identity),
    }
}

fn scope(config: &ClientConfig, what: &str) -> String {
    match config.samples {
        Some(n) => format!("{what} on {n} sampled triples"),
        None => format!("{what} on every triple"),
    }
}

/// Compare α's reconstruction of θ against the full table.
fn check_alpha(cl: &CodeLoop) -> (bool, String) {
    let Some(alpha) = cl.alpha() else {
        return (false, "α table was not built".to_string());
    };
    let n = cl.vector_count();
    for i in 0..n {
        for j in 0..n {
            match (alpha.theta_by_idx(i, j), cl.theta_by_idx(i, j)) {
                (Ok(a), Ok(t)) if a == t => {}
                (Ok(a), Ok(t)) => {
                    return (false, format!("α gives {a}, θ gives {t} at ({i}, {j})"));
                }
                (Err(e), _) | (_, Err(e)) => return (false, e.to_string()),
            }
        }
    }
    (
        true,
        format!("{} α entries reproduce all {} θ entries", alpha.len() * alpha.len(), n * n),
    )
}
