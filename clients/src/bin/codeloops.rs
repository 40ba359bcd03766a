//! `codeloops`: build a code loop and check its identities.
//!
//! **Usage:**
//! ```text
//! codeloops [--config <file>] [--basis <name|hex,...>] [--theta zero|random|path]
//!           [--seed <n>] [--path <hex>] [--alpha] [--strategy direct|cocycle|weight]
//!           [--workers <n>] [--samples <n>] [--check <check>]... [--json]
//! ```
//!
//! Flags override the config file. Exits non-zero if any check fails.
//! Set `RUST_LOG=codeloops=debug` to trace θ construction and the workers.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use codeloops_clients::{run, BasisChoice, Check, ClientConfig, Strategy, ThetaChoice};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build a code loop and check that it is Moufang.
#[derive(Parser)]
#[command(
    name = "codeloops",
    about = "Build a code loop over a doubly-even code and check its identities"
)]
struct Args {
    /// TOML file with run settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named basis (hamming, golay, golay-split) or comma-separated hex generators.
    #[arg(long)]
    basis: Option<BasisChoice>,

    /// How θ's free bits are chosen.
    #[arg(long, value_enum)]
    theta: Option<ThetaChoice>,

    /// Seed for random θ and for sampling (0 draws a fresh seed).
    ///
    /// A random θ's seed is reused for sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Recorded θ path to replay, as printed by an earlier run.
    #[arg(long)]
    path: Option<String>,

    /// Build the α table and check it against θ.
    #[arg(long)]
    alpha: bool,

    /// Verification strategy.
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Worker threads (default: number of CPUs; capped at four per CPU).
    #[arg(long)]
    workers: Option<usize>,

    /// Check this many random triples instead of all of them.
    #[arg(long)]
    samples: Option<u64>,

    /// Check to run; repeat for several (default: all).
    #[arg(long = "check", value_enum)]
    checks: Vec<Check>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(ClientConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(basis) = self.basis {
            config.basis = basis;
        }
        if let Some(path) = self.path {
            config.path = Some(path);
            // a path on the command line implies replay unless --theta says otherwise
            config.theta = ThetaChoice::Path;
        }
        if let Some(theta) = self.theta {
            config.theta = theta;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
        if self.samples.is_some() {
            config.samples = self.samples;
        }
        if !self.checks.is_empty() {
            config.checks = self.checks;
        }
        config.alpha |= self.alpha;
        Ok((config, self.json))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("codeloops=info,codeloops_clients=info")),
        )
        .init();

    let (config, json) = Args::parse().into_config()?;
    info!(basis = %config.basis, theta = ?config.theta, strategy = ?config.strategy, "run configured");

    let report = run(&config)?;

    if json {
        let text = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{text}");
    } else {
        let title = format!("Code loop over {}", report.basis);
        println!("{title}");
        println!("{}", "=".repeat(title.chars().count()));
        println!();
        println!("dimension:  {}", report.dimension);
        println!("codewords:  {}", report.vectors);
        println!("order:      {}", report.order);
        if let Some(seed) = report.seed {
            println!("seed:       {seed}");
        }
        println!("theta path: {}", report.theta_path);
        println!();
        for o in &report.outcomes {
            let status = if o.passed { "PASS" } else { "FAIL" };
            println!("[{status}] {} ({} ms): {}", o.check, o.elapsed_ms, o.message);
        }
        println!();
    }

    let failed = report.failed();
    if failed > 0 {
        eprintln!("{failed} check(s) FAILED.");
        process::exit(1);
    }
    if !json {
        println!("All checks passed.");
    }
    Ok(())
}
