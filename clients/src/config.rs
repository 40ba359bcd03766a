//! TOML run configuration for the `codeloops` client.
//!
//! Every field is optional; command-line flags override whatever the file
//! sets. A typical file:
//!
//! ```toml
//! basis = "golay"
//! theta = "random"
//! seed = 42
//! strategy = "weight"
//! checks = ["basis", "moufang", "non-associative"]
//! samples = 1000000
//! ```
//!
//! `basis` is either a named code or a list of generators (`[0x87, 0x4b,
//! 0x2d, 0x1e]`; TOML accepts hex integers).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use codeloops::verify::VerificationStrategy;
use codeloops::{LoopParams, ThetaMode, ThetaPath, GOLAY_BASIS, GOLAY_SPLIT_BASIS, HAMMING_BASIS};
use serde::{Deserialize, Serialize};

/// A built-in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamedBasis {
    /// The [8,4] extended Hamming code.
    Hamming,
    /// The [24,12] Golay code.
    Golay,
    /// The Golay code with a basis that splits into two 6-vector halves.
    GolaySplit,
}

impl NamedBasis {
    /// Generators of the code.
    pub fn generators(self) -> &'static [u64] {
        match self {
            NamedBasis::Hamming => &HAMMING_BASIS,
            NamedBasis::Golay => &GOLAY_BASIS,
            NamedBasis::GolaySplit => &GOLAY_SPLIT_BASIS,
        }
    }
}

/// Which basis to build the loop over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BasisChoice {
    /// A built-in code.
    Named(NamedBasis),
    /// Explicit generators.
    Vectors(Vec<u64>),
}

impl Default for BasisChoice {
    fn default() -> Self {
        BasisChoice::Named(NamedBasis::Hamming)
    }
}

impl BasisChoice {
    /// Generators, in order.
    pub fn generators(&self) -> Vec<u64> {
        match self {
            BasisChoice::Named(n) => n.generators().to_vec(),
            BasisChoice::Vectors(v) => v.clone(),
        }
    }
}

impl fmt::Display for BasisChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisChoice::Named(n) => match n.to_possible_value() {
                Some(v) => f.write_str(v.get_name()),
                None => write!(f, "{n:?}"),
            },
            BasisChoice::Vectors(v) => {
                let hex: Vec<String> = v.iter().map(|x| format!("{x:#x}")).collect();
                write!(f, "[{}]", hex.join(", "))
            }
        }
    }
}

/// Parses a basis name (`hamming`, `golay`, `golay-split`) or a
/// comma-separated list of hex generators.
impl FromStr for BasisChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(named) = NamedBasis::from_str(s, true) {
            return Ok(BasisChoice::Named(named));
        }
        let vectors = s
            .split(',')
            .map(|v| {
                let v = v.trim();
                let digits = v
                    .strip_prefix("0x")
                    .or_else(|| v.strip_prefix("0X"))
                    .unwrap_or(v);
                u64::from_str_radix(digits, 16)
                    .map_err(|e| anyhow!("bad generator {v:?}: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if vectors.is_empty() {
            bail!("empty basis");
        }
        Ok(BasisChoice::Vectors(vectors))
    }
}

/// How θ's free bits are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ThetaChoice {
    /// All free bits 0.
    #[default]
    Zero,
    /// Random bits from `seed` (0 draws a fresh seed).
    Random,
    /// Replay `path`.
    Path,
}

/// Verification strategy, as named on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Multiply loop elements.
    Direct,
    /// θ form of each identity.
    #[default]
    Cocycle,
    /// σ form of each identity.
    Weight,
}

impl From<Strategy> for VerificationStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Direct => VerificationStrategy::Direct,
            Strategy::Cocycle => VerificationStrategy::CocycleShortcut,
            Strategy::Weight => VerificationStrategy::WeightShortcut,
        }
    }
}

/// A check the client runs after building the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    /// Every codeword has weight divisible by 4.
    Basis,
    /// The Moufang identity holds.
    Moufang,
    /// Associativity fails somewhere.
    NonAssociative,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Check::Basis => "basis",
            Check::Moufang => "moufang",
            Check::NonAssociative => "non-associative",
        })
    }
}

fn default_checks() -> Vec<Check> {
    vec![Check::Basis, Check::Moufang, Check::NonAssociative]
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClientConfig {
    /// Code to build over.
    #[serde(default)]
    pub basis: BasisChoice,

    /// Free-bit choice for θ.
    #[serde(default)]
    pub theta: ThetaChoice,

    /// Seed for [`ThetaChoice::Random`] and for sampling; 0 draws a fresh
    /// seed.
    #[serde(default)]
    pub seed: u64,

    /// Hex path for [`ThetaChoice::Path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Build the α table and check it against θ.
    #[serde(default)]
    pub alpha: bool,

    /// How identities are checked.
    #[serde(default)]
    pub strategy: Strategy,

    /// Worker threads; defaults to the number of CPUs and is capped at
    /// [`codeloops::verify::max_workers`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Checks to run, in order.
    #[serde(default = "default_checks")]
    pub checks: Vec<Check>,

    /// Check this many random triples instead of all of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            basis: BasisChoice::default(),
            theta: ThetaChoice::default(),
            seed: 0,
            path: None,
            alpha: false,
            strategy: Strategy::default(),
            workers: None,
            checks: default_checks(),
            samples: None,
        }
    }
}

impl ClientConfig {
    /// Read a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).with_context(|| format!("parsing config {}", origin.display()))
    }

    /// Loop construction parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if θ is set to replay a path but no valid path is
    /// given.
    pub fn loop_params(&self) -> Result<LoopParams> {
        let theta = match self.theta {
            ThetaChoice::Zero => ThetaMode::Zero,
            ThetaChoice::Random => ThetaMode::Random { seed: self.seed },
            ThetaChoice::Path => {
                let raw = self
                    .path
                    .as_deref()
                    .context("theta = \"path\" needs a path")?;
                let path: ThetaPath = raw
                    .parse()
                    .with_context(|| format!("parsing theta path {raw:?}"))?;
                ThetaMode::Path { path }
            }
        };
        Ok(LoopParams {
            theta,
            alpha: self.alpha,
            ..LoopParams::new(&self.basis.generators())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ClientConfig> {
        ClientConfig::parse(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn full_file() {
        let c = parse(
            r#"
            basis = "golay-split"
            theta = "random"
            seed = 42
            alpha = true
            strategy = "weight"
            workers = 3
            checks = ["moufang"]
            samples = 1000
            "#,
        )
        .unwrap();
        assert_eq!(c.basis, BasisChoice::Named(NamedBasis::GolaySplit));
        assert_eq!(c.theta, ThetaChoice::Random);
        assert_eq!(c.seed, 42);
        assert!(c.alpha);
        assert_eq!(c.strategy, Strategy::Weight);
        assert_eq!(c.workers, Some(3));
        assert_eq!(c.checks, vec![Check::Moufang]);
        assert_eq!(c.samples, Some(1000));

        let p = c.loop_params().unwrap();
        assert_eq!(p.basis, GOLAY_SPLIT_BASIS.to_vec());
        assert_eq!(p.theta, ThetaMode::Random { seed: 42 });
        assert!(p.alpha);
    }

    #[test]
    fn hex_generators_in_toml() {
        let c = parse("basis = [0x87, 0x4b, 0x2d, 0x1e]").unwrap();
        assert_eq!(c.basis, BasisChoice::Vectors(HAMMING_BASIS.to_vec()));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("bases = \"golay\"").is_err());
        assert!(parse("basis = \"octonions\"").is_err());
    }

    #[test]
    fn path_mode_needs_a_valid_path() {
        let c = parse("theta = \"path\"").unwrap();
        assert!(c.loop_params().is_err());

        let c = parse("theta = \"path\"\npath = \"0xzz\"").unwrap();
        assert!(c.loop_params().is_err());

        let c = parse("theta = \"path\"\npath = \"0x2a\"").unwrap();
        let ThetaMode::Path { path } = c.loop_params().unwrap().theta else {
            panic!("expected a path");
        };
        assert_eq!(path.to_string(), "0x2a");
    }

    #[test]
    fn basis_from_command_line() {
        assert_eq!(
            "golay".parse::<BasisChoice>().unwrap(),
            BasisChoice::Named(NamedBasis::Golay)
        );
        assert_eq!(
            "0x87, 4b,0x2d,1E".parse::<BasisChoice>().unwrap(),
            BasisChoice::Vectors(HAMMING_BASIS.to_vec())
        );
        assert!("0x87,,0x4b".parse::<BasisChoice>().is_err());
        assert!("nope".parse::<BasisChoice>().is_err());
    }

    #[test]
    fn basis_display() {
        assert_eq!(BasisChoice::Named(NamedBasis::GolaySplit).to_string(), "golay-split");
        assert_eq!(BasisChoice::Vectors(vec![0x87, 0x4b]).to_string(), "[0x87, 0x4b]");
    }

    #[test]
    fn strategies_map_onto_library() {
        assert_eq!(
            VerificationStrategy::from(Strategy::default()),
            VerificationStrategy::default()
        );
        assert_eq!(
            VerificationStrategy::from(Strategy::Weight),
            VerificationStrategy::WeightShortcut
        );
    }
}
