//! Support code for the `codeloops` command-line client.
//!
//! [`config`] reads TOML run settings; [`report`] builds the loop they
//! describe and runs the requested checks.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod report;

pub use config::{BasisChoice, Check, ClientConfig, NamedBasis, Strategy, ThetaChoice};
pub use report::{run, Outcome, Report};
