//! Command line interface module
//!
//! Argument parsing, validation and the runner that probes a registry and prints the result.

pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::{ProbeReport, Runner};
