//! Logging setup
//!
//! Library code logs through `tracing`; the binary installs a subscriber here. Verbosity follows
//! the command line switches unless `RUST_LOG` is set.

use tracing_subscriber::{EnvFilter, fmt};

/// Output level selected by the `--quiet` / `--verbose` switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn default_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        tracing::debug!("Keeping existing tracing subscriber: {}", e);
    }
}
