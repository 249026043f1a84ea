//! Command-line interface.

use crate::config::{Config, Verbosity};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pullem",
    version,
    about = "Recursively fast-forwards clean git checkouts on their default branch"
)]
pub struct Cli {
    /// Offer to delete local branches that have no upstream configured
    #[arg(long)]
    pub prune: bool,

    /// Only print per-repository lines and a final count
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print every step and git command to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory to scan (defaults to the current directory)
    pub paths: Vec<PathBuf>,
}

/// What the binary should do for the given arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Usage,
    Run { root: PathBuf },
}

impl Cli {
    /// More than one positional argument is answered with the usage text.
    #[must_use]
    pub fn action(&self) -> Action {
        match self.paths.as_slice() {
            [] => Action::Run {
                root: PathBuf::from("."),
            },
            [root] => Action::Run { root: root.clone() },
            _ => Action::Usage,
        }
    }

    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            verbosity: Verbosity::from_flags(self.quiet, self.verbose),
            prune: self.prune,
        }
    }
}
