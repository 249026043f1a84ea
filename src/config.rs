//! Run options shared by the walker, the git backend and the console output.

use crate::git::{self, GitLogger};

/// How much the console reports besides the per-repository lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// No banner, no spinner; the summary shrinks to a single count.
    Quiet,
    #[default]
    Normal,
    /// Every step and git command is logged to stderr.
    Verbose,
}

impl Verbosity {
    /// `quiet` wins if both flags are somehow set.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }
}

/// Options for one run, passed by value into every repository visit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub verbosity: Verbosity,
    /// Offer orphaned local branches for deletion after a successful pull.
    pub prune: bool,
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// The spinner only runs in normal mode; verbose output would tear it.
    #[must_use]
    pub fn shows_spinner(&self) -> bool {
        self.verbosity == Verbosity::Normal
    }

    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        match self.verbosity {
            Verbosity::Verbose => git::verbose_logger,
            Verbosity::Quiet | Verbosity::Normal => git::no_op_logger,
        }
    }
}
