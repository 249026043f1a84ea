//! Application-wide constants.
//!
//! Centralized values shared by the walker, the updater and the git backend.

/// Git directory name used to detect repositories.
pub const GIT_DIR: &str = ".git";

/// Branch that is never offered for pruning, whatever the default branch is.
pub const MASTER_BRANCH: &str = "master";

/// Remote that fast-forward pulls are made against.
pub const ORIGIN_REMOTE: &str = "origin";

/// Prefix of local branch refs.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;
