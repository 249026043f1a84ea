//! Recursive git repository updater.
//!
//! This crate walks a directory tree and, for every git checkout found:
//! - Resolves the default branch and checks `HEAD` is on it
//! - Checks the working tree is clean
//! - Fast-forwards the branch from origin
//! - Optionally offers to delete local branches without an upstream

pub mod cli;
pub mod config;
pub mod constants;
pub mod git;
pub mod output;
pub mod prompt;
pub mod prune;
pub mod repo;
pub mod walk;
