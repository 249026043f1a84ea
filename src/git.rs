//! Git command wrappers.
//!
//! This module provides a thin wrapper around git CLI commands and the
//! [`VcsBackend`] seam the updater talks to, so the real executable can be
//! swapped for a test double.

use crate::config::Config;
use crate::constants::{HEADS_PREFIX, ORIGIN_REMOTE};
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

/// A single git invocation as seen by a [`GitLogger`].
#[derive(Debug)]
pub enum GitEvent<'a> {
    Running { repo: &'a Path, args: &'a [&'a str] },
    Failed { args: &'a [&'a str], stderr: &'a str },
}

/// Callback invoked around every git command run through a backend.
pub type GitLogger = fn(&GitEvent<'_>);

pub fn no_op_logger(_event: &GitEvent<'_>) {}

pub fn verbose_logger(event: &GitEvent<'_>) {
    match event {
        GitEvent::Running { repo, args } => eprintln!(
            "  {} git {} {}",
            "$".dimmed(),
            args.join(" "),
            format!("({})", repo.display()).dimmed()
        ),
        GitEvent::Failed { args, stderr } => {
            eprintln!("  {} git {} failed", "✗".red(), args.join(" "));
            for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
                eprintln!("    {}", line.dimmed());
            }
        }
    }
}

/// Runs git in `repo` and returns its trimmed stdout.
pub fn run_git(repo: &Path, args: &[&str]) -> anyhow::Result<String> {
    run_git_logged(repo, args, no_op_logger)
}

fn run_git_logged(repo: &Path, args: &[&str], logger: GitLogger) -> anyhow::Result<String> {
    logger(&GitEvent::Running { repo, args });

    let output = std::process::Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .context("Failed to spawn git command")?;

    if output.status.success() {
        let result = String::from_utf8_lossy(&output.stdout);
        Ok(result.as_ref().trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        logger(&GitEvent::Failed {
            args,
            stderr: &stderr,
        });
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim())
    }
}

fn validate_branch_name(branch: &str) -> anyhow::Result<()> {
    if branch.is_empty()
        || branch.contains('\0')
        || branch.contains('\n')
        || branch.starts_with('-')
    {
        anyhow::bail!("Invalid branch name: {:?}", branch);
    }
    Ok(())
}

/// A local branch and the upstream ref it tracks, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBranch {
    pub name: String,
    pub upstream: Option<String>,
}

/// Parses `for-each-ref --format "%(refname) %(upstream)" refs/heads` output.
///
/// A line that splits into exactly two fields tracks something; a single
/// field means no upstream is configured.
#[must_use]
pub fn parse_branch_listing(listing: &str) -> Vec<LocalBranch> {
    listing
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let name = fields.first()?.strip_prefix(HEADS_PREFIX)?;
            let upstream = match fields.as_slice() {
                [_, upstream] => Some((*upstream).to_string()),
                _ => None,
            };
            Some(LocalBranch {
                name: name.to_string(),
                upstream,
            })
        })
        .collect()
}

/// The operations the updater needs from a version-control tool.
///
/// Every method is a blocking call; zero exit status is success.
pub trait VcsBackend {
    /// Short name of the branch `HEAD` symbolically points to.
    fn default_branch(&self, repo: &Path) -> anyhow::Result<String>;

    /// Full symbolic ref of `HEAD`, e.g. `refs/heads/main`, or `None` when
    /// `HEAD` is detached.
    fn current_ref(&self, repo: &Path) -> anyhow::Result<Option<String>>;

    /// Short status listing; empty when the working tree is clean.
    fn status(&self, repo: &Path) -> anyhow::Result<String>;

    /// Fast-forward-only pull of `branch` from origin.
    fn pull(&self, repo: &Path, branch: &str) -> anyhow::Result<()>;

    fn list_branches(&self, repo: &Path) -> anyhow::Result<Vec<LocalBranch>>;

    /// Force-deletes a local branch, discarding unmerged commits.
    fn delete_branch(&self, repo: &Path, branch: &str) -> anyhow::Result<()>;
}

/// [`VcsBackend`] backed by the `git` executable.
#[derive(Debug, Clone, Copy)]
pub struct GitCli {
    logger: GitLogger,
}

impl GitCli {
    #[must_use]
    pub fn new(logger: GitLogger) -> Self {
        Self { logger }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.git_logger())
    }

    fn run(&self, repo: &Path, args: &[&str]) -> anyhow::Result<String> {
        run_git_logged(repo, args, self.logger)
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(no_op_logger)
    }
}

impl VcsBackend for GitCli {
    fn default_branch(&self, repo: &Path) -> anyhow::Result<String> {
        self.run(repo, &["symbolic-ref", "--short", "HEAD"])
            .context("Failed to resolve default branch")
    }

    fn current_ref(&self, repo: &Path) -> anyhow::Result<Option<String>> {
        let args = ["symbolic-ref", "--quiet", "HEAD"];
        (self.logger)(&GitEvent::Running { repo, args: &args });

        let output = std::process::Command::new("git")
            .current_dir(repo)
            .args(args)
            .output()
            .context("Failed to spawn git command")?;

        // --quiet turns "not a symbolic ref" into a silent exit status of 1.
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            Some(1) if output.stderr.is_empty() => Ok(None),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                (self.logger)(&GitEvent::Failed {
                    args: &args,
                    stderr: &stderr,
                });
                anyhow::bail!("Failed to resolve HEAD: {}", stderr.trim())
            }
        }
    }

    fn status(&self, repo: &Path) -> anyhow::Result<String> {
        self.run(repo, &["status", "--porcelain"])
            .context("Failed to check for uncommitted changes")
    }

    fn pull(&self, repo: &Path, branch: &str) -> anyhow::Result<()> {
        validate_branch_name(branch)?;
        self.run(repo, &["pull", ORIGIN_REMOTE, branch, "--ff-only"])
            .with_context(|| format!("Failed to fast-forward '{}'", branch))?;
        Ok(())
    }

    fn list_branches(&self, repo: &Path) -> anyhow::Result<Vec<LocalBranch>> {
        let listing = self
            .run(
                repo,
                &[
                    "for-each-ref",
                    "--format",
                    "%(refname) %(upstream)",
                    "refs/heads",
                ],
            )
            .context("Failed to list local branches")?;
        Ok(parse_branch_listing(&listing))
    }

    fn delete_branch(&self, repo: &Path, branch: &str) -> anyhow::Result<()> {
        validate_branch_name(branch)?;
        self.run(repo, &["branch", "-D", branch])
            .with_context(|| format!("Failed to delete branch '{}'", branch))?;
        Ok(())
    }
}
