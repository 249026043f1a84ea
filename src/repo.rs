// Repository detection, the per-repository update procedure, result types

use crate::config::Config;
use crate::constants::{GIT_DIR, HEADS_PREFIX};
use crate::git::VcsBackend;
use crate::prompt::Prompter;
use crate::prune::{self, PruneResult};
use crate::walk::{self, Visit};
use std::fmt;
use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStep {
    Classifying,
    ResolvingDefaultBranch,
    CheckingHead,
    CheckingStatus,
    Pulling { branch: String },
    ListingBranches,
    DeletingBranch { branch: String },
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStep::Classifying => write!(f, "Looking for {}", GIT_DIR),
            UpdateStep::ResolvingDefaultBranch => write!(f, "Resolving default branch"),
            UpdateStep::CheckingHead => write!(f, "Checking HEAD"),
            UpdateStep::CheckingStatus => write!(f, "Checking for uncommitted changes"),
            UpdateStep::Pulling { branch } => write!(f, "Fast-forwarding {} from origin", branch),
            UpdateStep::ListingBranches => write!(f, "Listing local branches"),
            UpdateStep::DeletingBranch { branch } => write!(f, "Deleting branch {}", branch),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailure {
    pub error: String,
    pub step: UpdateStep,
}

/// How processing of one repository ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { branch: String },
    NotOnDefaultBranch,
    NotClean,
    /// The pull was rejected; no distinction is made between a missing
    /// remote, a network error and diverged history.
    FastForwardImpossible,
    Failed(UpdateFailure),
}

impl UpdateOutcome {
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

#[derive(Debug)]
pub struct UpdateResult {
    /// Path relative to the walk root; `.` for the root itself.
    pub path: PathBuf,
    pub outcome: UpdateOutcome,
    /// Branch pruning results; empty unless pruning ran after an update.
    pub pruned: Vec<PruneResult>,
    pub duration: Duration,
}

/// Observer for progress and results.
///
/// Every method defaults to a no-op so implementations only override what
/// they render.
pub trait UpdateCallbacks {
    fn on_repo_start(&self, _path: &Path) {}
    fn on_step(&self, _step: &UpdateStep) {}
    fn on_outcome(&self, _path: &Path, _outcome: &UpdateOutcome) {}
    fn on_prune(&self, _result: &PruneResult) {}
}

/// Collaborators shared by every repository visit of one run.
#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    pub backend: &'a dyn VcsBackend,
    pub prompter: &'a dyn Prompter,
    pub callbacks: &'a dyn UpdateCallbacks,
    pub config: Config,
}

/// A directory is a repository iff it directly contains a `.git` entry.
///
/// The entry itself is not followed, so a dangling `.git` symlink still
/// counts and a missing one is `Ok(false)`.
pub fn is_repository(dir: &Path) -> io::Result<bool> {
    match std::fs::symlink_metadata(dir.join(GIT_DIR)) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

fn failed(step: UpdateStep, err: anyhow::Error) -> UpdateOutcome {
    UpdateOutcome::Failed(UpdateFailure {
        error: format!("{:#}", err),
        step,
    })
}

/// Runs the precondition chain and, if it passes, the fast-forward pull.
///
/// The first failing check ends processing; later commands are never run.
pub fn update(path: &Path, ctx: &UpdateContext<'_>) -> UpdateOutcome {
    let backend = ctx.backend;
    let callbacks = ctx.callbacks;

    callbacks.on_step(&UpdateStep::ResolvingDefaultBranch);
    let branch = match backend.default_branch(path) {
        Ok(branch) => branch,
        Err(err) => return failed(UpdateStep::ResolvingDefaultBranch, err),
    };

    callbacks.on_step(&UpdateStep::CheckingHead);
    match backend.current_ref(path) {
        Ok(Some(head)) if head == format!("{}{}", HEADS_PREFIX, branch) => {}
        Ok(_) => return UpdateOutcome::NotOnDefaultBranch,
        Err(err) => return failed(UpdateStep::CheckingHead, err),
    }

    callbacks.on_step(&UpdateStep::CheckingStatus);
    match backend.status(path) {
        Ok(status) if status.trim().is_empty() => {}
        Ok(_) => return UpdateOutcome::NotClean,
        Err(err) => return failed(UpdateStep::CheckingStatus, err),
    }

    callbacks.on_step(&UpdateStep::Pulling {
        branch: branch.clone(),
    });
    match backend.pull(path, &branch) {
        Ok(()) => UpdateOutcome::Updated { branch },
        Err(_) => UpdateOutcome::FastForwardImpossible,
    }
}

/// Handles one walked entry.
///
/// Non-repository directories and files are passed over silently. Anything
/// that was classified (or failed to be) is reported and not descended into.
pub fn visit(
    root: &Path,
    path: &Path,
    file_type: io::Result<FileType>,
    ctx: &UpdateContext<'_>,
) -> (Visit, Option<UpdateResult>) {
    let rel = relative_path(root, path);
    let started = Instant::now();

    let classified = file_type.and_then(|ft| {
        if ft.is_dir() {
            is_repository(path)
        } else {
            Ok(false)
        }
    });

    let outcome = match classified {
        Ok(false) => return (Visit::Continue, None),
        Ok(true) => {
            ctx.callbacks.on_repo_start(&rel);
            update(path, ctx)
        }
        Err(err) => failed(UpdateStep::Classifying, err.into()),
    };

    ctx.callbacks.on_outcome(&rel, &outcome);

    let pruned = match (&outcome, ctx.config.prune) {
        (UpdateOutcome::Updated { branch }, true) => prune::prune_orphaned(path, branch, ctx),
        _ => Vec::new(),
    };

    let result = UpdateResult {
        path: rel,
        outcome,
        pruned,
        duration: started.elapsed(),
    };
    (Visit::SkipSubtree, Some(result))
}

/// Walks `root` and updates every repository found, in walk order.
///
/// Per-repository problems end up in the returned results; only a walk
/// that cannot start is an error.
pub fn update_tree(root: &Path, ctx: &UpdateContext<'_>) -> anyhow::Result<Vec<UpdateResult>> {
    let mut results = Vec::new();
    walk::walk(root, |path, file_type| {
        let (next, result) = visit(root, path, file_type, ctx);
        results.extend(result);
        next
    })?;
    Ok(results)
}
