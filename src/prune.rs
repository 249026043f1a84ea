//! Pruning of local branches that no longer track anything.

use crate::constants::MASTER_BRANCH;
use crate::git::LocalBranch;
use crate::repo::{UpdateContext, UpdateStep};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneResult {
    Pruned { branch: String },
    /// The user declined; the branch is untouched.
    Kept { branch: String },
    Failed { branch: String, error: String },
    ListingFailed { error: String },
}

/// Branches offered for deletion: no upstream configured, and neither
/// `master` nor the repository's default branch.
#[must_use]
pub fn orphaned_branches(branches: &[LocalBranch], default_branch: &str) -> Vec<String> {
    branches
        .iter()
        .filter(|b| b.upstream.is_none())
        .filter(|b| b.name != MASTER_BRANCH && b.name != default_branch)
        .map(|b| b.name.clone())
        .collect()
}

/// Offers each orphaned branch of `path` for deletion, one prompt at a time.
///
/// Failures are reported and do not stop the remaining candidates.
pub fn prune_orphaned(path: &Path, default_branch: &str, ctx: &UpdateContext<'_>) -> Vec<PruneResult> {
    let callbacks = ctx.callbacks;
    let report = |result: PruneResult| {
        callbacks.on_prune(&result);
        result
    };

    callbacks.on_step(&UpdateStep::ListingBranches);
    let branches = match ctx.backend.list_branches(path) {
        Ok(branches) => branches,
        Err(err) => {
            return vec![report(PruneResult::ListingFailed {
                error: format!("{:#}", err),
            })];
        }
    };

    orphaned_branches(&branches, default_branch)
        .into_iter()
        .map(|branch| {
            let question = format!("\tDo you really want to delete branch {}", branch);
            let result = match ctx.prompter.confirm(&question) {
                Ok(false) => PruneResult::Kept { branch },
                Ok(true) => {
                    callbacks.on_step(&UpdateStep::DeletingBranch {
                        branch: branch.clone(),
                    });
                    match ctx.backend.delete_branch(path, &branch) {
                        Ok(()) => PruneResult::Pruned { branch },
                        Err(err) => PruneResult::Failed {
                            branch,
                            error: format!("{:#}", err),
                        },
                    }
                }
                Err(err) => PruneResult::Failed {
                    branch,
                    error: format!("{:#}", err),
                },
            };
            report(result)
        })
        .collect()
}
