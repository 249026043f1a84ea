//! Test infrastructure for pullem integration tests.
#![allow(dead_code)]

use anyhow::Result;
use pullem::config::Config;
use pullem::git::{LocalBranch, VcsBackend, run_git};
use pullem::prompt::{Prompter, parse_answer};
use pullem::prune::PruneResult;
use pullem::repo::{UpdateCallbacks, UpdateContext, UpdateOutcome, UpdateStep};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    _remote_dir: Option<TempDir>,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on the master branch.
    pub fn new() -> Result<Self> {
        Self::on_branch("master")
    }

    pub fn on_branch(branch: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        init_repo(&path, branch)?;

        Ok(Self {
            _temp_dir: temp_dir,
            _remote_dir: None,
            path,
        })
    }

    /// Creates a test repository pushed to a bare `origin` remote.
    pub fn with_remote(branch: Option<&str>) -> Result<Self> {
        let branch = branch.unwrap_or("master");
        let mut repo = Self::on_branch(branch)?;

        let remote_dir = TempDir::new()?;
        add_bare_origin(&repo.path, remote_dir.path(), branch)?;
        repo._remote_dir = Some(remote_dir);

        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remote_path(&self) -> Option<&Path> {
        self._remote_dir.as_ref().map(|d| d.path())
    }

    pub fn create_branch(&self, name: &str) -> Result<()> {
        run_git(&self.path, &["branch", name])?;
        Ok(())
    }

    pub fn checkout(&self, name: &str) -> Result<()> {
        run_git(&self.path, &["checkout", name])?;
        Ok(())
    }

    pub fn make_dirty(&self) -> Result<()> {
        std::fs::write(self.path.join("README.md"), "# Modified\n")?;
        Ok(())
    }

    pub fn make_untracked(&self) -> Result<()> {
        std::fs::write(self.path.join("untracked.txt"), "untracked\n")?;
        Ok(())
    }

    pub fn head_commit(&self) -> Result<String> {
        run_git(&self.path, &["rev-parse", "HEAD"])
    }

    pub fn has_branch(&self, name: &str) -> Result<bool> {
        let output = run_git(&self.path, &["branch", "--list", name])?;
        Ok(!output.trim().is_empty())
    }

    pub fn remove_remote(&mut self) {
        self._remote_dir = None;
    }
}

pub fn init_repo(path: &Path, branch: &str) -> Result<()> {
    std::fs::create_dir_all(path)?;
    run_git(path, &["init", "-b", branch])?;
    run_git(path, &["config", "user.email", "test@example.com"])?;
    run_git(path, &["config", "user.name", "Test User"])?;

    std::fs::write(path.join("README.md"), "# Test Repo\n")?;
    run_git(path, &["add", "README.md"])?;
    run_git(path, &["commit", "-m", "Initial commit"])?;
    Ok(())
}

pub fn add_bare_origin(repo: &Path, remote: &Path, branch: &str) -> Result<()> {
    std::fs::create_dir_all(remote)?;
    run_git(remote, &["init", "--bare"])?;
    run_git(repo, &["remote", "add", "origin", &remote.to_string_lossy()])?;
    run_git(repo, &["push", "-u", "origin", branch])?;
    Ok(())
}

/// Pushes a new commit to `remote` from a throwaway clone.
pub fn push_upstream_commit(remote: &Path, branch: &str) -> Result<()> {
    let scratch = TempDir::new()?;
    let clone = scratch.path().join("clone");
    run_git(
        scratch.path(),
        &["clone", "-b", branch, &remote.to_string_lossy(), "clone"],
    )?;
    run_git(&clone, &["config", "user.email", "test@example.com"])?;
    run_git(&clone, &["config", "user.name", "Test User"])?;
    std::fs::write(clone.join("CHANGELOG.md"), "upstream change\n")?;
    run_git(&clone, &["add", "CHANGELOG.md"])?;
    run_git(&clone, &["commit", "-m", "Upstream commit"])?;
    run_git(&clone, &["push", "origin", branch])?;
    Ok(())
}

/// In-memory backend that records every call made to it.
pub struct SpyBackend {
    pub default_branch: Result<String, String>,
    pub head: Result<Option<String>, String>,
    pub status: String,
    pub pull_ok: bool,
    pub branches: Result<Vec<LocalBranch>, String>,
    pub failing_deletes: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl SpyBackend {
    /// A repository on `branch`, clean, whose pull succeeds.
    pub fn on_branch(branch: &str) -> Self {
        Self {
            default_branch: Ok(branch.to_string()),
            head: Ok(Some(format!("refs/heads/{}", branch))),
            status: String::new(),
            pull_ok: true,
            branches: Ok(Vec::new()),
            failing_deletes: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn pull_attempts(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("pull"))
            .count()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| c.strip_prefix("delete_branch "))
            .map(str::to_string)
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl VcsBackend for SpyBackend {
    fn default_branch(&self, _repo: &Path) -> Result<String> {
        self.record("default_branch".to_string());
        self.default_branch.clone().map_err(anyhow::Error::msg)
    }

    fn current_ref(&self, _repo: &Path) -> Result<Option<String>> {
        self.record("current_ref".to_string());
        self.head.clone().map_err(anyhow::Error::msg)
    }

    fn status(&self, _repo: &Path) -> Result<String> {
        self.record("status".to_string());
        Ok(self.status.clone())
    }

    fn pull(&self, _repo: &Path, branch: &str) -> Result<()> {
        self.record(format!("pull {}", branch));
        if self.pull_ok {
            Ok(())
        } else {
            anyhow::bail!("fatal: Not possible to fast-forward, aborting.")
        }
    }

    fn list_branches(&self, _repo: &Path) -> Result<Vec<LocalBranch>> {
        self.record("list_branches".to_string());
        self.branches.clone().map_err(anyhow::Error::msg)
    }

    fn delete_branch(&self, _repo: &Path, branch: &str) -> Result<()> {
        self.record(format!("delete_branch {}", branch));
        if self.failing_deletes.iter().any(|b| b == branch) {
            anyhow::bail!("error: cannot delete branch '{}'", branch)
        }
        Ok(())
    }
}

pub fn local_branch(name: &str, upstream: Option<&str>) -> LocalBranch {
    LocalBranch {
        name: name.to_string(),
        upstream: upstream.map(str::to_string),
    }
}

/// Answers prompts from a script, re-asking on unparseable answers the way
/// the terminal prompter does.
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        loop {
            let answer = self
                .answers
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no answer scripted"))?;
            if let Some(yes) = parse_answer(&answer) {
                return Ok(yes);
            }
        }
    }
}

/// Records everything reported through the callbacks.
#[derive(Default)]
pub struct RecordingCallbacks {
    pub started: RefCell<Vec<PathBuf>>,
    pub steps: RefCell<Vec<UpdateStep>>,
    pub outcomes: RefCell<Vec<(PathBuf, UpdateOutcome)>>,
    pub prunes: RefCell<Vec<PruneResult>>,
}

impl RecordingCallbacks {
    pub fn outcomes(&self) -> Vec<(PathBuf, UpdateOutcome)> {
        self.outcomes.borrow().clone()
    }

    pub fn prunes(&self) -> Vec<PruneResult> {
        self.prunes.borrow().clone()
    }

    pub fn started(&self) -> Vec<PathBuf> {
        self.started.borrow().clone()
    }

    /// The stdout lines a console run would have printed, without colors.
    pub fn lines(&self) -> Vec<String> {
        colored::control::set_override(false);
        self.outcomes
            .borrow()
            .iter()
            .map(|(path, outcome)| pullem::output::format_outcome_line(path, outcome))
            .chain(
                self.prunes
                    .borrow()
                    .iter()
                    .filter_map(pullem::output::format_prune_line),
            )
            .collect()
    }
}

impl UpdateCallbacks for RecordingCallbacks {
    fn on_repo_start(&self, path: &Path) {
        self.started.borrow_mut().push(path.to_path_buf());
    }

    fn on_step(&self, step: &UpdateStep) {
        self.steps.borrow_mut().push(step.clone());
    }

    fn on_outcome(&self, path: &Path, outcome: &UpdateOutcome) {
        self.outcomes
            .borrow_mut()
            .push((path.to_path_buf(), outcome.clone()));
    }

    fn on_prune(&self, result: &PruneResult) {
        self.prunes.borrow_mut().push(result.clone());
    }
}

pub fn test_config(prune: bool) -> Config {
    Config {
        prune,
        ..Config::default()
    }
}

pub fn context<'a>(
    backend: &'a dyn VcsBackend,
    prompter: &'a dyn Prompter,
    callbacks: &'a dyn UpdateCallbacks,
    prune: bool,
) -> UpdateContext<'a> {
    UpdateContext {
        backend,
        prompter,
        callbacks,
        config: test_config(prune),
    }
}
