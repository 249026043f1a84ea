//! Status lines, spinner and summary formatting.
//!
//! Every visited repository produces exactly one status line on stdout.
//! Prune results are indented one tab stop under it.

use crate::config::Config;
use crate::constants::PROGRESS_TICK_MS;
use crate::prune::PruneResult;
use crate::repo::{UpdateCallbacks, UpdateOutcome, UpdateResult, UpdateStep};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

const SUCCESS_MARK: &str = "✅";
const FAILURE_MARK: &str = "❌";

pub const USAGE: &str = "
Usage:
    pullem [--prune]
         recursively updates git repos starting from current working dir
    pullem [--prune] some_path
         recursively updates git repos starting from specified path";

/// Formats the single status line for a repository.
#[must_use]
pub fn format_outcome_line(path: &Path, outcome: &UpdateOutcome) -> String {
    let rel = path.display().to_string().white().bold();
    match outcome {
        UpdateOutcome::Updated { .. } => {
            format!("{}  {} {}", SUCCESS_MARK, rel, "updated".green())
        }
        UpdateOutcome::NotOnDefaultBranch => {
            format!("{}  {} {}", FAILURE_MARK, rel, "not on default branch".red())
        }
        UpdateOutcome::NotClean => format!("{}  {} {}", FAILURE_MARK, rel, "not clean".red()),
        UpdateOutcome::FastForwardImpossible => format!(
            "{}  {} {}",
            FAILURE_MARK,
            rel,
            "fast forwarding not possible".red()
        ),
        UpdateOutcome::Failed(failure) => format!(
            "{}  {} {} {}",
            FAILURE_MARK,
            rel,
            "failed processing".red(),
            failure.error
        ),
    }
}

/// Formats an indented prune line; a kept branch prints nothing.
#[must_use]
pub fn format_prune_line(result: &PruneResult) -> Option<String> {
    match result {
        PruneResult::Pruned { branch } => Some(format!(
            "\t{} pruned orphaned branch {}",
            SUCCESS_MARK,
            branch.cyan()
        )),
        PruneResult::Kept { .. } => None,
        PruneResult::Failed { branch, error } => Some(format!(
            "\t{} failed pruning orphaned branch {} {}",
            FAILURE_MARK,
            branch.cyan(),
            error
        )),
        PruneResult::ListingFailed { error } => Some(format!(
            "\t{} failed pruning orphaned branches {}",
            FAILURE_MARK, error
        )),
    }
}

/// Prints status lines to stdout.
///
/// In normal mode a spinner on stderr shows the step being run while a
/// repository is processed; verbose mode prints each step instead.
pub struct ConsoleCallbacks {
    config: Config,
    spinner: RefCell<Option<ProgressBar>>,
}

impl ConsoleCallbacks {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            spinner: RefCell::new(None),
        }
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }
}

impl UpdateCallbacks for ConsoleCallbacks {
    fn on_repo_start(&self, path: &Path) {
        if self.config.is_verbose() {
            eprintln!("\n{}", format!("[{}]", path.display()).white().bold());
        }
        if !self.config.shows_spinner() {
            return;
        }
        let spinner = create_spinner();
        spinner.set_prefix(path.display().to_string());
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn on_step(&self, step: &UpdateStep) {
        if self.config.is_verbose() {
            eprintln!("  {}...", step.to_string().dimmed());
        } else if let Some(spinner) = self.spinner.borrow().as_ref() {
            spinner.set_message(step.to_string());
        }
    }

    fn on_outcome(&self, path: &Path, outcome: &UpdateOutcome) {
        self.clear_spinner();
        println!("{}", format_outcome_line(path, outcome));
    }

    fn on_prune(&self, result: &PruneResult) {
        if let Some(line) = format_prune_line(result) {
            println!("{}", line);
        }
    }
}

impl Drop for ConsoleCallbacks {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {prefix:.bold} {msg:.dim}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    spinner
}

pub fn print_usage() {
    println!("{}", USAGE);
}

pub fn print_working_dir(path: &Path, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!(
        "{} {}",
        "Working in:".cyan(),
        path.display().to_string().white().bold()
    )
}

/// Per-run counts shown in the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub updated: usize,
    pub skipped: usize,
    pub pruned: usize,
}

impl Tally {
    #[must_use]
    pub fn from_results(results: &[UpdateResult]) -> Self {
        results.iter().fold(Self::default(), |mut tally, result| {
            if result.outcome.is_updated() {
                tally.updated += 1;
            } else {
                tally.skipped += 1;
            }
            tally.pruned += result
                .pruned
                .iter()
                .filter(|p| matches!(p, PruneResult::Pruned { .. }))
                .count();
            tally
        })
    }
}

pub fn print_summary(results: &[UpdateResult], duration: Duration, config: &Config) {
    let tally = Tally::from_results(results);
    if config.is_quiet() {
        println!("{}/{} repositories updated", tally.updated, results.len());
        return;
    }
    if results.is_empty() {
        println!("{}", "No git repositories found".yellow().bold());
        return;
    }

    print_section("Summary");
    println!(
        "{}: {}/{} repos updated in {}",
        "Total".white().bold(),
        tally.updated,
        results.len(),
        format_duration(duration)
    );
    if tally.skipped > 0 {
        println!("{}", format!("{} skipped", tally.skipped).red());
    }
    if tally.pruned > 0 {
        println!("{}", format!("{} branches pruned", tally.pruned).cyan());
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn print_section(title: &str) {
    let line = "=".repeat(50).cyan().dimmed();
    let padding = (50 - title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}
