use anyhow::Context;
use clap::Parser;
use pullem::cli::{Action, Cli};
use pullem::git::GitCli;
use pullem::output::{self, ConsoleCallbacks};
use pullem::prompt::TerminalPrompter;
use pullem::repo::{self, UpdateContext};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let root = match cli.action() {
        Action::Usage => {
            output::print_usage();
            return Ok(());
        }
        Action::Run { root } => std::path::absolute(&root)
            .with_context(|| format!("Failed to resolve {}", root.display()))?,
    };

    output::print_working_dir(&root, &config);

    let backend = GitCli::from_config(&config);
    let callbacks = ConsoleCallbacks::new(config);
    let ctx = UpdateContext {
        backend: &backend,
        prompter: &TerminalPrompter,
        callbacks: &callbacks,
        config,
    };

    let start = Instant::now();
    let results = repo::update_tree(&root, &ctx)?;
    output::print_summary(&results, start.elapsed(), &config);

    Ok(())
}
