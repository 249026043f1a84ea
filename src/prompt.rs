//! Interactive yes/no confirmation.

use dialoguer::Input;
use std::io::{BufRead, IsTerminal, Write};

/// Asks the user to confirm an action.
pub trait Prompter {
    /// Blocks until a yes or no answer is given.
    fn confirm(&self, question: &str) -> anyhow::Result<bool>;
}

/// Interprets a free-text answer: `y`/`yes` or `n`/`no`, any case.
#[must_use]
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Asks `question` on `output` and reads answers line by line from `input`
/// until one parses. End of input is an error.
pub fn confirm_lines<R, W>(input: &mut R, output: &mut W, question: &str) -> anyhow::Result<bool>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{} [y/n]: ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("no answer given before end of input");
        }
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
    }
}

/// Prompts on the controlling terminal, re-asking until the answer parses.
///
/// When stdin is not a terminal (e.g. `yes | pullem --prune`) answers are
/// read from it line by line instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return confirm_lines(&mut stdin.lock(), &mut std::io::stderr(), question);
        }

        let answer: String = Input::new()
            .with_prompt(format!("{} [y/n]", question))
            .validate_with(|input: &String| -> Result<(), String> {
                parse_answer(input)
                    .map(|_| ())
                    .ok_or_else(|| "please answer y or n".to_string())
            })
            .interact_text()?;
        Ok(parse_answer(&answer).unwrap_or(false))
    }
}
