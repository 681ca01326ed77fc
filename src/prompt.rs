//! Interactive confirmation and input prompts.
use std::io::{self, BufRead as _, Write as _};

use crate::error::PromptError;

/// Interface for operator interaction.
///
/// The driver and tasks ask questions through this trait; the real
/// implementation blocks on standard input, tests script the answers.
pub trait Prompter {
    /// Ask a yes/no question. `default` is returned on empty input.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Aborted`] if input is closed or interrupted.
    fn confirm(&self, msg: &str, default: Option<bool>) -> Result<bool, PromptError>;

    /// Ask for a line of input. `default` is returned on empty input.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Aborted`] if input is closed or interrupted.
    fn input(&self, msg: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Block until the operator presses ENTER.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Aborted`] if input is closed or interrupted.
    fn wait(&self, action: &str) -> Result<(), PromptError>;
}

/// [`Prompter`] backed by the controlling terminal.
///
/// With `assume_default` set (`--yes`), every prompt resolves to its default
/// answer without blocking; prompts that have no default abort, since there
/// is no answer to assume.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    assume_default: bool,
}

impl TerminalPrompter {
    #[must_use]
    pub const fn new(assume_default: bool) -> Self {
        Self { assume_default }
    }

    fn read_line(&self) -> Result<String, PromptError> {
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            // EOF: stdin closed under us
            println!();
            return Err(PromptError::Aborted);
        }
        Ok(line.trim().to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, msg: &str, default: Option<bool>) -> Result<bool, PromptError> {
        if self.assume_default {
            return default.ok_or(PromptError::Aborted);
        }
        let (yes, no) = match default {
            Some(true) => ("Y", "n"),
            Some(false) => ("y", "N"),
            None => ("y", "n"),
        };
        loop {
            print!("{msg} [\x1b[92m{yes}\x1b[0m/\x1b[91m{no}\x1b[0m]: ");
            io::stdout().flush()?;
            match self.read_line()?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                "" => {
                    if let Some(value) = default {
                        return Ok(value);
                    }
                    println!("invalid input");
                }
                _ => println!("invalid input"),
            }
        }
    }

    fn input(&self, msg: &str, default: Option<&str>) -> Result<String, PromptError> {
        if self.assume_default {
            return match default {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(PromptError::Aborted),
            };
        }
        loop {
            match default {
                Some(value) if !value.is_empty() => {
                    print!("{msg} [\x1b[97m{value}\x1b[0m]: ");
                }
                _ => print!("{msg}: "),
            }
            io::stdout().flush()?;
            let value = self.read_line()?;
            if !value.is_empty() {
                return Ok(value);
            }
            if let Some(value) = default
                && !value.is_empty()
            {
                return Ok(value.to_string());
            }
            println!("input required");
        }
    }

    fn wait(&self, action: &str) -> Result<(), PromptError> {
        if self.assume_default {
            return Ok(());
        }
        print!("Press ENTER {action}");
        io::stdout().flush()?;
        self.read_line()?;
        Ok(())
    }
}
