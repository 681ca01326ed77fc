//! Child-process execution seam.
use anyhow::{Context, Result, bail};
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Interface for running external commands.
///
/// All collaborator invocations (package manager, `git config`, `chsh`,
/// `dconf`, version probes) go through this trait so that tasks can be
/// exercised in tests without touching the host system.
pub trait Executor {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns the result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be spawned at all.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with `input` piped to its standard input.
    /// Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, its stdin cannot be
    /// written, or it exits non-zero.
    fn run_with_input(&self, program: &str, args: &[&str], input: &[u8]) -> Result<ExecResult>;

    /// Run a command with inherited stdio, for children that interact with
    /// the terminal themselves (package managers, `chsh`). Output is not
    /// captured; the result carries only the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be spawned; a non-zero
    /// exit is reported through the result.
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by real [`std::process::Command`] invocations.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor;

fn checked(result: ExecResult, label: &str) -> Result<ExecResult> {
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        checked(self.run_unchecked(program, args)?, program)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &[u8]) -> Result<ExecResult> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {program}"))?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(input)
                .with_context(|| format!("failed to write stdin of: {program}"))?;
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for: {program}"))?;
        checked(ExecResult::from(output), program)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: status.success(),
            code: status.code(),
        })
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Shared mock executor for unit tests.
#[cfg(test)]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{ExecResult, Executor};

    /// A configurable mock executor.
    ///
    /// Maintains a queue of `(success, stdout)` responses consumed in FIFO
    /// order; when the queue is empty any call returns a successful empty
    /// response. Every invocation is recorded as a `program arg…` line so
    /// tests can assert what was run.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: RefCell<VecDeque<(bool, String)>>,
        /// Return value for every [`Executor::which`] call.
        pub which_result: bool,
        pub calls: RefCell<Vec<String>>,
    }

    impl MockExecutor {
        /// Create a mock with an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: &[(bool, &str)]) -> Self {
            Self {
                responses: RefCell::new(
                    responses
                        .iter()
                        .map(|(ok, out)| (*ok, (*out).to_string()))
                        .collect(),
                ),
                which_result: false,
                calls: RefCell::new(Vec::new()),
            }
        }

        /// Set the value returned by every [`Executor::which`] call.
        #[must_use]
        pub fn with_which(mut self, result: bool) -> Self {
            self.which_result = result;
            self
        }

        fn next(&self, program: &str, args: &[&str]) -> (bool, String) {
            let mut line = program.to_string();
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            self.calls.borrow_mut().push(line);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or((true, String::new()))
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                anyhow::bail!("mock command failed: {program}")
            }
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            })
        }

        fn run_with_input(
            &self,
            program: &str,
            args: &[&str],
            _input: &[u8],
        ) -> anyhow::Result<ExecResult> {
            self.run(program, args)
        }

        fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.run_unchecked(program, args)
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }
}
