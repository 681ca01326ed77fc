//! Named installer tasks, run linearly by the driver.
pub mod context;
pub mod editor;
pub mod git;
pub mod shell;
pub mod terminal;
pub mod tmux;
pub mod zsh;

use anyhow::Result;

use crate::logging::TaskStatus;
use crate::resources::managed_file::ManagedFile;
use crate::resources::{ConflictDecision, LinkState};

pub use context::{Context, InstallMode};

/// Outcome of a task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    Ok,
    Skipped(String),
}

/// A named, executable installer step.
pub trait Task {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current mode/host.
    fn should_run(&self, ctx: &Context<'_>) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error on filesystem failures; collaborator commands that
    /// exit non-zero are reported as warnings inside the task instead.
    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult>;
}

/// The complete set of tasks run by an install, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(tmux::InstallTmux),
        Box::new(zsh::InstallZsh),
        Box::new(git::ConfigureGit),
        Box::new(editor::InstallEditor),
        Box::new(terminal::LoadTerminalProfile),
        Box::new(shell::ConfigureShell),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// Task errors are recorded and do not stop later tasks; the driver decides
/// at the end of the run whether recorded failures fail the process.
pub fn execute(task: &dyn Task, ctx: &Context<'_>) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}

/// Decide what to do with whatever occupies a managed file's public link.
///
/// A non-blank regular file earns a preserve offer (default: preserve);
/// everything else (absent, blank, or any symlink) is simply replaced.
///
/// # Errors
///
/// Returns an error if the existing file cannot be inspected or the
/// operator aborts the prompt.
pub fn preserve_or_discard(ctx: &Context<'_>, managed: &ManagedFile) -> Result<ConflictDecision> {
    if !matches!(managed.link_state()?, LinkState::Occupied { blank: false }) {
        return Ok(ConflictDecision::Discard);
    }
    let Some(override_path) = managed.override_path() else {
        return Ok(ConflictDecision::Discard);
    };
    let msg = format!(
        "\x1b[97m{}\x1b[0m already exists. Move it to \x1b[97m{}\x1b[0m?",
        ctx.rel_home_display(managed.public_link()),
        ctx.rel_home_display(override_path),
    );
    let preserve = ctx.prompter.confirm(&msg, Some(true))?;
    Ok(if preserve {
        ConflictDecision::PreserveToOverride
    } else {
        ConflictDecision::Discard
    })
}
