//! git installer.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::template::PlaceholderSet;

use super::{Context, Task, TaskResult};

/// Register the managed gitconfig via an `include.path` entry.
#[derive(Debug)]
pub struct ConfigureGit;

/// Placeholder set for the gitconfig template.
#[must_use]
pub fn placeholders(smartless: &Path) -> PlaceholderSet {
    PlaceholderSet::new().with_path("smartless", smartless)
}

/// Escape `text` for literal use inside a regular expression.
///
/// `git config --replace-all` takes a value-matching regex; anchoring the
/// escaped path keeps the entry unique across re-runs.
#[must_use]
pub fn escape_regex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

impl Task for ConfigureGit {
    fn name(&self) -> &str {
        "git"
    }

    fn should_run(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let target_dir = ctx.etc_dir().join("git");
        std::fs::create_dir_all(&target_dir)
            .with_context(|| format!("create: {}", target_dir.display()))?;

        let target = target_dir.join("gitconfig");
        let smartless = ctx.rel_home(ctx.bin_dir().join("smartless").as_path());
        placeholders(&smartless).render_to_file(&ctx.payload_etc("git").join("gitconfig"), &target)?;

        let include_path = ctx.rel_home_display(&target);
        let anchor = format!("^{}$", escape_regex(&include_path));
        let result = ctx.executor.run_unchecked(
            "git",
            &[
                "config",
                ctx.mode.git_scope(),
                "--replace-all",
                "include.path",
                &include_path,
                &anchor,
            ],
        )?;
        if !result.success {
            ctx.log.warn(&format!(
                "registering {include_path} with git config failed: {}",
                result.stderr.trim()
            ));
        }
        Ok(TaskResult::Ok)
    }
}
