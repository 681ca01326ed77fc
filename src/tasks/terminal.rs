//! gnome-terminal profile installer.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};

/// Load the bundled terminal profile into dconf.
#[derive(Debug)]
pub struct LoadTerminalProfile;

const DCONF_DIR: &str = "/org/gnome/terminal/";

impl Task for LoadTerminalProfile {
    fn name(&self) -> &str {
        "gnome-terminal"
    }

    fn should_run(&self, ctx: &Context<'_>) -> bool {
        // headless hosts have neither tool; a global install additionally
        // needs a user account to load the profile for
        ctx.executor.which("dconf")
            && ctx.executor.which("gnome-terminal")
            && (ctx.mode.is_user() || ctx.primary_user.is_some())
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let profile_path = ctx.payload_root.join("dconf").join("gnome-terminal.ini");
        let profile = std::fs::read(&profile_path)
            .with_context(|| format!("read profile: {}", profile_path.display()))?;

        let result = if ctx.mode.is_user() {
            ctx.executor
                .run_with_input("dconf", &["load", DCONF_DIR], &profile)
        } else {
            // a global install runs as root; load the profile as the user
            let Some(user) = ctx.primary_user.as_deref() else {
                return Ok(TaskResult::Skipped("no primary user".to_string()));
            };
            ctx.executor.run_with_input(
                "sudo",
                &["-E", "-u", user, "dconf", "load", DCONF_DIR],
                &profile,
            )
        };

        if result.is_err() {
            ctx.log.warn("Loading terminal config likely failed");
        }
        Ok(TaskResult::Ok)
    }
}
