//! tmux installer.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::exec::Executor;
use crate::resources::managed_file::{ManagedFile, Payload};
use crate::template::PlaceholderSet;

use super::{Context, InstallMode, Task, TaskResult};

/// Deploy the managed tmux configuration.
#[derive(Debug)]
pub struct InstallTmux;

/// Where tmux reads its config in the given mode.
#[must_use]
pub fn link_path(mode: InstallMode, home: &Path) -> PathBuf {
    match mode {
        InstallMode::User => home.join(".tmux.conf"),
        InstallMode::Global => PathBuf::from("/etc/tmux.conf"),
    }
}

/// Pick the shipped template: tmux 2.x needs the legacy syntax.
#[must_use]
pub fn template_name(legacy: bool) -> &'static str {
    if legacy { "tmux-legacy.conf" } else { "tmux.conf" }
}

/// Whether the installed tmux is a 2.x release.
///
/// Returns `None` when the version cannot be determined; the caller falls
/// back to the current template.
#[must_use]
pub fn is_legacy_tmux(executor: &dyn Executor) -> Option<bool> {
    let result = executor.run_unchecked("tmux", &["-V"]).ok()?;
    if !result.success {
        return None;
    }
    parse_major_version(&result.stdout).map(|major| major == 2)
}

/// Parse the major version out of `tmux -V` output (`tmux 3.4`,
/// `tmux next-3.5`, `tmux 2.9a`).
fn parse_major_version(output: &str) -> Option<u32> {
    let rest = output.trim().strip_prefix("tmux ")?;
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Placeholder set for the tmux template.
#[must_use]
pub fn placeholders(custom_config_path: &Path, smartsplit: &Path) -> PlaceholderSet {
    PlaceholderSet::new()
        .with_path("custom_config_path", custom_config_path)
        .with_path("smartsplit", smartsplit)
}

impl Task for InstallTmux {
    fn name(&self) -> &str {
        "tmux"
    }

    fn should_run(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let target_dir = ctx.etc_dir().join("tmux");
        std::fs::create_dir_all(&target_dir)
            .with_context(|| format!("create: {}", target_dir.display()))?;

        let legacy = is_legacy_tmux(ctx.executor).unwrap_or(false);
        let source = ctx.payload_etc("tmux").join(template_name(legacy));

        let managed = ManagedFile::new(
            target_dir.join("tmux.conf"),
            link_path(ctx.mode, &ctx.home),
        )
        .with_override(target_dir.join("tmux.user.conf"));

        let decision = super::preserve_or_discard(ctx, &managed)?;

        let custom_config_path = ctx.rel_home(target_dir.join("tmux.user.conf").as_path());
        let smartsplit = ctx.rel_home(ctx.bin_dir().join("tmux-smartsplit").as_path());
        let rendered = placeholders(&custom_config_path, &smartsplit).render_file(&source)?;
        managed.provision(&Payload::Rendered(&rendered), decision)?;

        ctx.log.info(&format!(
            "\x1b[36mYou can add custom settings to\x1b[0m \x1b[96m{}\x1b[0m",
            custom_config_path.display()
        ));
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::TestEnv;

    const TEMPLATE: &str = "set -g mouse on\nbind | run-shell \"@@smartsplit@@ -h\"\nsource-file @@custom_config_path@@\n";

    #[test]
    fn parse_major_version_variants() {
        assert_eq!(parse_major_version("tmux 3.4"), Some(3));
        assert_eq!(parse_major_version("tmux 2.9a"), Some(2));
        assert_eq!(parse_major_version("tmux next-3.5"), Some(3));
        assert_eq!(parse_major_version("screen 4.0"), None);
        assert_eq!(parse_major_version("tmux"), None);
    }

    #[test]
    fn template_name_per_version() {
        assert_eq!(template_name(false), "tmux.conf");
        assert_eq!(template_name(true), "tmux-legacy.conf");
    }

    #[test]
    fn link_path_per_mode() {
        assert_eq!(
            link_path(InstallMode::User, Path::new("/home/a")),
            PathBuf::from("/home/a/.tmux.conf")
        );
        assert_eq!(
            link_path(InstallMode::Global, Path::new("/root")),
            PathBuf::from("/etc/tmux.conf")
        );
    }

    #[test]
    fn run_provisions_config_and_override() {
        let env = TestEnv::user_mode();
        env.write_payload("etc/tmux/tmux.conf", TEMPLATE);
        let ctx = env.ctx();

        let result = InstallTmux.run(&ctx).unwrap();
        assert_eq!(result, TaskResult::Ok);

        let canonical = ctx.etc_dir().join("tmux").join("tmux.conf");
        let rendered = std::fs::read_to_string(&canonical).unwrap();
        assert!(!rendered.contains("@@"), "placeholders must be resolved");
        assert!(rendered.contains("tmux-smartsplit"));

        let link = env.home().join(".tmux.conf");
        assert_eq!(std::fs::read_link(&link).unwrap(), canonical);
        assert!(ctx.etc_dir().join("tmux").join("tmux.user.conf").exists());
    }

    #[test]
    fn run_twice_reconverges() {
        let env = TestEnv::user_mode();
        env.write_payload("etc/tmux/tmux.conf", TEMPLATE);
        let ctx = env.ctx();

        InstallTmux.run(&ctx).unwrap();
        let canonical = ctx.etc_dir().join("tmux").join("tmux.conf");
        let first = std::fs::read(&canonical).unwrap();

        InstallTmux.run(&ctx).unwrap();
        assert_eq!(std::fs::read(&canonical).unwrap(), first);
        assert_eq!(
            std::fs::read_link(env.home().join(".tmux.conf")).unwrap(),
            canonical
        );
    }

    #[test]
    fn existing_config_is_preserved_on_confirm() {
        let env = TestEnv::user_mode();
        env.write_payload("etc/tmux/tmux.conf", TEMPLATE);
        env.prompter.confirms.borrow_mut().push_back(true);
        std::fs::write(env.home().join(".tmux.conf"), "set -g status off\n").unwrap();
        let ctx = env.ctx();

        InstallTmux.run(&ctx).unwrap();

        let override_path = ctx.etc_dir().join("tmux").join("tmux.user.conf");
        assert_eq!(
            std::fs::read_to_string(override_path).unwrap(),
            "set -g status off\n"
        );
    }
}
