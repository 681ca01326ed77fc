//! zsh installer.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::resources::managed_file::{ManagedFile, Payload};
use crate::resources::{ConflictDecision, LinkState};
use crate::template::PlaceholderSet;

use super::{Context, InstallMode, Task, TaskResult};

/// Deploy the managed zsh configuration.
#[derive(Debug)]
pub struct InstallZsh;

/// Distro-provided skeleton a fresh `~/.zshrc` is copied from.
const ZSHRC_SKELETON: &str = "/etc/skel/.zshrc";

/// Where zsh reads its rc and env files in the given mode.
///
/// Global installs prefer `/etc/zsh/` when the distro uses that layout;
/// user installs have no managed zshenv (the shell config is enough).
#[must_use]
pub fn link_paths(
    mode: InstallMode,
    home: &Path,
    etc_zsh_dir_exists: bool,
) -> (PathBuf, Option<PathBuf>) {
    match mode {
        InstallMode::User => (home.join(".zshrc"), None),
        InstallMode::Global if etc_zsh_dir_exists => (
            PathBuf::from("/etc/zsh/zshrc"),
            Some(PathBuf::from("/etc/zsh/zshenv")),
        ),
        InstallMode::Global => (
            PathBuf::from("/etc/zshrc"),
            Some(PathBuf::from("/etc/zshenv")),
        ),
    }
}

/// Whether a pre-existing `~/.zshrc` is worth offering to preserve.
///
/// A copy of the distro skeleton carries nothing of the user's, so only
/// content differing from the skeleton (or any content when no skeleton
/// exists) triggers the offer.
#[must_use]
pub fn differs_from_skeleton(existing: &str, skeleton: Option<&str>) -> bool {
    let existing = existing.trim();
    if existing.is_empty() {
        return false;
    }
    skeleton.is_none_or(|skel| existing != skel.trim())
}

/// Placeholder set for the zshrc template.
#[must_use]
pub fn zshrc_placeholders(
    zshrc: &Path,
    editor_env: &Path,
    custom_zshrc: &Path,
) -> PlaceholderSet {
    PlaceholderSet::new()
        .with_path("zshrc", zshrc)
        .with_path("editor_env", editor_env)
        .with_path("custom_zshrc", custom_zshrc)
}

/// Placeholder set for the zshenv template.
#[must_use]
pub fn zshenv_placeholders(zshenv: &Path, custom_zshenv: &Path) -> PlaceholderSet {
    PlaceholderSet::new()
        .with_path("zshenv", zshenv)
        .with_path("custom_zshenv", custom_zshenv)
}

impl InstallZsh {
    /// The preserve-or-discard decision for a pre-existing user `~/.zshrc`.
    fn zshrc_decision(ctx: &Context<'_>, managed: &ManagedFile) -> Result<ConflictDecision> {
        if !ctx.mode.is_user() {
            // global targets are distro files, never user content
            return Ok(ConflictDecision::Discard);
        }
        if !matches!(managed.link_state()?, LinkState::Occupied { blank: false }) {
            return Ok(ConflictDecision::Discard);
        }
        let existing = std::fs::read_to_string(managed.public_link())
            .with_context(|| format!("read existing: {}", managed.public_link().display()))?;
        let skeleton = std::fs::read_to_string(ZSHRC_SKELETON).ok();
        if !differs_from_skeleton(&existing, skeleton.as_deref()) {
            return Ok(ConflictDecision::Discard);
        }
        super::preserve_or_discard(ctx, managed)
    }
}

impl Task for InstallZsh {
    fn name(&self) -> &str {
        "zsh"
    }

    fn should_run(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let target_dir = ctx.etc_dir().join("zsh");
        std::fs::create_dir_all(&target_dir)
            .with_context(|| format!("create: {}", target_dir.display()))?;

        let (zshrc_path, zshenv_path) = link_paths(
            ctx.mode,
            &ctx.home,
            Path::new("/etc/zsh").exists(),
        );

        let zshrc = ManagedFile::new(target_dir.join("zshrc"), zshrc_path)
            .with_override(target_dir.join("zshrc.user"));
        let decision = Self::zshrc_decision(ctx, &zshrc)?;

        // The framework copy replaces any previous one wholesale; merging
        // would leave stale files behind across upgrades.
        let framework_dir = target_dir.join("config");
        crate::resources::fs::replace_dir(
            &ctx.payload_etc("zsh").join("config"),
            &framework_dir,
            true,
        )?;

        let custom_zshrc = ctx.rel_home(target_dir.join("zshrc.user").as_path());
        let rendered = zshrc_placeholders(
            &ctx.rel_home(framework_dir.join(".zshrc").as_path()),
            &ctx.rel_home(ctx.etc_dir().join("vim").join("editor-env.sh").as_path()),
            &custom_zshrc,
        )
        .render_file(&ctx.payload_etc("zsh").join("zshrc"))?;
        zshrc.provision(&Payload::Rendered(&rendered), decision)?;

        let mut custom_files = vec![custom_zshrc.display().to_string()];
        if let Some(zshenv_path) = zshenv_path {
            let zshenv = ManagedFile::new(target_dir.join("zshenv"), zshenv_path)
                .with_override(target_dir.join("zshenv.user"));
            let custom_zshenv = ctx.rel_home(target_dir.join("zshenv.user").as_path());
            let rendered = zshenv_placeholders(
                &ctx.rel_home(framework_dir.join(".zshenv").as_path()),
                &custom_zshenv,
            )
            .render_file(&ctx.payload_etc("zsh").join("zshenv"))?;
            zshenv.provision(&Payload::Rendered(&rendered), ConflictDecision::Discard)?;
            custom_files.push(custom_zshenv.display().to_string());
        }

        ctx.log.info(&format!(
            "\x1b[36mYou can add custom settings to\x1b[0m \x1b[96m{}\x1b[0m",
            custom_files.join("\x1b[0m \x1b[36mand\x1b[0m \x1b[96m")
        ));
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::TestEnv;

    const ZSHRC_TEMPLATE: &str =
        "source @@zshrc@@\nsource @@editor_env@@\nsource @@custom_zshrc@@\n";

    fn write_zsh_payload(env: &TestEnv) {
        env.write_payload("etc/zsh/zshrc", ZSHRC_TEMPLATE);
        env.write_payload("etc/zsh/zshenv", "source @@zshenv@@\nsource @@custom_zshenv@@\n");
        env.write_payload("etc/zsh/config/.zshrc", "# framework rc\n");
        env.write_payload("etc/zsh/config/.zshenv", "# framework env\n");
    }

    #[test]
    fn link_paths_user_mode() {
        let (rc, env) = link_paths(InstallMode::User, Path::new("/home/a"), true);
        assert_eq!(rc, PathBuf::from("/home/a/.zshrc"));
        assert!(env.is_none());
    }

    #[test]
    fn link_paths_global_prefers_etc_zsh_dir() {
        let (rc, env) = link_paths(InstallMode::Global, Path::new("/root"), true);
        assert_eq!(rc, PathBuf::from("/etc/zsh/zshrc"));
        assert_eq!(env, Some(PathBuf::from("/etc/zsh/zshenv")));

        let (rc, env) = link_paths(InstallMode::Global, Path::new("/root"), false);
        assert_eq!(rc, PathBuf::from("/etc/zshrc"));
        assert_eq!(env, Some(PathBuf::from("/etc/zshenv")));
    }

    #[test]
    fn skeleton_copy_is_not_worth_preserving() {
        assert!(!differs_from_skeleton(
            "# standard skel\n",
            Some("# standard skel\n")
        ));
        assert!(differs_from_skeleton(
            "# customised\n",
            Some("# standard skel\n")
        ));
        assert!(differs_from_skeleton("# anything\n", None));
        assert!(!differs_from_skeleton("   \n", None));
    }

    #[test]
    fn run_provisions_rc_framework_and_override() {
        let env = TestEnv::user_mode();
        write_zsh_payload(&env);
        let ctx = env.ctx();

        assert_eq!(InstallZsh.run(&ctx).unwrap(), TaskResult::Ok);

        let target_dir = ctx.etc_dir().join("zsh");
        let rendered = std::fs::read_to_string(target_dir.join("zshrc")).unwrap();
        assert!(!rendered.contains("@@"), "placeholders must be resolved");
        assert_eq!(
            std::fs::read_link(env.home().join(".zshrc")).unwrap(),
            target_dir.join("zshrc")
        );
        assert!(target_dir.join("config").join(".zshrc").exists());
        assert!(target_dir.join("zshrc.user").exists());
        // user mode: no managed zshenv
        assert!(!target_dir.join("zshenv").exists());
    }

    #[test]
    fn framework_copy_replaces_stale_files() {
        let env = TestEnv::user_mode();
        write_zsh_payload(&env);
        let ctx = env.ctx();

        let stale = ctx.etc_dir().join("zsh").join("config").join("stale.zsh");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old\n").unwrap();

        InstallZsh.run(&ctx).unwrap();
        assert!(!stale.exists(), "stale framework files must be removed");
    }

    #[test]
    fn customised_zshrc_is_preserved_on_confirm() {
        let env = TestEnv::user_mode();
        write_zsh_payload(&env);
        env.prompter.confirms.borrow_mut().push_back(true);
        std::fs::write(env.home().join(".zshrc"), "alias ll='ls -la'\n").unwrap();
        let ctx = env.ctx();

        InstallZsh.run(&ctx).unwrap();

        assert_eq!(
            std::fs::read_to_string(ctx.etc_dir().join("zsh").join("zshrc.user")).unwrap(),
            "alias ll='ls -la'\n"
        );
    }

    #[test]
    fn existing_override_survives_reruns() {
        let env = TestEnv::user_mode();
        write_zsh_payload(&env);
        let ctx = env.ctx();

        InstallZsh.run(&ctx).unwrap();
        let override_path = ctx.etc_dir().join("zsh").join("zshrc.user");
        std::fs::write(&override_path, "my tweaks\n").unwrap();

        InstallZsh.run(&ctx).unwrap();
        assert_eq!(
            std::fs::read_to_string(&override_path).unwrap(),
            "my tweaks\n"
        );
    }
}
