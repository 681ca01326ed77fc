//! vim installer.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::distro::DistroSpec;
use crate::resources::loader_patch::{LoaderPatch, PatchOutcome};
use crate::template::PlaceholderSet;

use super::{Context, InstallMode, Task, TaskResult};

/// Deploy the managed vim configuration and hook it into the host vimrc.
#[derive(Debug)]
pub struct InstallEditor;

/// Name of the shipped color scheme file.
const COLOR_SCHEME: &str = "homeset.vim";

/// Where vim color scheme files go in the given mode.
#[must_use]
pub fn colors_dir(mode: InstallMode, home: &Path) -> PathBuf {
    match mode {
        InstallMode::User => home.join(".vim").join("colors"),
        InstallMode::Global => PathBuf::from("/usr/share/vim/vimfiles/colors"),
    }
}

/// The rc file the loader snippet goes into, if any.
///
/// User installs always patch `~/.vimrc`; global installs need the distro's
/// system vimrc path, so an unknown distro means no patch.
#[must_use]
pub fn vimrc_target(
    mode: InstallMode,
    home: &Path,
    distro: Option<&DistroSpec>,
) -> Option<PathBuf> {
    match mode {
        InstallMode::User => Some(home.join(".vimrc")),
        InstallMode::Global => distro.map(|spec| spec.vimrc.clone()),
    }
}

/// Placeholder set for the loader template.
#[must_use]
pub fn loader_placeholders(vimrc: &Path) -> PlaceholderSet {
    PlaceholderSet::new().with_path("vimrc", vimrc)
}

impl Task for InstallEditor {
    fn name(&self) -> &str {
        "vim"
    }

    fn should_run(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn run(&self, ctx: &Context<'_>) -> Result<TaskResult> {
        let payload = ctx.payload_etc("vim");
        let target_dir = ctx.etc_dir().join("vim");
        std::fs::create_dir_all(&target_dir)
            .with_context(|| format!("create: {}", target_dir.display()))?;

        let vimrc = target_dir.join("vimrc");
        std::fs::copy(payload.join("vimrc"), &vimrc)
            .with_context(|| format!("copy vimrc to {}", vimrc.display()))?;

        if ctx.distro.is_some() {
            self.install_editor_env(ctx, &payload, &target_dir)?;
        } else {
            let hint = if ctx.mode.is_user() {
                String::new()
            } else {
                format!(" and load {}", vimrc.display())
            };
            ctx.log.warn(&format!(
                "You need to set the default editor{hint} manually"
            ));
        }

        let colors = colors_dir(ctx.mode, &ctx.home);
        std::fs::create_dir_all(&colors)
            .with_context(|| format!("create: {}", colors.display()))?;
        std::fs::copy(payload.join(COLOR_SCHEME), colors.join(COLOR_SCHEME))
            .with_context(|| format!("copy color scheme to {}", colors.display()))?;

        if let Some(target) = vimrc_target(ctx.mode, &ctx.home, ctx.distro) {
            let rel_vimrc = ctx.rel_home(&vimrc);
            let snippet =
                loader_placeholders(&rel_vimrc).render_file(&payload.join("loader"))?;
            let patch = LoaderPatch::new(
                target.clone(),
                snippet,
                rel_vimrc.display().to_string(),
            );
            match patch.apply()? {
                PatchOutcome::PatchedButModified => {
                    let name = target
                        .file_name()
                        .map_or_else(|| target.display().to_string(), |n| {
                            n.to_string_lossy().into_owned()
                        });
                    ctx.log
                        .info(&format!("{name} has already been patched (but modified)"));
                }
                PatchOutcome::Written | PatchOutcome::AlreadyPatched | PatchOutcome::Appended => {}
            }
        }

        Ok(TaskResult::Ok)
    }
}

impl InstallEditor {
    /// Make vim the default editor: an environment stanza for login shells
    /// plus the distro's own editor-selection mechanism, where one exists.
    fn install_editor_env(
        &self,
        ctx: &Context<'_>,
        payload: &Path,
        target_dir: &Path,
    ) -> Result<()> {
        let env_file = target_dir.join("editor-env.sh");
        std::fs::copy(payload.join("editor-env.sh"), &env_file)
            .with_context(|| format!("copy editor-env.sh to {}", env_file.display()))?;

        // user installs source the stanza from the managed shell config
        if ctx.mode.is_user() {
            return Ok(());
        }

        let profile_d = PathBuf::from("/etc/profile.d/homeset-editor.sh");
        crate::resources::fs::remove_existing(&profile_d)?;
        std::os::unix::fs::symlink(&env_file, &profile_d).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                profile_d.display(),
                env_file.display()
            )
        })?;

        if let Some(spec) = ctx.distro
            && let Some(set_editor) = &spec.set_editor
            && let Some((program, args)) = set_editor.split_first()
        {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let result = ctx.executor.run_unchecked(program, &args)?;
            if !result.success {
                ctx.log
                    .warn(&format!("setting the default editor via {program} failed"));
            }
        }
        Ok(())
    }
}
