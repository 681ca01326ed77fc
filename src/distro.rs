//! Distribution detection and the per-distro command table.
//!
//! The table is an immutable lookup loaded once at startup from an embedded
//! TOML document and passed explicitly to whatever needs it; there is no
//! ambient global.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::exec::Executor;

/// Per-distribution commands and paths.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DistroSpec {
    /// Package manager command prefix; package names are appended.
    pub install: Vec<String>,
    /// Distro package name per required tool (`git`, `zsh`, `tmux`, `vim`).
    pub packages: BTreeMap<String, String>,
    /// Command that selects vim as the system default editor, if any.
    #[serde(default)]
    pub set_editor: Option<Vec<String>>,
    /// System-wide vimrc used for global installs.
    pub vimrc: PathBuf,
}

impl DistroSpec {
    /// Map the given tool names to this distro's package names.
    ///
    /// Tools without a table entry fall back to their own name.
    #[must_use]
    pub fn package_names(&self, tools: &[&str]) -> Vec<String> {
        tools
            .iter()
            .map(|tool| {
                self.packages
                    .get(*tool)
                    .cloned()
                    .unwrap_or_else(|| (*tool).to_string())
            })
            .collect()
    }

    /// The full install command for the given tools.
    #[must_use]
    pub fn install_command(&self, tools: &[&str]) -> Vec<String> {
        let mut cmd = self.install.clone();
        cmd.extend(self.package_names(tools));
        cmd
    }
}

/// Immutable distro id → [`DistroSpec`] lookup.
#[derive(Debug, Deserialize)]
pub struct DistroTable {
    #[serde(flatten)]
    distros: BTreeMap<String, DistroSpec>,
}

impl DistroTable {
    /// Parse the table embedded at build time from `conf/distros.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document does not parse: a packaging
    /// defect, surfaced at startup rather than mid-install.
    pub fn builtin() -> Result<Self> {
        toml::from_str(include_str!("../conf/distros.toml"))
            .context("parse embedded distro table")
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DistroSpec> {
        self.distros.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.distros.contains_key(id)
    }

    /// Known distro ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.distros.keys().map(String::as_str).collect()
    }
}

/// Guess the host distribution id.
///
/// Reads `ID=` from `/etc/os-release` through a shell (the file is itself
/// shell syntax) and falls back to the Arch release marker, which at least
/// minimal container images ship without an os-release file.
#[must_use]
pub fn detect(executor: &dyn Executor) -> Option<String> {
    detect_at(executor, Path::new("/etc"))
}

fn detect_at(executor: &dyn Executor, etc: &Path) -> Option<String> {
    let os_release = etc.join("os-release");
    if os_release.exists() {
        let script = format!(". {}; echo -n $ID", os_release.display());
        let result = executor.run_unchecked("sh", &["-c", &script]).ok()?;
        if result.success && !result.stdout.trim().is_empty() {
            return Some(result.stdout.trim().to_string());
        }
    }
    if etc.join("arch-release").exists() {
        return Some("arch".to_string());
    }
    None
}
