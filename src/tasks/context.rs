//! Shared context for installer tasks.
use std::path::{Path, PathBuf};

use crate::distro::DistroSpec;
use crate::exec::Executor;
use crate::logging::Logger;
use crate::prompt::Prompter;

/// Whether the environment is deployed for one user or system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Per-user install under `~/.config/homeset`.
    User,
    /// System-wide install under `/opt/homeset` (requires root).
    Global,
}

impl InstallMode {
    /// The private directory holding canonical config copies and overrides.
    #[must_use]
    pub fn base_dir(self, home: &Path) -> PathBuf {
        match self {
            Self::User => home.join(".config").join("homeset"),
            Self::Global => PathBuf::from("/opt/homeset"),
        }
    }

    #[must_use]
    pub fn is_user(self) -> bool {
        self == Self::User
    }

    /// The `git config` scope flag for this mode.
    #[must_use]
    pub const fn git_scope(self) -> &'static str {
        match self {
            Self::User => "--global",
            Self::Global => "--system",
        }
    }
}

/// Everything an installer task needs, assembled once by the driver.
pub struct Context<'a> {
    pub mode: InstallMode,
    /// Command table for the detected distro; `None` when unknown.
    pub distro: Option<&'a DistroSpec>,
    /// Directory holding the shipped templates (`etc/`, `bin/`, `dconf/`).
    pub payload_root: PathBuf,
    /// Private install directory derived from the mode.
    pub base_dir: PathBuf,
    /// Home directory of the invoking user.
    pub home: PathBuf,
    /// Primary non-root user, for global installs performed as root.
    pub primary_user: Option<String>,
    pub executor: &'a dyn Executor,
    pub prompter: &'a dyn Prompter,
    pub log: &'a Logger,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("mode", &self.mode)
            .field("distro", &self.distro)
            .field("payload_root", &self.payload_root)
            .field("base_dir", &self.base_dir)
            .field("home", &self.home)
            .field("primary_user", &self.primary_user)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    pub fn new(
        mode: InstallMode,
        distro: Option<&'a DistroSpec>,
        payload_root: PathBuf,
        home: PathBuf,
        primary_user: Option<String>,
        executor: &'a dyn Executor,
        prompter: &'a dyn Prompter,
        log: &'a Logger,
    ) -> Self {
        let base_dir = mode.base_dir(&home);
        Self {
            mode,
            distro,
            payload_root,
            base_dir,
            home,
            primary_user,
            executor,
            prompter,
            log,
        }
    }

    /// Canonical config directory inside the install base.
    #[must_use]
    pub fn etc_dir(&self) -> PathBuf {
        self.base_dir.join("etc")
    }

    /// Helper-script directory inside the install base.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.base_dir.join("bin")
    }

    /// Shipped template directory for `app`.
    #[must_use]
    pub fn payload_etc(&self, app: &str) -> PathBuf {
        self.payload_root.join("etc").join(app)
    }

    /// Render a path `~`-relative for placeholders and messages.
    #[must_use]
    pub fn rel_home(&self, path: &Path) -> PathBuf {
        crate::paths::relative_to_home(path, &self.home)
    }

    /// [`rel_home`](Self::rel_home) as a display string.
    #[must_use]
    pub fn rel_home_display(&self, path: &Path) -> String {
        crate::paths::display_relative_to_home(path, &self.home)
    }
}
