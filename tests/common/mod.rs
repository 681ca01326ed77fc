// Shared helpers for integration tests.
//
// Provides an isolated home directory wired to the real shipped payload so
// each test can exercise installer tasks without touching the host system.
#![allow(dead_code, clippy::expect_used)]

use std::path::{Path, PathBuf};

use homeset_cli::exec::SystemExecutor;
use homeset_cli::logging::Logger;
use homeset_cli::prompt::TerminalPrompter;
use homeset_cli::tasks::{Context, InstallMode};

/// The payload directory shipped in this repository.
pub fn payload_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("payload")
}

/// An isolated user-mode install environment.
///
/// The home directory lives in a [`tempfile::TempDir`] and is deleted on
/// drop; prompts resolve to their defaults so no test ever blocks on stdin.
pub struct InstallFixture {
    home: tempfile::TempDir,
    executor: SystemExecutor,
    prompter: TerminalPrompter,
    log: Logger,
}

impl InstallFixture {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp home"),
            executor: SystemExecutor,
            prompter: TerminalPrompter::new(true),
            log: Logger::new("test"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// The private install directory a user-mode run would use.
    pub fn base_dir(&self) -> PathBuf {
        self.home.path().join(".config").join("homeset")
    }

    /// Build a user-mode context with no distro information.
    pub fn ctx(&self) -> Context<'_> {
        Context::new(
            InstallMode::User,
            None,
            payload_root(),
            self.home.path().to_path_buf(),
            None,
            &self.executor,
            &self.prompter,
            &self.log,
        )
    }
}
