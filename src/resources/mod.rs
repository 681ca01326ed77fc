//! Idempotent file-provisioning primitives.
//!
//! Everything under here reconciles a single filesystem fact and can be
//! re-applied safely; orchestration and prompting live in [`crate::tasks`].
pub mod fs;
pub mod loader_patch;
pub mod managed_file;
pub mod package;

/// What currently occupies a managed file's public link path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing exists at the link path.
    Missing,
    /// A symlink pointing at the canonical target.
    Correct,
    /// A symlink pointing somewhere else (possibly dangling).
    WrongLink(std::path::PathBuf),
    /// A regular file. `blank` is true when it holds only whitespace;
    /// non-blank files are candidates for preservation before removal.
    Occupied { blank: bool },
}

/// What the caller decided to do with a pre-existing regular file at the
/// public link path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Copy the old file into the override path before removing it.
    PreserveToOverride,
    /// Remove the old file without keeping a copy.
    Discard,
}

/// Result of a provisioning step, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Canonical content written and link created.
    Provisioned {
        /// Whether a pre-existing user file was copied into the override.
        preserved_existing: bool,
    },
}
