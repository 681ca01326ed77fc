//! The managed-file provisioner.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{ConflictDecision, LinkState, ProvisionOutcome};

/// Content to install into the canonical target.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// Copy the file at this path verbatim.
    CopyFrom(&'a Path),
    /// Write this already-rendered text.
    Rendered(&'a str),
}

/// A configuration file managed by the installer.
///
/// The canonical copy lives under the tool's private directory and is safe
/// to regenerate on every run; the public link path is what the application
/// actually reads and always points at the canonical copy; the optional
/// override file belongs to the user and is created once, then never touched.
#[derive(Debug, Clone)]
pub struct ManagedFile {
    canonical_target: PathBuf,
    public_link: PathBuf,
    override_path: Option<PathBuf>,
}

impl ManagedFile {
    #[must_use]
    pub fn new(canonical_target: PathBuf, public_link: PathBuf) -> Self {
        Self {
            canonical_target,
            public_link,
            override_path: None,
        }
    }

    /// Configure an override file, builder-style.
    #[must_use]
    pub fn with_override(mut self, override_path: PathBuf) -> Self {
        self.override_path = Some(override_path);
        self
    }

    #[must_use]
    pub fn canonical_target(&self) -> &Path {
        &self.canonical_target
    }

    #[must_use]
    pub fn public_link(&self) -> &Path {
        &self.public_link
    }

    #[must_use]
    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// Inspect what currently occupies the public link path.
    ///
    /// Callers use this before [`provision`](Self::provision) to decide
    /// whether a pre-existing user file should be preserved; a non-blank
    /// regular file is the only state that warrants asking.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing regular file cannot be read.
    pub fn link_state(&self) -> Result<LinkState> {
        if let Ok(existing) = std::fs::read_link(&self.public_link) {
            if existing == self.canonical_target {
                return Ok(LinkState::Correct);
            }
            return Ok(LinkState::WrongLink(existing));
        }
        if self.public_link.symlink_metadata().is_err() {
            return Ok(LinkState::Missing);
        }
        let content = std::fs::read_to_string(&self.public_link)
            .with_context(|| format!("read existing: {}", self.public_link.display()))?;
        Ok(LinkState::Occupied {
            blank: content.trim().is_empty(),
        })
    }

    /// Reconcile the filesystem with this managed file.
    ///
    /// Step order matters: the canonical content is written before anything
    /// is removed, so an interrupted run never deletes the old config without
    /// its replacement already existing on disk.
    ///
    /// `on_conflict` applies only when the public link path holds a non-blank
    /// regular file; `PreserveToOverride` copies it into the override path
    /// before removal (requires an override to be configured).
    ///
    /// # Errors
    ///
    /// Returns an error on any filesystem failure; there is no rollback,
    /// the run is expected to be repeated instead.
    pub fn provision(
        &self,
        payload: &Payload<'_>,
        on_conflict: ConflictDecision,
    ) -> Result<ProvisionOutcome> {
        super::fs::ensure_parent_dir(&self.canonical_target)?;

        match payload {
            Payload::CopyFrom(source) => {
                std::fs::copy(source, &self.canonical_target).with_context(|| {
                    format!(
                        "copy {} to {}",
                        source.display(),
                        self.canonical_target.display()
                    )
                })?;
            }
            Payload::Rendered(text) => {
                std::fs::write(&self.canonical_target, text)
                    .with_context(|| format!("write: {}", self.canonical_target.display()))?;
            }
        }

        let mut preserved = false;
        if on_conflict == ConflictDecision::PreserveToOverride
            && matches!(self.link_state()?, LinkState::Occupied { blank: false })
            && let Some(override_path) = &self.override_path
        {
            super::fs::ensure_parent_dir(override_path)?;
            std::fs::copy(&self.public_link, override_path).with_context(|| {
                format!(
                    "preserve {} to {}",
                    self.public_link.display(),
                    override_path.display()
                )
            })?;
            preserved = true;
        }

        super::fs::remove_existing(&self.public_link)?;
        super::fs::ensure_parent_dir(&self.public_link)?;
        std::os::unix::fs::symlink(&self.canonical_target, &self.public_link).with_context(
            || {
                format!(
                    "creating symlink {} -> {}",
                    self.public_link.display(),
                    self.canonical_target.display()
                )
            },
        )?;

        // The override belongs to the user: create it empty on first run,
        // never touch it afterwards.
        if let Some(override_path) = &self.override_path
            && override_path.symlink_metadata().is_err()
        {
            super::fs::ensure_parent_dir(override_path)?;
            std::fs::write(override_path, "")
                .with_context(|| format!("create override: {}", override_path.display()))?;
        }

        Ok(ProvisionOutcome::Provisioned {
            preserved_existing: preserved,
        })
    }
}
