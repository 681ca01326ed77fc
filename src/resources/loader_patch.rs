//! Loader-snippet patching for files the installer does not own.
//!
//! Unlike a managed file, the target here (typically the system or user
//! vimrc) may hold arbitrary pre-existing content that must survive. The
//! patcher only ever writes a fresh file, appends after the existing text,
//! or refuses to touch an ambiguous hand-edited file.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

/// How a loader patch turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Target was absent or blank; the snippet is now the whole file.
    Written,
    /// The exact snippet is already present; nothing changed.
    AlreadyPatched,
    /// The target references the managed config but the snippet no longer
    /// matches; it was edited by hand. Left untouched.
    PatchedButModified,
    /// The snippet was appended after the existing content.
    Appended,
}

/// A loader snippet to inject into a user-owned file.
#[derive(Debug, Clone)]
pub struct LoaderPatch {
    /// The file to patch.
    pub target: PathBuf,
    /// Rendered snippet text.
    pub snippet: String,
    /// Substring that identifies an earlier (possibly edited) patch,
    /// in practice the managed config path the snippet sources.
    pub marker: String,
}

impl LoaderPatch {
    #[must_use]
    pub fn new(target: PathBuf, snippet: String, marker: String) -> Self {
        Self {
            target,
            snippet,
            marker,
        }
    }

    /// Apply the patch.
    ///
    /// Decision order matters: the exact-snippet check runs before the marker
    /// check so that a file which already carries the snippet (plus whatever
    /// else the user added around it) is recognised as patched rather than
    /// flagged as modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be read or written.
    pub fn apply(&self) -> Result<PatchOutcome> {
        let existing = match std::fs::read_to_string(&self.target) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read existing: {}", self.target.display()));
            }
        };

        if existing.trim().is_empty() {
            super::fs::ensure_parent_dir(&self.target)?;
            std::fs::write(&self.target, &self.snippet)
                .with_context(|| format!("write: {}", self.target.display()))?;
            return Ok(PatchOutcome::Written);
        }

        let existing = existing.trim_end();
        if existing.contains(self.snippet.trim()) {
            return Ok(PatchOutcome::AlreadyPatched);
        }
        if existing.contains(&self.marker) {
            return Ok(PatchOutcome::PatchedButModified);
        }

        let patched = format!("{existing}\n\n{}", self.snippet.trim());
        std::fs::write(&self.target, patched)
            .with_context(|| format!("write: {}", self.target.display()))?;
        Ok(PatchOutcome::Appended)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const SNIPPET: &str = "\" load managed config\nsource /opt/homeset/etc/vim/vimrc\n";
    const MARKER: &str = "/opt/homeset/etc/vim/vimrc";

    fn patch(dir: &std::path::Path) -> LoaderPatch {
        LoaderPatch::new(
            dir.join("vimrc"),
            SNIPPET.to_string(),
            MARKER.to_string(),
        )
    }

    #[test]
    fn absent_target_gets_snippet_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        assert_eq!(p.apply().unwrap(), PatchOutcome::Written);
        assert_eq!(std::fs::read_to_string(&p.target).unwrap(), SNIPPET);
    }

    #[test]
    fn blank_target_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        std::fs::write(&p.target, "   \n").unwrap();
        assert_eq!(p.apply().unwrap(), PatchOutcome::Written);
        assert_eq!(std::fs::read_to_string(&p.target).unwrap(), SNIPPET);
    }

    #[test]
    fn exact_snippet_with_trailing_content_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        let content = format!("{SNIPPET}\n\" my own mappings\nnnoremap ; :\n");
        std::fs::write(&p.target, &content).unwrap();
        assert_eq!(p.apply().unwrap(), PatchOutcome::AlreadyPatched);
        assert_eq!(std::fs::read_to_string(&p.target).unwrap(), content);
    }

    #[test]
    fn marker_with_altered_snippet_is_reported_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        let content = format!("\" edited by hand\nsource {MARKER} \" tweaked\n");
        std::fs::write(&p.target, &content).unwrap();
        assert_eq!(p.apply().unwrap(), PatchOutcome::PatchedButModified);
        assert_eq!(std::fs::read_to_string(&p.target).unwrap(), content);
    }

    #[test]
    fn unrelated_content_gets_snippet_appended() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        std::fs::write(&p.target, "set nocompatible\n\n").unwrap();
        assert_eq!(p.apply().unwrap(), PatchOutcome::Appended);
        assert_eq!(
            std::fs::read_to_string(&p.target).unwrap(),
            format!("set nocompatible\n\n{}", SNIPPET.trim())
        );
    }

    #[test]
    fn applying_twice_keeps_one_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        std::fs::write(&p.target, "set nocompatible\n").unwrap();
        assert_eq!(p.apply().unwrap(), PatchOutcome::Appended);
        assert_eq!(p.apply().unwrap(), PatchOutcome::AlreadyPatched);
        let content = std::fs::read_to_string(&p.target).unwrap();
        assert_eq!(content.matches(SNIPPET.trim()).count(), 1);
    }

    #[test]
    fn written_then_applied_again_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let p = patch(dir.path());
        assert_eq!(p.apply().unwrap(), PatchOutcome::Written);
        assert_eq!(p.apply().unwrap(), PatchOutcome::AlreadyPatched);
    }
}
