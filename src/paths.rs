//! Path rendering helpers.
use std::path::{Path, PathBuf};

/// Render `path` relative to `home` with a leading `~` component when it
/// lies inside the home directory; otherwise return it unchanged.
///
/// Used for placeholder values and status messages so that per-user installs
/// read as `~/.config/homeset/...` instead of a machine-specific absolute
/// path.
#[must_use]
pub fn relative_to_home(path: &Path, home: &Path) -> PathBuf {
    path.strip_prefix(home)
        .map_or_else(|_| path.to_path_buf(), |rest| Path::new("~").join(rest))
}

/// [`relative_to_home`] rendered as a display string.
#[must_use]
pub fn display_relative_to_home(path: &Path, home: &Path) -> String {
    relative_to_home(path, home).display().to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn path_inside_home_is_rewritten() {
        let home = Path::new("/home/alice");
        let path = Path::new("/home/alice/.config/homeset/etc");
        assert_eq!(
            relative_to_home(path, home),
            PathBuf::from("~/.config/homeset/etc")
        );
    }

    #[test]
    fn path_outside_home_is_kept_absolute() {
        let home = Path::new("/home/alice");
        let path = Path::new("/opt/homeset/etc");
        assert_eq!(relative_to_home(path, home), PathBuf::from("/opt/homeset/etc"));
    }

    #[test]
    fn home_itself_becomes_tilde() {
        let home = Path::new("/home/alice");
        assert_eq!(relative_to_home(home, home), PathBuf::from("~"));
    }

    #[test]
    fn display_form_matches() {
        let home = Path::new("/home/alice");
        let path = Path::new("/home/alice/.vimrc");
        assert_eq!(display_relative_to_home(path, home), "~/.vimrc");
    }
}
