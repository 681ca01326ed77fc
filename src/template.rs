//! Placeholder substitution for shipped config templates.
//!
//! Templates mark insertion points as `@@name@@`. Tokens without a matching
//! value are left verbatim: some files legitimately contain `@@`-looking
//! text (e.g. diff markers in comments), so unresolved tokens are not an
//! error here. The per-template leak check lives in the test suite instead.
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context as _, Result};

/// An ordered mapping from placeholder token name to replacement text.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderSet {
    values: BTreeMap<String, String>,
}

impl PlaceholderSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a replacement value, builder-style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Add a path value, builder-style (lossy display form).
    #[must_use]
    pub fn with_path(self, name: &str, path: &Path) -> Self {
        let rendered = path.display().to_string();
        self.with(name, rendered)
    }

    /// Replace every `@@name@@` occurrence in `text` with its value.
    /// Unknown tokens stay verbatim.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (name, value) in &self.values {
            out = out.replace(&format!("@@{name}@@"), value);
        }
        out
    }

    /// Render the template file at `src` and return the result.
    ///
    /// # Errors
    ///
    /// Returns an error if `src` cannot be read.
    pub fn render_file(&self, src: &Path) -> Result<String> {
        let text = std::fs::read_to_string(src)
            .with_context(|| format!("read template: {}", src.display()))?;
        Ok(self.render(&text))
    }

    /// Render the template file at `src` and write the result to `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if `src` cannot be read or `dst` cannot be written.
    pub fn render_to_file(&self, src: &Path, dst: &Path) -> Result<()> {
        let rendered = self.render_file(src)?;
        std::fs::write(dst, rendered).with_context(|| format!("write: {}", dst.display()))?;
        Ok(())
    }

    /// Token names present in this set.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

/// Collect the distinct `@@token@@` names occurring in `text`.
///
/// Used by the template leak tests to verify every shipped template is fully
/// covered by its installer's [`PlaceholderSet`].
#[must_use]
pub fn token_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("@@") {
        let after = &rest[start + 2..];
        let Some(len) = after.find("@@") else { break };
        let name = &after[..len];
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            if !names.contains(&name.to_string()) {
                names.push(name.to_string());
            }
            rest = &after[len + 2..];
        } else {
            // not a token: resync after the opening marker
            rest = &rest[start + 2..];
        }
    }
    names
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_known_tokens() {
        let set = PlaceholderSet::new().with("name", "world");
        assert_eq!(set.render("hello @@name@@!"), "hello world!");
    }

    #[test]
    fn render_replaces_every_occurrence() {
        let set = PlaceholderSet::new().with("x", "1");
        assert_eq!(set.render("@@x@@ + @@x@@"), "1 + 1");
    }

    #[test]
    fn unknown_tokens_stay_verbatim() {
        let set = PlaceholderSet::new().with("known", "v");
        assert_eq!(
            set.render("@@known@@ and @@unknown@@"),
            "v and @@unknown@@"
        );
    }

    #[test]
    fn path_values_render_as_display_form() {
        let set = PlaceholderSet::new().with_path("p", Path::new("~/bin/smartless"));
        assert_eq!(set.render("pager = @@p@@"), "pager = ~/bin/smartless");
    }

    #[test]
    fn render_file_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("template");
        let dst = dir.path().join("out");
        std::fs::write(&src, "link to @@target@@\n").unwrap();

        let set = PlaceholderSet::new().with("target", "/opt/homeset/etc");
        set.render_to_file(&src, &dst).unwrap();

        assert_eq!(
            std::fs::read_to_string(&dst).unwrap(),
            "link to /opt/homeset/etc\n"
        );
    }

    #[test]
    fn token_names_finds_each_once() {
        let names = token_names("@@a@@ @@b_c@@ @@a@@ not@@ @@ @@");
        assert_eq!(names, vec!["a".to_string(), "b_c".to_string()]);
    }

    #[test]
    fn token_names_ignores_non_token_markers() {
        assert!(token_names("foo @@ bar @@ baz ").is_empty());
    }
}
