use std::path::Path;

use regex::Regex;

pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];
pub const DEFAULT_LABEL_EXTENSION: &str = "txt";
/// Images the empty-label creator pairs with a sidecar.
pub const DEFAULT_LABEL_IMAGE_EXTENSIONS: &[&str] = &["jpg"];

/// Case-insensitive file-name matcher for a list of extensions.
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    extensions: Vec<String>,
    pattern: Option<Regex>,
}

impl ExtensionSet {
    /// Builds a matcher from bare extensions; a leading dot is tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined pattern fails to compile.
    pub fn new<I, S>(extensions: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        let pattern = if normalized.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = normalized.iter().map(|e| regex::escape(e)).collect();
            Some(Regex::new(&format!(r"(?i)\.({})$", alternatives.join("|")))?)
        };

        Ok(Self {
            extensions: normalized,
            pattern,
        })
    }

    /// Union of two sets, keeping `self`'s order first.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined pattern fails to compile.
    pub fn union(&self, other: &Self) -> Result<Self, regex::Error> {
        Self::new(self.extensions.iter().chain(other.extensions.iter()))
    }

    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| pattern.is_match(name))
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
