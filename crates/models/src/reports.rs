use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub media_deleted: usize,
    pub sidecars_deleted: usize,
    pub errors: Vec<String>,
}

impl DeleteReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelReport {
    pub total_images: usize,
    pub already_labelled: usize,
    pub created: usize,
    pub errors: Vec<String>,
}

impl LabelReport {
    #[must_use]
    pub fn missing(&self) -> usize {
        self.total_images - self.already_labelled
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub images_copied: usize,
    pub labels_copied: usize,
    pub images_skipped: usize,
    pub labels_skipped: usize,
    pub sources: usize,
    pub missing_sources: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub errors: Vec<String>,
}

impl MergeReport {
    #[must_use]
    pub fn total_copied(&self) -> usize {
        self.images_copied + self.labels_copied
    }

    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.images_skipped + self.labels_skipped
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HashStripReport {
    pub total: usize,
    pub renamed: usize,
    pub already_correct: usize,
    pub not_found: usize,
    pub collisions: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// What to do when a label rename would land on an existing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the source untouched and count a collision.
    #[default]
    Skip,
    /// Append `_1`, `_2`, ... to the target stem until it is free.
    Suffix,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "suffix" => Ok(Self::Suffix),
            _ => Err(format!("Unknown collision policy: {s}")),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Suffix => write!(f, "suffix"),
        }
    }
}
