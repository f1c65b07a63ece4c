use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub enum FileType {
    Image,
    Video,
    Label,
    Other,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Image => write!(f, "Image"),
            FileType::Video => write!(f, "Video"),
            FileType::Label => write!(f, "Label"),
            FileType::Other => write!(f, "Other"),
        }
    }
}

/// A file discovered by a directory scan.
///
/// The digest is filled in at most once, after the file has been streamed
/// through the digest computer. `None` means either "not computed yet" or
/// "could not be read".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub name: Arc<str>,
    pub extension: Arc<str>,
    pub file_type: FileType,
    pub size: u64,
    pub modified: DateTime<Local>,
    pub hash: Option<Arc<str>>,
}

impl MediaFile {
    #[must_use]
    pub fn new(path: PathBuf, file_type: FileType, size: u64, modified: DateTime<Local>) -> Self {
        let name: Arc<str> = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
            .into();
        let extension: Arc<str> = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
            .into();

        Self {
            path,
            name,
            extension,
            file_type,
            size,
            modified,
            hash: None,
        }
    }

    #[must_use]
    pub fn with_hash(mut self, hash: Option<Arc<str>>) -> Self {
        self.hash = hash;
        self
    }

    /// Path of the label file that shares this file's base name.
    #[must_use]
    pub fn sidecar_path(&self, label_extension: &str) -> PathBuf {
        self.path.with_extension(label_extension)
    }
}
