use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use datasetkit_models::MediaFile;
use datasetkit_utils::naming::is_hidden_in_path;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::{CoreError, Result, ScanProfile};

/// Outcome of listing a folder that exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The folder exists but holds no file of the selected types.
    Empty,
    /// Matching files in file-name order.
    Files(Vec<PathBuf>),
}

impl Listing {
    #[must_use]
    pub fn into_files(self) -> Vec<PathBuf> {
        match self {
            Self::Empty => Vec::new(),
            Self::Files(files) => files,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Files(files) => files.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

pub struct FileEnumerator;

impl FileEnumerator {
    /// Lists the files selected by `profile` in `folder`.
    ///
    /// Non-recursive profiles only look at direct children. Results are
    /// sorted by path so "first discovered" is the same on every platform.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if `folder` does not exist or is not a
    /// directory, and an IO error if it cannot be read.
    pub fn list(folder: &Path, profile: &ScanProfile) -> Result<Listing> {
        if !folder.is_dir() {
            error!("Enumerator: Path does not exist: {:?}", folder);
            return Err(CoreError::NotFound(folder.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = if profile.recursive() {
            WalkDir::new(folder)
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Enumerator: Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|e| e.file_type().is_file())
                .map(walkdir::DirEntry::into_path)
                .collect()
        } else {
            std::fs::read_dir(folder)?
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .collect()
        };

        paths.retain(|p| profile.matches(p) && !(profile.skip_hidden() && is_hidden_in_path(p, folder)));
        paths.sort();

        debug!(
            "Enumerator: {} matching files in {:?} (recursive: {})",
            paths.len(),
            folder,
            profile.recursive()
        );

        if paths.is_empty() {
            Ok(Listing::Empty)
        } else {
            Ok(Listing::Files(paths))
        }
    }

    /// Reads size and modification time for each path, keeping order.
    ///
    /// Files whose metadata cannot be read are kept with size zero; the
    /// digest step will then report them as unreadable.
    #[must_use]
    pub fn describe(paths: Vec<PathBuf>, profile: &ScanProfile) -> Vec<MediaFile> {
        paths
            .into_iter()
            .map(|path| {
                let file_type = profile.classify(&path);
                match std::fs::metadata(&path) {
                    Ok(meta) => {
                        let modified = meta.modified().map_or_else(|_| Local::now(), DateTime::<Local>::from);
                        MediaFile::new(path, file_type, meta.len(), modified)
                    }
                    Err(e) => {
                        warn!("Enumerator: Failed to read metadata for {:?}: {}", path, e);
                        MediaFile::new(path, file_type, 0, Local::now())
                    }
                }
            })
            .collect()
    }
}
