use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use smallvec::SmallVec;

use crate::media_file::MediaFile;

/// Files sharing one content digest, in discovery order.
///
/// The first member is the keeper; every other member is removable.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub digest: Arc<str>,
    pub files: SmallVec<[Arc<MediaFile>; 4]>,
    pub wasted_space: u64, // Size that could be saved by keeping only one copy
}

impl DuplicateGroup {
    /// Builds a group, returning `None` for fewer than two members.
    #[must_use]
    pub fn new(digest: Arc<str>, files: impl Into<SmallVec<[Arc<MediaFile>; 4]>>) -> Option<Self> {
        let files = files.into();
        if files.len() < 2 {
            return None;
        }
        let wasted_space = files[0].size * (files.len() as u64 - 1);

        Some(Self {
            digest,
            files,
            wasted_space,
        })
    }

    #[must_use]
    pub fn keeper(&self) -> &Arc<MediaFile> {
        &self.files[0]
    }

    #[must_use]
    pub fn removable(&self) -> &[Arc<MediaFile>] {
        &self.files[1..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub folder: PathBuf,
    pub files: Vec<Arc<MediaFile>>,
    pub groups: Vec<DuplicateGroup>,
    pub unreadable: Vec<PathBuf>,
    pub duration: Duration,
    pub timestamp: DateTime<Local>,
}

impl ScanResult {
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn total_groups(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn total_duplicates(&self) -> usize {
        self.groups.iter().map(|g| g.len() - 1).sum()
    }

    #[must_use]
    pub fn total_wasted_space(&self) -> u64 {
        self.groups.iter().map(|g| g.wasted_space).sum()
    }

    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}
