use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No {kind} files found in {location}")]
    NoMatchingFiles { kind: String, location: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Target already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl CoreError {
    pub(crate) fn no_files(kind: &str, location: &std::path::Path) -> Self {
        Self::NoMatchingFiles {
            kind: kind.to_string(),
            location: location.display().to_string(),
        }
    }

    /// True for errors the caller reports as "nothing to do" rather than a failure.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::NoMatchingFiles { .. })
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
