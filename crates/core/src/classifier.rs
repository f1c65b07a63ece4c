use std::path::{Path, PathBuf};

use datasetkit_config::Settings;
use datasetkit_models::RenameOutcome;
use rand::Rng;
use tracing::info;

use crate::{CoreError, Result};

const TAG_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Renames a media file to `{classification}_{tag}` keeping its extension.
#[derive(Debug, Clone)]
pub struct Classifier {
    tag_length: usize,
}

impl Classifier {
    #[must_use]
    pub fn new(tag_length: usize) -> Self {
        Self {
            tag_length: tag_length.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.tag_length)
    }

    pub fn generate_tag<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.tag_length)
            .map(|_| char::from(TAG_CHARSET[rng.random_range(0..TAG_CHARSET.len())]))
            .collect()
    }

    /// The name `path` would get, without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] for an empty classification or one
    /// containing a path separator.
    pub fn target_for<R: Rng + ?Sized>(&self, path: &Path, classification: &str, rng: &mut R) -> Result<PathBuf> {
        let classification = classification.trim();
        if classification.is_empty() {
            return Err(CoreError::InvalidInput("classification must not be empty".to_string()));
        }
        if classification.contains(['/', '\\']) || classification == "." || classification == ".." {
            return Err(CoreError::InvalidInput(format!(
                "classification {classification:?} is not a valid file name"
            )));
        }

        let tag = self.generate_tag(rng);
        let name = match path.extension() {
            Some(ext) => format!("{classification}_{tag}.{}", ext.to_string_lossy()),
            None => format!("{classification}_{tag}"),
        };
        Ok(path.with_file_name(name))
    }

    /// Renames `path` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if `path` is not a file,
    /// [`CoreError::InvalidInput`] for a bad classification and
    /// [`CoreError::AlreadyExists`] if the generated name is taken.
    pub async fn rename(&self, path: &Path, classification: &str) -> Result<RenameOutcome> {
        if !tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }

        let target = self.target_for(path, classification, &mut rand::rng())?;
        if tokio::fs::try_exists(&target).await? {
            return Err(CoreError::AlreadyExists(target));
        }

        tokio::fs::rename(path, &target).await?;
        info!("Classified {:?} -> {:?}", path, target);

        Ok(RenameOutcome {
            from: path.to_path_buf(),
            to: target,
        })
    }
}
