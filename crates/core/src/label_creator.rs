use std::path::{Path, PathBuf};

use datasetkit_config::Settings;
use datasetkit_models::LabelReport;
use datasetkit_utils::ProgressSink;
use tracing::{info, warn};

use crate::{CoreError, FileEnumerator, Listing, Result, ScanProfile};

/// Creates empty sidecar labels for images that have none.
#[derive(Debug, Clone)]
pub struct LabelCreator {
    profile: ScanProfile,
}

impl LabelCreator {
    /// # Errors
    ///
    /// Returns an error if the configured extensions are invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            profile: ScanProfile::label_targets(settings)?,
        })
    }

    /// Splits the images in `folder` into those without a sidecar, plus the
    /// number of images checked.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for a missing folder and
    /// [`CoreError::NoMatchingFiles`] if it holds no images.
    pub fn find_unlabelled(&self, folder: &Path, progress: &ProgressSink) -> Result<(Vec<PathBuf>, usize)> {
        let images = match FileEnumerator::list(folder, &self.profile)? {
            Listing::Empty => return Err(CoreError::no_files("image", folder)),
            Listing::Files(images) => images,
        };

        let total = images.len();
        let mut unlabelled = Vec::new();
        for (i, image) in images.into_iter().enumerate() {
            if !self.profile.sidecar_for(&image).exists() {
                unlabelled.push(image);
            }
            progress.step(i + 1, total, "checking labels...");
        }

        Ok((unlabelled, total))
    }

    /// Writes a zero-byte label next to every unlabelled image.
    ///
    /// Existing labels are never opened for writing. Per-file failures are
    /// collected in the report.
    ///
    /// # Errors
    ///
    /// Same as [`LabelCreator::find_unlabelled`].
    pub async fn create_empty_labels(&self, folder: &Path, progress: &ProgressSink) -> Result<LabelReport> {
        info!("Creating empty labels in {:?}", folder);

        let creator = self.clone();
        let folder_buf = folder.to_path_buf();
        let checking = progress.band(0.0, 50.0);
        let (unlabelled, total) =
            tokio::task::spawn_blocking(move || creator.find_unlabelled(&folder_buf, &checking)).await??;

        let mut report = LabelReport {
            total_images: total,
            already_labelled: total - unlabelled.len(),
            ..Default::default()
        };

        let creating = progress.band(50.0, 50.0);
        let missing = unlabelled.len();
        if missing == 0 {
            creating.report(Some(100.0), "all images already have labels");
        }

        for (i, image) in unlabelled.iter().enumerate() {
            let label = self.profile.sidecar_for(image);
            let created = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&label)
                .await;
            match created {
                Ok(_) => report.created += 1,
                Err(e) => {
                    warn!("Failed to create label {:?}: {}", label, e);
                    let message = format!("error creating {}: {e}", label.display());
                    progress.note(message.clone());
                    report.errors.push(message);
                }
            }
            let name = label.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            creating.step(i + 1, missing, format!("created: {name}"));
        }

        info!(
            "Labels: {} images, {} already labelled, {} created",
            report.total_images, report.already_labelled, report.created
        );
        Ok(report)
    }
}
