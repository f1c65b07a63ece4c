use std::path::Path;

use ahash::AHashSet;
use datasetkit_config::Settings;
use datasetkit_models::{CollisionPolicy, HashStripReport};
use datasetkit_utils::ProgressSink;
use datasetkit_utils::naming::{first_free_numbered, percent_decode};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{CoreError, FileEnumerator, Listing, Result, ScanProfile};

/// Renames annotation-tool exports like `1a2b3c4d-cat%20photo.txt` back to
/// the stem of the image they describe.
#[derive(Debug, Clone)]
pub struct HashStripper {
    pattern: Regex,
    labels: ScanProfile,
    images: ScanProfile,
    policy: CollisionPolicy,
}

impl HashStripper {
    /// # Errors
    ///
    /// Returns an error if the configured hash pattern or extensions are invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(&settings.annotation_hash_pattern)?,
            labels: ScanProfile::labels(settings)?,
            images: ScanProfile::images(settings)?,
            policy: settings.collision_policy,
        })
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The stem with its hash prefix removed and percent-escapes decoded, or
    /// `None` if the stem carries no prefix.
    #[must_use]
    pub fn clean_stem(&self, stem: &str) -> Option<String> {
        let found = self.pattern.find(stem)?;
        if found.start() != 0 {
            return None;
        }
        Some(percent_decode(&stem[found.end()..]))
    }

    /// Renames every prefixed label in `folder` whose cleaned stem matches an
    /// image in the same folder.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for a missing folder and
    /// [`CoreError::NoMatchingFiles`] if it holds no labels or no images.
    pub async fn strip(&self, folder: &Path, progress: &ProgressSink) -> Result<HashStripReport> {
        info!("Stripping annotation hashes in {:?}", folder);

        let labels = match FileEnumerator::list(folder, &self.labels)? {
            Listing::Empty => {
                return Err(CoreError::no_files(&format!(".{}", self.labels.label_extension()), folder));
            }
            Listing::Files(labels) => labels,
        };
        let image_stems: AHashSet<String> = match FileEnumerator::list(folder, &self.images)? {
            Listing::Empty => return Err(CoreError::no_files("image", folder)),
            Listing::Files(images) => images
                .iter()
                .filter_map(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .collect(),
        };

        let extension = self.labels.label_extension();
        let mut report = HashStripReport {
            total: labels.len(),
            ..Default::default()
        };

        for (i, label) in labels.iter().enumerate() {
            let name = label.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let stem = label.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();

            let Some(clean) = self.clean_stem(&stem) else {
                report.already_correct += 1;
                progress.step(i + 1, labels.len(), format!("ignored (no hash): {name}"));
                continue;
            };

            if clean.is_empty() || clean.contains(['/', '\\']) || !image_stems.contains(&clean) {
                report.not_found += 1;
                progress.step(i + 1, labels.len(), format!("image not found for: {clean}"));
                continue;
            }

            let mut target = folder.join(format!("{clean}.{extension}"));
            if target.exists() {
                match self.policy {
                    CollisionPolicy::Skip => {
                        report.collisions += 1;
                        let target_name = target.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                        debug!("{:?} already exists, leaving {:?}", target, label);
                        progress.note(format!("warning: {target_name} already exists, skipping {name}"));
                        continue;
                    }
                    CollisionPolicy::Suffix => {
                        report.collisions += 1;
                        target = first_free_numbered(folder, &clean, extension);
                    }
                }
            }

            let target_name = target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            match tokio::fs::rename(label, &target).await {
                Ok(()) => {
                    report.renamed += 1;
                    info!("Renamed {:?} -> {:?}", label, target);
                    progress.step(i + 1, labels.len(), format!("renamed: {name} -> {target_name}"));
                }
                Err(e) => {
                    warn!("Failed to rename {:?}: {}", label, e);
                    let message = format!("error renaming {name}: {e}");
                    progress.note(message.clone());
                    report.errors.push(message);
                }
            }
        }

        info!(
            "Hash strip complete: {} renamed, {} already correct, {} without image, {} collisions",
            report.renamed, report.already_correct, report.not_found, report.collisions
        );
        Ok(report)
    }
}
