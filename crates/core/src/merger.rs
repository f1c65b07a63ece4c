use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use datasetkit_config::Settings;
use datasetkit_models::{FileType, MergeReport};
use datasetkit_utils::ProgressSink;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{CoreError, FileEnumerator, Listing, Result, ScanProfile};

/// Consolidates several dataset folders into `images/` and `labels/`.
#[derive(Debug, Clone)]
pub struct DatasetMerger {
    profile: ScanProfile,
    images_dir_name: String,
    labels_dir_name: String,
}

enum CopyOutcome {
    Copied,
    Exists,
}

impl DatasetMerger {
    /// # Errors
    ///
    /// Returns an error if the configured extensions are invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            profile: ScanProfile::merge_sources(settings)?,
            images_dir_name: settings.images_dir_name.clone(),
            labels_dir_name: settings.labels_dir_name.clone(),
        })
    }

    /// Copies every image and label found below `sources` into
    /// `destination`. Sources are never modified and existing destination
    /// files are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] without sources,
    /// [`CoreError::NoMatchingFiles`] when no source holds a matching file,
    /// or an IO error if the output folders cannot be created.
    pub async fn merge(&self, sources: &[PathBuf], destination: &Path, progress: &ProgressSink) -> Result<MergeReport> {
        if sources.is_empty() {
            return Err(CoreError::InvalidInput("no source folders given".to_string()));
        }
        info!("Merging {} sources into {:?}", sources.len(), destination);

        let mut report = MergeReport {
            sources: sources.len(),
            images_dir: destination.join(&self.images_dir_name),
            labels_dir: destination.join(&self.labels_dir_name),
            ..Default::default()
        };

        let merger = self.clone();
        let sources = sources.to_vec();
        let destination_buf = destination.to_path_buf();
        let (files, missing) =
            tokio::task::spawn_blocking(move || merger.collect_sources(&sources, &destination_buf)).await??;
        for source in &missing {
            progress.note(format!("source folder not found: {}", source.display()));
        }
        report.missing_sources = missing;

        if files.is_empty() {
            return Err(CoreError::no_files("image/label", destination));
        }

        fs::create_dir_all(&report.images_dir).await?;
        fs::create_dir_all(&report.labels_dir).await?;

        let total = files.len();
        for (i, (file, file_type)) in files.iter().enumerate() {
            let is_image = *file_type == FileType::Image;
            let Some(name) = file.file_name() else {
                continue;
            };
            let target_dir = if is_image { &report.images_dir } else { &report.labels_dir };
            let target = target_dir.join(name);
            let name = name.to_string_lossy();

            match copy_no_clobber(file, &target).await {
                Ok(CopyOutcome::Copied) => {
                    if is_image {
                        report.images_copied += 1;
                    } else {
                        report.labels_copied += 1;
                    }
                    progress.step(i + 1, total, format!("copied: {name}"));
                }
                Ok(CopyOutcome::Exists) => {
                    if is_image {
                        report.images_skipped += 1;
                    } else {
                        report.labels_skipped += 1;
                    }
                    report.skipped.push(file.clone());
                    progress.step(i + 1, total, format!("skipped (already exists): {name}"));
                }
                Err(e) => {
                    warn!("Failed to copy {:?} to {:?}: {}", file, target, e);
                    let message = format!("error copying {name}: {e}");
                    progress.note(message.clone());
                    report.errors.push(message);
                }
            }
        }

        info!(
            "Merge complete: {} images and {} labels copied, {} skipped, {} errors",
            report.images_copied,
            report.labels_copied,
            report.total_skipped(),
            report.errors.len()
        );
        Ok(report)
    }

    /// Lists every source, returning the classified files and the sources
    /// that do not exist. Files already inside `destination` are left out.
    fn collect_sources(&self, sources: &[PathBuf], destination: &Path) -> Result<(Vec<(PathBuf, FileType)>, Vec<PathBuf>)> {
        let destination = destination.canonicalize().ok();
        let mut files = Vec::new();
        let mut missing = Vec::new();

        for source in sources {
            let root = match source.canonicalize() {
                Ok(root) if root.is_dir() => root,
                _ => {
                    warn!("Merge source does not exist: {:?}", source);
                    missing.push(source.clone());
                    continue;
                }
            };

            match FileEnumerator::list(&root, &self.profile) {
                Ok(Listing::Files(paths)) => {
                    let before = files.len();
                    files.extend(
                        paths
                            .into_iter()
                            .filter(|p| destination.as_ref().is_none_or(|d| !p.starts_with(d)))
                            .map(|p| {
                                let file_type = self.profile.classify(&p);
                                (p, file_type)
                            }),
                    );
                    debug!("{} files from {:?}", files.len() - before, source);
                }
                Ok(Listing::Empty) => debug!("No files in {:?}", source),
                Err(CoreError::NotFound(path)) => missing.push(path),
                Err(e) => return Err(e),
            }
        }

        Ok((files, missing))
    }
}

async fn copy_no_clobber(source: &Path, target: &Path) -> std::io::Result<CopyOutcome> {
    let mut output = match fs::OpenOptions::new().write(true).create_new(true).open(target).await {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(CopyOutcome::Exists),
        Err(e) => return Err(e),
    };

    let copied = async {
        let mut input = fs::File::open(source).await?;
        tokio::io::copy(&mut input, &mut output).await?;
        output.sync_all().await?;
        let modified = fs::metadata(source).await?.modified()?;
        output.into_std().await.set_modified(modified)
    }
    .await;

    if let Err(e) = copied {
        // never leave a partial copy behind
        if let Err(cleanup) = fs::remove_file(target).await {
            warn!("Failed to remove partial copy {:?}: {}", target, cleanup);
        }
        return Err(e);
    }
    Ok(CopyOutcome::Copied)
}
