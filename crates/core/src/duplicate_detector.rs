use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ahash::{AHashMap, AHashSet};
use chrono::Local;
use datasetkit_config::Settings;
use datasetkit_models::{DeleteReport, DuplicateGroup, MediaFile, ScanResult};
use datasetkit_utils::{ProgressSink, format_bytes};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::{CoreError, DigestComputer, FileEnumerator, Listing, Result, ScanProfile};

/// Buckets files by digest, keeping first-seen order for both the groups
/// and their members. Files without a digest are skipped; singleton
/// buckets are dropped.
pub fn group_by_digest<I>(entries: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = (Arc<MediaFile>, Option<Arc<str>>)>,
{
    let mut index: AHashMap<Arc<str>, usize> = AHashMap::new();
    let mut buckets: Vec<(Arc<str>, SmallVec<[Arc<MediaFile>; 4]>)> = Vec::new();

    for (file, digest) in entries {
        let Some(digest) = digest else {
            continue;
        };
        match index.get(&digest) {
            Some(&slot) => buckets[slot].1.push(file),
            None => {
                index.insert(Arc::clone(&digest), buckets.len());
                let mut members = SmallVec::new();
                members.push(file);
                buckets.push((digest, members));
            }
        }
    }

    buckets
        .into_iter()
        .filter_map(|(digest, files)| DuplicateGroup::new(digest, files))
        .collect()
}

#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    profile: ScanProfile,
    digests: DigestComputer,
}

impl DuplicateDetector {
    #[must_use]
    pub fn new(profile: ScanProfile, digests: DigestComputer) -> Self {
        Self { profile, digests }
    }

    /// Detector over images and, unless `images_only`, videos.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured extensions are invalid.
    pub fn from_settings(settings: &Settings, images_only: bool) -> Result<Self> {
        Ok(Self::new(
            ScanProfile::duplicates(settings, images_only)?,
            DigestComputer::from_settings(settings),
        ))
    }

    /// Scans one folder for byte-identical media files.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for a missing folder,
    /// [`CoreError::NoMatchingFiles`] if it has no media files, or an error
    /// if the hashing task itself fails.
    pub async fn scan(&self, folder: &Path, progress: &ProgressSink) -> Result<ScanResult> {
        info!("Starting duplicate scan of {:?}", folder);
        let started = Instant::now();

        let detector = self.clone();
        let folder_buf = folder.to_path_buf();
        let sink = progress.clone();
        let (files, digests) = tokio::task::spawn_blocking(move || -> Result<_> {
            let paths = match FileEnumerator::list(&folder_buf, &detector.profile)? {
                Listing::Empty => {
                    let kinds = detector.profile.selected_extensions().join("/");
                    return Err(CoreError::no_files(&kinds, &folder_buf));
                }
                Listing::Files(paths) => paths,
            };
            sink.report(Some(0.0), format!("hashing {} files...", paths.len()));
            let digests = detector.digests.digest_all(&paths, &sink)?;
            let files = FileEnumerator::describe(paths, &detector.profile);
            Ok((files, digests))
        })
        .await??;

        let mut unreadable = Vec::new();
        let mut scanned = Vec::with_capacity(files.len());
        for (file, digest) in files.into_iter().zip(digests) {
            if digest.is_none() {
                progress.note(format!("could not read: {}", file.name));
                unreadable.push(file.path.clone());
            }
            let digest: Option<Arc<str>> = digest.map(Into::into);
            scanned.push((Arc::new(file.with_hash(digest.clone())), digest));
        }

        let files: Vec<Arc<MediaFile>> = scanned.iter().map(|(f, _)| Arc::clone(f)).collect();
        let groups = group_by_digest(scanned);

        let result = ScanResult {
            folder: folder.to_path_buf(),
            files,
            groups,
            unreadable,
            duration: started.elapsed(),
            timestamp: Local::now(),
        };

        info!(
            "Found {} duplicate groups with {} total duplicates wasting {} in {:?}",
            result.total_groups(),
            result.total_duplicates(),
            format_bytes(result.total_wasted_space()),
            result.duration
        );
        progress.report(
            Some(100.0),
            format!("{} duplicate group(s) found", result.total_groups()),
        );

        Ok(result)
    }

    /// Deletes every removable member of every group, sidecar first.
    ///
    /// Failures are recorded per file and never stop the batch. A sidecar
    /// that also belongs to a surviving media file is left in place.
    pub async fn delete_duplicates(&self, scan: &ScanResult, progress: &ProgressSink) -> DeleteReport {
        let mut report = DeleteReport::default();

        let removable: AHashSet<&Path> = scan
            .groups
            .iter()
            .flat_map(|g| g.removable().iter().map(|f| f.path.as_path()))
            .collect();
        let protected_sidecars: AHashSet<PathBuf> = scan
            .files
            .iter()
            .filter(|f| !removable.contains(f.path.as_path()))
            .map(|f| f.sidecar_path(self.profile.label_extension()))
            .collect();

        let total = removable.len();
        let mut processed = 0;
        info!("Deleting {} duplicates from {} groups", total, scan.total_groups());

        for group in &scan.groups {
            debug!("Keeping {:?} (digest {})", group.keeper().path, &group.digest);

            for file in group.removable() {
                let sidecar = file.sidecar_path(self.profile.label_extension());
                if protected_sidecars.contains(&sidecar) {
                    debug!("Sidecar {:?} is shared with a kept file, leaving it", sidecar);
                } else {
                    match tokio::fs::remove_file(&sidecar).await {
                        Ok(()) => {
                            report.sidecars_deleted += 1;
                            info!("Deleted sidecar: {:?}", sidecar);
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => {
                            warn!("Failed to delete sidecar {:?}: {}", sidecar, e);
                            let message = format!("error deleting {}: {e}", sidecar.display());
                            progress.note(message.clone());
                            report.errors.push(message);
                        }
                    }
                }

                match tokio::fs::remove_file(&file.path).await {
                    Ok(()) => {
                        report.media_deleted += 1;
                        info!("Deleted file: {:?}", file.path);
                    }
                    Err(e) => {
                        warn!("Failed to delete file {:?}: {}", file.path, e);
                        let message = format!("error deleting {}: {e}", file.path.display());
                        progress.note(message.clone());
                        report.errors.push(message);
                    }
                }

                processed += 1;
                progress.step(processed, total, format!("deleted: {}", file.name));
            }
        }

        info!(
            "Deletion complete: {} files, {} sidecars, {} errors",
            report.media_deleted,
            report.sidecars_deleted,
            report.errors.len()
        );
        report
    }
}
