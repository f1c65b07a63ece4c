use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datasetkit_config::Settings;
use datasetkit_core::{
    Classifier, CoreError, DatasetMerger, DuplicateDetector, HashStripper, LabelCreator,
};
use datasetkit_models::{
    AppEvent, AppState, CollisionPolicy, Confirmation, DeleteReport, HashStripReport, JobKind, LabelReport,
    MergeReport, RenameOutcome, ScanResult,
};
use datasetkit_utils::ProgressSink;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::{ControllerError, Task};

/// Runs one operation at a time and tracks the tool's lifecycle.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Controller {
    settings: Arc<Settings>,
    state: Arc<RwLock<AppState>>,
    last_scan: Arc<RwLock<Option<Arc<ScanResult>>>>,
}

impl Controller {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            state: Arc::new(RwLock::new(AppState::Idle)),
            last_scan: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn state(&self) -> AppState {
        *self.state.read().await
    }

    /// The result of the most recent successful scan, unless it has since
    /// been acted on by a delete.
    pub async fn last_scan(&self) -> Option<Arc<ScanResult>> {
        self.last_scan.read().await.clone()
    }

    /// Scans `folder` for duplicate media files.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] if an operation is already running.
    pub async fn start_scan(&self, folder: &Path, images_only: bool) -> Result<Task<Arc<ScanResult>>, ControllerError> {
        let detector = DuplicateDetector::from_settings(&self.settings, images_only)?;
        self.claim(AppEvent::ScanStarted).await?;
        *self.last_scan.write().await = None;

        let folder = folder.to_path_buf();
        let last_scan = Arc::clone(&self.last_scan);
        Ok(self.launch(
            |result| match result {
                Ok(scan) => AppEvent::ScanFinished {
                    groups_found: scan.has_duplicates(),
                },
                Err(_) => AppEvent::ScanFailed,
            },
            move |progress| async move {
                let scan = Arc::new(detector.scan(&folder, &progress).await?);
                *last_scan.write().await = Some(Arc::clone(&scan));
                Ok(scan)
            },
        ))
    }

    /// Deletes the removable members of every group from the last scan.
    ///
    /// Returns `Ok(None)` without touching anything when the user declined.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] while another operation runs,
    /// [`ControllerError::NoScan`] without a prior scan and a transition
    /// error if that scan found no duplicates.
    pub async fn start_delete(&self, confirmation: Confirmation) -> Result<Option<Task<DeleteReport>>, ControllerError> {
        let current = self.state().await;
        if current.is_busy() {
            return Err(ControllerError::Busy(current));
        }
        let Some(scan) = self.last_scan().await else {
            return Err(ControllerError::NoScan);
        };
        if confirmation == Confirmation::Declined {
            info!("Deletion declined, nothing removed");
            return Ok(None);
        }

        let detector = DuplicateDetector::from_settings(&self.settings, false)?;
        self.claim(AppEvent::DeleteStarted).await?;

        let last_scan = Arc::clone(&self.last_scan);
        Ok(Some(self.launch(
            |_| AppEvent::DeleteFinished,
            move |progress| async move {
                let report = detector.delete_duplicates(&scan, &progress).await;
                *last_scan.write().await = None;
                Ok(report)
            },
        )))
    }

    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] if an operation is already running.
    pub async fn start_create_labels(&self, folder: &Path) -> Result<Task<LabelReport>, ControllerError> {
        let creator = LabelCreator::from_settings(&self.settings)?;
        let folder = folder.to_path_buf();
        self.start_job(JobKind::CreateLabels, move |progress| async move {
            creator.create_empty_labels(&folder, &progress).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] if an operation is already running.
    pub async fn start_merge(&self, sources: Vec<PathBuf>, destination: &Path) -> Result<Task<MergeReport>, ControllerError> {
        let merger = DatasetMerger::from_settings(&self.settings)?;
        let destination = destination.to_path_buf();
        self.start_job(JobKind::Merge, move |progress| async move {
            merger.merge(&sources, &destination, &progress).await
        })
        .await
    }

    /// Strips annotation hashes, using `policy` instead of the configured
    /// collision policy when given.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] if an operation is already running,
    /// or an error if the configured hash pattern is invalid.
    pub async fn start_strip_hashes(
        &self,
        folder: &Path,
        policy: Option<CollisionPolicy>,
    ) -> Result<Task<HashStripReport>, ControllerError> {
        let mut stripper = HashStripper::from_settings(&self.settings)?;
        if let Some(policy) = policy {
            stripper = stripper.with_policy(policy);
        }
        let folder = folder.to_path_buf();
        self.start_job(JobKind::StripHashes, move |progress| async move {
            stripper.strip(&folder, &progress).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] if an operation is already running.
    pub async fn start_classify(&self, file: &Path, classification: &str) -> Result<Task<RenameOutcome>, ControllerError> {
        let classifier = Classifier::from_settings(&self.settings);
        let file = file.to_path_buf();
        let classification = classification.to_string();
        self.start_job(JobKind::Classify, move |_| async move {
            classifier.rename(&file, &classification).await
        })
        .await
    }

    async fn start_job<T, F, Fut>(&self, kind: JobKind, op: F) -> Result<Task<T>, ControllerError>
    where
        T: Send + 'static,
        F: FnOnce(ProgressSink) -> Fut,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        self.claim(AppEvent::JobStarted(kind)).await?;
        info!("Started {}", kind);
        Ok(self.launch(|_| AppEvent::JobFinished, op))
    }

    /// Moves to the busy state for `event`, refusing if already busy.
    async fn claim(&self, event: AppEvent) -> Result<(), ControllerError> {
        let mut state = self.state.write().await;
        if state.is_busy() {
            return Err(ControllerError::Busy(*state));
        }
        *state = state.apply(event)?;
        Ok(())
    }

    /// Spawns `op` and settles the state with the event `finished` derives
    /// from its result. A panic inside `op` settles as a failure.
    fn launch<T, F, Fut>(&self, finished: fn(&Result<T, CoreError>) -> AppEvent, op: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce(ProgressSink) -> Fut,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let (progress, events) = ProgressSink::channel();
        let operation = op(progress);
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let result = match tokio::spawn(operation).await {
                Ok(result) => result,
                Err(e) => Err(CoreError::from(e)),
            };
            if let Err(e) = &result {
                error!("Operation failed: {}", e);
            }
            settle(&state, finished(&result)).await;
            result
        });

        Task::new(events, handle)
    }
}

async fn settle(state: &RwLock<AppState>, event: AppEvent) {
    let mut state = state.write().await;
    match state.apply(event) {
        Ok(next) => *state = next,
        Err(e) => {
            error!("Resetting to idle: {}", e);
            *state = AppState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn controller() -> Controller {
        Controller::new(Settings {
            worker_threads: 2,
            ..Default::default()
        })
    }

    async fn drain<T>(mut task: Task<T>) -> (Vec<datasetkit_utils::ProgressEvent>, Result<T, ControllerError>) {
        let mut events = Vec::new();
        while let Some(event) = task.next_event().await {
            events.push(event);
        }
        (events, task.finish().await)
    }

    fn dataset_with_duplicates() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("cat1.jpg"), b"cat").unwrap();
        fs::write(root.join("cat2.jpg"), b"cat").unwrap();
        fs::write(root.join("cat2.txt"), b"0 0.5 0.5 0.2 0.2").unwrap();
        fs::write(root.join("dog.jpg"), b"dog").unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_scan_then_delete() {
        let dir = dataset_with_duplicates();
        let controller = controller();

        let task = controller.start_scan(dir.path(), false).await.unwrap();
        let (events, scan) = drain(task).await;
        let scan = scan.unwrap();

        assert!(!events.is_empty());
        assert_eq!(scan.total_groups(), 1);
        assert_eq!(controller.state().await, AppState::GroupsFound);
        assert!(controller.last_scan().await.is_some());

        let task = controller.start_delete(Confirmation::Granted).await.unwrap().unwrap();
        let report = task.finish().await.unwrap();

        assert_eq!(report.media_deleted, 1);
        assert_eq!(report.sidecars_deleted, 1);
        assert_eq!(controller.state().await, AppState::Idle);
        assert!(controller.last_scan().await.is_none());
        assert!(dir.path().join("cat1.jpg").exists());
        assert!(!dir.path().join("cat2.jpg").exists());
    }

    #[tokio::test]
    async fn test_declined_delete_changes_nothing() {
        let dir = dataset_with_duplicates();
        let controller = controller();
        controller.start_scan(dir.path(), false).await.unwrap().finish().await.unwrap();

        let task = controller.start_delete(Confirmation::Declined).await.unwrap();

        assert!(task.is_none());
        assert_eq!(controller.state().await, AppState::GroupsFound);
        assert!(dir.path().join("cat2.jpg").exists());
    }

    #[tokio::test]
    async fn test_delete_without_scan() {
        let err = controller().start_delete(Confirmation::Granted).await.unwrap_err();
        assert!(matches!(err, ControllerError::NoScan));
    }

    #[tokio::test]
    async fn test_delete_after_clean_scan_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"a").unwrap();
        let controller = controller();
        controller.start_scan(temp_dir.path(), false).await.unwrap().finish().await.unwrap();

        assert_eq!(controller.state().await, AppState::Idle);
        let err = controller.start_delete(Confirmation::Granted).await.unwrap_err();
        assert!(matches!(err, ControllerError::Transition(_)));
    }

    async fn blow_up() -> Result<(), CoreError> {
        panic!("operation blew up")
    }

    #[tokio::test]
    async fn test_panicking_scan_returns_to_idle() {
        let controller = controller();
        controller.claim(AppEvent::ScanStarted).await.unwrap();
        assert_eq!(controller.state().await, AppState::Scanning);

        let task = controller.launch(
            |result| match result {
                Ok(()) => AppEvent::ScanFinished { groups_found: false },
                Err(_) => AppEvent::ScanFailed,
            },
            |_| blow_up(),
        );
        let (events, result) = drain(task).await;

        assert!(events.is_empty());
        assert!(matches!(result, Err(ControllerError::Core(CoreError::Task(_)))));
        assert_eq!(controller.state().await, AppState::Idle);
    }

    #[tokio::test]
    async fn test_panicking_job_frees_the_controller() {
        let dir = dataset_with_duplicates();
        let controller = controller();

        let task = controller.start_job(JobKind::Merge, |_| blow_up()).await.unwrap();
        assert!(task.finish().await.is_err());
        assert_eq!(controller.state().await, AppState::Idle);

        let labels = controller.start_create_labels(dir.path()).await.unwrap().finish().await.unwrap();
        assert_eq!(labels.created, 2);
    }

    #[tokio::test]
    async fn test_second_operation_is_busy() {
        let dir = dataset_with_duplicates();
        let controller = controller();

        let task = controller.start_scan(dir.path(), false).await.unwrap();
        let err = controller.start_create_labels(dir.path()).await.unwrap_err();

        assert!(matches!(err, ControllerError::Busy(AppState::Scanning)));
        task.finish().await.unwrap();
        assert!(!controller.state().await.is_busy());
    }

    #[tokio::test]
    async fn test_failed_scan_returns_to_idle() {
        let temp_dir = TempDir::new().unwrap();
        let controller = controller();

        let err = controller
            .start_scan(temp_dir.path(), false)
            .await
            .unwrap()
            .finish()
            .await
            .unwrap_err();

        assert!(err.is_empty_input());
        assert_eq!(controller.state().await, AppState::Idle);
        assert!(controller.last_scan().await.is_none());
    }

    #[tokio::test]
    async fn test_jobs_return_to_idle() {
        let dir = dataset_with_duplicates();
        let controller = controller();

        let labels = controller.start_create_labels(dir.path()).await.unwrap().finish().await.unwrap();
        assert_eq!(labels.created, 2);
        assert_eq!(controller.state().await, AppState::Idle);

        let outcome = controller
            .start_classify(&dir.path().join("dog.jpg"), "dog")
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();
        assert!(outcome.to.file_name().unwrap().to_string_lossy().starts_with("dog_"));
        assert_eq!(controller.state().await, AppState::Idle);
    }

    #[tokio::test]
    async fn test_strip_hashes_policy_override() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("cat.jpg"), b"img").unwrap();
        fs::write(root.join("cat.txt"), b"existing").unwrap();
        fs::write(root.join("1a2b3c4d-cat.txt"), b"exported").unwrap();
        let controller = controller();

        let report = controller
            .start_strip_hashes(root, Some(CollisionPolicy::Suffix))
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        assert_eq!(report.renamed, 1);
        assert!(root.join("cat_1.txt").exists());
    }

    #[tokio::test]
    async fn test_merge_job() {
        let dir = dataset_with_duplicates();
        let out = TempDir::new().unwrap();
        let controller = controller();

        let report = controller
            .start_merge(vec![dir.path().to_path_buf()], out.path())
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        assert_eq!(report.images_copied, 3);
        assert_eq!(report.labels_copied, 1);
        assert_eq!(controller.state().await, AppState::Idle);
    }
}
