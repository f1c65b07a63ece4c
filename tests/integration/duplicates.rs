use color_eyre::Result;
use tempfile::TempDir;

use datasetkit_app::{Controller, ControllerError};
use datasetkit_models::{AppState, Confirmation, FileType};

use crate::common::{create_test_file, run_to_end, sorted_names, test_settings};

#[tokio::test]
async fn test_scan_and_delete_keeps_first_of_each_group() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("beach.jpg"), b"JPG_DATA", 64 * 1024).await?;
    create_test_file(&root.join("beach_backup.jpg"), b"JPG_DATA", 64 * 1024).await?;
    create_test_file(&root.join("beach_copy.jpg"), b"JPG_DATA", 64 * 1024).await?;
    create_test_file(&root.join("beach_copy.txt"), b"0 0.5 0.5 0.3 0.3", 0).await?;
    create_test_file(&root.join("holiday.mp4"), b"MP4_DATA", 256 * 1024).await?;
    create_test_file(&root.join("holiday_again.mov"), b"MP4_DATA", 256 * 1024).await?;
    create_test_file(&root.join("sunset.png"), b"PNG_DATA", 32 * 1024).await?;
    create_test_file(&root.join("nested/beach.jpg"), b"JPG_DATA", 64 * 1024).await?;

    let controller = Controller::new(test_settings());
    let (events, scan) = run_to_end(controller.start_scan(root, false).await?).await;
    let scan = scan?;

    assert!(events.iter().any(|e| e.message.starts_with("hashing: ")));
    assert_eq!(scan.total_files(), 6, "nested folders are not scanned");
    assert_eq!(scan.total_groups(), 2);
    assert_eq!(scan.total_duplicates(), 3);
    assert_eq!(scan.total_wasted_space(), 2 * 64 * 1024 + 256 * 1024);
    assert_eq!(scan.groups[0].keeper().name.as_ref(), "beach.jpg");
    assert_eq!(scan.groups[1].keeper().file_type, FileType::Video);
    assert_eq!(controller.state().await, AppState::GroupsFound);

    let task = controller
        .start_delete(Confirmation::Granted)
        .await?
        .expect("confirmed delete starts a task");
    let (_, report) = run_to_end(task).await;
    let report = report?;

    assert_eq!(report.media_deleted, 3);
    assert_eq!(report.sidecars_deleted, 1);
    assert!(!report.has_errors());
    assert_eq!(
        sorted_names(root).await?,
        vec!["beach.jpg", "holiday.mp4", "nested", "sunset.png"]
    );
    assert!(root.join("nested/beach.jpg").exists());

    // rescanning a cleaned folder finds nothing
    let (_, rescan) = run_to_end(controller.start_scan(root, false).await?).await;
    assert!(!rescan?.has_duplicates());
    assert_eq!(controller.state().await, AppState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_scan_result_serializes_to_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("a.jpg"), b"same", 16).await?;
    create_test_file(&root.join("b.jpg"), b"same", 16).await?;

    let controller = Controller::new(test_settings());
    let scan = controller.start_scan(root, true).await?.finish().await?;
    let json: serde_json::Value = serde_json::to_value(&*scan)?;

    assert_eq!(json["groups"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["groups"][0]["files"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["groups"][0]["wasted_space"], 16);

    Ok(())
}

#[tokio::test]
async fn test_deletion_needs_confirmation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("a.jpg"), b"same", 16).await?;
    create_test_file(&root.join("b.jpg"), b"same", 16).await?;

    let controller = Controller::new(test_settings());
    controller.start_scan(root, false).await?.finish().await?;

    assert!(controller.start_delete(Confirmation::from(false)).await?.is_none());
    assert_eq!(sorted_names(root).await?, vec!["a.jpg", "b.jpg"]);

    // the scan stays available for a later confirmation
    let report = controller
        .start_delete(Confirmation::from(true))
        .await?
        .expect("confirmed delete starts a task")
        .finish()
        .await?;
    assert_eq!(report.media_deleted, 1);

    Ok(())
}

#[tokio::test]
async fn test_empty_and_missing_folders() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_test_file(&temp_dir.path().join("notes.txt"), b"hello", 5).await?;
    let controller = Controller::new(test_settings());

    let err = controller.start_scan(temp_dir.path(), false).await?.finish().await.unwrap_err();
    assert!(err.is_empty_input());

    let err = controller
        .start_scan(&temp_dir.path().join("missing"), false)
        .await?
        .finish()
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Core(_)));
    assert!(!err.is_empty_input());
    assert_eq!(controller.state().await, AppState::Idle);

    Ok(())
}
