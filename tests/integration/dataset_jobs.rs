use color_eyre::Result;
use tempfile::TempDir;
use tokio::fs;

use datasetkit_app::Controller;
use datasetkit_config::Settings;
use datasetkit_models::{AppState, CollisionPolicy};

use crate::common::{create_test_file, run_to_end, sorted_names, test_settings};

/// Label-studio export next to its images, merged into a fresh dataset.
#[tokio::test]
async fn test_export_cleanup_then_merge() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let export = temp_dir.path().join("export");
    let extra = temp_dir.path().join("extra/batch_2");
    create_test_file(&export.join("frame 01.jpg"), b"F1", 128).await?;
    create_test_file(&export.join("frame_02.jpg"), b"F2", 128).await?;
    create_test_file(&export.join("frame_03.jpg"), b"F3", 128).await?;
    create_test_file(&export.join("cover.png"), b"CV", 128).await?;
    create_test_file(&export.join("3fa85f64-frame%2001.txt"), b"0 0.5 0.5 0.1 0.1", 0).await?;
    create_test_file(&export.join("0badc0de-frame_02.txt"), b"1 0.4 0.4 0.2 0.2", 0).await?;
    create_test_file(&extra.join("frame_04.jpeg"), b"F4", 128).await?;

    let controller = Controller::new(test_settings());

    let (_, stripped) = run_to_end(controller.start_strip_hashes(&export, None).await?).await;
    let stripped = stripped?;
    assert_eq!(stripped.renamed, 2);
    assert!(export.join("frame 01.txt").exists());
    assert!(export.join("frame_02.txt").exists());

    let (events, labels) = run_to_end(controller.start_create_labels(&export).await?).await;
    let labels = labels?;
    assert_eq!(labels.created, 1);
    assert_eq!(labels.already_labelled, 2);
    assert_eq!(fs::read(export.join("frame_03.txt")).await?.len(), 0);
    assert!(!export.join("cover.txt").exists());
    assert!(events.iter().filter_map(|e| e.percent).all(|p| (0.0..=100.0).contains(&p)));

    let output = temp_dir.path().join("dataset");
    let (_, merged) = run_to_end(
        controller
            .start_merge(vec![export.clone(), temp_dir.path().join("extra")], &output)
            .await?,
    )
    .await;
    let merged = merged?;

    assert_eq!(merged.images_copied, 5);
    assert_eq!(merged.labels_copied, 3);
    assert_eq!(
        sorted_names(&output.join("images")).await?,
        vec!["cover.png", "frame 01.jpg", "frame_02.jpg", "frame_03.jpg", "frame_04.jpeg"]
    );
    assert_eq!(
        sorted_names(&output.join("labels")).await?,
        vec!["frame 01.txt", "frame_02.txt", "frame_03.txt"]
    );
    assert_eq!(controller.state().await, AppState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_configured_policy_and_label_extension() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    let config_path = root.join("config.toml");
    fs::write(
        &config_path,
        "collision_policy = \"suffix\"\nlabel_extension = \".txt\"\nworker_threads = 1\n",
    )
    .await?;
    let settings = Settings::load_from(&config_path).await?;
    assert_eq!(settings.collision_policy, CollisionPolicy::Suffix);

    let data = root.join("data");
    create_test_file(&data.join("cat.jpg"), b"C", 8).await?;
    create_test_file(&data.join("cat.txt"), b"old", 3).await?;
    create_test_file(&data.join("a1b2c3d4-cat.txt"), b"new", 3).await?;

    let controller = Controller::new(settings);
    let report = controller.start_strip_hashes(&data, None).await?.finish().await?;

    assert_eq!(report.collisions, 1);
    assert_eq!(report.renamed, 1);
    assert_eq!(fs::read_to_string(data.join("cat_1.txt")).await?, "new");

    Ok(())
}

#[tokio::test]
async fn test_classify_renames_in_place() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("capture_0007.png");
    create_test_file(&file, b"PNG", 32).await?;

    let controller = Controller::new(Settings {
        tag_length: 6,
        ..test_settings()
    });
    let outcome = controller.start_classify(&file, "forklift").await?.finish().await?;

    let name = outcome.to.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    assert!(name.starts_with("forklift_"));
    assert_eq!(name.len(), "forklift_".len() + 6 + ".png".len());
    assert_eq!(outcome.to.parent(), Some(temp_dir.path()));
    assert!(!file.exists());

    Ok(())
}
