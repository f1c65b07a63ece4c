use color_eyre::Result;
use std::path::Path;
use tokio::fs;

use datasetkit_app::Task;
use datasetkit_config::Settings;
use datasetkit_utils::ProgressEvent;

/// Create a test file with specific content padded to `size` bytes
pub async fn create_test_file(path: &Path, content: &[u8], size: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut data = content.to_vec();
    data.resize(size.max(content.len()), 0);
    fs::write(path, &data).await?;
    Ok(())
}

pub async fn sorted_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

pub fn test_settings() -> Settings {
    Settings {
        worker_threads: 2,
        ..Default::default()
    }
}

/// Collects every progress event, then the result.
pub async fn run_to_end<T>(mut task: Task<T>) -> (Vec<ProgressEvent>, Result<T>) {
    let mut events = Vec::new();
    while let Some(event) = task.next_event().await {
        events.push(event);
    }
    (events, task.finish().await.map_err(Into::into))
}
