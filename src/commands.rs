use std::path::Path;

use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use datasetkit_app::{Controller, ControllerError};
use datasetkit_config::Settings;
use datasetkit_models::Confirmation;
use dialoguer::Confirm;
use tracing::info;

use crate::cli::{Cli, Commands, ConfigCmd, DuplicatesCmd, LabelsCmd};
use crate::render;

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::config_path()?,
    };

    if let Err(e) = dispatch(cli.command, &config_path).await {
        let Some(message) = outcome_message(&e) else {
            return Err(e);
        };
        println!("{message}");
    }
    Ok(())
}

/// What to tell the user for an error that means the input had nothing to
/// work on. Any other error stays an error.
fn outcome_message(report: &Report) -> Option<String> {
    report
        .downcast_ref::<ControllerError>()
        .filter(|e| e.is_empty_input())
        .map(|e| format!("Nothing to do: {e}"))
}

async fn dispatch(command: Commands, config_path: &Path) -> Result<()> {
    match command {
        Commands::Config { command } => config(command, config_path).await,
        Commands::Duplicates { command } => duplicates(&controller(config_path).await?, command).await,
        Commands::Labels {
            command: LabelsCmd::Create { path },
        } => {
            let controller = controller(config_path).await?;
            let task = render::follow(controller.start_create_labels(&path).await?, false).await?;
            render::print_labels(&task.finish().await?);
            Ok(())
        }
        Commands::Merge { sources, output } => {
            let controller = controller(config_path).await?;
            let task = render::follow(controller.start_merge(sources, &output).await?, false).await?;
            render::print_merge(&task.finish().await?);
            Ok(())
        }
        Commands::StripHashes { path, on_collision } => {
            let controller = controller(config_path).await?;
            let task = render::follow(controller.start_strip_hashes(&path, on_collision).await?, false).await?;
            render::print_strip(&task.finish().await?);
            Ok(())
        }
        Commands::Classify { file, class } => {
            let controller = controller(config_path).await?;
            let outcome = controller.start_classify(&file, &class).await?.finish().await?;
            render::print_rename(&outcome);
            Ok(())
        }
    }
}

async fn controller(config_path: &Path) -> Result<Controller> {
    let settings = Settings::load_from(config_path).await?;
    Ok(Controller::new(settings))
}

async fn duplicates(controller: &Controller, command: DuplicatesCmd) -> Result<()> {
    match command {
        DuplicatesCmd::Scan { path, images_only, json } => {
            let task = render::follow(controller.start_scan(&path, images_only).await?, json).await?;
            let scan = task.finish().await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&*scan).wrap_err("Failed to serialize scan result")?
                );
            } else {
                render::print_scan(&scan);
            }
        }
        DuplicatesCmd::Delete { path, yes, images_only } => {
            let task = render::follow(controller.start_scan(&path, images_only).await?, false).await?;
            let scan = task.finish().await?;
            render::print_scan(&scan);
            if !scan.has_duplicates() {
                return Ok(());
            }

            let confirmation = if yes {
                Confirmation::Granted
            } else {
                Confirm::new()
                    .with_prompt(format!(
                        "Permanently delete {} duplicate file(s) and their labels?",
                        scan.total_duplicates()
                    ))
                    .default(false)
                    .interact()?
                    .into()
            };

            match controller.start_delete(confirmation).await? {
                Some(task) => {
                    let task = render::follow(task, false).await?;
                    render::print_delete(&task.finish().await?);
                }
                None => println!("Cancelled, nothing deleted."),
            }
        }
    }
    Ok(())
}

async fn config(command: ConfigCmd, path: &Path) -> Result<()> {
    match command {
        ConfigCmd::Show => {
            let settings = Settings::load_from(path).await?;
            println!("# {}", path.display());
            println!("{}", toml::to_string_pretty(&settings).wrap_err("Failed to serialize settings")?);
        }
        ConfigCmd::Init { force } => {
            init_config(path, force)?;
            println!("▶ Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(eyre!("{} already exists; pass --force to overwrite", path.display()));
    }
    Settings::default()
        .save_to(path)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use clap::Parser;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    fn scan_args(folder: &Path, config: &Path) -> Cli {
        let args: Vec<OsString> = vec![
            "datasetkit".into(),
            "duplicates".into(),
            "scan".into(),
            "--json".into(),
            "--path".into(),
            folder.as_os_str().to_owned(),
            "--config".into(),
            config.as_os_str().to_owned(),
        ];
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn test_empty_folder_is_nothing_to_do() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("empty");
        fs::create_dir(&folder).unwrap();
        let config = temp_dir.path().join("config.toml");

        let err = dispatch(scan_args(&folder, &config).command, &config).await.unwrap_err();
        let message = outcome_message(&err).unwrap();

        assert!(message.starts_with("Nothing to do: "));
        assert!(message.contains("empty"));
        assert!(run(scan_args(&folder, &config)).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_folder_stays_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("absent");
        let config = temp_dir.path().join("config.toml");

        let err = dispatch(scan_args(&folder, &config).command, &config).await.unwrap_err();

        assert!(outcome_message(&err).is_none());
        assert!(run(scan_args(&folder, &config)).await.is_err());
    }

    #[test]
    fn test_unrelated_errors_have_no_message() {
        assert!(outcome_message(&eyre!("disk on fire")).is_none());
        assert!(outcome_message(&Report::new(ControllerError::NoScan)).is_none());
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "tag_length = 9\n").unwrap();

        let err = init_config(&path, false).unwrap_err();

        assert!(err.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "tag_length = 9\n");
    }

    #[tokio::test]
    async fn test_init_with_force_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        init_config(&path, false).unwrap();
        fs::write(&path, "tag_length = 9\n").unwrap();

        init_config(&path, true).unwrap();

        assert_eq!(Settings::load_from(&path).await.unwrap(), Settings::default());
    }
}
