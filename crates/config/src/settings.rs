use color_eyre::eyre::{Result, WrapErr, eyre};
use datasetkit_models::CollisionPolicy;
use datasetkit_utils::media_types::{
    DEFAULT_IMAGE_EXTENSIONS, DEFAULT_LABEL_EXTENSION, DEFAULT_LABEL_IMAGE_EXTENSIONS, DEFAULT_VIDEO_EXTENSIONS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "datasetkit";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    #[serde(default = "default_label_extension")]
    pub label_extension: String,
    #[serde(default = "default_label_image_extensions")]
    pub label_image_extensions: Vec<String>,
    #[serde(default = "default_hash_chunk_size")]
    pub hash_chunk_size: usize,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    #[serde(default)]
    pub skip_hidden_files: bool,
    #[serde(default = "default_annotation_hash_pattern")]
    pub annotation_hash_pattern: String,
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    #[serde(default = "default_tag_length")]
    pub tag_length: usize,
    #[serde(default = "default_images_dir_name")]
    pub images_dir_name: String,
    #[serde(default = "default_labels_dir_name")]
    pub labels_dir_name: String,
}

// Default value functions for serde
fn default_image_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS.iter().map(ToString::to_string).collect()
}
fn default_video_extensions() -> Vec<String> {
    DEFAULT_VIDEO_EXTENSIONS.iter().map(ToString::to_string).collect()
}
fn default_label_extension() -> String {
    DEFAULT_LABEL_EXTENSION.to_string()
}
fn default_label_image_extensions() -> Vec<String> {
    DEFAULT_LABEL_IMAGE_EXTENSIONS.iter().map(ToString::to_string).collect()
}
fn default_hash_chunk_size() -> usize {
    4 * 1024
}
fn default_worker_threads() -> usize {
    num_cpus::get()
}
fn default_annotation_hash_pattern() -> String {
    "^[a-f0-9]{8}-".to_string()
}
fn default_tag_length() -> usize {
    4
}
fn default_images_dir_name() -> String {
    "images".to_string()
}
fn default_labels_dir_name() -> String {
    "labels".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            video_extensions: default_video_extensions(),
            label_extension: default_label_extension(),
            label_image_extensions: default_label_image_extensions(),
            hash_chunk_size: default_hash_chunk_size(),
            worker_threads: default_worker_threads(),
            skip_hidden_files: false,
            annotation_hash_pattern: default_annotation_hash_pattern(),
            collision_policy: CollisionPolicy::default(),
            tag_length: default_tag_length(),
            images_dir_name: default_images_dir_name(),
            labels_dir_name: default_labels_dir_name(),
        }
    }
}

impl Settings {
    /// Loads settings from the user config directory, or defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?).await
    }

    /// Loads settings from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&content).wrap_err_with(|| format!("Invalid settings file {}", path.display()))?;
        settings.validate()?;

        info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// Writes the settings as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Default location of the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| eyre!("Could not find config directory"))?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Rejects values the tools cannot work with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.hash_chunk_size == 0 {
            return Err(eyre!("hash_chunk_size must be greater than zero"));
        }
        if self.worker_threads == 0 {
            return Err(eyre!("worker_threads must be greater than zero"));
        }
        if self.tag_length == 0 {
            return Err(eyre!("tag_length must be greater than zero"));
        }
        if self.label_extension.trim_start_matches('.').is_empty() {
            return Err(eyre!("label_extension must not be empty"));
        }
        if self.image_extensions.is_empty() {
            return Err(eyre!("image_extensions must list at least one extension"));
        }
        if self.label_image_extensions.is_empty() {
            return Err(eyre!("label_image_extensions must list at least one extension"));
        }
        Ok(())
    }

    /// Label extension without a leading dot.
    #[must_use]
    pub fn label_extension(&self) -> &str {
        self.label_extension.trim_start_matches('.')
    }
}
