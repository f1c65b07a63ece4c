use std::path::{Path, PathBuf};

use datasetkit_config::Settings;
use datasetkit_models::FileType;
use datasetkit_utils::ExtensionSet;

use crate::Result;

/// Which files a tool looks at and how.
///
/// Every tool is an instance of the same profile: an extension selection,
/// a recursion flag and the sidecar rule (label extension, same base name).
#[derive(Debug, Clone)]
pub struct ScanProfile {
    images: ExtensionSet,
    videos: ExtensionSet,
    labels: ExtensionSet,
    selected: ExtensionSet,
    label_extension: String,
    recursive: bool,
    skip_hidden: bool,
}

impl ScanProfile {
    /// Images and, unless `images_only`, videos directly inside one folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured extensions do not form a valid pattern.
    pub fn duplicates(settings: &Settings, images_only: bool) -> Result<Self> {
        let base = Self::base(settings)?;
        let selected = if images_only {
            base.images.clone()
        } else {
            base.images.union(&base.videos)?
        };
        Ok(Self { selected, ..base })
    }

    /// Images directly inside one folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured extensions do not form a valid pattern.
    pub fn images(settings: &Settings) -> Result<Self> {
        let base = Self::base(settings)?;
        Ok(Self {
            selected: base.images.clone(),
            ..base
        })
    }

    /// Images that should carry a label, directly inside one folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured extensions do not form a valid pattern.
    pub fn label_targets(settings: &Settings) -> Result<Self> {
        let base = Self::base(settings)?;
        Ok(Self {
            selected: ExtensionSet::new(&settings.label_image_extensions)?,
            ..base
        })
    }

    /// Label files directly inside one folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured extensions do not form a valid pattern.
    pub fn labels(settings: &Settings) -> Result<Self> {
        let base = Self::base(settings)?;
        Ok(Self {
            selected: base.labels.clone(),
            ..base
        })
    }

    /// Images and labels anywhere below a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured extensions do not form a valid pattern.
    pub fn merge_sources(settings: &Settings) -> Result<Self> {
        let base = Self::base(settings)?;
        Ok(Self {
            selected: base.images.union(&base.labels)?,
            recursive: true,
            ..base
        })
    }

    fn base(settings: &Settings) -> Result<Self> {
        let label_extension = settings.label_extension().to_string();
        Ok(Self {
            images: ExtensionSet::new(&settings.image_extensions)?,
            videos: ExtensionSet::new(&settings.video_extensions)?,
            labels: ExtensionSet::new([label_extension.as_str()])?,
            selected: ExtensionSet::new(Vec::<String>::new())?,
            label_extension,
            recursive: false,
            skip_hidden: settings.skip_hidden_files,
        })
    }

    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.selected.matches(path)
    }

    #[must_use]
    pub fn classify(&self, path: &Path) -> FileType {
        if self.images.matches(path) {
            FileType::Image
        } else if self.videos.matches(path) {
            FileType::Video
        } else if self.labels.matches(path) {
            FileType::Label
        } else {
            FileType::Other
        }
    }

    #[must_use]
    pub fn sidecar_for(&self, path: &Path) -> PathBuf {
        path.with_extension(&self.label_extension)
    }

    #[must_use]
    pub fn label_extension(&self) -> &str {
        &self.label_extension
    }

    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    #[must_use]
    pub fn skip_hidden(&self) -> bool {
        self.skip_hidden
    }

    #[must_use]
    pub fn selected_extensions(&self) -> &[String] {
        self.selected.extensions()
    }
}
