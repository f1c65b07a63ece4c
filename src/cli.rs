use std::path::PathBuf;

use clap::{Parser, Subcommand};
use datasetkit_models::CollisionPolicy;

#[derive(Parser, Debug)]
#[command(name = "datasetkit", version, about = "Housekeeping tools for image and label datasets")]
pub struct Cli {
    /// Settings file (default: the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find and remove byte-identical media files
    Duplicates {
        #[command(subcommand)]
        command: DuplicatesCmd,
    },

    /// Work with sidecar label files
    Labels {
        #[command(subcommand)]
        command: LabelsCmd,
    },

    /// Copy images and labels from several folders into one dataset
    Merge {
        /// Folder to merge from (repeatable)
        #[arg(short, long = "source", value_name = "DIR", required = true)]
        sources: Vec<PathBuf>,
        /// Dataset folder to create `images/` and `labels/` in
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },

    /// Rename exported labels like `1a2b3c4d-photo.txt` to `photo.txt`
    StripHashes {
        /// Folder holding labels and images
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// What to do when the clean name is taken: skip or suffix
        #[arg(long, value_name = "POLICY")]
        on_collision: Option<CollisionPolicy>,
    },

    /// Rename a media file to `<class>_<tag>.<ext>`
    Classify {
        /// File to rename
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
        /// Classification to prefix the new name with
        #[arg(short, long = "class", value_name = "NAME")]
        class: String,
    },

    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCmd,
    },
}

#[derive(Subcommand, Debug)]
pub enum DuplicatesCmd {
    /// List duplicate groups
    Scan {
        /// Folder to scan (not recursive)
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Ignore video files
        #[arg(long)]
        images_only: bool,
        /// Print the scan result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan, then delete every duplicate except the first of each group
    Delete {
        /// Folder to clean (not recursive)
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Ignore video files
        #[arg(long)]
        images_only: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LabelsCmd {
    /// Create an empty label for every `.jpg` image that has none
    Create {
        /// Folder holding the images
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Print the effective settings
    Show,
    /// Write the default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
