mod classifier;
mod digest;
mod duplicate_detector;
mod enumerator;
mod error;
mod hash_stripper;
mod label_creator;
mod merger;
mod profile;

pub use classifier::Classifier;
pub use digest::DigestComputer;
pub use duplicate_detector::{DuplicateDetector, group_by_digest};
pub use enumerator::{FileEnumerator, Listing};
pub use error::{CoreError, Result};
pub use hash_stripper::HashStripper;
pub use label_creator::LabelCreator;
pub use merger::DatasetMerger;
pub use profile::ScanProfile;
