mod duplicate;
mod media_file;
mod reports;
mod state;

pub use duplicate::{DuplicateGroup, ScanResult};
pub use media_file::{FileType, MediaFile};
pub use reports::{CollisionPolicy, DeleteReport, HashStripReport, LabelReport, MergeReport, RenameOutcome};
pub use state::{AppEvent, AppState, Confirmation, JobKind, TransitionError};
