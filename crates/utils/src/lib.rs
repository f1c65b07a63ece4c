mod bytes;
pub mod media_types;
pub mod naming;
mod progress;

pub use bytes::format_bytes;
pub use media_types::ExtensionSet;
pub use progress::{ProgressEvent, ProgressSink};
