//! Immutable descriptions of what to fetch.

pub(crate) mod entry;
pub(crate) mod job;
pub(crate) mod progress;
pub(crate) mod resource;

pub use entry::{DirEntry, FileType};
pub use job::FetchJob;
pub use progress::{JobPhase, Progress, ProgressSink};
pub use resource::MediaResource;
