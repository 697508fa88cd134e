use std::fmt;

use crate::check::{Checker, DigestChecker};
use crate::data::resource::MediaResource;

/// A single unit of work in a fetch batch.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub(crate) resource:  MediaResource,
    pub(crate) checkers:  Vec<Checker>,
    pub(crate) directory: bool,
    pub(crate) recursive: bool,
}

impl FetchJob {
    /// A plain file job with no checkers.
    pub fn file(resource: MediaResource) -> Self {
        Self {
            resource,
            checkers: Vec::new(),
            directory: false,
            recursive: false,
        }
    }

    /// A file job validated first by the resource's own checksum.
    pub fn digested(resource: MediaResource) -> Self {
        let digest = DigestChecker::new(resource.checksum().clone());
        Self::file(resource).with_checker(digest)
    }

    pub fn directory(resource: MediaResource, recursive: bool) -> Self {
        Self {
            directory: true,
            recursive,
            ..Self::file(resource)
        }
    }

    /// Append a checker; checkers run in insertion order.
    pub fn with_checker(mut self, checker: impl Into<Checker>) -> Self {
        self.checkers.push(checker.into());
        self
    }

    pub fn resource(&self) -> &MediaResource { &self.resource }

    pub fn checkers(&self) -> &[Checker] { &self.checkers }

    pub fn is_directory(&self) -> bool { self.directory }

    pub fn is_recursive(&self) -> bool { self.recursive }
}

impl fmt::Display for FetchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.directory {
            write!(f, "dir {}", self.resource)?;
            if self.recursive {
                f.write_str(" (recursive)")?;
            }
        } else {
            write!(f, "file {}", self.resource)?;
        }
        write!(f, " [{} checkers]", self.checkers.len())
    }
}
