//! Error types for cairn-fetch.

use std::io;
use std::path::PathBuf;

use cairn_verify::Checksum;
use thiserror::Error;

/// Failure reported by a media provider.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("'{0}' not found on medium")]
    NotFound(PathBuf),

    #[error("invalid medium number {0}")]
    InvalidMedium(u32),

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reason a [`FileChecker`](crate::FileChecker) rejected a file.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("digest mismatch for '{path}': expected {expected}, got {actual}")]
    DigestMismatch {
        path:     PathBuf,
        expected: Checksum,
        actual:   Checksum,
    },

    #[error("signature check of '{path}' failed: {reason}")]
    Signature { path: PathBuf, reason: String },

    #[error("{0}")]
    Rejected(String),

    #[error("cannot read '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// A batch-ending failure. Every variant names the resource being processed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("can't provide '{resource}': not found")]
    NotFound {
        resource: String,
        #[source]
        source:   MediaError,
    },

    #[error("can't provide '{resource}' to '{dest}'")]
    Provide {
        resource: String,
        dest:     PathBuf,
        #[source]
        source:   MediaError,
    },

    #[error("can't list directory '{resource}'")]
    Listing {
        resource: String,
        #[source]
        source:   MediaError,
    },

    #[error("file '{resource}' failed validation")]
    Validation {
        resource: String,
        #[source]
        source:   CheckError,
    },

    #[error("validation failed for '{resource}'")]
    ValidationFailed {
        resource: String,
        #[source]
        source:   CheckError,
    },

    #[error("filesystem error while providing '{resource}': {source}")]
    Fs {
        resource: String,
        source:   cairn_fs::Error,
    },

    #[error("can't read '{path}' for '{resource}': {source}")]
    Io {
        resource: String,
        path:     PathBuf,
        source:   io::Error,
    },

    #[error("wrong format for checksums file '{resource}' at line {line}: '{content}'")]
    ManifestFormat {
        resource: String,
        path:     PathBuf,
        line:     usize,
        content:  String,
    },

    #[error("fetch aborted by user after {completed} of {total} jobs")]
    Cancelled { completed: u64, total: u64 },
}

impl FetchError {
    /// Whether the user asked to stop, as opposed to a real failure.
    pub fn is_cancelled(&self) -> bool { matches!(self, FetchError::Cancelled { .. }) }

    /// The resource being processed when the batch stopped, if any.
    pub fn resource(&self) -> Option<&str> {
        match self {
            FetchError::NotFound { resource, .. }
            | FetchError::Provide { resource, .. }
            | FetchError::Listing { resource, .. }
            | FetchError::Validation { resource, .. }
            | FetchError::ValidationFailed { resource, .. }
            | FetchError::Fs { resource, .. }
            | FetchError::Io { resource, .. }
            | FetchError::ManifestFormat { resource, .. } => Some(resource),
            FetchError::Cancelled { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
