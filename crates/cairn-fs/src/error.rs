use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to create directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("cannot hardlink '{src}' to '{dest}': {source}")]
    Hardlink {
        src:    PathBuf,
        dest:   PathBuf,
        source: io::Error,
    },

    #[error("cross-device hardlink not supported")]
    CrossDeviceHardlink,

    #[error("'{0}' exists and is not a directory")]
    NotADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The underlying I/O error, if any.
    pub fn io(&self) -> Option<&io::Error> {
        match self {
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::CreateDir { source, .. }
            | Self::Hardlink { source, .. } => Some(source),
            Self::CrossDeviceHardlink | Self::NotADirectory(_) => None,
        }
    }
}

pub(crate) fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(18) || err.kind() == io::ErrorKind::CrossesDevices
}
