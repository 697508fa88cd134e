use super::copy::copy_file;
use crate::error::is_cross_device;
use crate::{Error, Result};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackStrategy {
    #[default]
    Copy,
    Error,
}

/// How a file ended up at its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Linked,
    Copied,
}

#[derive(Clone, Copy, Debug)]
pub struct HardlinkOrCopyOptions {
    fallback: FallbackStrategy,
    hardlink: bool,
}

impl Default for HardlinkOrCopyOptions {
    fn default() -> Self { Self::new() }
}

impl HardlinkOrCopyOptions {
    pub fn new() -> Self {
        Self {
            fallback: FallbackStrategy::default(),
            hardlink: true,
        }
    }

    pub fn fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Skip the hardlink attempt and always copy bytes.
    pub fn copy_only(mut self) -> Self {
        self.hardlink = false;
        self
    }

    pub fn get_fallback(&self) -> FallbackStrategy { self.fallback }

    pub fn links(&self) -> bool { self.hardlink }
}

/// Place `src` at `dest`, preferring a hardlink.
///
/// Any link failure (cross-device, existing destination, unsupported
/// filesystem) falls back to a byte copy when the strategy allows it. A copy
/// replaces an existing destination.
pub fn hardlink_or_copy(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: HardlinkOrCopyOptions,
) -> Result<Placement> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if same_file(src, dest) {
        return Ok(Placement::Linked);
    }

    if !options.hardlink {
        return copy(src, dest);
    }

    match std::fs::hard_link(src, dest) {
        Ok(()) => Ok(Placement::Linked),
        Err(e) => match options.fallback {
            FallbackStrategy::Copy => copy(src, dest),
            FallbackStrategy::Error if is_cross_device(&e) => Err(Error::CrossDeviceHardlink),
            FallbackStrategy::Error => Err(Error::Hardlink {
                src:    src.to_path_buf(),
                dest:   dest.to_path_buf(),
                source: e,
            }),
        },
    }
}

fn copy(src: &Path, dest: &Path) -> Result<Placement> { copy_file(src, dest).map(|_| Placement::Copied) }

// Copying a file onto another name of itself would truncate it.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
