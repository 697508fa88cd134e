//! Lookup of already-trusted local copies.

use std::path::{Path, PathBuf};

use cairn_fs::{HardlinkOrCopyOptions, Placement, ensure_dir, hardlink_or_copy};
use cairn_verify::Checksum;
use tracing::{debug, error, info, warn};

use crate::data::MediaResource;
use crate::error::{FetchError, Result};

/// Ordered list of local directories searched before the media provider.
///
/// A cached file is only used when its digest matches a non-empty expected
/// checksum. The first matching directory wins.
#[derive(Debug, Clone, Default)]
pub struct CacheDirs {
    dirs: Vec<PathBuf>,
    link: HardlinkOrCopyOptions,
}

impl CacheDirs {
    pub fn new() -> Self { Self::default() }

    /// How cached files are placed into the destination.
    pub fn with_link_options(mut self, link: HardlinkOrCopyOptions) -> Self {
        self.link = link;
        self
    }

    /// Register `dir` if it is an existing directory. Bad entries are logged
    /// and ignored.
    pub fn add(&mut self, dir: impl Into<PathBuf>) -> bool {
        let dir = dir.into();
        if !dir.exists() {
            error!(cache = %dir.display(), "not adding cache: path does not exist");
            return false;
        }
        if !dir.is_dir() {
            error!(cache = %dir.display(), "not adding cache: not a directory");
            return false;
        }
        debug!(cache = %dir.display(), "adding fetcher cache");
        self.dirs.push(dir);
        true
    }

    pub fn dirs(&self) -> &[PathBuf] { &self.dirs }

    pub fn len(&self) -> usize { self.dirs.len() }

    pub fn is_empty(&self) -> bool { self.dirs.is_empty() }

    /// Try to satisfy `resource` below `dest_dir` without the media provider.
    ///
    /// Returns `Ok(true)` when the destination now holds a trusted copy.
    /// Failing to place a candidate only moves on to the next directory; only
    /// failing to create the destination directory is an error.
    pub fn provide(&self, resource: &MediaResource, dest_dir: &Path) -> Result<bool> {
        let expected = resource.checksum();
        let dest = resource.local_path(dest_dir);

        if dest.exists() && digest_matches(&dest, expected) {
            debug!(resource = %resource, path = %dest.display(), "already in destination");
            return Ok(true);
        }

        debug!(resource = %resource, caches = self.dirs.len(), "searching caches");
        for dir in &self.dirs {
            let cached = resource.local_path(dir);
            if !cached.exists() {
                continue;
            }
            debug!(path = %cached.display(), checksum = %expected, "cached file exists, testing checksum");
            if !digest_matches(&cached, expected) {
                continue;
            }
            info!(resource = %resource, cache = %dir.display(), "using cached copy");

            if cached == dest {
                return Ok(true);
            }
            if let Some(parent) = dest.parent() {
                ensure_dir(parent).map_err(|source| FetchError::Fs {
                    resource: resource.to_string(),
                    source,
                })?;
            }
            match hardlink_or_copy(&cached, &dest, self.link) {
                Ok(Placement::Linked) => return Ok(true),
                Ok(Placement::Copied) => {
                    warn!(path = %cached.display(), dest = %dest.display(), "can't hardlink, copied instead");
                    return Ok(true);
                }
                Err(e) => {
                    error!(path = %cached.display(), dest = %dest.display(), error = %e, "can't place cached copy, trying next cache");
                }
            }
        }
        Ok(false)
    }
}

// An empty expected checksum never matches, whatever the file holds.
fn digest_matches(path: &Path, expected: &Checksum) -> bool {
    match expected.matches_file(path) {
        Ok(matches) => matches,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "can't compute checksum");
            false
        }
    }
}
