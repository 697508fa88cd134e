use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Create `path` and all missing parents.
///
/// An existing directory is fine; an existing non-directory is an error.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(Error::NotADirectory(path.to_path_buf()));
    }
    fs::create_dir_all(path).map_err(|e| Error::CreateDir {
        path:   path.to_path_buf(),
        source: e,
    })
}

/// Copy the bytes of `src` to `dest`, creating the parent of `dest`.
///
/// An existing `dest` is unlinked first, so other names of its inode (such as
/// a cache entry it was hardlinked from) keep their content. Returns the
/// number of bytes copied.
pub fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    if !src.is_file() {
        return Err(Error::Read {
            path:   src.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a regular file"),
        });
    }
    if dest.symlink_metadata().is_ok_and(|meta| !meta.is_dir()) {
        fs::remove_file(dest).map_err(|e| Error::Write {
            path:   dest.to_path_buf(),
            source: e,
        })?;
    }
    fs::copy(src, dest).map_err(|e| Error::Write {
        path:   dest.to_path_buf(),
        source: e,
    })
}
