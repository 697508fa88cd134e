use std::path::{Path, PathBuf};

use tracing::debug;

use crate::data::{DirEntry, FileType, MediaResource};
use crate::error::MediaError;

/// Access to a set of media (network mirror, DVD set, local tree).
///
/// Implementations handle their own transport, retries and staging. All calls
/// block until the operation completes.
pub trait MediaProvider {
    /// Make the resource available locally and return the staging path.
    ///
    /// The staged file belongs to the provider; callers copy it, never move it.
    fn provide_file(&mut self, resource: &MediaResource) -> Result<PathBuf, MediaError>;

    /// The staged copy of `resource` is no longer needed.
    fn release_file(&mut self, resource: &MediaResource) -> Result<(), MediaError>;

    /// List the immediate entries of `dir` on medium `media_nr`.
    ///
    /// Entries whose name starts with `.` are only included when `dots` is set.
    fn dir_info(&mut self, dir: &Path, dots: bool, media_nr: u32) -> Result<Vec<DirEntry>, MediaError>;
}

impl<M: MediaProvider + ?Sized> MediaProvider for &mut M {
    fn provide_file(&mut self, resource: &MediaResource) -> Result<PathBuf, MediaError> {
        (**self).provide_file(resource)
    }

    fn release_file(&mut self, resource: &MediaResource) -> Result<(), MediaError> {
        (**self).release_file(resource)
    }

    fn dir_info(&mut self, dir: &Path, dots: bool, media_nr: u32) -> Result<Vec<DirEntry>, MediaError> {
        (**self).dir_info(dir, dots, media_nr)
    }
}

/// A media set made of local directories, medium `n` being the `n`-th root.
///
/// Files are provided in place, so releasing them does nothing.
#[derive(Debug, Clone, Default)]
pub struct LocalMedia {
    roots: Vec<PathBuf>,
}

impl LocalMedia {
    /// A single-medium set rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { roots: vec![root.into()] } }

    /// Append a medium and return its number.
    pub fn add_medium(&mut self, root: impl Into<PathBuf>) -> u32 {
        self.roots.push(root.into());
        self.roots.len() as u32
    }

    pub fn media_count(&self) -> usize { self.roots.len() }

    fn root(&self, media_nr: u32) -> Result<&Path, MediaError> {
        media_nr
            .checked_sub(1)
            .and_then(|i| self.roots.get(i as usize))
            .map(PathBuf::as_path)
            .ok_or(MediaError::InvalidMedium(media_nr))
    }

    fn locate(&self, path: &Path, media_nr: u32) -> Result<PathBuf, MediaError> {
        let resource = MediaResource::new(path);
        Ok(resource.local_path(self.root(media_nr)?))
    }
}

impl MediaProvider for LocalMedia {
    fn provide_file(&mut self, resource: &MediaResource) -> Result<PathBuf, MediaError> {
        let path = self.locate(resource.filename(), resource.media_nr())?;
        if !path.is_file() {
            return Err(MediaError::NotFound(resource.filename().to_path_buf()));
        }
        debug!(resource = %resource, path = %path.display(), "provided from local medium");
        Ok(path)
    }

    fn release_file(&mut self, _resource: &MediaResource) -> Result<(), MediaError> { Ok(()) }

    fn dir_info(&mut self, dir: &Path, dots: bool, media_nr: u32) -> Result<Vec<DirEntry>, MediaError> {
        let path = self.locate(dir, media_nr)?;
        if !path.is_dir() {
            return Err(MediaError::NotFound(dir.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !dots && name.starts_with('.') {
                continue;
            }
            let mut file_type = FileType::from(entry.file_type()?);
            if file_type == FileType::Link {
                // Only links to regular files are followed. Directory links
                // stay links, so a link back up the tree can't recurse.
                let target = std::fs::metadata(entry.path());
                if target.is_ok_and(|meta| meta.is_file()) {
                    file_type = FileType::File;
                }
            }
            entries.push(DirEntry::new(name, file_type));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn provides_from_selected_medium() {
        let one = tempdir().unwrap();
        let two = tempdir().unwrap();
        std::fs::create_dir_all(two.path().join("suse")).unwrap();
        std::fs::write(two.path().join("suse/pkg.rpm"), "rpm").unwrap();

        let mut media = LocalMedia::new(one.path());
        assert_eq!(media.add_medium(two.path()), 2);

        let on_two = MediaResource::new("/suse/pkg.rpm").with_media_nr(2);
        assert_eq!(media.provide_file(&on_two).unwrap(), two.path().join("suse/pkg.rpm"));

        let on_one = MediaResource::new("/suse/pkg.rpm");
        assert!(matches!(media.provide_file(&on_one), Err(MediaError::NotFound(_))));
    }

    #[test]
    fn invalid_medium_numbers() {
        let root = tempdir().unwrap();
        let mut media = LocalMedia::new(root.path());
        for nr in [0, 2] {
            let resource = MediaResource::new("/x").with_media_nr(nr);
            assert!(matches!(media.provide_file(&resource), Err(MediaError::InvalidMedium(n)) if n == nr));
        }
    }

    #[test]
    fn dir_info_is_sorted_and_typed() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("repo/sub")).unwrap();
        std::fs::write(root.path().join("repo/b.rpm"), "b").unwrap();
        std::fs::write(root.path().join("repo/a.rpm"), "a").unwrap();
        std::fs::write(root.path().join("repo/.hidden"), "h").unwrap();

        let mut media = LocalMedia::new(root.path());
        let entries = media.dir_info(Path::new("/repo"), false, 1).unwrap();
        assert_eq!(
            entries,
            vec![DirEntry::file("a.rpm"), DirEntry::file("b.rpm"), DirEntry::dir("sub")]
        );

        let with_dots = media.dir_info(Path::new("/repo"), true, 1).unwrap();
        assert_eq!(with_dots.len(), 4);
        assert_eq!(with_dots[0].name, ".hidden");
    }

    #[test]
    #[cfg(unix)]
    fn directory_links_are_not_followed() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("repo")).unwrap();
        std::fs::write(root.path().join("repo/pkg.rpm"), "rpm").unwrap();
        std::os::unix::fs::symlink("..", root.path().join("repo/loop")).unwrap();
        std::os::unix::fs::symlink("pkg.rpm", root.path().join("repo/alias.rpm")).unwrap();

        let mut media = LocalMedia::new(root.path());
        let entries = media.dir_info(Path::new("/repo"), false, 1).unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry::file("alias.rpm"),
                DirEntry::new("loop", FileType::Link),
                DirEntry::file("pkg.rpm"),
            ]
        );
    }

    #[test]
    fn listing_a_missing_directory() {
        let root = tempdir().unwrap();
        let mut media = LocalMedia::new(root.path());
        assert!(matches!(
            media.dir_info(Path::new("/nope"), false, 1),
            Err(MediaError::NotFound(_))
        ));
    }
}
