use std::fmt;
use std::path::{Component, Path, PathBuf};

use cairn_verify::Checksum;

/// A file on a media set, identified by its path relative to the medium root.
///
/// Built once with the consuming setters and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use cairn_fetch::MediaResource;
/// use cairn_verify::Checksum;
///
/// let resource = MediaResource::new("/repodata/repomd.xml")
///     .with_checksum(Checksum::sha1("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"))
///     .with_optional(true);
///
/// assert_eq!(resource.media_nr(), 1);
/// assert_eq!(resource.relative_path(), std::path::Path::new("repodata/repomd.xml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaResource {
    filename: PathBuf,
    checksum: Checksum,
    media_nr: u32,
    optional: bool,
}

impl MediaResource {
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            checksum: Checksum::empty(),
            media_nr: 1,
            optional: false,
        }
    }

    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_media_nr(mut self, media_nr: u32) -> Self {
        self.media_nr = media_nr;
        self
    }

    /// Mark the resource as not fatal when missing.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn filename(&self) -> &Path { &self.filename }

    pub fn checksum(&self) -> &Checksum { &self.checksum }

    pub fn media_nr(&self) -> u32 { self.media_nr }

    pub fn is_optional(&self) -> bool { self.optional }

    /// Final path component, if any.
    pub fn name(&self) -> Option<&str> { self.filename.file_name().and_then(|n| n.to_str()) }

    /// The filename with root, prefix, `.` and `..` components dropped.
    ///
    /// Joining this onto a directory never escapes that directory.
    pub fn relative_path(&self) -> PathBuf {
        self.filename
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect()
    }

    /// Where this resource lives below `dir`.
    pub fn local_path(&self, dir: &Path) -> PathBuf { dir.join(self.relative_path()) }

    /// A resource for `name` inside this one, on the same medium.
    ///
    /// The child starts without checksum and is not optional.
    pub fn join(&self, name: impl AsRef<Path>) -> Self {
        Self::new(self.filename.join(name)).with_media_nr(self.media_nr)
    }
}

impl fmt::Display for MediaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename.display())?;
        if self.media_nr != 1 {
            write!(f, " (medium {})", self.media_nr)?;
        }
        Ok(())
    }
}
