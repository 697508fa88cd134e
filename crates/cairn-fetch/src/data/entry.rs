use std::fmt;

/// Type of a directory entry as reported by a media provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileType {
    /// The listing carried no type information.
    #[default]
    NotAvailable,
    File,
    Dir,
    Link,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
}

impl From<std::fs::FileType> for FileType {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_file() {
            return FileType::File;
        }
        if ft.is_dir() {
            return FileType::Dir;
        }
        if ft.is_symlink() {
            return FileType::Link;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_char_device() {
                return FileType::CharDevice;
            }
            if ft.is_block_device() {
                return FileType::BlockDevice;
            }
            if ft.is_fifo() {
                return FileType::Fifo;
            }
            if ft.is_socket() {
                return FileType::Socket;
            }
        }
        FileType::NotAvailable
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirEntry {
    pub name:      String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, file_type: FileType) -> Self {
        Self {
            name: name.into(),
            file_type,
        }
    }

    pub fn file(name: impl Into<String>) -> Self { Self::new(name, FileType::File) }

    pub fn dir(name: impl Into<String>) -> Self { Self::new(name, FileType::Dir) }
}

impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.file_type)
    }
}
