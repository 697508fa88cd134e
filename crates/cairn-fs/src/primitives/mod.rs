pub mod copy;
pub mod hardlink;

pub use copy::{copy_file, ensure_dir};
pub use hardlink::{FallbackStrategy, HardlinkOrCopyOptions, Placement, hardlink_or_copy};
