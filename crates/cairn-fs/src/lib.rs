//! Filesystem primitives used to materialize fetched artifacts.
//!
//! Files are placed either by hardlink or by byte copy, never rewritten, so a
//! destination is always byte-identical to its source.

mod error;
mod primitives;

pub use error::{Error, Result};
pub use primitives::{
    FallbackStrategy, HardlinkOrCopyOptions, Placement, copy_file, ensure_dir, hardlink_or_copy,
};
