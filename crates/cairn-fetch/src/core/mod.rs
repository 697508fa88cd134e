//! Pure transformations with no I/O.

mod manifest;

pub use manifest::{
    CHECKSUMS_FILE, CHECKSUMS_KEY, CHECKSUMS_PREFIX, CHECKSUMS_SIGNATURE, DigestIndex,
    ManifestError, parse_manifest,
};
