use std::path::Path;

use cairn_verify::{Checksum, VerificationError};
use tracing::{debug, warn};

use super::FileChecker;
use crate::error::CheckError;

/// Accepts a file whose digest equals the expected checksum.
///
/// An empty checksum accepts any file: there is nothing to compare against,
/// so trust is left to the rest of the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestChecker {
    expected: Checksum,
}

impl DigestChecker {
    pub fn new(expected: Checksum) -> Self { Self { expected } }

    pub fn expected(&self) -> &Checksum { &self.expected }
}

impl FileChecker for DigestChecker {
    fn check(&self, path: &Path) -> Result<(), CheckError> {
        if self.expected.is_empty() {
            warn!(path = %path.display(), "no checksum known, accepting file unverified");
            return Ok(());
        }
        match self.expected.verify_file(path) {
            Ok(len) => {
                debug!(path = %path.display(), bytes = len, checksum = %self.expected, "digest verified");
            }
            Err(VerificationError::Mismatch { actual, .. }) => {
                return Err(CheckError::DigestMismatch {
                    path:     path.to_path_buf(),
                    expected: self.expected.clone(),
                    actual:   Checksum::from_digest(self.expected.algorithm(), &actual),
                });
            }
            Err(VerificationError::Io(source)) => {
                return Err(CheckError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(e) => return Err(CheckError::Rejected(e.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    #[test]
    fn accepts_matching_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "hello world").unwrap();

        DigestChecker::new(Checksum::sha1(HELLO_SHA1)).check(&path).unwrap();
    }

    #[test]
    fn rejects_other_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "hello mars").unwrap();

        let err = DigestChecker::new(Checksum::sha1(HELLO_SHA1)).check(&path).unwrap_err();
        match err {
            CheckError::DigestMismatch { expected, actual, .. } => {
                assert_eq!(expected.value(), HELLO_SHA1);
                assert_ne!(actual.value(), HELLO_SHA1);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_digest_is_unconstrained() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "anything").unwrap();

        DigestChecker::default().check(&path).unwrap();
    }

    #[test]
    fn malformed_expected_digest_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "hello world").unwrap();

        let err = DigestChecker::new(Checksum::sha1("not-hex")).check(&path).unwrap_err();
        assert!(matches!(err, CheckError::Rejected(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = DigestChecker::new(Checksum::sha1(HELLO_SHA1))
            .check(&dir.path().join("gone"))
            .unwrap_err();
        assert!(matches!(err, CheckError::Io { .. }));
    }
}
