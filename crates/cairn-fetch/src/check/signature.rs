use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::{debug, warn};

use super::FileChecker;
use crate::error::CheckError;

/// Verifies a detached Ed25519 signature against a set of trusted keys.
///
/// The signature file holds one base64 signature of the checked file. Each key
/// file holds one base64 public key per line, optionally prefixed with
/// `ed25519:`; blank lines and `#` comments are ignored.
///
/// Without a signature file the checker accepts everything. With a signature
/// but no usable key it rejects everything.
#[derive(Debug, Clone, Default)]
pub struct SignatureChecker {
    signature: Option<PathBuf>,
    keys:      Vec<PathBuf>,
}

impl SignatureChecker {
    pub fn new() -> Self { Self::default() }

    /// A checker bound to the detached signature at `signature`.
    pub fn with_signature(signature: impl Into<PathBuf>) -> Self {
        Self {
            signature: Some(signature.into()),
            keys:      Vec::new(),
        }
    }

    /// Trust the keys stored in `key_file`.
    pub fn add_public_key(&mut self, key_file: impl Into<PathBuf>) {
        let key_file = key_file.into();
        debug!(key = %key_file.display(), "trusting public key file");
        self.keys.push(key_file);
    }

    pub fn signature(&self) -> Option<&Path> { self.signature.as_deref() }

    pub fn keys(&self) -> &[PathBuf] { &self.keys }

    fn load_keys(&self) -> Result<Vec<VerifyingKey>, CheckError> {
        let mut keys = Vec::new();
        for key_file in &self.keys {
            let content = read_to_string(key_file)?;
            for line in content.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match parse_key(line) {
                    Some(key) => keys.push(key),
                    None => warn!(key = %key_file.display(), "ignoring malformed public key"),
                }
            }
        }
        Ok(keys)
    }
}

impl FileChecker for SignatureChecker {
    fn check(&self, path: &Path) -> Result<(), CheckError> {
        let Some(signature_file) = &self.signature else {
            warn!(path = %path.display(), "no signature to check");
            return Ok(());
        };
        let rejected = |reason: &str| CheckError::Signature {
            path:   path.to_path_buf(),
            reason: reason.to_string(),
        };

        let encoded = read_to_string(signature_file)?;
        let signature = decode_base64(encoded.trim())
            .and_then(|raw| Signature::from_slice(&raw).ok())
            .ok_or_else(|| rejected("signature is not a valid base64 Ed25519 signature"))?;

        let keys = self.load_keys()?;
        if keys.is_empty() {
            return Err(rejected("no trusted public key"));
        }

        let data = std::fs::read(path).map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if keys.iter().any(|key| key.verify(&data, &signature).is_ok()) {
            debug!(path = %path.display(), "signature verified");
            Ok(())
        } else {
            Err(rejected("signature does not match any trusted key"))
        }
    }
}

fn read_to_string(path: &Path) -> Result<String, CheckError> {
    std::fs::read_to_string(path).map_err(|source| CheckError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_base64(value: &str) -> Option<Vec<u8>> {
    STANDARD_NO_PAD
        .decode(value)
        .or_else(|_| STANDARD.decode(value))
        .ok()
}

fn parse_key(line: &str) -> Option<VerifyingKey> {
    let encoded = match line.split_once(':') {
        Some((alg, key)) if alg.eq_ignore_ascii_case("ed25519") => key.trim(),
        Some(_) => return None,
        None => line,
    };
    let raw = decode_base64(encoded)?;
    let bytes: &[u8; 32] = raw.as_slice().try_into().ok()?;
    VerifyingKey::from_bytes(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use tempfile::tempdir;

    fn write_key(path: &Path, secret: &SigningKey) {
        let public = STANDARD.encode(secret.verifying_key().as_bytes());
        std::fs::write(path, format!("# repo key\ned25519:{public}\n")).unwrap();
    }

    fn write_signature(path: &Path, secret: &SigningKey, data: &[u8]) {
        std::fs::write(path, STANDARD.encode(secret.sign(data).to_bytes())).unwrap();
    }

    #[test]
    fn accepts_valid_signatures() {
        let dir = tempdir().unwrap();
        let secret = SigningKey::from_bytes(&[7u8; 32]);
        let data = dir.path().join("SHA1SUMS");
        std::fs::write(&data, "abc file1\n").unwrap();
        write_signature(&dir.path().join("SHA1SUMS.asc"), &secret, b"abc file1\n");
        write_key(&dir.path().join("SHA1SUMS.key"), &secret);

        let mut checker = SignatureChecker::with_signature(dir.path().join("SHA1SUMS.asc"));
        checker.add_public_key(dir.path().join("SHA1SUMS.key"));
        checker.check(&data).unwrap();
    }

    #[test]
    fn rejects_tampered_data() {
        let dir = tempdir().unwrap();
        let secret = SigningKey::from_bytes(&[7u8; 32]);
        let data = dir.path().join("SHA1SUMS");
        std::fs::write(&data, "abc evil\n").unwrap();
        write_signature(&dir.path().join("sig"), &secret, b"abc file1\n");
        write_key(&dir.path().join("key"), &secret);

        let mut checker = SignatureChecker::with_signature(dir.path().join("sig"));
        checker.add_public_key(dir.path().join("key"));
        assert!(matches!(checker.check(&data), Err(CheckError::Signature { .. })));
    }

    #[test]
    fn rejects_untrusted_signer() {
        let dir = tempdir().unwrap();
        let signer = SigningKey::from_bytes(&[1u8; 32]);
        let trusted = SigningKey::from_bytes(&[2u8; 32]);
        let data = dir.path().join("data");
        std::fs::write(&data, "payload").unwrap();
        write_signature(&dir.path().join("sig"), &signer, b"payload");
        write_key(&dir.path().join("key"), &trusted);

        let mut checker = SignatureChecker::with_signature(dir.path().join("sig"));
        checker.add_public_key(dir.path().join("key"));
        assert!(checker.check(&data).is_err());
    }

    #[test]
    fn signature_without_key_is_rejected() {
        let dir = tempdir().unwrap();
        let secret = SigningKey::from_bytes(&[3u8; 32]);
        let data = dir.path().join("data");
        std::fs::write(&data, "payload").unwrap();
        write_signature(&dir.path().join("sig"), &secret, b"payload");

        let checker = SignatureChecker::with_signature(dir.path().join("sig"));
        let err = checker.check(&data).unwrap_err();
        assert!(err.to_string().contains("no trusted public key"));
    }

    #[test]
    fn no_signature_accepts() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::write(&data, "payload").unwrap();

        let mut checker = SignatureChecker::new();
        checker.add_public_key(dir.path().join("never-read"));
        checker.check(&data).unwrap();
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let dir = tempdir().unwrap();
        let secret = SigningKey::from_bytes(&[4u8; 32]);
        let data = dir.path().join("data");
        std::fs::write(&data, "payload").unwrap();
        std::fs::write(dir.path().join("sig"), "not base64 at all!").unwrap();
        write_key(&dir.path().join("key"), &secret);

        let mut checker = SignatureChecker::with_signature(dir.path().join("sig"));
        checker.add_public_key(dir.path().join("key"));
        assert!(matches!(checker.check(&data), Err(CheckError::Signature { .. })));
    }
}
