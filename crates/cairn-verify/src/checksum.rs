use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::{Hasher, Result, Sha1Hasher, Sha256Hasher, VerificationError, VerifiedReader};

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// Guess the algorithm from the length of a hex digest.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            40 => Some(HashAlgorithm::Sha1),
            64 => Some(HashAlgorithm::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for HashAlgorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            _ => Err(VerificationError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// An expected digest: algorithm plus lower-case hex value.
///
/// The empty checksum means "no known digest". It never matches a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Checksum {
    algorithm: HashAlgorithm,
    value:     String,
}

impl Checksum {
    pub fn new(algorithm: HashAlgorithm, value: impl AsRef<str>) -> Self {
        Self {
            algorithm,
            value: value.as_ref().trim().to_ascii_lowercase(),
        }
    }

    pub fn sha1(value: impl AsRef<str>) -> Self { Self::new(HashAlgorithm::Sha1, value) }

    pub fn sha256(value: impl AsRef<str>) -> Self { Self::new(HashAlgorithm::Sha256, value) }

    pub fn empty() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.value.is_empty() }

    pub fn algorithm(&self) -> HashAlgorithm { self.algorithm }

    pub fn value(&self) -> &str { &self.value }

    /// The checksum for raw digest bytes.
    pub fn from_digest(algorithm: HashAlgorithm, digest: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex::encode(digest),
        }
    }

    /// Hash the file at `path` with `algorithm`.
    pub fn of_file(algorithm: HashAlgorithm, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = BufReader::new(File::open(path)?);
        let digest = match algorithm {
            HashAlgorithm::Sha1 => VerifiedReader::new(file, Sha1Hasher::new()).drain()?,
            HashAlgorithm::Sha256 => VerifiedReader::new(file, Sha256Hasher::new()).drain()?,
        };
        Ok(Self::from_digest(algorithm, &digest))
    }

    /// Whether the file at `path` has this digest. Always false when empty.
    pub fn matches_file(&self, path: impl AsRef<Path>) -> io::Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        Ok(Self::of_file(self.algorithm, path)? == *self)
    }

    /// Check the file at `path` against this digest in one streaming pass.
    ///
    /// Returns the number of bytes verified, or
    /// [`VerificationError::Mismatch`] carrying the actual digest.
    pub fn verify_file(&self, path: impl AsRef<Path>) -> Result<u64> {
        let expected = hex::decode(&self.value)
            .map_err(|_| VerificationError::InvalidChecksum(self.value.clone()))?;
        let file = BufReader::new(File::open(path)?);
        match self.algorithm {
            HashAlgorithm::Sha1 => verify_reader(VerifiedReader::new(file, Sha1Hasher::new()), &expected),
            HashAlgorithm::Sha256 => verify_reader(VerifiedReader::new(file, Sha256Hasher::new()), &expected),
        }
    }
}

fn verify_reader<R: io::Read, H: Hasher>(mut reader: VerifiedReader<R, H>, expected: &[u8]) -> Result<u64> {
    io::copy(&mut reader, &mut io::sink())?;
    reader.finish(expected)
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<none>");
        }
        write!(f, "{}:{}", self.algorithm, self.value)
    }
}

impl FromStr for Checksum {
    type Err = VerificationError;

    /// Parses `<alg>:<hex>` or a bare hex digest of a known length.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let checksum = match s.split_once(':') {
            Some((alg, value)) => Checksum::new(alg.parse()?, value),
            None => {
                let algorithm = HashAlgorithm::from_hex_len(s.len())
                    .ok_or_else(|| VerificationError::InvalidChecksum(s.to_string()))?;
                Checksum::new(algorithm, s)
            }
        };
        let valid_hex = checksum.value.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid_hex || checksum.value.len() != checksum.algorithm.digest_length() * 2 {
            return Err(VerificationError::InvalidChecksum(s.to_string()));
        }
        Ok(checksum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_of_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello");
        std::fs::write(&path, "hello world").unwrap();

        assert_eq!(Checksum::of_file(HashAlgorithm::Sha1, &path).unwrap(), Checksum::sha1(HELLO_SHA1));
        assert_eq!(
            Checksum::of_file(HashAlgorithm::Sha256, &path).unwrap(),
            Checksum::sha256(HELLO_SHA256)
        );
    }

    #[test]
    fn test_matches_file_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello");
        std::fs::write(&path, "hello world").unwrap();

        assert!(Checksum::sha1(HELLO_SHA1.to_uppercase()).matches_file(&path).unwrap());
        assert!(!Checksum::sha1("0".repeat(40)).matches_file(&path).unwrap());
    }

    #[test]
    fn test_empty_never_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, "").unwrap();

        assert!(Checksum::empty().is_empty());
        assert!(!Checksum::empty().matches_file(&path).unwrap());
    }

    #[test]
    fn test_verify_file_reports_actual() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello");
        std::fs::write(&path, "hello world").unwrap();

        assert_eq!(Checksum::sha256(HELLO_SHA256).verify_file(&path).unwrap(), 11);
        let err = Checksum::sha1("ff".repeat(20)).verify_file(&path).unwrap_err();
        match err {
            VerificationError::Mismatch { actual, .. } => assert_eq!(hex::encode(actual), HELLO_SHA1),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            format!("sha1:{HELLO_SHA1}").parse::<Checksum>().unwrap(),
            Checksum::sha1(HELLO_SHA1)
        );
        assert_eq!(HELLO_SHA256.parse::<Checksum>().unwrap().algorithm(), HashAlgorithm::Sha256);
        assert!("md5:abcd".parse::<Checksum>().is_err());
        assert!("sha1:abcd".parse::<Checksum>().is_err());
        assert!("zz".repeat(20).parse::<Checksum>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Checksum::sha1(HELLO_SHA1).to_string(), format!("sha1:{HELLO_SHA1}"));
        assert_eq!(Checksum::empty().to_string(), "<none>");
    }
}
