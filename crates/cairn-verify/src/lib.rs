//! Content verification primitives for fetched artifacts.
//!
//! Provides incremental hashing and a [`Checksum`] value type without
//! enforcing any verification policy. Callers decide what an empty or
//! mismatching digest means.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use cairn_verify::{Sha1Hasher, VerifiedReader};
//!
//! let data = b"hello world";
//! let expected = Sha1Hasher::digest(b"hello world");
//!
//! let mut reader = VerifiedReader::new(&data[..], Sha1Hasher::new());
//! let mut buffer = Vec::new();
//! reader.read_to_end(&mut buffer).unwrap();
//!
//! reader.finish(&expected).unwrap();
//! ```

pub use self::checksum::{Checksum, HashAlgorithm};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{DigestHasher, Hasher, Sha1Hasher, Sha256Hasher};
pub use self::reader::VerifiedReader;

mod checksum;
mod error;
mod hasher;
mod reader;
