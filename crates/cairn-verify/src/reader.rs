use std::io::{self, Read};

use crate::{Hasher, Result, VerificationError};

/// Reader adapter that feeds every byte it yields into a [`Hasher`].
///
/// Draining it computes the digest of the stream in the same pass that
/// consumes it; [`VerifiedReader::finish`] then compares against an expected
/// digest.
pub struct VerifiedReader<R, H> {
    inner:  R,
    hasher: H,
    len:    u64,
}

impl<R, H> VerifiedReader<R, H> {
    pub fn new(inner: R, hasher: H) -> Self {
        Self {
            inner,
            hasher,
            len: 0,
        }
    }

    /// Bytes hashed so far.
    pub fn len(&self) -> u64 { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.len += n as u64;
        Ok(n)
    }
}

impl<R: Read, H: Hasher> VerifiedReader<R, H> {
    /// Read whatever is left and return the digest of the whole stream.
    pub fn drain(mut self) -> io::Result<Vec<u8>> {
        io::copy(&mut self, &mut io::sink())?;
        Ok(self.hasher.finalize())
    }

    /// Compare the digest of everything read so far with `expected`.
    ///
    /// Returns the number of bytes verified.
    pub fn finish(self, expected: &[u8]) -> Result<u64> {
        let len = self.len;
        let actual = self.hasher.finalize();
        if actual != expected {
            return Err(VerificationError::Mismatch {
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(len)
    }
}
