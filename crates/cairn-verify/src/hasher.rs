use digest::Digest;

/// Incremental hash state.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapter for any RustCrypto [`Digest`].
#[derive(Clone, Default)]
pub struct DigestHasher<D>(D);

pub type Sha1Hasher = DigestHasher<sha1::Sha1>;
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

impl<D: Digest> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    /// One-shot digest of `data`.
    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }

    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}
