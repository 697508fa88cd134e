//! File checkers and the validation chain.
//!
//! A checker inspects a materialized file and either accepts it or reports a
//! [`CheckError`]. Jobs carry an ordered list of checkers; the first failure
//! stops the chain.

mod digest;
mod signature;

pub use digest::DigestChecker;
pub use signature::SignatureChecker;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use crate::data::MediaResource;
use crate::error::{CheckError, FetchError, Result};

pub trait FileChecker: Send + Sync {
    fn check(&self, path: &Path) -> std::result::Result<(), CheckError>;
}

impl<F> FileChecker for F
where
    F: Fn(&Path) -> std::result::Result<(), CheckError> + Send + Sync,
{
    fn check(&self, path: &Path) -> std::result::Result<(), CheckError> { self(path) }
}

/// A slot in a job's checker chain. An empty slot is skipped with an error log.
#[derive(Clone, Default)]
pub struct Checker(Option<Arc<dyn FileChecker>>);

impl Checker {
    pub fn new(checker: impl FileChecker + 'static) -> Self { Self(Some(Arc::new(checker))) }

    /// Wrap a closure; its signature is inferred from the chain contract.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Path) -> std::result::Result<(), CheckError> + Send + Sync + 'static,
    {
        Self(Some(Arc::new(f)))
    }

    pub fn none() -> Self { Self(None) }

    pub fn is_set(&self) -> bool { self.0.is_some() }

    pub fn get(&self) -> Option<&dyn FileChecker> { self.0.as_deref() }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "Checker(..)" } else { "Checker(none)" })
    }
}

impl From<Arc<dyn FileChecker>> for Checker {
    fn from(checker: Arc<dyn FileChecker>) -> Self { Self(Some(checker)) }
}

impl From<DigestChecker> for Checker {
    fn from(checker: DigestChecker) -> Self { Self::new(checker) }
}

impl From<SignatureChecker> for Checker {
    fn from(checker: SignatureChecker) -> Self { Self::new(checker) }
}

/// Run `checkers` against `local` in order, stopping at the first failure.
pub(crate) fn validate(resource: &MediaResource, local: &Path, checkers: &[Checker]) -> Result<()> {
    debug!(path = %local.display(), checkers = checkers.len(), "checking job");
    for checker in checkers {
        let Some(checker) = checker.get() else {
            error!(path = %local.display(), "invalid checker, skipping");
            continue;
        };
        checker.check(local).map_err(|source| match source {
            CheckError::Io { .. } => FetchError::ValidationFailed {
                resource: resource.to_string(),
                source,
            },
            source => FetchError::Validation {
                resource: resource.to_string(),
                source,
            },
        })?;
    }
    Ok(())
}
