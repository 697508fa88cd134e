//! Directory expansion through the `SHA1SUMS` trust chain.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::check::SignatureChecker;
use crate::core::{
    CHECKSUMS_FILE, CHECKSUMS_KEY, CHECKSUMS_PREFIX, CHECKSUMS_SIGNATURE, DigestIndex, parse_manifest,
};
use crate::data::{FetchJob, FileType, MediaResource};
use crate::effects::fetcher::Fetcher;
use crate::effects::media::MediaProvider;
use crate::error::{FetchError, Result};

impl Fetcher {
    /// Turn the directory `resource` into digested file jobs.
    ///
    /// In order: the detached signature `SHA1SUMS.asc` is fetched, then the
    /// key `SHA1SUMS.key`, then the manifest `SHA1SUMS`, which must pass the
    /// signature check built from the first two. Every other file becomes a
    /// job checked against its manifest digest (empty when unlisted).
    /// Subdirectories are expanded the same way, each with its own chain,
    /// when `recursive` is set. Entries that are neither files nor
    /// directories are skipped.
    ///
    /// Trust-chain files are fetched into `dest_dir` immediately; the returned
    /// jobs are not run.
    pub fn expand_dir<M>(
        &self,
        media: &mut M,
        resource: &MediaResource,
        dest_dir: &Path,
        recursive: bool,
    ) -> Result<Vec<FetchJob>>
    where
        M: MediaProvider + ?Sized,
    {
        let entries = media
            .dir_info(resource.filename(), false, resource.media_nr())
            .map_err(|source| FetchError::Listing {
                resource: resource.to_string(),
                source,
            })?;
        let listed = |name: &str| entries.iter().any(|entry| entry.name == name);

        // A listed signature binds the manifest even when the file can't be
        // provided; checking then fails on the missing signature.
        let mut signature = SignatureChecker::new();
        if listed(CHECKSUMS_SIGNATURE) {
            let asc = resource.join(CHECKSUMS_SIGNATURE);
            self.fetch_companion(media, asc.clone(), dest_dir, None)?;
            signature = SignatureChecker::with_signature(asc.local_path(dest_dir));
        }

        for key in self.trusted_keys() {
            signature.add_public_key(key);
        }
        if listed(CHECKSUMS_KEY) {
            if let Some(local) = self.fetch_companion(media, resource.join(CHECKSUMS_KEY), dest_dir, None)? {
                signature.add_public_key(local);
            }
        }

        let mut index = DigestIndex::new();
        if listed(CHECKSUMS_FILE) {
            let manifest = resource.join(CHECKSUMS_FILE);
            let Some(local) = self.fetch_companion(media, manifest.clone(), dest_dir, Some(signature))? else {
                return Err(FetchError::Io {
                    resource: manifest.to_string(),
                    path:     manifest.local_path(dest_dir),
                    source:   io::Error::new(io::ErrorKind::NotFound, "can't open checksums file"),
                });
            };
            index = read_manifest(&manifest, &local)?;
            debug!(resource = %resource, digests = index.len(), "read checksums file");
        } else {
            info!(resource = %resource, "no checksums file, files will be fetched without expected digests");
        }

        let mut jobs = Vec::new();
        for entry in &entries {
            if entry.name.starts_with(CHECKSUMS_PREFIX) {
                continue;
            }
            match entry.file_type {
                FileType::File | FileType::NotAvailable => {
                    let checksum = index.checksum_for(&entry.name);
                    jobs.push(FetchJob::digested(resource.join(&entry.name).with_checksum(checksum)));
                }
                FileType::Dir if recursive => {
                    jobs.extend(self.expand_dir(media, &resource.join(&entry.name), dest_dir, true)?);
                }
                FileType::Dir => {}
                other => {
                    debug!(resource = %resource, entry = %entry.name, file_type = ?other, "skipping special file");
                }
            }
        }
        Ok(jobs)
    }

    /// Fetch one trust-chain file with a throwaway queue. Returns its local
    /// path, or `None` when the media no longer has it. Callers decide what a
    /// listed but missing file means.
    fn fetch_companion<M>(
        &self,
        media: &mut M,
        resource: MediaResource,
        dest_dir: &Path,
        checker: Option<SignatureChecker>,
    ) -> Result<Option<PathBuf>>
    where
        M: MediaProvider + ?Sized,
    {
        let mut job = FetchJob::file(resource.with_optional(true));
        if let Some(checker) = checker {
            job = job.with_checker(checker);
        }

        let mut fetcher = self.scoped();
        fetcher.push(job);
        let report = fetcher.start(dest_dir, media, None)?;
        fetcher.reset();

        if let Some(skipped) = report.skipped.first() {
            warn!(resource = %skipped, "listed but not provided");
        }
        Ok(report.provided.into_iter().next())
    }
}

fn read_manifest(manifest: &MediaResource, local: &Path) -> Result<DigestIndex> {
    let content = std::fs::read_to_string(local).map_err(|source| FetchError::Io {
        resource: manifest.to_string(),
        path: local.to_path_buf(),
        source,
    })?;
    parse_manifest(&content).map_err(|e| FetchError::ManifestFormat {
        resource: manifest.to_string(),
        path:     local.to_path_buf(),
        line:     e.line,
        content:  e.content,
    })
}
