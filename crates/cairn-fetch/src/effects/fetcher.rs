use std::fmt;
use std::path::{Path, PathBuf};

use cairn_fs::copy_file;
use tracing::{debug, error, info, warn};

use crate::check::{Checker, validate};
use crate::config::FetchConfig;
use crate::data::{FetchJob, JobPhase, MediaResource, Progress, ProgressSink};
use crate::effects::cache::CacheDirs;
use crate::effects::media::MediaProvider;
use crate::error::{FetchError, MediaError, Result};

/// Outcome of a successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Local paths of every file job that completed, in processing order.
    pub provided: Vec<PathBuf>,
    /// Optional resources that were missing and skipped.
    pub skipped:  Vec<MediaResource>,
}

/// Sequential fetch engine: an ordered job queue, cache roots and trusted keys.
///
/// Jobs run in enqueue order. Each file job is satisfied from the destination
/// or a cache root when a digest-correct copy exists, otherwise from the media
/// provider, and is then run through its checker chain. The first failure ends
/// the batch.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    jobs:         Vec<FetchJob>,
    caches:       CacheDirs,
    trusted_keys: Vec<PathBuf>,
}

impl Fetcher {
    pub fn new() -> Self { Self::default() }

    /// A fetcher with the cache roots, link mode and trusted keys of `config`.
    ///
    /// Cache roots that are not existing directories are logged and dropped.
    pub fn from_config(config: &FetchConfig) -> Self {
        let mut fetcher = Self {
            caches: CacheDirs::new().with_link_options(config.link.options()),
            ..Self::default()
        };
        for dir in &config.cache_dirs {
            fetcher.add_cache_path(dir);
        }
        for key in &config.trusted_keys {
            fetcher.trust_key(key);
        }
        fetcher
    }

    /// Queue `resource`, checked by `checker`.
    pub fn enqueue(&mut self, resource: MediaResource, checker: impl Into<Checker>) {
        self.jobs.push(FetchJob::file(resource).with_checker(checker));
    }

    /// Queue `resource`, checked by its own checksum and then by `checker`.
    pub fn enqueue_digested(&mut self, resource: MediaResource, checker: impl Into<Checker>) {
        self.jobs.push(FetchJob::digested(resource).with_checker(checker));
    }

    /// Queue a directory. `checker` runs on every file the directory expands to.
    pub fn enqueue_dir(&mut self, resource: MediaResource, recursive: bool, checker: impl Into<Checker>) {
        self.jobs.push(FetchJob::directory(resource, recursive).with_checker(checker));
    }

    /// Queue a prepared job.
    pub fn push(&mut self, job: FetchJob) { self.jobs.push(job); }

    /// Register a cache root, searched after the ones already added.
    pub fn add_cache_path(&mut self, dir: impl Into<PathBuf>) -> bool { self.caches.add(dir) }

    /// Trust the keys in `key_file` for every directory signature check.
    pub fn trust_key(&mut self, key_file: impl Into<PathBuf>) { self.trusted_keys.push(key_file.into()); }

    /// Drop all queued jobs. Cache roots and trusted keys are kept.
    pub fn reset(&mut self) { self.jobs.clear(); }

    pub fn jobs(&self) -> &[FetchJob] { &self.jobs }

    pub fn len(&self) -> usize { self.jobs.len() }

    pub fn is_empty(&self) -> bool { self.jobs.is_empty() }

    pub fn cache_dirs(&self) -> &[PathBuf] { self.caches.dirs() }

    pub fn trusted_keys(&self) -> &[PathBuf] { &self.trusted_keys }

    /// An empty queue sharing this fetcher's caches and keys.
    pub(super) fn scoped(&self) -> Self {
        Self {
            jobs:         Vec::new(),
            caches:       self.caches.clone(),
            trusted_keys: self.trusted_keys.clone(),
        }
    }

    /// Run every queued job into `dest_dir`.
    ///
    /// `progress` is told after each top-level file job; returning `false`
    /// stops the batch with [`FetchError::Cancelled`]. Files already placed
    /// stay where they are.
    pub fn start<M>(
        &self,
        dest_dir: &Path,
        media: &mut M,
        mut progress: Option<&mut dyn ProgressSink>,
    ) -> Result<FetchReport>
    where
        M: MediaProvider + ?Sized,
    {
        let mut counter = Progress::new(self.jobs.len() as u64);
        let mut report = FetchReport::default();
        info!(jobs = self.jobs.len(), dest = %dest_dir.display(), "starting fetch");

        for job in &self.jobs {
            if job.is_directory() {
                let leaves = self.expand_dir(media, job.resource(), dest_dir, job.is_recursive())?;
                debug!(resource = %job.resource(), files = leaves.len(), "directory expanded");
                for mut leaf in leaves {
                    leaf.checkers.extend(job.checkers().iter().filter(|c| c.is_set()).cloned());
                    self.fetch_file(&leaf, dest_dir, media, &mut report)?;
                }
                continue;
            }

            self.fetch_file(job, dest_dir, media, &mut report)?;

            counter.completed += 1;
            let keep_going = progress.as_deref_mut().is_none_or(|sink| sink.report(&counter));
            if !keep_going {
                warn!(completed = counter.completed, total = counter.total, "fetch aborted by user");
                return Err(FetchError::Cancelled {
                    completed: counter.completed,
                    total:     counter.total,
                });
            }
        }

        info!(provided = report.provided.len(), skipped = report.skipped.len(), "fetch finished");
        Ok(report)
    }

    fn fetch_file<M>(&self, job: &FetchJob, dest_dir: &Path, media: &mut M, report: &mut FetchReport) -> Result<()>
    where
        M: MediaProvider + ?Sized,
    {
        let resource = job.resource();
        debug!(resource = %resource, phase = %JobPhase::Queued, "processing job");

        let phase = match self.provide_to_dest(resource, dest_dir, media) {
            Ok(phase) => phase,
            Err(FetchError::NotFound { .. }) if resource.is_optional() => {
                info!(resource = %resource, "optional resource not found, skipping");
                report.skipped.push(resource.clone());
                return Ok(());
            }
            Err(e) => {
                error!(resource = %resource, phase = %JobPhase::Failed, error = %e, "can't provide file");
                return Err(e);
            }
        };
        debug!(resource = %resource, phase = %phase, "file in place");

        let local = resource.local_path(dest_dir);
        debug!(resource = %resource, phase = %JobPhase::Validating, "running checkers");
        if let Err(e) = validate(resource, &local, job.checkers()) {
            error!(resource = %resource, phase = %JobPhase::Failed, error = %e, "validation failed");
            return Err(e);
        }

        debug!(resource = %resource, phase = %JobPhase::Done, "job done");
        report.provided.push(local);
        Ok(())
    }

    /// Place `resource` below `dest_dir`, from the caches if possible.
    fn provide_to_dest<M>(&self, resource: &MediaResource, dest_dir: &Path, media: &mut M) -> Result<JobPhase>
    where
        M: MediaProvider + ?Sized,
    {
        if self.caches.provide(resource, dest_dir)? {
            return Ok(JobPhase::CacheHit);
        }

        let dest = resource.local_path(dest_dir);
        debug!(resource = %resource, phase = %JobPhase::Materializing, "not in cache, fetching from media");
        let staged = media.provide_file(resource).map_err(|source| match source {
            MediaError::NotFound(_) => FetchError::NotFound {
                resource: resource.to_string(),
                source,
            },
            source => FetchError::Provide {
                resource: resource.to_string(),
                dest: dest.clone(),
                source,
            },
        })?;

        // A provider may stage straight into the destination.
        if staged != dest {
            copy_file(&staged, &dest).map_err(|source| FetchError::Fs {
                resource: resource.to_string(),
                source,
            })?;
        }

        if let Err(e) = media.release_file(resource) {
            warn!(resource = %resource, error = %e, "can't release staged file");
        }
        Ok(JobPhase::Materializing)
    }
}

impl fmt::Display for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fetcher: {} jobs, {} caches", self.jobs.len(), self.caches.len())?;
        for job in &self.jobs {
            writeln!(f, "  {job}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkMode;
    use crate::data::DirEntry;
    use cairn_verify::Checksum;
    use tempfile::tempdir;

    const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    #[derive(Default)]
    struct NoMedia {
        provided: usize,
    }

    impl MediaProvider for NoMedia {
        fn provide_file(&mut self, resource: &MediaResource) -> std::result::Result<PathBuf, MediaError> {
            self.provided += 1;
            Err(MediaError::NotFound(resource.filename().to_path_buf()))
        }

        fn release_file(&mut self, _: &MediaResource) -> std::result::Result<(), MediaError> { Ok(()) }

        fn dir_info(&mut self, dir: &Path, _: bool, _: u32) -> std::result::Result<Vec<DirEntry>, MediaError> {
            Err(MediaError::NotFound(dir.to_path_buf()))
        }
    }

    #[test]
    fn queue_management() {
        let mut fetcher = Fetcher::new();
        assert!(fetcher.is_empty());

        fetcher.enqueue(MediaResource::new("/a"), Checker::none());
        fetcher.enqueue_digested(MediaResource::new("/b"), Checker::none());
        fetcher.enqueue_dir(MediaResource::new("/dir"), true, Checker::none());

        assert_eq!(fetcher.len(), 3);
        assert_eq!(fetcher.jobs()[1].checkers().len(), 2);
        assert!(fetcher.jobs()[2].is_directory());

        let shown = fetcher.to_string();
        assert!(shown.contains("file /a"));
        assert!(shown.contains("dir /dir (recursive)"));

        fetcher.reset();
        assert!(fetcher.is_empty());
    }

    #[test]
    fn missing_required_file_is_not_found() {
        let dest = tempdir().unwrap();
        let mut fetcher = Fetcher::new();
        fetcher.enqueue(MediaResource::new("/missing"), Checker::none());

        let err = fetcher.start(dest.path(), &mut NoMedia::default(), None).unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(err.resource(), Some("/missing"));
    }

    #[test]
    fn missing_optional_file_is_skipped() {
        let dest = tempdir().unwrap();
        let mut fetcher = Fetcher::new();
        fetcher.enqueue(MediaResource::new("/maybe").with_optional(true), Checker::none());

        let mut media = NoMedia::default();
        let report = fetcher.start(dest.path(), &mut media, None).unwrap();
        assert_eq!(media.provided, 1);
        assert!(report.provided.is_empty());
        assert_eq!(report.skipped, vec![MediaResource::new("/maybe").with_optional(true)]);
    }

    #[test]
    fn destination_copy_skips_media() {
        let dest = tempdir().unwrap();
        std::fs::write(dest.path().join("hello"), "hello world").unwrap();

        let resource = MediaResource::new("/hello").with_checksum(Checksum::sha1(HELLO_SHA1));
        let mut fetcher = Fetcher::new();
        fetcher.enqueue_digested(resource, Checker::none());

        let mut media = NoMedia::default();
        let report = fetcher.start(dest.path(), &mut media, None).unwrap();
        assert_eq!(media.provided, 0);
        assert_eq!(report.provided, vec![dest.path().join("hello")]);
    }

    #[test]
    fn from_config_drops_bad_cache_roots() {
        let cache = tempdir().unwrap();
        let config = FetchConfig {
            cache_dirs:   vec![cache.path().to_path_buf(), cache.path().join("missing")],
            trusted_keys: vec![PathBuf::from("/etc/keys/vendor.key")],
            link:         LinkMode::Copy,
        };

        let fetcher = Fetcher::from_config(&config);
        assert_eq!(fetcher.cache_dirs(), &[cache.path().to_path_buf()]);
        assert_eq!(fetcher.trusted_keys(), &[PathBuf::from("/etc/keys/vendor.key")]);
    }
}
