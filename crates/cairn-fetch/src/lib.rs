//! Cache-aware fetching of media resources with trust-chain verification.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - `data` - Immutable resources, jobs and progress types
//! - [`core`] - Pure transformations (checksum manifest parsing)
//! - `effects` - Media access, cache lookup and the fetch engine
//!
//! # Key Features
//!
//! - **Cache First**: destination and cache roots are used only when a known
//!   digest matches; an empty digest never trusts a local copy
//! - **Hardlink Placement**: cached files are hardlinked, copied across devices
//! - **Trust Chain**: directories are expanded through `SHA1SUMS.asc`,
//!   `SHA1SUMS.key` and `SHA1SUMS`, in that order
//! - **Cooperative Cancellation**: the progress sink can stop a batch between jobs
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use cairn_fetch::{Checker, Fetcher, LocalMedia, MediaResource, Progress};
//!
//! let mut fetcher = Fetcher::new();
//! fetcher.add_cache_path("/var/cache/cairn");
//! fetcher.enqueue_dir(MediaResource::new("/suse/x86_64"), true, Checker::none());
//!
//! let mut media = LocalMedia::new("/media/dvd");
//! let mut sink = |p: &Progress| {
//!     println!("{}/{}", p.completed, p.total);
//!     true
//! };
//! fetcher.start(Path::new("/srv/mirror"), &mut media, Some(&mut sink))?;
//! # Ok::<(), cairn_fetch::FetchError>(())
//! ```

mod check;
mod config;
pub mod core;
mod data;
mod effects;
mod error;

pub use check::{Checker, DigestChecker, FileChecker, SignatureChecker};
pub use config::{ConfigError, FetchConfig, LinkMode};
pub use data::{DirEntry, FetchJob, FileType, JobPhase, MediaResource, Progress, ProgressSink};
pub use effects::{CacheDirs, FetchReport, Fetcher, LocalMedia, MediaProvider};
pub use error::{CheckError, FetchError, MediaError, Result};
