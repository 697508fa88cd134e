//! I/O: media access, cache lookup and the fetch engine.

mod cache;
mod expand;
mod fetcher;
mod media;

pub use cache::CacheDirs;
pub use fetcher::{FetchReport, Fetcher};
pub use media::{LocalMedia, MediaProvider};
