#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Drives planned downloads through a torrent-client backend, resolving
//! backend-specific handle and file-selection quirks.

mod driver;
mod episode_extractor;

pub use driver::{AbortReason, DownloadDriver, DriveOutcome};
pub use episode_extractor::extract_episodes;
