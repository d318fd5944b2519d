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

//! Post-acquisition scheduled jobs: transferring completed downloads out,
//! reaping torrents past their seeding window, and retrying subscriptions
//! that fell back to a research state.

mod reaper;
mod retry;
mod transfer;

pub use reaper::SeedingReaper;
pub use retry::{RssRetry, SearchOutcome, Searcher, SubscriptionRepository};
pub use transfer::{ExternalTransfer, TransferWorker};
