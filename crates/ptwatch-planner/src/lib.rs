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

//! Gap reconciliation and download planning: given candidates, subscriptions,
//! and a working gap map, decide what to download and how much of it.

mod planner;
mod reconciler;

pub use planner::{plan, DownloadDirective, PlannedItem};
pub use reconciler::{
    reconcile_candidate, DropReason, HistoryStore, LibraryProbe, MediaResolver, ReconcileOutcome,
    ResolvedMedia,
};
