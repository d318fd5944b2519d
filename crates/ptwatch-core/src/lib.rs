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

//! Shared media/torrent DTOs and the torrent-client capability contract used
//! across the ptwatch workspace.

mod client;
mod error;
mod model;

pub use client::{
    Counters, DownloadingHandle, TorrentClient, TorrentFileEntry, TorrentHandle,
    TransferableTorrent,
};
pub use error::{ClientError, ClientResult};
pub use model::{
    title_key, Candidate, GapEntry, GapMap, MediaItem, MediaType, RssHistoryKey, Subscription,
    SubscriptionState,
};
