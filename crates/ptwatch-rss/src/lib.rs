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
#![allow(clippy::module_name_repetitions, clippy::cast_possible_truncation)]

//! RSS feed ingest: fetch, parse, per-site filter, and raw-title parsing
//! into candidate media items.

mod error;
mod fetch;
mod ingest;
mod parse;
mod title_parse;

pub use error::{RssError, RssResult};
pub use fetch::FeedFetcher;
pub use ingest::{ingest_site, FilterSet};
pub use parse::{parse_items, RawItem};
pub use title_parse::parse_title;
