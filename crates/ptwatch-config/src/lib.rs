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

//! Static configuration surface: torrent client selection, per-site RSS feed
//! and filter rules, and peripheral subtitle settings. Loaded once at process
//! start; there is no live-reload watcher here.

mod error;
mod loader;
mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::CONFIG_PATH_ENV;
pub use model::{
    ClientBackend, Config, PtSettings, RssRuleConfig, SiteConfig, SubtitleConfig, SubtitleServer,
    DEFAULT_PT_TAG,
};
pub use validate::validate;
