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

//! Wires the persistence, RSS ingest, planner, driver, and lifecycle crates
//! into a runnable scheduler, and exposes the CLI that drives it.
//!
//! Layout: `adapters.rs` (trait bridges and out-of-scope collaborator
//! placeholders), `jobs.rs` (the four scheduler jobs), `cli.rs` (argument
//! parsing and dispatch), with a thin `main.rs` delegating to [`cli::run`].

/// Trait bridges between storage and the planner/lifecycle contracts, plus
/// placeholder external collaborators.
pub mod adapters;
/// Command-line argument parsing and dispatch.
pub mod cli;
/// Application-level error type.
pub mod error;
/// The four scheduler jobs.
pub mod jobs;

use adapters::{NoSearcher, NoTransfer, UncheckedLibrary, UnconfiguredClient, UnresolvedMedia};
use error::AppResult;
use ptwatch_config::Config;
use ptwatch_events::EventBus;
use ptwatch_store::Store;

pub use cli::run;

/// Environment variable naming the SQLite database file path.
pub const DB_PATH_ENV: &str = "PTWATCH_DB_PATH";

const DEFAULT_DB_PATH: &str = "ptwatch.sqlite3";

/// Every dependency a scheduler job needs, wired once at process start.
pub struct Services {
    /// Loaded, validated configuration.
    pub config: Config,
    /// Opened, migrated persistence store.
    pub store: Store,
    /// Domain event bus observing the scheduler jobs.
    pub events: EventBus,
    /// Torrent-client backend. A placeholder until a real qBittorrent- or
    /// Transmission-style driver is wired in.
    pub client: UnconfiguredClient,
    /// Media metadata resolver. A placeholder until a real catalog lookup is wired in.
    pub resolver: UnresolvedMedia,
    /// Media-server library probe. A placeholder until a real catalog check is wired in.
    pub probe: UncheckedLibrary,
    /// External transfer step. A placeholder until a real mover is wired in.
    pub transfer: NoTransfer,
    /// On-demand search fallback. A placeholder until a real indexer client is wired in.
    pub searcher: NoSearcher,
}

impl Services {
    /// Load configuration from [`ptwatch_config::CONFIG_PATH_ENV`], open the
    /// database named by [`DB_PATH_ENV`] (or [`DEFAULT_DB_PATH`]), and wire
    /// up every job dependency.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load/validate or the
    /// database cannot be opened and migrated.
    pub async fn bootstrap() -> AppResult<Self> {
        let config = Config::load_from_env()?;
        let db_path = std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let store = Store::open(&db_path).await?;
        Ok(Self {
            config,
            store,
            events: EventBus::new(),
            client: UnconfiguredClient,
            resolver: UnresolvedMedia,
            probe: UncheckedLibrary,
            transfer: NoTransfer,
            searcher: NoSearcher,
        })
    }
}
