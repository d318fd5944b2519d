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

//! Persistence for subscriptions and RSS dedup history, backed by `sqlx`
//! against a single-file SQLite database.

mod error;
mod rss_history_repo;
mod subscription_repo;

pub use error::{StoreError, StoreResult};
pub use rss_history_repo::RssHistoryRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
pub use subscription_repo::SubscriptionRepo;

/// Opened, migrated connection to the ptwatch database.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if absent) the database at `path` and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn open(path: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Query {
                operation: "store.open",
                source,
            })?;
        Self::from_pool(pool).await
    }

    /// Wrap an already-connected pool and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::Migration)?;
        Ok(Self { pool })
    }

    /// Repository for persisted subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> SubscriptionRepo {
        SubscriptionRepo::new(self.pool.clone())
    }

    /// Repository for RSS dedup history.
    #[must_use]
    pub fn rss_history(&self) -> RssHistoryRepo {
        RssHistoryRepo::new(self.pool.clone())
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::SqlitePool;

    pub(crate) async fn fresh_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:")
            .await
            .expect("in-memory sqlite connects");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations apply");
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::testing::fresh_pool;
    use super::*;

    #[tokio::test]
    async fn open_creates_and_migrates_a_database_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ptwatch.sqlite3");
        let store = Store::open(path.to_str().expect("utf-8 path"))
            .await
            .expect("store opens");
        assert!(store.subscriptions().list_all().await.expect("list succeeds").is_empty());
    }

    #[tokio::test]
    async fn from_pool_wraps_an_already_migrated_pool() {
        let pool = fresh_pool().await;
        let store = Store::from_pool(pool).await.expect("store wraps pool");
        assert!(store.rss_history().contains(&ptwatch_core::RssHistoryKey {
            title_key: "x".to_string(),
            season_episode_key: "y".to_string(),
        })
        .await
        .expect("contains succeeds")
        .eq(&false));
    }
}
