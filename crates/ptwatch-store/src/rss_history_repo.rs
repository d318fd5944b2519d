//! Dedup history for items already claimed from RSS feeds.

use chrono::Utc;
use ptwatch_core::RssHistoryKey;
use sqlx::SqlitePool;

use crate::error::{StoreError, StoreResult};

const INSERT_IGNORE: &str = r"
    INSERT OR IGNORE INTO rss_history (title_key, season_episode_key, seen_at)
    VALUES (?1, ?2, ?3)
";

const EXISTS: &str = r"
    SELECT 1 FROM rss_history WHERE title_key = ?1 AND season_episode_key = ?2
";

const DELETE_FOR_TITLE: &str = r"DELETE FROM rss_history WHERE title_key = ?1";

/// Repository for the `rss_history` dedup table.
#[derive(Clone)]
pub struct RssHistoryRepo {
    pool: SqlitePool,
}

impl RssHistoryRepo {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that a candidate matching this key has been claimed.
    ///
    /// Idempotent: re-recording the same key is a no-op.
    pub async fn record(&self, key: &RssHistoryKey) -> StoreResult<()> {
        sqlx::query(INSERT_IGNORE)
            .bind(&key.title_key)
            .bind(&key.season_episode_key)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "rss_history.record",
                source,
            })?;
        Ok(())
    }

    /// Whether this key has already been claimed.
    pub async fn contains(&self, key: &RssHistoryKey) -> StoreResult<bool> {
        let row = sqlx::query(EXISTS)
            .bind(&key.title_key)
            .bind(&key.season_episode_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "rss_history.contains",
                source,
            })?;
        Ok(row.is_some())
    }

    /// Drop all dedup history for a title (used when a subscription retires).
    pub async fn clear_for_title(&self, title_key: &str) -> StoreResult<()> {
        sqlx::query(DELETE_FOR_TITLE)
            .bind(title_key)
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "rss_history.clear_for_title",
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fresh_pool;

    #[tokio::test]
    async fn record_then_contains_is_idempotent() {
        let pool = fresh_pool().await;
        let repo = RssHistoryRepo::new(pool);
        let key = RssHistoryKey {
            title_key: "show::2020".to_string(),
            season_episode_key: "s01e02".to_string(),
        };
        assert!(!repo.contains(&key).await.expect("contains succeeds"));
        repo.record(&key).await.expect("record succeeds");
        repo.record(&key).await.expect("second record is a no-op");
        assert!(repo.contains(&key).await.expect("contains succeeds"));
    }

    #[tokio::test]
    async fn clear_for_title_drops_only_that_title() {
        let pool = fresh_pool().await;
        let repo = RssHistoryRepo::new(pool);
        let kept = RssHistoryKey {
            title_key: "other::2019".to_string(),
            season_episode_key: "s01e01".to_string(),
        };
        let dropped = RssHistoryKey {
            title_key: "show::2020".to_string(),
            season_episode_key: "s01e01".to_string(),
        };
        repo.record(&kept).await.expect("record kept");
        repo.record(&dropped).await.expect("record dropped");

        repo.clear_for_title("show::2020").await.expect("clear succeeds");

        assert!(repo.contains(&kept).await.expect("contains succeeds"));
        assert!(!repo.contains(&dropped).await.expect("contains succeeds"));
    }
}
