//! Persistence for [`Subscription`] rows.

use chrono::Utc;
use ptwatch_core::{Subscription, SubscriptionState};
use sqlx::{FromRow, SqlitePool};

use crate::error::{StoreError, StoreResult};

const UPSERT: &str = r"
    INSERT INTO subscriptions (title_key, kind, title, year, season, lack_count, state, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(title_key) DO UPDATE SET
        kind = excluded.kind,
        title = excluded.title,
        year = excluded.year,
        season = excluded.season,
        lack_count = excluded.lack_count,
        state = excluded.state,
        updated_at = excluded.updated_at
";

const SELECT_ALL: &str = r"
    SELECT title_key, kind, title, year, season, lack_count, state
    FROM subscriptions
";

const SELECT_ONE: &str = r"
    SELECT title_key, kind, title, year, season, lack_count, state
    FROM subscriptions
    WHERE title_key = ?1
";

const DELETE: &str = r"DELETE FROM subscriptions WHERE title_key = ?1";

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    #[sqlx(rename = "title_key")]
    _title_key: String,
    kind: String,
    title: String,
    year: Option<i64>,
    season: Option<i64>,
    lack_count: Option<i64>,
    state: String,
}

impl SubscriptionRow {
    fn into_subscription(self) -> StoreResult<Subscription> {
        let state = parse_state(&self.state)?;
        match self.kind.as_str() {
            "movie" => Ok(Subscription::Movie {
                title: self.title,
                year: self.year.unwrap_or_default() as i32,
                state,
            }),
            "tv" => Ok(Subscription::Tv {
                title: self.title,
                year: self.year.map(|year| year as i32),
                season: self.season.unwrap_or(1) as u32,
                lack_count: self.lack_count.unwrap_or(0) as u32,
                state,
            }),
            other => Err(StoreError::UnrecognisedDiscriminator {
                table: "subscriptions",
                value: other.to_string(),
            }),
        }
    }
}

fn parse_state(value: &str) -> StoreResult<SubscriptionState> {
    match value {
        "R" => Ok(SubscriptionState::Ready),
        "D" => Ok(SubscriptionState::PendingResearch),
        "S" => Ok(SubscriptionState::Searching),
        other => Err(StoreError::UnrecognisedDiscriminator {
            table: "subscriptions",
            value: other.to_string(),
        }),
    }
}

const fn state_code(state: SubscriptionState) -> &'static str {
    match state {
        SubscriptionState::Ready => "R",
        SubscriptionState::PendingResearch => "D",
        SubscriptionState::Searching => "S",
    }
}

/// Repository for the `subscriptions` table.
#[derive(Clone)]
pub struct SubscriptionRepo {
    pool: SqlitePool,
}

impl SubscriptionRepo {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update a subscription row.
    pub async fn upsert(&self, subscription: &Subscription) -> StoreResult<()> {
        let title_key = subscription.title_key();
        let now = Utc::now().to_rfc3339();
        let (kind, title, year, season, lack_count, state) = match subscription {
            Subscription::Movie { title, year, state } => (
                "movie",
                title.clone(),
                Some(i64::from(*year)),
                None::<i64>,
                None::<i64>,
                *state,
            ),
            Subscription::Tv {
                title,
                year,
                season,
                lack_count,
                state,
            } => (
                "tv",
                title.clone(),
                year.map(i64::from),
                Some(i64::from(*season)),
                Some(i64::from(*lack_count)),
                *state,
            ),
        };

        sqlx::query(UPSERT)
            .bind(title_key)
            .bind(kind)
            .bind(title)
            .bind(year)
            .bind(season)
            .bind(lack_count)
            .bind(state_code(state))
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "subscriptions.upsert",
                source,
            })?;
        Ok(())
    }

    /// Remove a subscription row (used when a gap closes and it retires).
    pub async fn remove(&self, title_key: &str) -> StoreResult<()> {
        sqlx::query(DELETE)
            .bind(title_key)
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "subscriptions.remove",
                source,
            })?;
        Ok(())
    }

    /// Load every subscription row.
    pub async fn list_all(&self) -> StoreResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "subscriptions.list_all",
                source,
            })?;
        rows.into_iter().map(SubscriptionRow::into_subscription).collect()
    }

    /// Load a single subscription row by `title_key`.
    pub async fn get(&self, title_key: &str) -> StoreResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(SELECT_ONE)
            .bind(title_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "subscriptions.get",
                source,
            })?;
        row.map(SubscriptionRow::into_subscription).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fresh_pool;

    #[tokio::test]
    async fn round_trips_a_tv_subscription() {
        let pool = fresh_pool().await;
        let repo = SubscriptionRepo::new(pool);
        let subscription = Subscription::Tv {
            title: "Example Show".to_string(),
            year: Some(2020),
            season: 2,
            lack_count: 3,
            state: SubscriptionState::Searching,
        };
        repo.upsert(&subscription).await.expect("upsert succeeds");

        let loaded = repo
            .get(&subscription.title_key())
            .await
            .expect("get succeeds")
            .expect("row present");
        assert_eq!(loaded, subscription);
    }

    #[tokio::test]
    async fn remove_deletes_the_row() {
        let pool = fresh_pool().await;
        let repo = SubscriptionRepo::new(pool);
        let subscription = Subscription::Movie {
            title: "Example Movie".to_string(),
            year: 1999,
            state: SubscriptionState::Ready,
        };
        repo.upsert(&subscription).await.expect("upsert succeeds");
        repo.remove(&subscription.title_key()).await.expect("remove succeeds");
        assert!(repo
            .get(&subscription.title_key())
            .await
            .expect("get succeeds")
            .is_none());
    }

    #[tokio::test]
    async fn list_all_returns_every_row() {
        let pool = fresh_pool().await;
        let repo = SubscriptionRepo::new(pool);
        repo.upsert(&Subscription::Movie {
            title: "A".to_string(),
            year: 2001,
            state: SubscriptionState::Ready,
        })
        .await
        .expect("upsert a");
        repo.upsert(&Subscription::Movie {
            title: "B".to_string(),
            year: 2002,
            state: SubscriptionState::Ready,
        })
        .await
        .expect("upsert b");

        let all = repo.list_all().await.expect("list succeeds");
        assert_eq!(all.len(), 2);
    }
}
