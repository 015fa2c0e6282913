use anyhow::Result;
use chrono::{DateTime, Utc};
use game_core::{normalize_record, record_match_result};
use game_types::{LocalStatsRecord, MatchOutcome, RecentResult};
use tracing::{debug, warn};

use super::{KeyChange, KeyValueStore};

pub const STREAK_KEY: &str = "wb_streak";
pub const BEST_STREAK_KEY: &str = "wb_best_streak";
pub const RECENT_RESULTS_KEY: &str = "wb_recent_results";

/// Typed view over the three stats keys. The record is validated as a whole
/// when read; anything unreadable resets it to the default record.
pub struct LocalStatsRepository<S> {
    store: S,
}

impl<S: KeyValueStore> LocalStatsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load(&self) -> Result<LocalStatsRecord> {
        let streak = self.store.get(STREAK_KEY).await?;
        let best_streak = self.store.get(BEST_STREAK_KEY).await?;
        let recent_results = self.store.get(RECENT_RESULTS_KEY).await?;

        match parse_record(
            streak.as_deref(),
            best_streak.as_deref(),
            recent_results.as_deref(),
        ) {
            Ok(record) => Ok(normalize_record(record)),
            Err(e) => {
                warn!("Discarding unreadable local stats: {}", e);
                Ok(LocalStatsRecord::default())
            }
        }
    }

    /// Writes all three keys in one batch.
    pub async fn save(&self, record: &LocalStatsRecord) -> Result<()> {
        let recent = serde_json::to_string(&record.recent_results)?;

        self.store
            .apply(vec![
                KeyChange::set(STREAK_KEY, record.streak.to_string()),
                KeyChange::set(BEST_STREAK_KEY, record.best_streak.to_string()),
                KeyChange::set(RECENT_RESULTS_KEY, recent),
            ])
            .await
    }

    /// Removes all three keys together.
    pub async fn clear(&self) -> Result<()> {
        self.store
            .apply(vec![
                KeyChange::remove(STREAK_KEY),
                KeyChange::remove(BEST_STREAK_KEY),
                KeyChange::remove(RECENT_RESULTS_KEY),
            ])
            .await?;
        debug!("Local stats cleared");
        Ok(())
    }

    /// Loads, applies one finished match and writes the record back.
    pub async fn record_result(
        &self,
        outcome: MatchOutcome,
        label: &str,
        finished_at: DateTime<Utc>,
    ) -> Result<LocalStatsRecord> {
        let mut record = self.load().await?;
        record_match_result(&mut record, outcome, label, finished_at);
        self.save(&record).await?;
        Ok(record)
    }
}

fn parse_record(
    streak: Option<&str>,
    best_streak: Option<&str>,
    recent_results: Option<&str>,
) -> Result<LocalStatsRecord> {
    let streak = streak.map(|s| s.trim().parse::<u32>()).transpose()?;
    let best_streak = best_streak.map(|s| s.trim().parse::<u32>()).transpose()?;
    let recent_results = recent_results
        .map(|raw| serde_json::from_str::<Vec<RecentResult>>(raw))
        .transpose()?;

    Ok(LocalStatsRecord {
        streak: streak.unwrap_or(0),
        best_streak: best_streak.unwrap_or(0),
        recent_results: recent_results.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::{MemoryKeyValueStore, SqliteKeyValueStore};
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> LocalStatsRepository<SqliteKeyValueStore> {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        LocalStatsRepository::new(SqliteKeyValueStore::new(db))
    }

    #[tokio::test]
    async fn test_empty_store_loads_default() {
        let repo = setup_test_db().await;
        assert_eq!(repo.load().await.unwrap(), LocalStatsRecord::default());
    }

    #[tokio::test]
    async fn test_streaks_across_results() {
        let repo = setup_test_db().await;
        let now = Utc::now();

        repo.record_result(MatchOutcome::Win, "3-1", now).await.unwrap();
        repo.record_result(MatchOutcome::Win, "2-0", now).await.unwrap();
        repo.record_result(MatchOutcome::Tie, "1-1", now).await.unwrap();
        let record = repo.record_result(MatchOutcome::Loss, "0-2", now).await.unwrap();

        assert_eq!(record.streak, 0);
        assert_eq!(record.best_streak, 2);
        assert_eq!(record.recent_results.len(), 4);
        assert_eq!(record.recent_results[0].outcome, MatchOutcome::Loss);
        assert_eq!(record.recent_results[0].label, "0-2");

        assert_eq!(repo.load().await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_recent_results_are_bounded() {
        let repo = setup_test_db().await;
        let now = Utc::now();

        for i in 0..8 {
            repo.record_result(MatchOutcome::Win, &format!("{}-0", i), now)
                .await
                .unwrap();
        }

        let record = repo.load().await.unwrap();
        assert_eq!(record.recent_results.len(), 5);
        assert_eq!(record.recent_results[0].label, "7-0");
        assert_eq!(record.streak, 8);
        assert_eq!(record.best_streak, 8);
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let repo = setup_test_db().await;
        repo.record_result(MatchOutcome::Win, "1-0", Utc::now())
            .await
            .unwrap();

        repo.clear().await.unwrap();

        assert_eq!(repo.load().await.unwrap(), LocalStatsRecord::default());
        assert_eq!(repo.store().get(STREAK_KEY).await.unwrap(), None);
        assert_eq!(repo.store().get(RECENT_RESULTS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_record() {
        use sea_orm::ConnectionTrait;

        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let repo = LocalStatsRepository::new(SqliteKeyValueStore::new(db.clone()));
        let before = repo
            .record_result(MatchOutcome::Win, "2-1", Utc::now())
            .await
            .unwrap();

        db.execute_unprepared(
            "CREATE TRIGGER reject_recent BEFORE UPDATE ON local_kv \
             WHEN NEW.storage_key = 'wb_recent_results' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .await
        .unwrap();

        assert!(
            repo.record_result(MatchOutcome::Win, "3-0", Utc::now())
                .await
                .is_err()
        );
        assert_eq!(repo.load().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_values_reset_to_default() {
        let repo = LocalStatsRepository::new(MemoryKeyValueStore::new());
        repo.store().set(STREAK_KEY, "3").await.unwrap();
        repo.store().set(RECENT_RESULTS_KEY, "{not json").await.unwrap();

        assert_eq!(repo.load().await.unwrap(), LocalStatsRecord::default());

        repo.store().set(RECENT_RESULTS_KEY, "[]").await.unwrap();
        repo.store().set(BEST_STREAK_KEY, "-1").await.unwrap();
        assert_eq!(repo.load().await.unwrap(), LocalStatsRecord::default());
    }

    #[tokio::test]
    async fn test_best_streak_never_below_streak() {
        let repo = LocalStatsRepository::new(MemoryKeyValueStore::new());
        repo.store().set(STREAK_KEY, "4").await.unwrap();
        repo.store().set(BEST_STREAK_KEY, "1").await.unwrap();

        let record = repo.load().await.unwrap();
        assert_eq!(record.streak, 4);
        assert_eq!(record.best_streak, 4);
    }

    #[tokio::test]
    async fn test_stored_format() {
        let repo = LocalStatsRepository::new(MemoryKeyValueStore::new());
        repo.record_result(MatchOutcome::Win, "5-3", Utc::now())
            .await
            .unwrap();

        assert_eq!(
            repo.store().get(STREAK_KEY).await.unwrap().as_deref(),
            Some("1")
        );
        let raw = repo.store().get(RECENT_RESULTS_KEY).await.unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["outcome"], "WIN");
        assert_eq!(parsed[0]["label"], "5-3");
        assert!(parsed[0]["timestamp"].is_string());
    }
}
