//! SQLite-backed option and job store via libsql. Implements OptionStore and JobRegistry.
//!
//! One database file (`wp-digest.db`) in the data directory. Options are a flat
//! name/value table; jobs are keyed by hook name with the next run as a unix timestamp.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use libsql::{Database, params};
use tracing::info;

use crate::domain::{DomainError, ScheduledJob};
use crate::ports::{JobRegistry, OptionStore};

const OPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS options (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL DEFAULT ''
)"#;

const JOBS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scheduled_jobs (
    hook TEXT PRIMARY KEY,
    next_run INTEGER NOT NULL,
    interval_secs INTEGER NOT NULL
)"#;

fn store_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Store(e.to_string())
}

fn to_utc(ts: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| DomainError::Store(format!("timestamp out of range: {}", ts)))
}

pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Connect to (or create) the database and ensure the schema exists.
    /// Call once at startup; the store is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(store_err)?;
        let db_path = base.join("wp-digest.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(store_err)?;
        let conn = db.connect().map_err(store_err)?;

        // PRAGMA returns a row; use query and drain it.
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Store(format!("WAL pragma failed: {}", e)))?;
        while wal_rows.next().await.map_err(store_err)?.is_some() {}

        conn.execute(OPTIONS_TABLE, ()).await.map_err(store_err)?;
        conn.execute(JOBS_TABLE, ()).await.map_err(store_err)?;

        info!(path = %db_path.display(), "settings store ready");
        Ok(Self { db, db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<libsql::Connection, DomainError> {
        self.db.connect().map_err(store_err)
    }
}

#[async_trait::async_trait]
impl OptionStore for SqliteStore {
    async fn load_options(&self) -> Result<HashMap<String, String>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT name, value FROM options", ())
            .await
            .map_err(store_err)?;
        let mut options = HashMap::new();
        while let Some(row) = rows.next().await.map_err(store_err)? {
            let name: String = row.get(0).map_err(store_err)?;
            let value: String = row.get::<String>(1).unwrap_or_default();
            options.insert(name, value);
        }
        Ok(options)
    }

    async fn save_options(&self, options: &[(String, String)]) -> Result<(), DomainError> {
        if options.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(store_err)?;
        for (name, value) in options {
            tx.execute(
                r#"
                INSERT INTO options (name, value) VALUES (?1, ?2)
                ON CONFLICT (name) DO UPDATE SET value = excluded.value
                "#,
                params![name.as_str(), value.as_str()],
            )
            .await
            .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn add_missing(&self, options: &[(String, String)]) -> Result<usize, DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(store_err)?;
        let mut added = 0usize;
        for (name, value) in options {
            added += tx
                .execute(
                    "INSERT INTO options (name, value) VALUES (?1, ?2) ON CONFLICT (name) DO NOTHING",
                    params![name.as_str(), value.as_str()],
                )
                .await
                .map_err(store_err)? as usize;
        }
        tx.commit().await.map_err(store_err)?;
        Ok(added)
    }

    async fn delete_options(&self, keys: &[&str]) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(store_err)?;
        for key in keys {
            tx.execute("DELETE FROM options WHERE name = ?1", params![*key])
                .await
                .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobRegistry for SqliteStore {
    async fn schedule(
        &self,
        hook: &str,
        next_run: DateTime<Utc>,
        interval_secs: i64,
    ) -> Result<(), DomainError> {
        self.conn()?
            .execute(
                r#"
                INSERT INTO scheduled_jobs (hook, next_run, interval_secs) VALUES (?1, ?2, ?3)
                ON CONFLICT (hook) DO UPDATE SET
                    next_run = excluded.next_run,
                    interval_secs = excluded.interval_secs
                "#,
                params![hook, next_run.timestamp(), interval_secs],
            )
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn clear(&self, hook: &str) -> Result<bool, DomainError> {
        let removed = self
            .conn()?
            .execute("DELETE FROM scheduled_jobs WHERE hook = ?1", params![hook])
            .await
            .map_err(store_err)?;
        Ok(removed > 0)
    }

    async fn clear_all(&self) -> Result<usize, DomainError> {
        let removed = self
            .conn()?
            .execute("DELETE FROM scheduled_jobs", ())
            .await
            .map_err(store_err)?;
        Ok(removed as usize)
    }

    async fn next_scheduled(&self, hook: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT next_run FROM scheduled_jobs WHERE hook = ?1",
                params![hook],
            )
            .await
            .map_err(store_err)?;
        match rows.next().await.map_err(store_err)? {
            Some(row) => Ok(Some(to_utc(row.get(0).map_err(store_err)?)?)),
            None => Ok(None),
        }
    }

    async fn due_jobs(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT hook, next_run, interval_secs FROM scheduled_jobs
                WHERE next_run <= ?1
                ORDER BY next_run ASC
                "#,
                params![now.timestamp()],
            )
            .await
            .map_err(store_err)?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next().await.map_err(store_err)? {
            jobs.push(ScheduledJob {
                hook: row.get(0).map_err(store_err)?,
                next_run: to_utc(row.get(1).map_err(store_err)?)?,
                interval_secs: row.get(2).map_err(store_err)?,
            });
        }
        Ok(jobs)
    }

    async fn advance(&self, hook: &str, next_run: DateTime<Utc>) -> Result<(), DomainError> {
        self.conn()?
            .execute(
                "UPDATE scheduled_jobs SET next_run = ?1 WHERE hook = ?2",
                params![next_run.timestamp(), hook],
            )
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[tokio::test]
    async fn options_upsert_and_add_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(dir.path()).await.unwrap();
        assert!(store.path().ends_with("wp-digest.db"));

        store.save_options(&[pair("subject", "One")]).await.unwrap();
        store.save_options(&[pair("subject", "Two")]).await.unwrap();
        let added = store
            .add_missing(&[pair("subject", "Default"), pair("enabled", "1")])
            .await
            .unwrap();
        assert_eq!(added, 1);

        let map = store.load_options().await.unwrap();
        assert_eq!(map["subject"], "Two");
        assert_eq!(map["enabled"], "1");

        store.delete_options(&["subject", "enabled"]).await.unwrap();
        assert!(store.load_options().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn jobs_survive_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();
        {
            let store = SqliteStore::connect(dir.path()).await.unwrap();
            store.schedule("weekly_digest_send", at, 604_800).await.unwrap();
        }
        let store = SqliteStore::connect(dir.path()).await.unwrap();
        assert_eq!(
            store.next_scheduled("weekly_digest_send").await.unwrap(),
            Some(at)
        );

        let before = at - chrono::TimeDelta::hours(1);
        assert!(store.due_jobs(before).await.unwrap().is_empty());
        let due = store.due_jobs(at).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].interval_secs, 604_800);

        let later = at + chrono::TimeDelta::days(7);
        store.advance("weekly_digest_send", later).await.unwrap();
        assert_eq!(
            store.next_scheduled("weekly_digest_send").await.unwrap(),
            Some(later)
        );

        assert!(store.clear("weekly_digest_send").await.unwrap());
        assert!(!store.clear("weekly_digest_send").await.unwrap());
    }

    #[tokio::test]
    async fn clear_all_drops_every_hook() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(dir.path()).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();
        store.schedule("weekly_digest_send", at, 604_800).await.unwrap();
        store.schedule("weekly_digest_cleanup", at, 86_400).await.unwrap();

        assert_eq!(store.clear_all().await.unwrap(), 2);
        assert!(store.due_jobs(at).await.unwrap().is_empty());
        assert_eq!(store.clear_all().await.unwrap(), 0);
    }
}
