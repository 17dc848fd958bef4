//! Durable key-value storage for progress snapshots
//!
//! Two keys live under the data directory: `progress` holds the
//! JSON-serialized category list and `timestamp` holds the RFC 3339
//! wall-clock time of the save. Both are written on suspend and read back
//! on resume.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use crate::error::PersistenceError;
use crate::state::Category;

const PROGRESS_KEY: &str = "progress";
const TIMESTAMP_KEY: &str = "timestamp";

/// A snapshot read back from storage, not yet corrected for elapsed time.
#[derive(Debug, Clone)]
pub struct StoredProgress {
    pub categories: Vec<Category>,
    pub saved_at: DateTime<Utc>,
}

/// File-backed store for the two progress keys.
#[derive(Debug, Clone)]
pub struct ProgressStorage {
    dir: PathBuf,
}

impl ProgressStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the default data directory for the app.
    /// Falls back to the current directory when no data dir is found.
    pub fn default_dir() -> PathBuf {
        match dirs::data_local_dir() {
            Some(data_dir) => data_dir.join("timerdeck"),
            None => PathBuf::from("."),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Write both keys: the full live snapshot and the save timestamp.
    pub async fn save(
        &self,
        categories: &[Category],
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;

        let progress_path = self.key_path(PROGRESS_KEY);
        let payload = serde_json::to_string(categories)?;
        fs::write(&progress_path, payload)
            .await
            .map_err(|e| Self::io_error(&progress_path, e))?;

        let timestamp_path = self.key_path(TIMESTAMP_KEY);
        fs::write(&timestamp_path, at.to_rfc3339())
            .await
            .map_err(|e| Self::io_error(&timestamp_path, e))?;

        debug!("Saved {} categories at {}", categories.len(), at);
        Ok(())
    }

    /// Read both keys. A missing key means first run and yields `None`.
    pub async fn load(&self) -> Result<Option<StoredProgress>, PersistenceError> {
        let progress_path = self.key_path(PROGRESS_KEY);
        let stored = match fs::read_to_string(&progress_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&progress_path, e)),
        };

        let timestamp_path = self.key_path(TIMESTAMP_KEY);
        let timestamp = match fs::read_to_string(&timestamp_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&timestamp_path, e)),
        };

        let categories: Vec<Category> = serde_json::from_str(&stored)?;
        let saved_at = DateTime::parse_from_rfc3339(timestamp.trim())
            .map_err(|_| PersistenceError::Timestamp(timestamp.trim().to_string()))?
            .with_timezone(&Utc);

        Ok(Some(StoredProgress {
            categories,
            saved_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Timer;

    fn sample_categories() -> Vec<Category> {
        let mut work = Category::with_timer("Work", Timer::new("Focus", 300));
        work.timers.push(Timer::new("Review", 600));
        work.timers[0].running = true;
        work.timers[0].time_left = 120;
        work.recompute_running();
        vec![work, Category::with_timer("Home", Timer::new("Laundry", 900))]
    }

    #[tokio::test]
    async fn save_then_load_round_trips_structurally() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProgressStorage::new(dir.path());
        let categories = sample_categories();
        let at = Utc::now();

        storage.save(&categories, at).await.unwrap();
        let stored = storage.load().await.unwrap().unwrap();

        assert_eq!(stored.categories, categories);
        assert_eq!(stored.saved_at.timestamp(), at.timestamp());
    }

    #[tokio::test]
    async fn missing_keys_mean_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProgressStorage::new(dir.path());
        assert!(storage.load().await.unwrap().is_none());

        // Only one of the two keys present is still a first run.
        tokio::fs::create_dir_all(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join("progress"), "[]")
            .await
            .unwrap();
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_timestamp_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProgressStorage::new(dir.path());
        tokio::fs::write(dir.path().join("progress"), "[]")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("timestamp"), "not-a-date")
            .await
            .unwrap();

        assert!(matches!(
            storage.load().await,
            Err(PersistenceError::Timestamp(_))
        ));
    }
}
