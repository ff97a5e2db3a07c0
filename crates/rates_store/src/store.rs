use log::{debug, warn};
use rates_model::{DailyRate, MonthKey, merge_rates};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

const LATEST_FILE_NAME: &str = "latest.json";

/// On-disk JSON store: one shard per month plus a `latest.json` pointer.
///
/// ```text
/// <data_dir>/
///   latest.json
///   2024/
///     01/data.json
///     02/data.json
/// ```
///
/// Writes are plain overwrites. Two processes sharing a data directory can
/// lose each other's shard updates.
#[derive(Debug, Clone)]
pub struct RatesStore {
    data_dir: PathBuf,
}

impl RatesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        return RatesStore {
            data_dir: data_dir.into(),
        };
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn month_path(&self, key: &MonthKey) -> PathBuf {
        self.data_dir.join(key.relative_path())
    }

    pub fn latest_path(&self) -> PathBuf {
        self.data_dir.join(LATEST_FILE_NAME)
    }

    /// Merges `incoming` into the month shard and rewrites it. Returns the
    /// number of records now in the shard.
    pub async fn process_group(
        &self,
        key: MonthKey,
        incoming: Vec<DailyRate>,
    ) -> Result<usize, StoreError> {
        let path = self.month_path(&key);

        debug!("process_group | month: {} | incoming: {}", key, incoming.len());

        let existing: Vec<DailyRate> = read_json_or(&path, Vec::new()).await;
        let merged = merge_rates(existing, incoming);
        write_json(&path, &merged).await?;

        Ok(merged.len())
    }

    /// Replaces `latest.json` only when `candidate` is strictly newer than the
    /// stored record. Returns whether the file was written.
    pub async fn process_latest(&self, candidate: &DailyRate) -> Result<bool, StoreError> {
        let path = self.latest_path();
        let existing: Option<DailyRate> = read_json_or(&path, None).await;

        if let Some(existing) = &existing {
            if candidate.date <= existing.date {
                debug!(
                    "process_latest | kept: {} | candidate: {}",
                    existing.date, candidate.date
                );
                return Ok(false);
            }
        }

        write_json(&path, candidate).await?;
        Ok(true)
    }
}

/// Reads JSON from `path`, falling back to `default` when the file is missing,
/// unreadable or not valid for `T`.
pub async fn read_json_or<T: DeserializeOwned>(path: &Path, default: T) -> T {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            debug!("read_json_or | using default | path: {} | {}", path.display(), e);
            return default;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!("read_json_or | invalid json, using default | path: {} | {}", path.display(), e);
            default
        }
    }
}

/// Writes `value` as two-space indented JSON, creating parent directories.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).await.map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("write_json | path: {}", path.display());
    Ok(())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
