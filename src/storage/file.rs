//! File-backed storage.
//!
//! The whole map lives in memory and is flushed as one JSON object on every
//! mutation. Flushes go through a sibling temp file that is renamed over the
//! target, so a crash mid-write leaves the previous document intact.
//! Scratch entries written by the usage probe stay in memory and never reach
//! the file.

use super::backend::{check_quota, entry_size, is_scratch_key, StorageBackend};
use super::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct FileBackend {
    path: PathBuf,
    quota: Option<usize>,
    data: Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Opens `path`, starting empty when the file does not exist yet.
    ///
    /// A document that cannot be parsed is logged and replaced on the next
    /// write rather than failing the open.
    pub async fn open(path: &Path, quota: Option<usize>) -> StorageResult<Self> {
        let mut data: BTreeMap<String, String> = match tokio::fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Ignoring unreadable storage file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Storage file {} not found, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                return Err(StorageError::io(
                    format!("reading {}", path.display()),
                    e,
                ))
            }
        };

        let before = data.len();
        data.retain(|key, _| !is_scratch_key(key));
        if data.len() < before {
            warn!(
                "Dropped {} leftover probe entries from {}",
                before - data.len(),
                path.display()
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            quota,
            data: Mutex::new(data),
        })
    }

    async fn flush(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        let persisted: BTreeMap<&String, &String> =
            map.iter().filter(|(key, _)| !is_scratch_key(key)).collect();
        let json = serde_json::to_vec(&persisted)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| StorageError::io("joining flush task", std::io::Error::other(e)))?
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| StorageError::io(format!("creating {}", dir.display()), e))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| StorageError::io("creating temp file", e))?;
    tmp.write_all(contents)
        .map_err(|e| StorageError::io("writing temp file", e))?;
    tmp.persist(path)
        .map_err(|e| StorageError::io(format!("replacing {}", path.display()), e.error))?;

    Ok(())
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().await;

        let used = data.iter().map(|(k, v)| entry_size(k, v)).sum();
        check_quota(self.quota, used, key, data.get(key).map(String::as_str), value)?;

        if is_scratch_key(key) {
            data.insert(key.to_string(), value.to_string());
            return Ok(());
        }

        let mut next = data.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next).await?;
        *data = next;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.lock().await;
        if !data.contains_key(key) {
            return Ok(false);
        }
        if is_scratch_key(key) {
            data.remove(key);
            return Ok(true);
        }

        let mut next = data.clone();
        next.remove(key);
        self.flush(&next).await?;
        *data = next;

        Ok(true)
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.lock().await.keys().cloned().collect())
    }
}
