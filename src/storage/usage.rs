//! Advisory storage usage estimate.
//!
//! The ceiling is discovered empirically by writing filler under a scratch
//! key until the backend rejects it. Nothing here gates writes. Scratch
//! entries left behind by an interrupted run are swept before the next probe.

use super::backend::{
    entry_size, is_scratch_key, LocalStorage, DEFAULT_QUOTA_BYTES, SCRATCH_KEY_PREFIX,
};
use super::error::StorageResult;
use tracing::{debug, warn};
use uuid::Uuid;

const PROBE_CHUNK: usize = 1024;
const PROBE_CEILING: usize = 64 * 1024 * 1024;
const NEARLY_FULL_PERCENT: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    pub used: usize,
    pub total: usize,
    pub percentage: u32,
}

impl StorageUsage {
    pub fn new(used: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (100.0 * used as f64 / total as f64).round() as u32
        };

        Self {
            used,
            total,
            percentage,
        }
    }

    pub fn is_nearly_full(&self) -> bool {
        self.percentage > NEARLY_FULL_PERCENT
    }
}

impl Default for StorageUsage {
    fn default() -> Self {
        Self::new(0, DEFAULT_QUOTA_BYTES)
    }
}

pub struct UsageEstimator {
    storage: LocalStorage,
}

impl UsageEstimator {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Never fails; probe errors are logged and reported as the default.
    pub async fn estimate(&self) -> StorageUsage {
        match self.try_estimate().await {
            Ok(usage) => usage,
            Err(e) => {
                warn!("Error calculating storage usage: {}", e);
                StorageUsage::default()
            }
        }
    }

    async fn try_estimate(&self) -> StorageResult<StorageUsage> {
        self.sweep_scratch().await?;
        let scratch_key = format!("{}{}__", SCRATCH_KEY_PREFIX, Uuid::new_v4().simple());

        let probed = self.probe(&scratch_key).await;
        let cleanup = self.storage.remove_item(&scratch_key).await;
        let total = probed?;
        cleanup?;

        let used = self.used().await?;
        debug!("Storage usage: {} of {} bytes", used, total);

        Ok(StorageUsage::new(used, total))
    }

    async fn sweep_scratch(&self) -> StorageResult<()> {
        for key in self.storage.keys().await? {
            if is_scratch_key(&key) && self.storage.remove_item(&key).await? {
                warn!("Removed leftover probe entry {}", key);
            }
        }
        Ok(())
    }

    /// Bytes the store would have held at the first rejected scratch write.
    async fn probe(&self, scratch_key: &str) -> StorageResult<usize> {
        let used = self.used().await?;
        let max_chunks = PROBE_CEILING / PROBE_CHUNK;

        // Double until a write fails, then bisect between the last accepted
        // and the first rejected chunk count.
        let mut accepted = 0;
        let mut rejected = None;
        let mut chunks = 1;
        while chunks <= max_chunks {
            if self.try_fill(scratch_key, chunks).await? {
                accepted = chunks;
                chunks *= 2;
            } else {
                rejected = Some(chunks);
                break;
            }
        }

        let Some(mut rejected) = rejected else {
            return Ok(PROBE_CEILING);
        };

        while rejected - accepted > 1 {
            let mid = accepted + (rejected - accepted) / 2;
            if self.try_fill(scratch_key, mid).await? {
                accepted = mid;
            } else {
                rejected = mid;
            }
        }

        Ok(used + scratch_key.len() + rejected * PROBE_CHUNK)
    }

    /// `Ok(false)` when the backend refused the write for lack of space.
    async fn try_fill(&self, scratch_key: &str, chunks: usize) -> StorageResult<bool> {
        let filler = "1".repeat(chunks * PROBE_CHUNK);
        match self.storage.set_item(scratch_key, &filler).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_quota_exceeded() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn used(&self) -> StorageResult<usize> {
        let mut used = 0;
        for key in self.storage.keys().await? {
            if let Some(value) = self.storage.get_item(&key).await? {
                used += entry_size(&key, &value);
            }
        }
        Ok(used)
    }
}
