use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::config::USAGE_STORAGE_KEY;
use crate::workflows::correction::domain::UsageRecord;

/// Durable slot holding the current usage record.
///
/// Reads never fail: a missing, unreadable or malformed record is reported as absent so
/// callers treat it as zero usage today.
pub trait QuotaStore: Send + Sync {
    fn read(&self) -> Option<UsageRecord>;
    fn write(&self, record: UsageRecord) -> Result<(), QuotaStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QuotaStoreError {
    #[error("failed to persist usage record to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode usage record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("quota storage unavailable: {0}")]
    Unavailable(String),
}

/// Decodes a stored slot value, discarding anything that is not a well-formed record.
pub fn decode_record(raw: &str) -> Option<UsageRecord> {
    match serde_json::from_str::<UsageRecord>(raw) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(error = %err, "discarding malformed usage record");
            None
        }
    }
}

/// Process-local store, mainly for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    slot: Mutex<Option<String>>,
}

impl MemoryQuotaStore {
    pub fn with_record(record: UsageRecord) -> Self {
        Self {
            slot: Mutex::new(serde_json::to_string(&record).ok()),
        }
    }

    /// Seeds the slot with an arbitrary raw value, e.g. a corrupted payload.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl QuotaStore for MemoryQuotaStore {
    fn read(&self) -> Option<UsageRecord> {
        let guard = self.slot.lock().ok()?;
        guard.as_deref().and_then(decode_record)
    }

    fn write(&self, record: UsageRecord) -> Result<(), QuotaStoreError> {
        let encoded = serde_json::to_string(&record)?;
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| QuotaStoreError::Unavailable("usage slot mutex poisoned".to_string()))?;
        *guard = Some(encoded);
        Ok(())
    }
}

/// JSON file under a data directory, named after the storage key.
#[derive(Debug, Clone)]
pub struct FileQuotaStore {
    path: PathBuf,
}

impl FileQuotaStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, USAGE_STORAGE_KEY)
    }

    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> QuotaStoreError {
        QuotaStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl QuotaStore for FileQuotaStore {
    fn read(&self) -> Option<UsageRecord> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode_record(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "usage record unreadable");
                None
            }
        }
    }

    fn write(&self, record: UsageRecord) -> Result<(), QuotaStoreError> {
        let encoded = serde_json::to_vec(&record)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        // Write beside the slot and rename so readers never observe a torn record.
        let staging = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&staging).map_err(|err| self.io_error(err))?;
        file.write_all(&encoded).map_err(|err| self.io_error(err))?;
        file.sync_all().map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }
}
