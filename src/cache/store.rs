//! Cache Store Module
//!
//! The disk engine: `get`/`set`/`drop` over envelope files plus the
//! start/stop lifecycle that arms the background cleaner.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::envelope::{self, current_timestamp_ms, Envelope};
use crate::cache::{fs, key, locator, CacheEntry, CacheKey, MAX_TTL_MS};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_cleaner, CleanerHandle};

// == Envelope State ==
/// What was found at an envelope path after the expiry check.
#[derive(Debug)]
pub(crate) enum EnvelopeState {
    /// No file at the path
    Missing,
    /// File could not be decoded and was removed
    Corrupt,
    /// Entry had expired and was removed
    Expired,
    /// Entry is live with `remaining` milliseconds left
    Live { envelope: Envelope, remaining: i64 },
}

/// Reads the envelope at `path`, removing it if it is corrupt or expired.
///
/// Shared by `get` and the cleaner. Removal failures are logged and ignored.
pub(crate) async fn read_envelope(path: &Path) -> Result<EnvelopeState> {
    let bytes = match fs::read_file_if_exists(path).await? {
        Some(bytes) => bytes,
        None => return Ok(EnvelopeState::Missing),
    };

    let envelope = match envelope::decode(&bytes) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Removing corrupt cache envelope");
            discard(path).await;
            return Ok(EnvelopeState::Corrupt);
        }
    };

    let remaining = envelope.remaining_ttl(current_timestamp_ms());
    if remaining <= 0 {
        discard(path).await;
        return Ok(EnvelopeState::Expired);
    }

    Ok(EnvelopeState::Live {
        envelope,
        remaining,
    })
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file_if_exists(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove stale cache file");
    }
}

// == Disk Cache ==
/// Disk-resident TTL cache. Cheap to clone; clones share one lifecycle.
#[derive(Debug, Clone)]
pub struct DiskCache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: Config,
    /// Lifecycle flag checked by every operation
    ready: AtomicBool,
    /// Serializes start/stop and owns the armed cleaner
    cleaner: Mutex<Option<CleanerHandle>>,
}

impl DiskCache {
    // == Constructor ==
    /// Creates a stopped engine for the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                ready: AtomicBool::new(false),
                cleaner: Mutex::new(None),
            }),
        })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Root directory of the cache tree.
    pub fn cache_path(&self) -> &Path {
        &self.inner.config.cache_path
    }

    // == Lifecycle ==
    /// Probes the cache root, runs the disk self-test and arms the cleaner.
    ///
    /// Starting an already started engine succeeds without arming a second
    /// cleaner.
    pub async fn start(&self) -> Result<()> {
        let mut cleaner = self.inner.cleaner.lock().await;
        if self.is_ready() {
            debug!("Disk cache already started");
            return Ok(());
        }

        let root = self.cache_path();
        fs::ensure_directory(root).await?;
        fs::test_disk_access(root).await?;

        let clean_every = self.inner.config.clean_every;
        if clean_every > 0 {
            *cleaner = Some(spawn_cleaner(
                root.to_path_buf(),
                Duration::from_millis(clean_every),
            ));
        }

        self.inner.ready.store(true, Ordering::Release);
        info!(
            cache_path = %root.display(),
            clean_every_ms = clean_every,
            "Disk cache started"
        );
        Ok(())
    }

    /// Cancels the cleaner and stops accepting operations. Idempotent.
    ///
    /// A sweep already walking the tree may finish, but no further sweep runs.
    pub async fn stop(&self) {
        let mut cleaner = self.inner.cleaner.lock().await;
        let was_ready = self.inner.ready.swap(false, Ordering::AcqRel);

        if let Some(handle) = cleaner.take() {
            let _ = handle.cancel();
        }

        if was_ready {
            info!(cache_path = %self.cache_path().display(), "Disk cache stopped");
        }
    }

    /// Returns true while the engine is started.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// Rejects segment names that cannot be used as a directory.
    pub fn validate_segment_name(&self, name: &str) -> Result<()> {
        key::validate_segment_name(name)
    }

    /// Returns the envelope path for `key` under this cache root.
    pub fn storage_path_for_key(&self, key: &CacheKey) -> Result<PathBuf> {
        locator::locate(self.cache_path(), key)
    }

    fn ensure_started(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(CacheError::NotStarted)
        }
    }

    // == Get ==
    /// Retrieves a live entry, or `None` if absent, expired or corrupt.
    ///
    /// Expired and corrupt files are removed as a side effect.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        self.ensure_started()?;
        let path = self.storage_path_for_key(key)?;

        match read_envelope(&path).await? {
            EnvelopeState::Live {
                envelope,
                remaining,
            } => Ok(Some(CacheEntry::from_envelope(envelope, remaining))),
            EnvelopeState::Expired => {
                debug!(segment = %key.segment, id = %key.id, "Cache entry expired");
                Ok(None)
            }
            EnvelopeState::Missing | EnvelopeState::Corrupt => Ok(None),
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` milliseconds, replacing any
    /// previous entry.
    ///
    /// A `ttl` of zero or less is accepted and reads back as expired.
    pub async fn set<T>(&self, key: &CacheKey, value: &T, ttl: i64) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_started()?;
        if ttl > MAX_TTL_MS {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let path = self.storage_path_for_key(key)?;
        let body = envelope::encode(key, value, ttl, current_timestamp_ms())?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write_file(&path, &body).await
    }

    // == Drop ==
    /// Removes the entry for `key`. Dropping a missing entry succeeds.
    pub async fn drop(&self, key: &CacheKey) -> Result<()> {
        self.ensure_started()?;
        let path = self.storage_path_for_key(key)?;

        fs::remove_file_if_exists(&path).await.map(|_| ())
    }
}
