//! Cache Cleaner Task
//!
//! Background task that periodically walks the cache tree and removes
//! expired or corrupt envelope files nobody has read since they went stale.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cache::store::{read_envelope, EnvelopeState};
use crate::cache::{is_envelope_file_name, SweepStats};

/// Bounds on the randomized delay before the first sweep, in milliseconds.
const FIRST_SWEEP_JITTER_MS: (u64, u64) = (100, 500);

/// Paths buffered between the blocking walker and the async sweep.
const WALK_BUFFER: usize = 256;

/// Handle to an armed cleaner.
#[derive(Debug)]
pub struct CleanerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CleanerHandle {
    /// Prevents any further sweep from starting.
    ///
    /// A sweep already in progress stops before its next file. The returned
    /// handle resolves once the task has exited.
    pub fn cancel(self) -> JoinHandle<()> {
        let _ = self.shutdown.send(true);
        self.task
    }
}

/// Spawns a background task that sweeps `root` every `clean_every`.
///
/// The first sweep runs after a short random delay so many engines started
/// together do not hit the disk at once.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleaner(PathBuf::from("/var/cache/app"), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.cancel();
/// ```
pub fn spawn_cleaner(root: PathBuf, clean_every: Duration) -> CleanerHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!(
            cache_path = %root.display(),
            "Starting cache cleaner with interval of {}ms",
            clean_every.as_millis()
        );

        let (low, high) = FIRST_SWEEP_JITTER_MS;
        let mut delay = Duration::from_millis(rand::rng().random_range(low..=high));

        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            if *shutdown_rx.borrow() {
                break;
            }

            let stats = sweep_until(&root, &shutdown_rx).await;
            if stats.removed() > 0 {
                info!(
                    expired = stats.expired,
                    corrupt = stats.corrupt,
                    scanned = stats.scanned,
                    "Cache sweep: removed {} stale files",
                    stats.removed()
                );
            } else {
                debug!(scanned = stats.scanned, "Cache sweep: no stale files found");
            }

            delay = clean_every;
        }

        debug!(cache_path = %root.display(), "Cache cleaner stopped");
    });

    CleanerHandle { shutdown, task }
}

/// Walks `root` once and removes every expired or corrupt envelope.
///
/// Symbolic links are not followed and files not named like envelopes are
/// left alone. Per-file failures are logged and skipped.
pub async fn sweep(root: &Path) -> SweepStats {
    let (_never, shutdown) = watch::channel(false);
    sweep_until(root, &shutdown).await
}

/// Like [`sweep`], but gives up as soon as `shutdown` reads `true`.
///
/// The flag is checked before the walker is spawned and before each file, so
/// a sweep racing a `cancel` never touches the tree once it has observed it.
async fn sweep_until(root: &Path, shutdown: &watch::Receiver<bool>) -> SweepStats {
    let mut stats = SweepStats::new();
    if *shutdown.borrow() {
        return stats;
    }

    let (tx, mut rx) = mpsc::channel::<PathBuf>(WALK_BUFFER);
    let walk_root = root.to_path_buf();
    let walker = tokio::task::spawn_blocking(move || walk_envelopes(&walk_root, tx));

    while let Some(path) = rx.recv().await {
        if *shutdown.borrow() {
            debug!(scanned = stats.scanned, "Cache sweep interrupted by shutdown");
            break;
        }

        match read_envelope(&path).await {
            Ok(EnvelopeState::Live { .. }) => stats.record_live(),
            Ok(EnvelopeState::Expired) => stats.record_expired(),
            Ok(EnvelopeState::Corrupt) => stats.record_corrupt(),
            Ok(EnvelopeState::Missing) => stats.record_vanished(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache sweep skipped file");
                stats.record_failure();
            }
        }
    }

    // Closing the channel ends an interrupted walk
    drop(rx);
    if let Err(e) = walker.await {
        warn!(error = %e, "Cache sweep walker panicked");
    }
    stats
}

/// Sends every envelope-named regular file under `root` to `tx`.
fn walk_envelopes(root: &Path, tx: mpsc::Sender<PathBuf>) {
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Directories removed mid-walk land here
                debug!(error = %e, "Cache sweep could not visit entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let is_envelope = entry
            .file_name()
            .to_str()
            .is_some_and(is_envelope_file_name);
        if !is_envelope {
            continue;
        }

        if tx.blocking_send(entry.into_path()).is_err() {
            return;
        }
    }
}
