use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use reqwest::Client;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::{MAX_CONCURRENCY, MIN_CONCURRENCY, SyncError, SyncSettings, SyncStats, SyncSummary};
use crate::acquire::{AcquireOutcome, AudioBackend, acquire_and_commit};
use crate::library::{canonical_path, track_exists};
use crate::metadata::TrackMetadata;

type PathLocks = DashMap<PathBuf, Arc<Mutex<()>>>;

/// Runs the idempotency check and the acquire pipeline for each track.
///
/// # Concurrency Model
///
/// - A semaphore permit is taken, in playlist order, before a track's task
///   is spawned; with one permit the run is strictly sequential
/// - The check-then-commit sequence for one canonical path is serialized by
///   a per-path async mutex, so two tracks that map to the same file never
///   race
/// - Each worker sleeps the item delay after an acquisition attempt (not
///   after a skip), holding its permit so pacing is per worker
/// - Per-item failures are counted; nothing an item does fails the run
pub struct SyncEngine {
    semaphore: Arc<Semaphore>,
    settings: SyncSettings,
    backend: Arc<dyn AudioBackend>,
    covers: Client,
    path_locks: Arc<PathLocks>,
    stats: Arc<SyncStats>,
}

impl SyncEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConcurrency`] if `settings.concurrency` is
    /// outside 1..=8.
    pub fn new(
        settings: SyncSettings,
        backend: Arc<dyn AudioBackend>,
        covers: Client,
    ) -> Result<Self, SyncError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&settings.concurrency) {
            return Err(SyncError::InvalidConcurrency {
                value: settings.concurrency,
            });
        }
        debug!(
            concurrency = settings.concurrency,
            item_delay_ms = settings.item_delay.as_millis(),
            "creating sync engine"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(settings.concurrency)),
            settings,
            backend,
            covers,
            path_locks: Arc::new(DashMap::new()),
            stats: Arc::new(SyncStats::new()),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Handle on the live counters (for progress display).
    #[must_use]
    pub fn stats(&self) -> Arc<SyncStats> {
        Arc::clone(&self.stats)
    }

    /// Processes `tracks` in order into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SemaphoreClosed`] only if the worker semaphore is
    /// closed, which does not happen in normal operation. Item failures are
    /// reported through the returned summary.
    #[instrument(skip(self, tracks), fields(dir = %dir.display(), total = tracks.len()))]
    pub async fn run(
        &self,
        dir: &Path,
        tracks: Vec<TrackMetadata>,
    ) -> Result<SyncSummary, SyncError> {
        let total = tracks.len();
        let mut tasks = JoinSet::new();

        for (offset, metadata) in tracks.into_iter().enumerate() {
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| SyncError::SemaphoreClosed)?;

            let worker = Worker {
                dir: dir.to_path_buf(),
                backend: Arc::clone(&self.backend),
                covers: self.covers.clone(),
                path_locks: Arc::clone(&self.path_locks),
                stats: Arc::clone(&self.stats),
                settings: self.settings,
            };
            tasks.spawn(async move {
                let _permit = permit;
                worker.process(offset + 1, total, metadata).await;
            });

            while let Some(joined) = tasks.try_join_next() {
                self.reap(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.reap(joined);
        }

        let summary = self.stats.summary(total);
        info!(
            committed = summary.committed,
            skipped = summary.skipped,
            failed = summary.failed,
            total,
            "sync complete"
        );
        Ok(summary)
    }

    fn reap(&self, joined: Result<(), tokio::task::JoinError>) {
        if let Err(join_error) = joined {
            warn!(error = %join_error, "track task panicked");
            self.stats.increment_failed();
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("settings", &self.settings)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

struct Worker {
    dir: PathBuf,
    backend: Arc<dyn AudioBackend>,
    covers: Client,
    path_locks: Arc<PathLocks>,
    stats: Arc<SyncStats>,
    settings: SyncSettings,
}

impl Worker {
    async fn process(self, index: usize, total: usize, metadata: TrackMetadata) {
        let title = metadata.title().to_string();
        info!(index, total, title = %title, "Processing {index}/{total}: {title}");

        let path = canonical_path(&self.dir, &metadata);
        let lock = Arc::clone(self.path_locks.entry(path.clone()).or_default().value());
        let guard = lock.lock_owned().await;

        if self.already_stored(&metadata).await {
            info!(title = %title, "Already exists: {title}");
            self.stats.increment_skipped();
            return;
        }

        match acquire_and_commit(&self.dir, &metadata, self.backend.as_ref(), &self.covers).await {
            AcquireOutcome::Committed(committed) => {
                debug!(path = %committed.display(), "committed");
                self.stats.increment_committed();
            }
            AcquireOutcome::AlreadyPresent => {
                warn!(
                    path = %path.display(),
                    "a file with this name exists but its tags differ; leaving it untouched"
                );
                self.stats.increment_skipped();
            }
            AcquireOutcome::Failed(failure) => {
                error!(title = %title, error = %failure, "failed to sync track");
                self.stats.increment_failed();
            }
        }
        drop(guard);

        if !self.settings.item_delay.is_zero() {
            tokio::time::sleep(self.settings.item_delay).await;
        }
    }

    async fn already_stored(&self, metadata: &TrackMetadata) -> bool {
        let dir = self.dir.clone();
        let metadata = metadata.clone();
        tokio::task::spawn_blocking(move || track_exists(&dir, &metadata))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::acquire::{AcquireError, FetchRequest};
    use crate::library::{DEFAULT_COVER_TIMEOUT, build_cover_http_client, embed_tags, tags};
    use crate::metadata::DEFAULTS;

    #[derive(Default)]
    struct RecordingBackend {
        queries: StdMutex<Vec<String>>,
        fail_titles: Vec<String>,
    }

    #[async_trait]
    impl AudioBackend for RecordingBackend {
        async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, AcquireError> {
            self.queries.lock().unwrap().push(request.query.clone());
            if self
                .fail_titles
                .iter()
                .any(|t| request.query.starts_with(t.as_str()))
            {
                return Err(AcquireError::Backend {
                    query: request.query.clone(),
                    message: "no results".to_string(),
                });
            }
            let out = request.expected_output();
            tags::write_silent_mp3(&out).unwrap();
            Ok(out)
        }
    }

    fn track(title: &str) -> TrackMetadata {
        TrackMetadata::builder()
            .title(title)
            .artists("Artist")
            .album("Album")
            .build(&DEFAULTS)
    }

    fn engine(backend: Arc<RecordingBackend>, concurrency: usize) -> SyncEngine {
        SyncEngine::new(
            SyncSettings::unpaced(concurrency),
            backend,
            build_cover_http_client(DEFAULT_COVER_TIMEOUT).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_concurrency_out_of_range() {
        let backend = Arc::new(RecordingBackend::default());
        for value in [0, 9] {
            let err = SyncEngine::new(
                SyncSettings::unpaced(value),
                Arc::clone(&backend) as Arc<dyn AudioBackend>,
                Client::new(),
            )
            .unwrap_err();
            assert!(matches!(err, SyncError::InvalidConcurrency { value: v } if v == value));
        }
    }

    #[tokio::test]
    async fn test_sequential_run_processes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(Arc::clone(&backend), 1);

        let summary = engine
            .run(dir.path(), vec![track("One"), track("Two"), track("Three")])
            .await
            .unwrap();

        assert_eq!(summary.committed, 3);
        assert_eq!(summary.total, 3);
        let queries = backend.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![
                "One lyrics explicit Artist",
                "Two lyrics explicit Artist",
                "Three lyrics explicit Artist"
            ]
        );
    }

    #[tokio::test]
    async fn test_correctly_tagged_file_is_skipped_without_backend_call() {
        let dir = tempfile::tempdir().unwrap();
        let existing = track("Kept");
        let path = canonical_path(dir.path(), &existing);
        tags::write_silent_mp3(&path).unwrap();
        embed_tags(&path, &existing, None).unwrap();

        let backend = Arc::new(RecordingBackend::default());
        let summary = engine(Arc::clone(&backend), 1)
            .run(dir.path(), vec![existing])
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert!(backend.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend {
            fail_titles: vec!["Bad".to_string()],
            ..RecordingBackend::default()
        });

        let summary = engine(Arc::clone(&backend), 1)
            .run(dir.path(), vec![track("Good"), track("Bad"), track("Also Good")])
            .await
            .unwrap();

        assert_eq!(summary.committed, 2);
        assert_eq!(summary.failed, 1);
        assert!(dir.path().join("Artist - Also Good.mp3").is_file());
        assert!(!dir.path().join("Artist - Bad.mp3").exists());
    }

    #[tokio::test]
    async fn test_colliding_names_are_acquired_once_under_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());

        let summary = engine(Arc::clone(&backend), 4)
            .run(dir.path(), vec![track("Why?"), track("Why"), track("Other")])
            .await
            .unwrap();

        assert_eq!(summary.committed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(backend.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_item_delay_applies_after_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(RecordingBackend::default());
        let delay = Duration::from_millis(30);
        let engine = SyncEngine::new(
            SyncSettings {
                concurrency: 1,
                item_delay: delay,
                page_delay: Duration::ZERO,
            },
            backend,
            Client::new(),
        )
        .unwrap();

        let started = std::time::Instant::now();
        engine
            .run(dir.path(), vec![track("A"), track("B")])
            .await
            .unwrap();
        assert!(started.elapsed() >= delay * 2);
    }
}
