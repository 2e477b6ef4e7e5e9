//! Resolution fan-out and the end-to-end playlist sync.
//!
//! [`sync_tracks`] resolves every source track concurrently, at most
//! `concurrency` at a time. Each task reports its `(index, result)` back to a
//! single join loop, which is the only writer of the slot array, so slot order
//! always follows source order no matter which task finishes first.
//!
//! A failed track leaves its slot empty and never stops its siblings. Two
//! kinds of failure stop the run instead: an authentication failure (no
//! further search can succeed) and cancellation. Both cancel the shared
//! token, so no new task is spawned and in-flight tasks return early.

use std::sync::Arc;

use async_trait::async_trait;
use indicatif::ProgressBar;
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    config::DEFAULT_CONCURRENCY,
    error::{SyncError, SyncResult},
    spotify::{SpotifyClient, WrittenPlaylist, write_playlist},
    types::{Candidate, SourcePlaylist, Track},
};

/// Resolves a single source track to a destination candidate.
#[async_trait]
pub trait TrackResolver: Send + Sync + 'static {
    async fn resolve(&self, track: &Track) -> SyncResult<Candidate>;
}

#[async_trait]
impl TrackResolver for SpotifyClient {
    async fn resolve(&self, track: &Track) -> SyncResult<Candidate> {
        self.resolve_track(&track.title, &track.artist, true).await
    }
}

/// Receives one signal per settled resolution task.
pub trait ProgressSink: Send + Sync {
    fn advance(&self);
}

impl ProgressSink for ProgressBar {
    fn advance(&self) {
        self.inc(1);
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self) {}
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub concurrency: usize,
    pub cancel: CancellationToken,
}

impl SyncOptions {
    pub fn new(concurrency: usize) -> Self {
        SyncOptions {
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub index: usize,
    pub track: Track,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// Destination URI per source index, empty when unresolved.
    pub slots: Vec<String>,
    pub unresolved: Vec<Unresolved>,
}

impl SyncOutcome {
    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.unresolved.len()
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Result of the write phase. A failed write keeps the resolved slots.
    pub playlist: SyncResult<WrittenPlaylist>,
}

/// Resolves `tracks` concurrently and returns one slot per track.
///
/// # Errors
///
/// - [`SyncError::Auth`] if any task hit an authentication failure
/// - [`SyncError::Cancelled`] if `options.cancel` fired before every track settled
///
/// Every other per-track error is recorded in [`SyncOutcome::unresolved`].
pub async fn sync_tracks<R: TrackResolver>(
    resolver: Arc<R>,
    tracks: &[Track],
    options: &SyncOptions,
    progress: Arc<dyn ProgressSink>,
) -> SyncResult<SyncOutcome> {
    let cancel = options.cancel.clone();
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut stopped_early = false;

    for (index, track) in tracks.iter().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                stopped_early = true;
                break;
            }
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    stopped_early = true;
                    break;
                }
            },
        };

        let resolver = Arc::clone(&resolver);
        let progress = Arc::clone(&progress);
        let cancel = cancel.clone();
        let track = track.clone();

        tasks.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(SyncError::Cancelled),
                result = resolver.resolve(&track) => result,
            };
            drop(permit);

            if matches!(result, Err(SyncError::Auth { .. })) {
                cancel.cancel();
            }
            progress.advance();
            (index, result)
        });
    }

    let mut slots = vec![String::new(); tracks.len()];
    let mut reasons: Vec<Option<String>> = vec![None; tracks.len()];
    let mut fatal: Option<SyncError> = None;
    let mut cancelled = stopped_early;

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(settled) => settled,
            Err(err) => {
                tracing::error!(error = %err, "resolution task did not finish");
                continue;
            }
        };

        match result {
            Ok(candidate) => slots[index] = candidate.id,
            Err(SyncError::Cancelled) => cancelled = true,
            Err(err) if err.is_fatal() => {
                tracing::error!(index, error = %err, "resolution stopped");
                if fatal.is_none() {
                    fatal = Some(err);
                }
            }
            Err(err) => {
                let track = &tracks[index];
                tracing::warn!(
                    index,
                    title = %track.title,
                    artist = %track.artist,
                    error = %err,
                    "track unresolved"
                );
                reasons[index] = Some(err.to_string());
            }
        }
    }

    if let Some(err) = fatal {
        return Err(err);
    }
    if cancelled {
        return Err(SyncError::Cancelled);
    }

    let unresolved = slots
        .iter()
        .zip(reasons)
        .enumerate()
        .filter(|(_, (slot, _))| slot.is_empty())
        .map(|(index, (_, reason))| Unresolved {
            index,
            track: tracks[index].clone(),
            reason: reason.unwrap_or_else(|| "resolution task failed".to_string()),
        })
        .collect();

    Ok(SyncOutcome { slots, unresolved })
}

/// Converts a whole source playlist: resolves every track, then creates the
/// destination playlist `name` and writes the resolved tracks into it.
///
/// Resolution errors that end the run are returned as `Err`. A failure in the
/// write phase is reported in [`SyncReport::playlist`] next to the resolved
/// slots.
pub async fn sync_playlist(
    client: Arc<SpotifyClient>,
    source: &SourcePlaylist,
    name: &str,
    options: &SyncOptions,
    progress: Arc<dyn ProgressSink>,
) -> SyncResult<SyncReport> {
    let outcome = sync_tracks(Arc::clone(&client), &source.tracks, options, progress).await?;

    tracing::info!(
        resolved = outcome.resolved_count(),
        failed = outcome.failed_count(),
        "resolution finished"
    );

    let playlist = if options.cancel.is_cancelled() {
        Err(SyncError::Cancelled)
    } else {
        write_playlist(&client, name, &outcome.slots).await
    };

    Ok(SyncReport { outcome, playlist })
}
