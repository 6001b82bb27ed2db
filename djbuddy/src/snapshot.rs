//! Track snapshot and the shared snapshot store
//!
//! The store holds exactly one snapshot. The poller replaces it wholesale;
//! HTTP handlers clone the current `Arc` and serialize outside the lock, so a
//! reader always sees one complete snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Placeholder for tracks with no artist tag
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Placeholder for tracks with no title tag
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// One published track
///
/// Field names are the wire format of `GET /api/data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    pub bpm: f64,
    pub artist: String,
    pub title: String,
    /// Seconds
    pub duration: f64,
    /// Crate names joined with ", "
    pub crates: String,
    /// Non-session, non-hidden playlist names joined with ", "
    pub playlists: String,
}

impl TrackRecord {
    /// Build a record from nullable library columns
    ///
    /// Returns `None` for tracks Mixxx has not analyzed yet (missing or
    /// non-positive BPM). Silence detected as 0 BPM is treated the same way.
    pub fn from_columns(
        bpm: Option<f64>,
        artist: Option<String>,
        title: Option<String>,
        duration: Option<f64>,
        crates: Option<String>,
        playlists: Option<String>,
    ) -> Option<Self> {
        let bpm = bpm.filter(|b| *b > 0.0)?;

        Some(Self {
            bpm,
            artist: non_empty_or(artist, UNKNOWN_ARTIST),
            title: non_empty_or(title, UNKNOWN_TITLE),
            duration: duration.filter(|d| *d > 0.0).unwrap_or(0.0),
            crates: crates.unwrap_or_default(),
            playlists: playlists.unwrap_or_default(),
        })
    }

    pub fn is_analyzed(&self) -> bool {
        self.bpm > 0.0
    }
}

fn non_empty_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}

/// Ordered tracks of the current session, as published
///
/// Serializes as a bare JSON array. Unanalyzed records never make it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackSnapshot {
    tracks: Vec<TrackRecord>,
}

impl TrackSnapshot {
    /// Assemble a snapshot, keeping input order and dropping records with bpm <= 0
    pub fn new(tracks: impl IntoIterator<Item = TrackRecord>) -> Self {
        Self {
            tracks: tracks.into_iter().filter(TrackRecord::is_analyzed).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Commit bookkeeping reported by `/health`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatus {
    pub tracks: usize,
    pub commits: u64,
    pub last_commit: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Committed {
    snapshot: Arc<TrackSnapshot>,
    commits: u64,
    last_commit: Option<DateTime<Utc>>,
}

/// Holder of the latest committed snapshot
///
/// Cloning the store clones the handle, not the data. tokio's `RwLock` queues
/// readers and writers fairly, so neither side can starve the other.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Committed>>,
}

impl SnapshotStore {
    /// Create a store holding the empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot, superseding the previous one
    pub async fn replace(&self, snapshot: TrackSnapshot) {
        let snapshot = Arc::new(snapshot);
        let now = Utc::now();

        let previous = {
            let mut committed = self.inner.write().await;
            committed.commits += 1;
            committed.last_commit = Some(now);
            std::mem::replace(&mut committed.snapshot, snapshot)
        };

        // Old snapshot is freed after the write lock is released
        drop(previous);
    }

    /// Latest committed snapshot (empty before the first commit)
    pub async fn current(&self) -> Arc<TrackSnapshot> {
        Arc::clone(&self.inner.read().await.snapshot)
    }

    pub async fn status(&self) -> StoreStatus {
        let committed = self.inner.read().await;
        StoreStatus {
            tracks: committed.snapshot.len(),
            commits: committed.commits,
            last_commit: committed.last_commit,
        }
    }
}
