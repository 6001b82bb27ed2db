//! Background poller
//!
//! Queries the Mixxx library on a fixed cadence and commits each result to the
//! [`SnapshotStore`]. A failed cycle keeps the previous snapshot and waits the
//! error backoff *instead of* the normal interval; the loop never gives up on
//! its own and only stops when its cancellation token fires.

use sqlx::SqlitePool;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use djbuddy_common::config::Settings;
use djbuddy_common::Result;

use crate::db::{fetch_session_tracks, SessionScan};
use crate::snapshot::{SnapshotStore, TrackSnapshot};

/// Poll cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Wait after a successful cycle
    pub interval: Duration,
    /// Wait after a failed cycle
    pub error_backoff: Duration,
}

impl From<&Settings> for PollerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            interval: settings.poll_interval,
            error_backoff: settings.error_backoff,
        }
    }
}

/// What a successful cycle committed
///
/// Every variant but `Published` commits an empty snapshot; they differ only
/// in what gets logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Session found with at least one analyzed track
    Published { session: String, tracks: usize },
    /// Session found but Mixxx has not analyzed any of its tracks yet
    Unanalyzed { session: String, rows: usize },
    /// Session playlist exists but nothing has been played into it
    EmptySession { session: String },
    /// No date-named playlist exists
    NoSession,
}

pub struct Poller {
    pool: SqlitePool,
    store: SnapshotStore,
    config: PollerConfig,
}

impl Poller {
    pub fn new(pool: SqlitePool, store: SnapshotStore, config: PollerConfig) -> Self {
        Self { pool, store, config }
    }

    /// Run one query → filter → commit cycle
    ///
    /// On error nothing is committed and the store keeps its previous snapshot.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let scan = fetch_session_tracks(&self.pool).await?;

        let outcome = match &scan {
            SessionScan::NoSession => PollOutcome::NoSession,
            SessionScan::Session {
                playlist,
                rows_scanned,
                tracks,
            } => {
                if *rows_scanned == 0 {
                    PollOutcome::EmptySession {
                        session: playlist.name.clone(),
                    }
                } else if tracks.is_empty() {
                    PollOutcome::Unanalyzed {
                        session: playlist.name.clone(),
                        rows: *rows_scanned,
                    }
                } else {
                    PollOutcome::Published {
                        session: playlist.name.clone(),
                        tracks: tracks.len(),
                    }
                }
            }
        };

        self.store.replace(TrackSnapshot::new(scan.into_tracks())).await;
        Ok(outcome)
    }

    /// Poll until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Poller started ({}ms interval, {}ms error backoff)",
            self.config.interval.as_millis(),
            self.config.error_backoff.as_millis()
        );

        let mut last_outcome: Option<PollOutcome> = None;

        loop {
            let wait = match self.poll_once().await {
                Ok(outcome) => {
                    if last_outcome.as_ref() != Some(&outcome) {
                        log_outcome(&outcome);
                    } else {
                        debug!("Snapshot refreshed, unchanged outcome: {:?}", outcome);
                    }
                    last_outcome = Some(outcome);
                    self.config.interval
                }
                Err(e) => {
                    warn!(
                        "Poll failed, keeping previous snapshot (retry in {}ms): {}",
                        self.config.error_backoff.as_millis(),
                        e
                    );
                    // Re-log whatever the next successful cycle finds
                    last_outcome = None;
                    self.config.error_backoff
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        info!("Poller stopped");
    }

    /// Spawn [`Poller::run`] on the tokio runtime
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

fn log_outcome(outcome: &PollOutcome) {
    match outcome {
        PollOutcome::Published { session, tracks } => {
            info!("Snapshot updated from '{}': {} tracks with BPM > 0", session, tracks);
        }
        PollOutcome::Unanalyzed { session, rows } => {
            info!(
                "Session '{}' has {} tracks but none analyzed yet, waiting for Mixxx",
                session, rows
            );
        }
        PollOutcome::EmptySession { session } => {
            info!("Session '{}' is empty, waiting for the first track", session);
        }
        PollOutcome::NoSession => {
            info!("Waiting for history data (no date-named playlist found)");
        }
    }
}
