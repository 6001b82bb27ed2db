//! Database access layer for djbuddy
//!
//! The Mixxx library is owned by Mixxx; every connection opened here is
//! read-only.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

pub mod session;
pub use session::{fetch_session_tracks, find_session_playlist, SessionPlaylist, SessionScan};

/// Mixxx holds write locks briefly while saving; wait this long before failing a read
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Open the Mixxx library read-only
///
/// Only the poller queries the pool, so a single connection is enough.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Mixxx database not found: {}\nStart Mixxx once or pass --database.",
            db_path.display()
        );
    }

    // Not immutable: Mixxx keeps writing while we poll
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open {} in read-only mode", db_path.display()))?;

    // Verify read-only by attempting a write (should fail)
    #[cfg(debug_assertions)]
    {
        let write_test = sqlx::query("CREATE TABLE _djbuddy_write_probe (id INTEGER)")
            .execute(&pool)
            .await;
        if write_test.is_ok() {
            anyhow::bail!("Database connection to {} is not read-only", db_path.display());
        }
    }

    Ok(pool)
}
