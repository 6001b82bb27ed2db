//! Session query engine
//!
//! Mixxx records every DJ session as a history playlist named after its date
//! (`2024-05-17`, `2024-05-17 (2)`, `2024-05-17 #live`). The engine picks the
//! most recently created of these and returns its analyzed tracks in play
//! order, tagged with the crates and the ordinary playlists each track is in.

use djbuddy_common::Result;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::snapshot::TrackRecord;

const DATE_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]";

/// Playlist name forms that mark a session playlist (SQLite GLOB syntax)
fn session_name_globs() -> [String; 3] {
    [
        DATE_GLOB.to_string(),
        format!("{DATE_GLOB} (*)"),
        format!("{DATE_GLOB} #*"),
    ]
}

/// SQL predicate that is true when `column` holds a session playlist name
fn session_name_predicate(column: &str) -> String {
    let alternatives: Vec<String> = session_name_globs()
        .iter()
        .map(|glob| format!("{column} GLOB '{glob}'"))
        .collect();
    format!("({})", alternatives.join(" OR "))
}

/// The selected session playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlaylist {
    pub id: i64,
    pub name: String,
}

/// Result of one engine run
#[derive(Debug, Clone, PartialEq)]
pub enum SessionScan {
    /// No playlist has a session name yet
    NoSession,
    /// Session found; `rows_scanned` counts rows before the BPM filter
    Session {
        playlist: SessionPlaylist,
        rows_scanned: usize,
        tracks: Vec<TrackRecord>,
    },
}

impl SessionScan {
    /// Analyzed tracks in play order (empty when there is no session)
    pub fn into_tracks(self) -> Vec<TrackRecord> {
        match self {
            SessionScan::NoSession => Vec::new(),
            SessionScan::Session { tracks, .. } => tracks,
        }
    }
}

/// Latest-created session playlist, if any
///
/// Ties on `date_created` go to the higher id so repeated polls agree.
pub async fn find_session_playlist<'e, E>(executor: E) -> Result<Option<SessionPlaylist>>
where
    E: sqlx::sqlite::SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT P.id, P.name
         FROM Playlists P
         WHERE {}
         ORDER BY P.date_created DESC, P.id DESC
         LIMIT 1",
        session_name_predicate("P.name")
    );

    let row = sqlx::query(&sql).fetch_optional(executor).await?;

    Ok(match row {
        Some(row) => Some(SessionPlaylist {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        }),
        None => None,
    })
}

/// Select the current session playlist and load its tracks
///
/// Both statements run inside one read transaction so the playlist cannot
/// change between selection and track listing.
pub async fn fetch_session_tracks(pool: &SqlitePool) -> Result<SessionScan> {
    let mut tx = pool.begin().await?;

    let Some(playlist) = find_session_playlist(&mut *tx).await? else {
        tx.commit().await?;
        return Ok(SessionScan::NoSession);
    };

    let sql = format!(
        "SELECT CAST(T.bpm AS REAL) AS bpm,
                T.artist,
                T.title,
                CAST(T.duration AS REAL) AS duration,
                COALESCE(
                  (SELECT GROUP_CONCAT(C.name, ', ' ORDER BY C.name)
                   FROM crates C
                   WHERE C.id IN (SELECT CT.crate_id FROM crate_tracks CT WHERE CT.track_id = T.id)),
                  '') AS crates,
                COALESCE(
                  (SELECT GROUP_CONCAT(P2.name, ', ' ORDER BY P2.name)
                   FROM Playlists P2
                   WHERE P2.id IN (SELECT PT2.playlist_id FROM PlaylistTracks PT2 WHERE PT2.track_id = T.id)
                     AND P2.hidden = 0
                     AND NOT {}),
                  '') AS playlists
         FROM library T
         JOIN PlaylistTracks PT ON T.id = PT.track_id
         WHERE PT.playlist_id = ?
         ORDER BY PT.position ASC, PT.id ASC",
        session_name_predicate("P2.name")
    );

    let rows = sqlx::query(&sql)
        .bind(playlist.id)
        .fetch_all(&mut *tx)
        .await?;
    tx.commit().await?;

    let rows_scanned = rows.len();
    let mut tracks = Vec::with_capacity(rows_scanned);
    for row in &rows {
        match decode_track(row) {
            Ok(Some(track)) => tracks.push(track),
            Ok(None) => {}
            Err(e) => warn!("Skipping undecodable track row in '{}': {}", playlist.name, e),
        }
    }

    Ok(SessionScan::Session {
        playlist,
        rows_scanned,
        tracks,
    })
}

fn decode_track(row: &sqlx::sqlite::SqliteRow) -> std::result::Result<Option<TrackRecord>, sqlx::Error> {
    Ok(TrackRecord::from_columns(
        row.try_get("bpm")?,
        row.try_get("artist")?,
        row.try_get("title")?,
        row.try_get("duration")?,
        row.try_get("crates")?,
        row.try_get("playlists")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn matches_session_name(pool: &SqlitePool, name: &str) -> bool {
        let sql = format!("SELECT {} FROM (SELECT ? AS name)", session_name_predicate("name"));
        let matched: i64 = sqlx::query_scalar(&sql)
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
        matched != 0
    }

    #[tokio::test]
    async fn test_session_name_forms() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();

        for name in ["2024-01-01", "2024-01-02 (live)", "2024-01-02 (2)", "2023-12-31 #3"] {
            assert!(matches_session_name(&pool, name).await, "{name} should be a session");
        }

        for name in [
            "Favourites",
            "2024-01-01 live",
            "2024-01-01(live)",
            "2024-01-01 (live",
            "24-01-01",
            "abcd-ef-gh",
            "Set 2024-01-01",
            "2024-01-01 extra (x)",
        ] {
            assert!(!matches_session_name(&pool, name).await, "{name} should not be a session");
        }
    }

    #[test]
    fn test_into_tracks_for_no_session_is_empty() {
        assert!(SessionScan::NoSession.into_tracks().is_empty());
    }
}
