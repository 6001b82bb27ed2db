//! Test Helper Utilities
//!
//! Builds throwaway Mixxx library databases on disk. The fixture keeps a
//! writable pool for seeding; code under test opens the same file through
//! `djbuddy::db::connect_readonly`.

#![allow(dead_code)]

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

/// Subset of the Mixxx schema that djbuddy reads
pub const MIXXX_SCHEMA: &str = r#"
CREATE TABLE library (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist varchar(64),
    title varchar(64),
    album varchar(64),
    duration integer DEFAULT 0,
    bpm float,
    mixxx_deleted integer DEFAULT 0
);
CREATE TABLE Playlists (
    id INTEGER PRIMARY KEY,
    name varchar(48),
    position INTEGER,
    hidden INTEGER DEFAULT 0 NOT NULL,
    date_created datetime,
    date_modified datetime
);
CREATE TABLE PlaylistTracks (
    id INTEGER PRIMARY KEY,
    playlist_id INTEGER REFERENCES Playlists(id),
    track_id INTEGER REFERENCES library(id),
    position INTEGER,
    pl_datetime_added TEXT
);
CREATE TABLE crates (
    id integer PRIMARY KEY AUTOINCREMENT,
    name varchar(48) UNIQUE NOT NULL,
    count integer DEFAULT 0,
    show integer DEFAULT 1
);
CREATE TABLE crate_tracks (
    crate_id integer NOT NULL REFERENCES crates(id),
    track_id integer NOT NULL REFERENCES library(id),
    UNIQUE (crate_id, track_id)
);
"#;

/// Hidden flag Mixxx uses for its history (set log) playlists
pub const HIDDEN_SET_LOG: i64 = 2;

pub struct MixxxFixture {
    _dir: TempDir,
    pub path: PathBuf,
    pub writer: SqlitePool,
}

impl MixxxFixture {
    /// Database with the Mixxx schema and no rows
    pub async fn new() -> Self {
        let fixture = Self::without_schema().await;
        fixture.create_schema().await;
        fixture
    }

    /// Database file with no tables; queries against it fail
    pub async fn without_schema() -> Self {
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("mixxxdb.sqlite");

        let writer = SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true),
        )
        .await
        .expect("Should create fixture database");

        Self {
            _dir: dir,
            path,
            writer,
        }
    }

    pub async fn create_schema(&self) {
        sqlx::raw_sql(MIXXX_SCHEMA)
            .execute(&self.writer)
            .await
            .expect("Should create Mixxx schema");
    }

    /// Read-only pool as the application opens it
    pub async fn reader(&self) -> SqlitePool {
        djbuddy::db::connect_readonly(&self.path)
            .await
            .expect("Should connect read-only")
    }

    pub async fn add_track(
        &self,
        artist: Option<&str>,
        title: Option<&str>,
        bpm: Option<f64>,
        duration: Option<f64>,
    ) -> i64 {
        sqlx::query("INSERT INTO library (artist, title, bpm, duration) VALUES (?, ?, ?, ?)")
            .bind(artist)
            .bind(title)
            .bind(bpm)
            .bind(duration)
            .execute(&self.writer)
            .await
            .expect("Should insert track")
            .last_insert_rowid()
    }

    /// Shorthand for a fully tagged, analyzed track
    pub async fn add_simple_track(&self, title: &str, bpm: f64) -> i64 {
        self.add_track(Some("Artist"), Some(title), Some(bpm), Some(200.0))
            .await
    }

    pub async fn add_playlist(&self, name: &str, date_created: &str, hidden: i64) -> i64 {
        sqlx::query("INSERT INTO Playlists (name, hidden, date_created) VALUES (?, ?, ?)")
            .bind(name)
            .bind(hidden)
            .bind(date_created)
            .execute(&self.writer)
            .await
            .expect("Should insert playlist")
            .last_insert_rowid()
    }

    pub async fn add_to_playlist(&self, playlist_id: i64, track_id: i64, position: i64) {
        sqlx::query("INSERT INTO PlaylistTracks (playlist_id, track_id, position) VALUES (?, ?, ?)")
            .bind(playlist_id)
            .bind(track_id)
            .bind(position)
            .execute(&self.writer)
            .await
            .expect("Should insert playlist track");
    }

    pub async fn add_crate(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO crates (name) VALUES (?)")
            .bind(name)
            .execute(&self.writer)
            .await
            .expect("Should insert crate")
            .last_insert_rowid()
    }

    pub async fn add_to_crate(&self, crate_id: i64, track_id: i64) {
        sqlx::query("INSERT INTO crate_tracks (crate_id, track_id) VALUES (?, ?)")
            .bind(crate_id)
            .bind(track_id)
            .execute(&self.writer)
            .await
            .expect("Should insert crate track");
    }
}
