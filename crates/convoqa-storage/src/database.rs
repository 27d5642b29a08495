// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, so a
//! `Database` is the one writer for its file. Do NOT open extra connections
//! for writes.

use std::time::Duration;

use convoqa_core::ConvoqaError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Single-writer handle to the warehouse.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the warehouse at `path` in WAL mode and
    /// apply pending migrations.
    pub async fn open(path: &str) -> Result<Self, ConvoqaError> {
        Self::open_with_options(path, true).await
    }

    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, ConvoqaError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConvoqaError::Storage { source: Box::new(e) })?;

        conn.call(move |conn| -> Result<Result<(), ConvoqaError>, rusqlite::Error> {
            if wal_mode {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        debug!(path, wal_mode, "warehouse opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. Query modules go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, waiting for queued statements to finish.
    pub async fn close(self) -> Result<(), ConvoqaError> {
        self.conn
            .close()
            .await
            .map_err(|e| ConvoqaError::Storage { source: Box::new(e) })
    }
}

/// Map a tokio-rusqlite call error into the storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConvoqaError {
    ConvoqaError::Storage {
        source: Box::new(e),
    }
}

/// Current UTC time in the warehouse's text timestamp format.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
