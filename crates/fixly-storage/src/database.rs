// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The `Database` struct IS the single writer; do NOT create
//! additional Connection instances for writes.

use fixly_core::FixlyError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite byte-store database.
///
/// Opened explicitly, closed explicitly (WAL checkpoint). Query code calls
/// through [`Database::connection`] with `conn.call(...)`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, FixlyError> {
        let conn = Connection::open(path.to_owned())
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::Error(e)))?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )
            .map_err(FixlyError::storage)?;
            migrations::run_migrations(conn).map_err(FixlyError::storage)?;
            Ok::<(), FixlyError>(())
        })
        .await
        .map_err(unwrap_call_err)?;

        debug!(path, "byte-store database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests and ephemeral sessions).
    pub async fn open_in_memory() -> Result<Self, FixlyError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::Error(e)))?;
        conn.call(|conn| {
            migrations::run_migrations(conn).map_err(FixlyError::storage)?;
            Ok::<(), FixlyError>(())
        })
        .await
        .map_err(unwrap_call_err)?;
        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL, flushing pending pages into the main file.
    pub async fn close(&self) -> Result<(), FixlyError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error) -> FixlyError {
    FixlyError::storage(err)
}

/// Flatten a `Connection::call` error whose closure already produced a
/// [`FixlyError`]: surface that error directly, and wrap the rare
/// connection/close failures as storage errors.
fn unwrap_call_err(err: tokio_rusqlite::Error<FixlyError>) -> FixlyError {
    match err {
        tokio_rusqlite::Error::Error(e) => e,
        other => FixlyError::storage(other),
    }
}
