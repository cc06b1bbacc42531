// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the byte-store trait.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};

use fixly_core::{FixlyError, KeyValueStore};

use crate::database::{Database, map_tr_err};

/// SQLite-backed byte-store.
///
/// Wraps a [`Database`] handle; every operation goes through the single
/// background writer thread, so concurrent callers serialize naturally.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    pub async fn open(path: &str) -> Result<Self, FixlyError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Open an in-memory store.
    pub async fn open_in_memory() -> Result<Self, FixlyError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Checkpoint and release the store.
    pub async fn close(&self) -> Result<(), FixlyError> {
        self.db.close().await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, FixlyError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let value = conn
                    .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                        row.get(0)
                    })
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), FixlyError> {
        let key = key.to_string();
        let value = value.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn remove(&self, key: &str) -> Result<(), FixlyError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
