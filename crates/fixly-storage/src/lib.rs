// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-store backends for the Fixly client core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, plus an in-memory
//! store for tests and ephemeral sessions. Both implement the
//! [`fixly_core::KeyValueStore`] trait consumed by the api and chat crates.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
