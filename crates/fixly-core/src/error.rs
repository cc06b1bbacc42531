// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fixly client core.

use thiserror::Error;

/// The primary error type used across the Fixly client crates.
///
/// Only `Api`, `Unauthorized`, and `SessionExpired` are expected to reach
/// UI callers; storage and decode failures are absorbed at the layer where
/// they occur and degrade to cache misses.
#[derive(Debug, Error)]
pub enum FixlyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Byte-store backend errors (database connection, query failure, quota).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP request failures: network errors, timeouts, non-success statuses.
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server rejected the call's credentials and the one permitted
    /// renewal replay has already been spent (or none was possible).
    #[error("unauthorized")]
    Unauthorized,

    /// Credential renewal itself failed. Terminal for the current session:
    /// stored credentials are cleared before this is returned.
    #[error("session expired: {message}")]
    SessionExpired { message: String },

    /// A response body did not match the expected shape.
    #[error("decode error: {source}")]
    Decode {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FixlyError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Wrap a serde failure as a decode error.
    pub fn decode<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode {
            source: Box::new(source),
        }
    }
}
