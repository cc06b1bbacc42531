// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fixly client core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level Fixly client configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FixlyConfig {
    /// Platform API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Chat cache settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Byte-store backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Platform API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every request path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request ceiling in seconds. Exceeding it is a generic request
    /// failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause after the last keystroke before an address lookup is issued.
    #[serde(default = "default_suggest_debounce_ms")]
    pub suggest_debounce_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            suggest_debounce_ms: default_suggest_debounce_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.fixly.app".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_suggest_debounce_ms() -> u64 {
    300
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,

    /// Maximum entry age in seconds before a read is a miss.
    #[serde(default = "default_cache_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
            max_age_secs: default_cache_max_age_secs(),
        }
    }
}

fn default_cache_max_entries() -> usize {
    100
}

fn default_cache_max_age_secs() -> u64 {
    300
}

/// Chat cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Per-conversation trailing window of cached messages.
    #[serde(default = "default_max_cached_messages")]
    pub max_cached_messages: usize,

    /// Cap on the in-memory notification feed.
    #[serde(default = "default_max_notifications")]
    pub max_notifications: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_cached_messages: default_max_cached_messages(),
            max_notifications: default_max_notifications(),
        }
    }
}

fn default_max_cached_messages() -> usize {
    200
}

fn default_max_notifications() -> usize {
    100
}

/// Byte-store backend selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// WAL-mode SQLite file (persistent).
    #[default]
    Sqlite,
    /// In-memory store (ephemeral sessions, tests).
    Memory,
}

/// Byte-store backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Which backend to open.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file (ignored by the memory backend).
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "fixly.db".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
