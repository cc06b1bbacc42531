// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./fixly.toml` > `~/.config/fixly/fixly.toml`
//! > `/etc/fixly/fixly.toml` with environment variable overrides via the
//! `FIXLY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FixlyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/fixly/fixly.toml` (system-wide)
/// 3. `~/.config/fixly/fixly.toml` (user XDG config)
/// 4. `./fixly.toml` (local directory)
/// 5. `FIXLY_*` environment variables
pub fn load_config() -> Result<FixlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FixlyConfig::default()))
        .merge(Toml::file("/etc/fixly/fixly.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fixly/fixly.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fixly.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FixlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FixlyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FixlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FixlyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FIXLY_CHAT_MAX_CACHED_MESSAGES` must
/// map to `chat.max_cached_messages`, not `chat.max.cached.messages`.
fn env_provider() -> Env {
    Env::prefixed("FIXLY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FIXLY_API_BASE_URL -> "api_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
