// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! valid key listings and "did you mean?" suggestions using Jaro-Winkler
//! string similarity.

use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// 0.75 catches common typos like `timout_secs` -> `timeout_secs` while
/// filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic context.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(fixly::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(fixly::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(fixly::config::missing_key),
        help("add `{key} = <value>` to your fixly.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(fixly::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(fixly::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a Figment extraction error into diagnostics, one per underlying
/// error.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter().map(convert_single).collect()
}

fn convert_single(err: figment::Error) -> ConfigError {
    use figment::error::Kind;

    let path = err.path.join(".");
    match &err.kind {
        Kind::UnknownField(field, expected) => {
            let key = join_key(&path, field);
            ConfigError::UnknownKey {
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                key,
            }
        }
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: path,
            detail: format!("found {actual}"),
            expected: expected.clone(),
        },
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: join_key(&path, field),
        },
        _ => ConfigError::Other(err.to_string()),
    }
}

fn join_key(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Pick the closest valid key by Jaro-Winkler similarity, if any clears the
/// threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a batch of config errors to stderr, one per line with help text.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!("error: {err}");
        if let Some(help) = err.help() {
            eprintln!("  help: {help}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_catches_close_typos() {
        let valid = ["base_url", "timeout_secs", "suggest_debounce_ms"];
        assert_eq!(
            suggest_key("timout_secs", &valid),
            Some("timeout_secs".to_string())
        );
        assert_eq!(suggest_key("zzz", &valid), None);
    }

    #[test]
    fn unknown_key_help_includes_suggestion() {
        let err = ConfigError::UnknownKey {
            key: "api.base_ur".to_string(),
            suggestion: Some("base_url".to_string()),
            valid_keys: "base_url, timeout_secs".to_string(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("did you mean `base_url`"), "got: {help}");
    }
}
