// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP layer of the Fixly client core.
//!
//! Provides [`ApiClient`] (bearer-authenticated calls with transparent,
//! single-flight credential renewal), response envelope decoding, credential
//! persistence, and the cancellable address-suggestion fetcher.
//!
//! Consumers receive either the decoded payload or the final, non-retriable
//! error; retry-on-401 lives here and nowhere else.

pub mod auth;
pub mod client;
pub mod envelope;
pub mod suggest;

pub use auth::CredentialStore;
pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use suggest::{AddressSuggestion, SuggestionFetcher};
