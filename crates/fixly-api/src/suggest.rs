// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellable address-autocomplete lookups.
//!
//! Each keystroke issues a new lookup and cancels its predecessor's
//! in-flight request, so a slow earlier response can never overwrite a
//! faster later one. The cancellation token doubles as the debounce guard:
//! a fetch superseded during its debounce window never reaches the network.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use fixly_core::FixlyError;

use crate::client::ApiClient;
use crate::envelope;

const SUGGEST_PATH: &str = "/addresses/suggest";

/// Default pause after the last keystroke before the request is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// One address-autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSuggestion {
    pub label: String,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// Debounced, self-cancelling suggestion lookup.
pub struct SuggestionFetcher {
    client: ApiClient,
    debounce: Duration,
    current: Mutex<Option<CancellationToken>>,
}

impl SuggestionFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self::with_debounce(client, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(client: ApiClient, debounce: Duration) -> Self {
        Self {
            client,
            debounce,
            current: Mutex::new(None),
        }
    }

    /// Look up suggestions for `query`.
    ///
    /// Returns `Ok(None)` when a newer keystroke superseded this lookup
    /// (cancellation is not an error); `Ok(Some(items))` otherwise.
    pub async fn fetch(&self, query: &str) -> Result<Option<Vec<AddressSuggestion>>, FixlyError> {
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
        }

        if !self.debounce.is_zero() {
            tokio::select! {
                _ = token.cancelled() => return Ok(None),
                _ = tokio::time::sleep(self.debounce) => {}
            }
        }

        let params = [("q", query)];
        let request = self.client.get_with_query(SUGGEST_PATH, &params);
        tokio::select! {
            // Dropping the request future aborts the underlying connection.
            _ = token.cancelled() => Ok(None),
            result = request => {
                let value = result?;
                let page = envelope::unwrap_paginated::<AddressSuggestion>(value);
                Ok(Some(page.items))
            }
        }
    }
}
