// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential pair persistence.
//!
//! The access/refresh pair is stored as a single JSON record under one key:
//! the byte-store only guarantees single-key atomicity, and one record is
//! what makes "both tokens replace and disappear together" hold.
//!
//! Read and write failures degrade to "no credentials" rather than
//! surfacing: a client that cannot persist tokens behaves like one that was
//! never logged in, which every caller already handles.

use std::sync::Arc;

use tracing::warn;

use fixly_core::{CredentialPair, KeyValueStore};

const CREDENTIALS_KEY: &str = "auth:credentials";

/// Byte-store-backed home of the credential pair.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the stored pair. Absent, unreadable, or corrupt records all
    /// yield `None`.
    pub async fn load(&self) -> Option<CredentialPair> {
        let raw = match self.store.get(CREDENTIALS_KEY).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "failed to read stored credentials");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(pair) => Some(pair),
            Err(err) => {
                warn!(error = %err, "stored credentials are corrupt; treating as absent");
                None
            }
        }
    }

    /// Persist a new pair, replacing any previous one.
    pub async fn save(&self, pair: &CredentialPair) {
        let raw = match serde_json::to_string(pair) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to serialize credentials");
                return;
            }
        };
        if let Err(err) = self.store.set(CREDENTIALS_KEY, &raw).await {
            warn!(error = %err, "failed to persist credentials");
        }
    }

    /// Remove the stored pair.
    pub async fn clear(&self) {
        if let Err(err) = self.store.remove(CREDENTIALS_KEY).await {
            warn!(error = %err, "failed to clear stored credentials");
        }
    }
}

#[cfg(test)]
mod tests {
    use fixly_storage::MemoryStore;

    use super::*;

    fn pair(access: &str, refresh: &str) -> CredentialPair {
        CredentialPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[tokio::test]
    async fn save_load_clear_roundtrip() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(creds.load().await, None);

        creds.save(&pair("tokA", "refA")).await;
        assert_eq!(creds.load().await, Some(pair("tokA", "refA")));

        creds.save(&pair("tokB", "refB")).await;
        assert_eq!(creds.load().await, Some(pair("tokB", "refB")));

        creds.clear().await;
        assert_eq!(creds.load().await, None);
    }

    #[tokio::test]
    async fn corrupt_record_degrades_to_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set(CREDENTIALS_KEY, "not json").await.unwrap();

        let creds = CredentialStore::new(store);
        assert_eq!(creds.load().await, None);
    }
}
