// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fixly status` command implementation.
//!
//! Opens the configured byte-store, runs a write/read probe, and reports
//! whether a credential pair is present.

use std::sync::Arc;

use fixly_api::CredentialStore;
use fixly_config::{FixlyConfig, StorageBackend};
use fixly_core::{FixlyError, KeyValueStore};
use fixly_storage::{MemoryStore, SqliteStore};

const PROBE_KEY: &str = "diag:probe";

/// Run the `fixly status` command.
pub async fn run_status(config: &FixlyConfig) -> Result<(), FixlyError> {
    let store = open_store(config).await?;

    let healthy = probe_store(store.as_ref()).await?;
    let logged_in = CredentialStore::new(Arc::clone(&store)).load().await.is_some();

    println!("api base:  {}", config.api.base_url);
    match config.storage.backend {
        StorageBackend::Sqlite => {
            println!("storage:   sqlite ({})", config.storage.database_path)
        }
        StorageBackend::Memory => println!("storage:   memory (ephemeral)"),
    }
    println!(
        "store:     {}",
        if healthy { "healthy" } else { "unhealthy" }
    );
    println!(
        "session:   {}",
        if logged_in {
            "credentials present"
        } else {
            "not logged in"
        }
    );
    Ok(())
}

async fn open_store(config: &FixlyConfig) -> Result<Arc<dyn KeyValueStore>, FixlyError> {
    Ok(match config.storage.backend {
        StorageBackend::Sqlite => {
            Arc::new(SqliteStore::open(&config.storage.database_path).await?)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    })
}

/// Write/read/remove under a reserved key to prove the store works end to end.
async fn probe_store(store: &dyn KeyValueStore) -> Result<bool, FixlyError> {
    store.set(PROBE_KEY, "ok").await?;
    let readback = store.get(PROBE_KEY).await?;
    store.remove(PROBE_KEY).await?;
    Ok(readback.as_deref() == Some("ok"))
}
