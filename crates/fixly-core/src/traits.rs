// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The byte-store boundary trait.
//!
//! Persistent browser-style storage as consumed by the client core: a
//! key-value string store with single-key atomicity only. No transactions,
//! no cross-key guarantees; writes may fail (quota) and most callers degrade
//! to "nothing cached" rather than propagate.

use async_trait::async_trait;

use crate::error::FixlyError;

/// Adapter for key-value byte-store backends.
///
/// Implementations serialize their own access; callers hold an
/// `Arc<dyn KeyValueStore>` and never coordinate beyond last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, FixlyError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), FixlyError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), FixlyError>;
}
