// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local chat state for the Fixly client core.
//!
//! Persists per-conversation message lists and the conversation index to the
//! byte-store with a trailing-window cap, reconciles optimistic sends with
//! server confirmations, and routes real-time events into those caches.

pub mod cache;
pub mod events;
pub mod notifications;

pub use cache::{ChatCache, DEFAULT_MAX_CACHED_MESSAGES};
pub use events::{Inbox, decode_event};
pub use notifications::{DEFAULT_MAX_NOTIFICATIONS, NotificationFeed};
