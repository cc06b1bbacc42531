// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory notification feed.
//!
//! Holds the most recent notifications newest-first, deduplicated by id and
//! capped. The unread counter is seeded from the server's side-channel count
//! (which may exceed the cached window) and maintained locally after that.

use std::sync::{Mutex, MutexGuard, PoisonError};

use fixly_core::Notification;

/// Default cap on cached notifications.
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 100;

struct FeedInner {
    items: Vec<Notification>,
    unread: u64,
}

/// Bounded, deduplicated notification list with an unread counter.
pub struct NotificationFeed {
    inner: Mutex<FeedInner>,
    max_entries: usize,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_NOTIFICATIONS)
    }
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(FeedInner {
                items: Vec::new(),
                unread: 0,
            }),
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the feed with a server-fetched page and its side-channel
    /// unread count.
    pub fn seed(&self, items: Vec<Notification>, unread_count: u64) {
        let mut inner = self.lock();
        inner.items = items;
        inner.items.truncate(self.max_entries);
        inner.unread = unread_count;
    }

    /// Ingest one notification from the real-time channel.
    ///
    /// Duplicate ids are dropped; new entries go to the front and push the
    /// oldest out past the cap.
    pub fn add_notification(&self, notification: Notification) {
        let mut inner = self.lock();
        if inner.items.iter().any(|n| n.id == notification.id) {
            return;
        }
        if !notification.read {
            inner.unread += 1;
        }
        inner.items.insert(0, notification);
        let max_entries = self.max_entries;
        inner.items.truncate(max_entries);
    }

    /// Current snapshot, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().items.clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.lock().unread
    }

    pub fn mark_all_read(&self) {
        let mut inner = self.lock();
        for item in &mut inner.items {
            item.read = true;
        }
        inner.unread = 0;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn notification(id: &str) -> Notification {
        Notification {
            id: id.to_string(),
            kind: "booking".to_string(),
            body: "Your pro confirmed".to_string(),
            created_at: Utc::now(),
            read: false,
        }
    }

    #[test]
    fn add_dedupes_and_counts_unread() {
        let feed = NotificationFeed::new();
        feed.add_notification(notification("n-1"));
        feed.add_notification(notification("n-1"));
        feed.add_notification(notification("n-2"));

        assert_eq!(feed.notifications().len(), 2);
        assert_eq!(feed.unread_count(), 2);
        // Newest first.
        assert_eq!(feed.notifications()[0].id, "n-2");
    }

    #[test]
    fn capacity_pushes_out_the_oldest() {
        let feed = NotificationFeed::with_capacity(3);
        for i in 0..5 {
            feed.add_notification(notification(&format!("n-{i}")));
        }
        let items = feed.notifications();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "n-4");
        assert_eq!(items[2].id, "n-2");
    }

    #[test]
    fn seed_takes_the_server_unread_count() {
        let feed = NotificationFeed::new();
        // Server reports more unread than the page holds.
        feed.seed(vec![notification("n-1")], 12);
        assert_eq!(feed.unread_count(), 12);

        feed.add_notification(notification("n-2"));
        assert_eq!(feed.unread_count(), 13);

        feed.mark_all_read();
        assert_eq!(feed.unread_count(), 0);
        assert!(feed.notifications().iter().all(|n| n.read));
    }
}
