// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time event ingestion.
//!
//! The transport is a black box that hands over raw JSON frames. Frames
//! decode into [`RealtimeEvent`]s and route into the conversation cache and
//! the notification feed; unknown event types are dropped, not errors.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use fixly_core::{ConversationPatch, RealtimeEvent};

use crate::cache::ChatCache;
use crate::notifications::NotificationFeed;

/// Decode one raw transport frame. `None` for unknown or malformed frames.
pub fn decode_event(value: Value) -> Option<RealtimeEvent> {
    serde_json::from_value(value).ok()
}

/// Routes real-time events into the local caches.
pub struct Inbox {
    chat: ChatCache,
    feed: Arc<NotificationFeed>,
}

impl Inbox {
    pub fn new(chat: ChatCache, feed: Arc<NotificationFeed>) -> Self {
        Self { chat, feed }
    }

    pub fn chat(&self) -> &ChatCache {
        &self.chat
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    /// Decode and apply one raw frame. Unknown frames are dropped.
    pub async fn apply_raw(&self, value: Value) {
        match decode_event(value) {
            Some(event) => self.apply_event(event).await,
            None => debug!("dropping unrecognized realtime frame"),
        }
    }

    /// Apply one typed event.
    pub async fn apply_event(&self, event: RealtimeEvent) {
        match event {
            RealtimeEvent::NewMessage(message) => {
                let conversation_id = message.conversation_id.clone();
                self.chat.append_message(&conversation_id, message.clone()).await;

                // Patch the index so previews stay current without a reload.
                let unread = self
                    .chat
                    .conversations()
                    .await
                    .iter()
                    .find(|c| c.id == conversation_id)
                    .map(|c| c.unread_count + 1);
                self.chat
                    .update_conversation(&conversation_id, ConversationPatch {
                        last_message: Some(message.content),
                        last_message_at: Some(message.created_at),
                        unread_count: unread,
                        ..Default::default()
                    })
                    .await;
            }
            RealtimeEvent::NewNotification(notification) => {
                self.feed.add_notification(notification);
            }
        }
    }
}
