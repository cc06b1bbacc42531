// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent conversation cache.
//!
//! Gives the chat UI an immediately-renderable view of recent messages and
//! the conversation index, reconciling optimistically-sent placeholders with
//! their server-confirmed counterparts.
//!
//! Every operation is best-effort: a byte-store or decode failure degrades
//! to "nothing cached" on reads and a no-op on writes, logged and never
//! surfaced. The server remains the source of truth; this cache only has to
//! be correct about what it does hold: no duplicate ids, placeholders
//! replaced in place, and never more than the trailing window of messages.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use fixly_core::{Conversation, ConversationPatch, KeyValueStore, Message};

/// Per-conversation trailing-window cap. Older history falls out of the
/// local cache, not out of the server.
pub const DEFAULT_MAX_CACHED_MESSAGES: usize = 200;

const CONVERSATIONS_KEY: &str = "chat:conversations";

fn messages_key(conversation_id: &str) -> String {
    format!("chat:messages:{conversation_id}")
}

/// Byte-store-backed cache of conversations and their recent messages.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct ChatCache {
    store: Arc<dyn KeyValueStore>,
    max_messages: usize,
}

impl ChatCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_MAX_CACHED_MESSAGES)
    }

    pub fn with_capacity(store: Arc<dyn KeyValueStore>, max_messages: usize) -> Self {
        Self {
            store,
            max_messages: max_messages.max(1),
        }
    }

    /// Read the cached conversation index, empty on any failure.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.read_list(CONVERSATIONS_KEY).await
    }

    /// Replace the cached conversation index.
    pub async fn set_conversations(&self, conversations: &[Conversation]) {
        self.write_list(CONVERSATIONS_KEY, conversations).await;
    }

    /// Read a conversation's cached messages, empty on any failure.
    pub async fn messages(&self, conversation_id: &str) -> Vec<Message> {
        self.read_list(&messages_key(conversation_id)).await
    }

    /// Replace a conversation's cached messages, truncated to the most
    /// recent `max_messages` before persisting.
    pub async fn set_messages(&self, conversation_id: &str, messages: &[Message]) {
        let tail = &messages[messages.len().saturating_sub(self.max_messages)..];
        self.write_list(&messages_key(conversation_id), tail).await;
    }

    /// Append `message` unless its id is already cached.
    pub async fn append_message(&self, conversation_id: &str, message: Message) {
        let mut messages = self.messages(conversation_id).await;
        if messages.iter().any(|m| m.id == message.id) {
            return;
        }
        messages.push(message);
        self.set_messages(conversation_id, &messages).await;
    }

    /// Reconcile an optimistic send with its server-confirmed counterpart.
    ///
    /// The first cached placeholder matching sender and exact content is
    /// overwritten in place, keeping its list position so the UI ordering
    /// does not jump. When no placeholder matches (it scrolled out of the
    /// window, or another device originated the send), `confirmed` is
    /// appended only if its id is not already cached. The dual path
    /// prevents both lost updates and duplicate insertion.
    pub async fn replace_temp_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        confirmed: Message,
    ) {
        let mut messages = self.messages(conversation_id).await;
        let slot = messages
            .iter_mut()
            .find(|m| m.is_placeholder() && m.sender_id == sender_id && m.content == content);
        match slot {
            Some(slot) => *slot = confirmed,
            None => {
                if messages.iter().any(|m| m.id == confirmed.id) {
                    return;
                }
                messages.push(confirmed);
            }
        }
        self.set_messages(conversation_id, &messages).await;
    }

    /// Merge a partial update into one cached conversation summary. No-op
    /// when the index is not cached or the conversation is unknown.
    pub async fn update_conversation(&self, conversation_id: &str, patch: ConversationPatch) {
        let mut conversations = self.conversations().await;
        let Some(conversation) = conversations.iter_mut().find(|c| c.id == conversation_id)
        else {
            return;
        };
        conversation.apply(patch);
        self.set_conversations(&conversations).await;
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key, error = %err, "chat cache read failed");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(key, error = %err, "chat cache entry is corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    async fn write_list<T: Serialize>(&self, key: &str, items: &[T]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "chat cache serialization failed");
                return;
            }
        };
        if let Err(err) = self.store.set(key, &raw).await {
            warn!(key, error = %err, "chat cache write failed");
        }
    }
}
