// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared domain types used across the Fixly client crates.
//!
//! Wire-facing structs use camelCase field names to match the platform API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id prefix marking a client-generated placeholder message that has
/// not yet been confirmed by the server.
pub const TEMP_MESSAGE_PREFIX: &str = "temp-";

/// Access/refresh token pair issued at login and rotated on every renewal.
///
/// Persisted as a single byte-store record so both tokens always replace and
/// disappear together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication state of the client session, broadcast to the UI layer.
///
/// Flips to `Expired` exactly once, when credential renewal fails terminally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Active,
    Expired,
}

/// A single chat message.
///
/// Two provenance states: placeholder (client-generated id carrying
/// [`TEMP_MESSAGE_PREFIX`], written optimistically before the server
/// confirms) and confirmed (server-assigned id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build an optimistic placeholder for a message the user just sent.
    pub fn placeholder(conversation_id: &str, sender_id: &str, content: &str) -> Self {
        Self {
            id: format!("{TEMP_MESSAGE_PREFIX}{}", uuid::Uuid::new_v4()),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Whether this message is still awaiting server confirmation.
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(TEMP_MESSAGE_PREFIX)
    }
}

/// Conversation summary record, one entry of the cached conversation index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u32,
}

impl Conversation {
    /// Merge a partial update into this summary. `None` fields are left as-is.
    pub fn apply(&mut self, patch: ConversationPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(last_message) = patch.last_message {
            self.last_message = Some(last_message);
        }
        if let Some(last_message_at) = patch.last_message_at {
            self.last_message_at = Some(last_message_at);
        }
        if let Some(unread_count) = patch.unread_count {
            self.unread_count = unread_count;
        }
    }
}

/// Partial update for a cached [`Conversation`] summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationPatch {
    pub title: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: Option<u32>,
}

/// An in-app notification delivered over the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub kind: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// Typed events delivered by the black-box real-time transport.
///
/// Decoded from `{"type": ..., "payload": ...}` frames; unknown types fail
/// decoding and are dropped by the ingestion layer, not treated as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum RealtimeEvent {
    #[serde(rename = "newMessage")]
    NewMessage(Message),
    #[serde(rename = "newNotification")]
    NewNotification(Notification),
}

/// Pagination metadata attached to list responses.
///
/// Every field defaults independently, so a partially malformed `meta`
/// object still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default = "default_total_pages")]
    pub total_pages: u64,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            page: default_page(),
            limit: default_limit(),
            total_pages: default_total_pages(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

fn default_total_pages() -> u64 {
    1
}

/// A decoded page of items plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// A [`Page`] plus a numeric side-channel field (e.g. an unread count).
#[derive(Debug, Clone, PartialEq)]
pub struct CountedPage<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_carries_temp_prefix() {
        let msg = Message::placeholder("c-1", "u-1", "hello");
        assert!(msg.is_placeholder());
        assert!(msg.id.starts_with(TEMP_MESSAGE_PREFIX));
        assert_eq!(msg.conversation_id, "c-1");
        assert_eq!(msg.sender_id, "u-1");
    }

    #[test]
    fn confirmed_id_is_not_placeholder() {
        let mut msg = Message::placeholder("c-1", "u-1", "hello");
        msg.id = "m-99".to_string();
        assert!(!msg.is_placeholder());
    }

    #[test]
    fn credential_pair_uses_wire_field_names() {
        let pair = CredentialPair {
            access_token: "tokA".to_string(),
            refresh_token: "refA".to_string(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "tokA");
        assert_eq!(json["refreshToken"], "refA");
    }

    #[test]
    fn page_meta_defaults_match_wire_contract() {
        let meta = PageMeta::default();
        assert_eq!(meta.total, 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 10);
        assert_eq!(meta.total_pages, 1);

        // Partial meta objects fill in missing fields.
        let partial: PageMeta = serde_json::from_value(serde_json::json!({"total": 42})).unwrap();
        assert_eq!(partial.total, 42);
        assert_eq!(partial.total_pages, 1);
    }

    #[test]
    fn conversation_patch_merges_only_set_fields() {
        let mut conv = Conversation {
            id: "c-1".to_string(),
            title: "Kitchen sink repair".to_string(),
            last_message: Some("on my way".to_string()),
            last_message_at: None,
            unread_count: 2,
        };
        conv.apply(ConversationPatch {
            last_message: Some("arrived".to_string()),
            unread_count: Some(3),
            ..Default::default()
        });
        assert_eq!(conv.title, "Kitchen sink repair");
        assert_eq!(conv.last_message.as_deref(), Some("arrived"));
        assert_eq!(conv.unread_count, 3);
    }

    #[test]
    fn realtime_event_decodes_tagged_frames() {
        let frame = serde_json::json!({
            "type": "newNotification",
            "payload": {
                "id": "n-1",
                "kind": "booking",
                "body": "Your pro confirmed",
                "createdAt": "2026-01-01T00:00:00Z"
            }
        });
        let event: RealtimeEvent = serde_json::from_value(frame).unwrap();
        match event {
            RealtimeEvent::NewNotification(n) => assert_eq!(n.id, "n-1"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn realtime_event_unknown_type_fails_decode() {
        let frame = serde_json::json!({"type": "presence", "payload": {}});
        assert!(serde_json::from_value::<RealtimeEvent>(frame).is_err());
    }
}
