// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flows across the client core crates: an authenticated listing
//! fetched through the response cache with a credential renewal mid-session,
//! and realtime chat ingestion persisting across a byte-store reopen.

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixly_api::{ApiClient, envelope};
use fixly_cache::SwrCache;
use fixly_chat::{ChatCache, Inbox, NotificationFeed};
use fixly_core::{Conversation, CredentialPair, Message};
use fixly_storage::SqliteStore;

#[tokio::test]
async fn cached_listing_survives_a_renewal_mid_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(header("authorization", "Bearer tokA"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(header("authorization", "Bearer tokB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "j-1", "title": "Fix kitchen sink"}],
            "meta": {"total": 1, "page": 1, "limit": 10, "totalPages": 1}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"accessToken": "tokB", "refreshToken": "refB"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("e2e.db");
    let store = Arc::new(SqliteStore::open(db_path.to_str().unwrap()).await.unwrap());
    let client = ApiClient::new(server.uri(), store).unwrap();
    client
        .credential_store()
        .save(&CredentialPair {
            access_token: "tokA".to_string(),
            refresh_token: "refA".to_string(),
        })
        .await;

    // Read-through: the expired token renews transparently under the cache.
    let cache: SwrCache<Value> = SwrCache::default();
    let body = {
        let client = client.clone();
        cache
            .fetch_with_cache("jobs:list", move || async move {
                client.get("/jobs").await
            })
            .await
            .unwrap()
    };
    let page = envelope::unwrap_paginated::<Value>(body);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0]["id"], "j-1");
    assert_eq!(page.meta.total, 1);

    // The listing is now served from memory and the rotated pair stuck.
    assert!(cache.get("jobs:list").is_some());
    let stored = client.credential_store().load().await.unwrap();
    assert_eq!(stored.access_token, "tokB");
}

#[tokio::test]
async fn realtime_chat_flow_persists_across_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("chat.db");
    let db_path = db_path.to_str().unwrap();

    {
        let store = Arc::new(SqliteStore::open(db_path).await.unwrap());
        let chat = ChatCache::new(store);
        chat.set_conversations(&[Conversation {
            id: "c-1".to_string(),
            title: "Bathroom tiling".to_string(),
            last_message: None,
            last_message_at: None,
            unread_count: 0,
        }])
        .await;

        // Optimistic send, then the confirmed counterpart arrives.
        let placeholder = Message::placeholder("c-1", "u-1", "when can you start?");
        chat.append_message("c-1", placeholder).await;

        let inbox = Inbox::new(chat.clone(), Arc::new(NotificationFeed::new()));
        inbox
            .apply_raw(json!({
                "type": "newMessage",
                "payload": {
                    "id": "m-1",
                    "conversationId": "c-1",
                    "senderId": "u-2",
                    "content": "tomorrow at 9",
                    "createdAt": "2026-03-01T09:00:00Z"
                }
            }))
            .await;
        chat.replace_temp_message("c-1", "u-1", "when can you start?", Message {
            id: "m-2".to_string(),
            conversation_id: "c-1".to_string(),
            sender_id: "u-1".to_string(),
            content: "when can you start?".to_string(),
            created_at: "2026-03-01T08:59:00Z".parse().unwrap(),
        })
        .await;
    }

    // A fresh process sees the reconciled history.
    let store = Arc::new(SqliteStore::open(db_path).await.unwrap());
    let chat = ChatCache::new(store);

    let messages = chat.messages("c-1").await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "m-2", "placeholder kept its position");
    assert_eq!(messages[1].id, "m-1");
    assert!(messages.iter().all(|m| !m.is_placeholder()));

    let index = chat.conversations().await;
    assert_eq!(index[0].last_message.as_deref(), Some("tomorrow at 9"));
    assert_eq!(index[0].unread_count, 1);
}
