// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fixly client SDK.
//!
//! This crate provides the error type, shared domain types, and the
//! byte-store trait used throughout the Fixly client workspace. Higher
//! crates (api, cache, chat, storage) all depend on this one and nothing
//! else in the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FixlyError;
pub use traits::KeyValueStore;
pub use types::{
    Conversation, ConversationPatch, CountedPage, CredentialPair, Message, Notification, Page,
    PageMeta, RealtimeEvent, SessionState, TEMP_MESSAGE_PREFIX,
};
