// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server response envelope decoding.
//!
//! The platform API answers in three shapes: a bare value, `{data, meta}`,
//! and `{data, meta, unreadCount}`. This module normalizes all of them
//! through one explicit [`Envelope`] union so the wrapped-vs-bare decision
//! lives in exactly one place.
//!
//! API-contract constraint: any JSON object carrying a top-level `data` key
//! is treated as a wrapped envelope. A legitimate payload with its own
//! top-level `data` field would be misread; the contract with the API owners
//! forbids that shape.
//!
//! The paginated and counted forms never fail: malformed input degrades to
//! empty lists and default metadata so rendering code needs no null-checks
//! beyond "empty list".

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use fixly_core::{CountedPage, FixlyError, Page, PageMeta};

/// The two envelope shapes the server is allowed to answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped(Wrapped),
    Bare(Value),
}

#[derive(Debug, Deserialize)]
struct Wrapped {
    data: Value,
    #[serde(default)]
    meta: Option<Value>,
    /// Side-channel fields riding next to `data` (e.g. `unreadCount`).
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn parse(value: Value) -> Envelope {
    // `Bare` accepts any JSON value, so this only falls through on a
    // serde internal failure.
    serde_json::from_value(value).unwrap_or(Envelope::Bare(Value::Null))
}

/// Extract the payload: the `data` field of a wrapped envelope, or the body
/// itself.
pub fn unwrap(value: Value) -> Value {
    match parse(value) {
        Envelope::Wrapped(w) => w.data,
        Envelope::Bare(v) => v,
    }
}

/// Typed [`unwrap`] for callers that need a concrete shape.
pub fn unwrap_as<T: DeserializeOwned>(value: Value) -> Result<T, FixlyError> {
    serde_json::from_value(unwrap(value)).map_err(FixlyError::decode)
}

/// Extract a page of items plus metadata.
///
/// A non-array `data` coerces to an empty list, elements that fail to decode
/// are dropped, and missing or malformed `meta` synthesizes the default
/// `{total: 0, page: 1, limit: 10, totalPages: 1}`.
pub fn unwrap_paginated<T: DeserializeOwned>(value: Value) -> Page<T> {
    match parse(value) {
        Envelope::Wrapped(w) => Page {
            items: decode_items(w.data),
            meta: decode_meta(w.meta),
        },
        Envelope::Bare(v) => Page {
            items: decode_items(v),
            meta: PageMeta::default(),
        },
    }
}

/// [`unwrap_paginated`] plus a numeric side-channel field, defaulting to 0
/// when missing or non-numeric.
pub fn unwrap_with_count<T: DeserializeOwned>(value: Value, field: &str) -> CountedPage<T> {
    match parse(value) {
        Envelope::Wrapped(w) => {
            let count = w.extra.get(field).and_then(Value::as_u64).unwrap_or(0);
            CountedPage {
                items: decode_items(w.data),
                meta: decode_meta(w.meta),
                count,
            }
        }
        Envelope::Bare(v) => CountedPage {
            items: decode_items(v),
            meta: PageMeta::default(),
            count: 0,
        },
    }
}

fn decode_items<T: DeserializeOwned>(data: Value) -> Vec<T> {
    match data {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_meta(meta: Option<Value>) -> PageMeta {
    meta.and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
