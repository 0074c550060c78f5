// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Document store client contract.
//!
//! A document store holds JSON records at `/`-separated paths. Every call is
//! one request with one outcome; nothing is cached, so each read reflects the
//! backend's state at call time.

use async_trait::async_trait;
use serde_json::Value;

use super::StoreResult;

/// A record together with the key it is stored under.
pub type KeyedRecord = (String, Value);

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend name used in logs and health output.
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    /// Write a record at `path`, replacing whatever was there.
    async fn write(&self, path: &str, record: &Value) -> StoreResult<()>;

    /// Append a record to `collection` under a store-assigned key.
    ///
    /// Keys sort in creation order.
    async fn push(&self, collection: &str, record: &Value) -> StoreResult<String>;

    /// Read the record at `path`, or `None` when nothing is stored there.
    async fn read(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Read every direct child of `collection` in key order.
    ///
    /// An absent collection is an empty list, not an error.
    async fn children(&self, collection: &str) -> StoreResult<Vec<KeyedRecord>>;

    /// Children of `collection` whose text `field` equals `value`.
    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<KeyedRecord>> {
        let records = self.children(collection).await?;
        Ok(records
            .into_iter()
            .filter(|(_, record)| field_equals(record, field, value))
            .collect())
    }

    /// Remove the record at `path` and anything stored beneath it.
    ///
    /// Removing an absent path succeeds.
    async fn delete(&self, path: &str) -> StoreResult<()>;
}

/// Whether `record` has a text `field` equal to `value`.
pub fn field_equals(record: &Value, field: &str, value: &str) -> bool {
    record.get(field).and_then(Value::as_str) == Some(value)
}
