// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! In-process store implementing both store contracts.
//!
//! Used by tests and by the `memory` backend for local development. It
//! counts every call so tests can prove that an operation never reached the
//! store, and it can be told to fail to exercise error paths.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::document::{DocumentStore, KeyedRecord};
use super::object::ObjectStore;
use super::paths::{split_object_key, validate_document_path, validate_object_key};
use super::{StoreError, StoreResult};

#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    content_type: String,
}

pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Value>>,
    objects: Mutex<BTreeMap<String, Blob>>,
    unresolvable: Mutex<HashSet<String>>,
    calls: AtomicU64,
    failing: AtomicBool,
    /// Calls numbered above this fail.
    last_good_call: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            documents: Mutex::default(),
            objects: Mutex::default(),
            unresolvable: Mutex::default(),
            calls: AtomicU64::new(0),
            failing: AtomicBool::new(false),
            last_good_call: AtomicU64::new(u64::MAX),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Make every subsequent call fail, or succeed again.
    ///
    /// Clearing the flag also cancels [`fail_after`](Self::fail_after).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
        if !failing {
            self.last_good_call.store(u64::MAX, Ordering::Relaxed);
        }
    }

    /// Let the next `n` calls succeed and fail every call after them.
    pub fn fail_after(&self, n: u64) {
        let limit = self.calls().saturating_add(n);
        self.last_good_call.store(limit, Ordering::Relaxed);
    }

    /// Make `url_for` fail for one key only.
    pub async fn fail_url_for(&self, key: &str) {
        self.unresolvable.lock().await.insert(key.to_string());
    }

    /// Bytes and content type of a stored blob.
    pub async fn blob(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .await
            .get(key)
            .map(|blob| (blob.bytes.clone(), blob.content_type.clone()))
    }

    fn begin_call(&self) -> StoreResult<()> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.failing.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        if call > self.last_good_call.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(format!("memory store failed call {call}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, path: &str, record: &Value) -> StoreResult<()> {
        self.begin_call()?;
        validate_document_path(path)?;
        self.documents
            .lock()
            .await
            .insert(path.to_string(), record.clone());
        Ok(())
    }

    async fn push(&self, collection: &str, record: &Value) -> StoreResult<String> {
        self.begin_call()?;
        validate_document_path(collection)?;
        let key = Uuid::now_v7().to_string();
        self.documents
            .lock()
            .await
            .insert(format!("{collection}/{key}"), record.clone());
        Ok(key)
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        self.begin_call()?;
        validate_document_path(path)?;
        Ok(self.documents.lock().await.get(path).cloned())
    }

    async fn children(&self, collection: &str) -> StoreResult<Vec<KeyedRecord>> {
        self.begin_call()?;
        validate_document_path(collection)?;
        let prefix = format!("{collection}/");
        let documents = self.documents.lock().await;
        Ok(documents
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, record)| {
                let key = &path[prefix.len()..];
                (!key.contains('/')).then(|| (key.to_string(), record.clone()))
            })
            .collect())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.begin_call()?;
        validate_document_path(path)?;
        let prefix = format!("{path}/");
        self.documents
            .lock()
            .await
            .retain(|key, _| key != path && !key.starts_with(&prefix));
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        self.begin_call()?;
        validate_object_key(key)?;
        self.objects.lock().await.insert(
            key.to_string(),
            Blob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(key.to_string())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.begin_call()?;
        Ok(self
            .objects
            .lock()
            .await
            .keys()
            .filter_map(|key| {
                let (key_prefix, name) = split_object_key(key);
                (key_prefix == prefix).then(|| name.to_string())
            })
            .collect())
    }

    async fn url_for(&self, key: &str) -> StoreResult<String> {
        self.begin_call()?;
        if self.unresolvable.lock().await.contains(key) {
            return Err(StoreError::Unavailable(format!("cannot resolve {key}")));
        }
        if !self.objects.lock().await.contains_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(format!("memory://{key}"))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.begin_call()?;
        match self.objects.lock().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn documents_round_trip_and_count_calls() {
        let store = MemoryStore::new();
        store.write("donation_goals/June", &json!({ "month": "June" })).await.unwrap();
        let record = store.read("donation_goals/June").await.unwrap();

        assert_eq!(record, Some(json!({ "month": "June" })));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn children_are_in_push_order() {
        let store = MemoryStore::new();
        let first = store.push("donations", &json!({ "name": "Zed" })).await.unwrap();
        let second = store.push("donations", &json!({ "name": "Amy" })).await.unwrap();

        let keys: Vec<String> = store
            .children("donations")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec![first, second]);
    }

    #[tokio::test]
    async fn failing_store_rejects_calls() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let result = DocumentStore::read(&store, "donations/x").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.set_failing(false);
        assert!(DocumentStore::read(&store, "donations/x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fail_after_lets_n_calls_through() {
        let store = MemoryStore::new();
        store.write("donations/a", &json!({ "name": "A" })).await.unwrap();

        store.fail_after(2);
        assert!(DocumentStore::read(&store, "donations/a").await.is_ok());
        assert!(DocumentStore::read(&store, "donations/a").await.is_ok());
        assert!(matches!(
            DocumentStore::read(&store, "donations/a").await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_failing(false);
        assert!(DocumentStore::read(&store, "donations/a").await.is_ok());
    }

    #[tokio::test]
    async fn objects_list_by_prefix() {
        let store = MemoryStore::new();
        store.put("images/a.jpg", vec![1], "image/jpeg").await.unwrap();
        store.put("images/b.jpg", vec![2], "image/jpeg").await.unwrap();
        store.put("thumbs/a.jpg", vec![3], "image/jpeg").await.unwrap();

        let mut names = store.list("images").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(store.url_for("images/a.jpg").await.unwrap(), "memory://images/a.jpg");
    }

    #[tokio::test]
    async fn deleting_missing_object_is_not_found() {
        let store = MemoryStore::new();
        let result = ObjectStore::delete(&store, "images/nope.jpg").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
