// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Embedded document store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `documents`: full document path → JSON bytes
//!
//! Paths are stored flat (`donations/{key}`), so the children of a
//! collection are the keys in the half-open range `collection/`..`collection0`
//! (`'0'` is the character after `'/'`) that contain no further `/`.

use std::path::Path;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde_json::Value;
use uuid::Uuid;

use super::document::{DocumentStore, KeyedRecord};
use super::paths::validate_document_path;
use super::StoreResult;

/// Primary table: document path → serialized record (JSON bytes).
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// Start of the key range holding everything beneath `path`.
fn subtree_start(path: &str) -> String {
    format!("{path}/")
}

/// Exclusive end of the key range holding everything beneath `path`.
fn subtree_end(path: &str) -> String {
    format!("{path}0")
}

/// Embedded ACID document database.
pub struct EmbeddedDocumentStore {
    db: Database,
}

impl EmbeddedDocumentStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn write_sync(&self, path: &str, record: &Value) -> StoreResult<()> {
        validate_document_path(path)?;
        let json = serde_json::to_vec(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            table.insert(path, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_sync(&self, path: &str) -> StoreResult<Option<Value>> {
        validate_document_path(path)?;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;
        match table.get(path)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn children_sync(&self, collection: &str) -> StoreResult<Vec<KeyedRecord>> {
        validate_document_path(collection)?;
        let start = subtree_start(collection);
        let end = subtree_end(collection);

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;

        let mut records = Vec::new();
        for entry in table.range(start.as_str()..end.as_str())? {
            let (path, value) = entry?;
            let Some(key) = path.value().strip_prefix(start.as_str()) else {
                continue;
            };
            // Grandchildren belong to a child node, not to this collection
            if key.contains('/') {
                continue;
            }
            let record: Value = serde_json::from_slice(value.value())?;
            records.push((key.to_string(), record));
        }
        Ok(records)
    }

    fn delete_sync(&self, path: &str) -> StoreResult<()> {
        validate_document_path(path)?;
        let start = subtree_start(path);
        let end = subtree_end(path);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            let descendants: Vec<String> = {
                let mut keys = Vec::new();
                for entry in table.range(start.as_str()..end.as_str())? {
                    let (key, _) = entry?;
                    keys.push(key.value().to_string());
                }
                keys
            };
            table.remove(path)?;
            for key in &descendants {
                table.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for EmbeddedDocumentStore {
    fn backend_tag(&self) -> &'static str {
        "embedded"
    }

    async fn write(&self, path: &str, record: &Value) -> StoreResult<()> {
        self.write_sync(path, record)
    }

    async fn push(&self, collection: &str, record: &Value) -> StoreResult<String> {
        // UUIDv7 keys are time-ordered, so key order is insertion order
        let key = Uuid::now_v7().to_string();
        self.write_sync(&format!("{collection}/{key}"), record)?;
        Ok(key)
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        self.read_sync(path)
    }

    async fn children(&self, collection: &str) -> StoreResult<Vec<KeyedRecord>> {
        self.children_sync(collection)
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.delete_sync(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;
    use serde_json::json;

    fn temp_store() -> (EmbeddedDocumentStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = EmbeddedDocumentStore::open(&dir.path().join("documents.redb")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn write_then_read_replaces_record() {
        let (store, _dir) = temp_store();
        let path = "donation_goals/March";

        store
            .write(path, &json!({ "month": "March", "monthly_goal": "900" }))
            .await
            .unwrap();
        store
            .write(path, &json!({ "month": "March", "monthly_goal": "1000" }))
            .await
            .unwrap();

        let record = store.read(path).await.unwrap().unwrap();
        assert_eq!(record, json!({ "month": "March", "monthly_goal": "1000" }));
    }

    #[tokio::test]
    async fn read_missing_is_none() {
        let (store, _dir) = temp_store();
        assert!(store.read("donation_goals/April").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn push_assigns_keys_in_insertion_order() {
        let (store, _dir) = temp_store();
        let mut keys = Vec::new();
        for name in ["Alice", "Bob", "Carol"] {
            keys.push(store.push("donations", &json!({ "name": name })).await.unwrap());
        }

        let children = store.children("donations").await.unwrap();
        let names: Vec<&str> = children
            .iter()
            .map(|(_, record)| record["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(
            children.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(),
            keys
        );
    }

    #[tokio::test]
    async fn children_skip_other_collections_and_grandchildren() {
        let (store, _dir) = temp_store();
        store.write("donations/a", &json!({ "name": "A" })).await.unwrap();
        store.write("donations/a/notes", &json!({ "x": 1 })).await.unwrap();
        store.write("donations_archive/b", &json!({ "name": "B" })).await.unwrap();

        let children = store.children("donations").await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].0, "a");
    }

    #[tokio::test]
    async fn query_equal_filters_on_field() {
        let (store, _dir) = temp_store();
        store.push("donations", &json!({ "name": "Alice" })).await.unwrap();
        store.push("donations", &json!({ "name": "Bob" })).await.unwrap();
        store.push("donations", &json!({ "name": "Alice" })).await.unwrap();

        let matches = store.query_equal("donations", "name", "Alice").await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_node_and_subtree() {
        let (store, _dir) = temp_store();
        store.write("donations/a", &json!({ "name": "A" })).await.unwrap();
        store.write("donations/a/notes", &json!({ "x": 1 })).await.unwrap();
        store.write("donations/b", &json!({ "name": "B" })).await.unwrap();

        store.delete("donations/a").await.unwrap();

        assert!(store.read("donations/a").await.unwrap().is_none());
        assert!(store.read("donations/a/notes").await.unwrap().is_none());
        assert!(store.read("donations/b").await.unwrap().is_some());

        // Deleting again is not an error
        store.delete("donations/a").await.unwrap();
    }

    #[tokio::test]
    async fn invalid_paths_are_rejected() {
        let (store, _dir) = temp_store();
        let result = store.write("donations/a.b", &json!({})).await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.redb");
        {
            let store = EmbeddedDocumentStore::open(&path).unwrap();
            store.write("donation_goals/May", &json!({ "month": "May" })).await.unwrap();
        }
        let store = EmbeddedDocumentStore::open(&path).unwrap();
        assert!(store.read("donation_goals/May").await.unwrap().is_some());
    }
}
