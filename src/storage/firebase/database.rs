// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Realtime Database REST client.
//!
//! | Operation     | Request                                                   |
//! |---------------|-----------------------------------------------------------|
//! | `write`       | `PUT {path}.json`                                         |
//! | `push`        | `POST {collection}.json` → `{"name": "<key>"}`            |
//! | `read`        | `GET {path}.json` (`null` when absent)                    |
//! | `children`    | `GET {collection}.json`                                   |
//! | `query_equal` | `GET {collection}.json?orderBy="field"&equalTo="value"`   |
//! | `delete`      | `DELETE {path}.json`                                      |
//!
//! `query_equal` needs an `.indexOn` rule for the field in the database rules.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{http_client, send_checked};
use crate::storage::document::{DocumentStore, KeyedRecord};
use crate::storage::paths::validate_document_path;
use crate::storage::{StoreError, StoreResult};

/// Response body of a `POST` (push).
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

pub struct FirebaseDatabase {
    base_url: Url,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl FirebaseDatabase {
    pub fn new(database_url: &str, auth_token: Option<String>, timeout: Duration) -> StoreResult<Self> {
        let base_url = Url::parse(database_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidPath(format!(
                "database URL cannot be a base: {database_url}"
            )));
        }
        Ok(Self {
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            client: http_client(timeout),
        })
    }

    /// REST URL of the node at `path`.
    fn node_url(&self, path: &str) -> StoreResult<Url> {
        validate_document_path(path)?;
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidPath("database URL cannot be a base".to_string()))?;
            segments.pop_if_empty();
            let mut parts = path.split('/').peekable();
            while let Some(part) = parts.next() {
                if parts.peek().is_some() {
                    segments.push(part);
                } else {
                    segments.push(&format!("{part}.json"));
                }
            }
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    /// REST URL of an equality query on `field` within `collection`.
    fn query_url(&self, collection: &str, field: &str, value: &str) -> StoreResult<Url> {
        let mut url = self.node_url(collection)?;
        // orderBy/equalTo take JSON-encoded values
        let field = serde_json::to_string(field)?;
        let value = serde_json::to_string(value)?;
        url.query_pairs_mut()
            .append_pair("orderBy", &field)
            .append_pair("equalTo", &value);
        Ok(url)
    }

    async fn get_value(&self, url: &Url) -> StoreResult<Value> {
        let response = send_checked(self.client.get(url.clone()), url).await?;
        Ok(response.json::<Value>().await?)
    }
}

/// Convert a node's JSON object into key-sorted children.
///
/// Push keys sort chronologically, so key order is insertion order.
fn into_children(node: Value) -> StoreResult<Vec<KeyedRecord>> {
    match node {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => {
            let mut children: Vec<KeyedRecord> = map.into_iter().collect();
            children.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(children)
        }
        other => Err(StoreError::UnexpectedResponse(format!(
            "expected an object node, got {other}"
        ))),
    }
}

#[async_trait]
impl DocumentStore for FirebaseDatabase {
    fn backend_tag(&self) -> &'static str {
        "firebase-rtdb"
    }

    async fn write(&self, path: &str, record: &Value) -> StoreResult<()> {
        let url = self.node_url(path)?;
        send_checked(self.client.put(url.clone()).json(record), &url).await?;
        Ok(())
    }

    async fn push(&self, collection: &str, record: &Value) -> StoreResult<String> {
        let url = self.node_url(collection)?;
        let response = send_checked(self.client.post(url.clone()).json(record), &url).await?;
        let body: PushResponse = response.json().await?;
        Ok(body.name)
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        let url = self.node_url(path)?;
        match self.get_value(&url).await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn children(&self, collection: &str) -> StoreResult<Vec<KeyedRecord>> {
        let url = self.node_url(collection)?;
        into_children(self.get_value(&url).await?)
    }

    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<KeyedRecord>> {
        let url = self.query_url(collection, field, value)?;
        into_children(self.get_value(&url).await?)
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let url = self.node_url(path)?;
        send_checked(self.client.delete(url.clone()), &url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(token: Option<&str>) -> FirebaseDatabase {
        FirebaseDatabase::new(
            "https://furballs-default-rtdb.firebaseio.com/",
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn node_url_appends_json_suffix() {
        let url = client(None).node_url("donation_goals/March").unwrap();
        assert_eq!(
            url.as_str(),
            "https://furballs-default-rtdb.firebaseio.com/donation_goals/March.json"
        );
    }

    #[test]
    fn node_url_carries_auth_token() {
        let url = client(Some("tok")).node_url("donations").unwrap();
        assert_eq!(url.query(), Some("auth=tok"));
    }

    #[test]
    fn empty_token_is_ignored() {
        let url = client(Some("")).node_url("donations").unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn query_url_json_encodes_values() {
        let url = client(None).query_url("donations", "name", "Alice Smith").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("orderBy".to_string(), "\"name\"".to_string()),
                ("equalTo".to_string(), "\"Alice Smith\"".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_paths_never_reach_the_network() {
        assert!(client(None).node_url("donations/a.b").is_err());
    }

    #[test]
    fn children_are_sorted_by_key() {
        let node = json!({
            "-Nb": { "name": "Bob" },
            "-Na": { "name": "Alice" },
        });
        let children = into_children(node).unwrap();
        assert_eq!(children[0].0, "-Na");
        assert_eq!(children[1].0, "-Nb");
        assert!(into_children(Value::Null).unwrap().is_empty());
        assert!(into_children(json!("scalar")).is_err());
    }
}
