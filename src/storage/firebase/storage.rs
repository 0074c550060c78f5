// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Cloud Storage for Firebase REST client.
//!
//! Objects are addressed as `{endpoint}/v0/b/{bucket}/o/{key}` where the whole
//! key is one percent-encoded path segment (`images/cat.jpg` becomes
//! `images%2Fcat.jpg`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{http_client, send_checked};
use crate::storage::object::ObjectStore;
use crate::storage::paths::validate_object_key;
use crate::storage::{StoreError, StoreResult};

/// Public endpoint of the Firebase Storage REST API.
pub const DEFAULT_ENDPOINT: &str = "https://firebasestorage.googleapis.com";

/// Object metadata as returned by upload and metadata requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// One page of a folder listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
}

pub struct FirebaseStorage {
    bucket_url: Url,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl FirebaseStorage {
    pub fn new(bucket: &str, auth_token: Option<String>, timeout: Duration) -> StoreResult<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, bucket, auth_token, timeout)
    }

    /// Point the client at another endpoint (e.g. the storage emulator).
    pub fn with_endpoint(
        endpoint: &str,
        bucket: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StoreError::InvalidPath(format!("invalid bucket {bucket:?}")));
        }
        let mut bucket_url = Url::parse(endpoint)?;
        bucket_url
            .path_segments_mut()
            .map_err(|_| StoreError::InvalidPath("endpoint cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v0", "b", bucket, "o"]);
        Ok(Self {
            bucket_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            client: http_client(timeout),
        })
    }

    /// URL of the object collection (`.../o`).
    fn collection_url(&self) -> Url {
        self.bucket_url.clone()
    }

    /// URL of a single object.
    fn object_url(&self, key: &str) -> StoreResult<Url> {
        validate_object_key(key)?;
        let mut url = self.bucket_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidPath("endpoint cannot be a base".to_string()))?
            .push(key);
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn list_page(&self, prefix: &str, page_token: Option<&str>) -> StoreResult<ListPage> {
        let mut url = self.collection_url();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prefix", &format!("{prefix}/"));
            query.append_pair("delimiter", "/");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        let response = send_checked(self.authorized(self.client.get(url.clone())), &url).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    fn backend_tag(&self) -> &'static str {
        "firebase-storage"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        validate_object_key(key)?;
        let mut url = self.collection_url();
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);

        let request = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let response = send_checked(self.authorized(request), &url).await?;
        let metadata: ObjectMetadata = response.json().await?;
        tracing::debug!(key = %metadata.name, "object uploaded");
        Ok(metadata.name)
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(prefix, page_token.as_deref()).await?;
            names.extend(
                page.items
                    .into_iter()
                    .map(|item| item.name.rsplit('/').next().unwrap_or_default().to_string())
                    .filter(|name| !name.is_empty()),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(names)
    }

    async fn url_for(&self, key: &str) -> StoreResult<String> {
        let url = self.object_url(key)?;
        let response = send_checked(self.authorized(self.client.get(url.clone())), &url)
            .await
            .map_err(|e| match e {
                StoreError::Status { status: 404, .. } => StoreError::NotFound(key.to_string()),
                other => other,
            })?;
        let metadata: ObjectMetadata = response.json().await?;
        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                StoreError::UnexpectedResponse(format!("no download token for {key}"))
            })?;

        let mut download = url;
        download
            .query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(download.to_string())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let url = self.object_url(key)?;
        send_checked(self.authorized(self.client.delete(url.clone())), &url)
            .await
            .map_err(|e| match e {
                StoreError::Status { status: 404, .. } => StoreError::NotFound(key.to_string()),
                other => other,
            })?;
        Ok(())
    }
}
