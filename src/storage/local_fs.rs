// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Filesystem-backed object store.
//!
//! Blobs are plain files under `{DATA_DIR}/objects/{key}`. Writes go to a
//! hidden temporary file first and are renamed into place, so a reader never
//! sees a half-written image. Download URLs are signed links served by the
//! API's media route (see [`UrlSigner`]).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use super::object::ObjectStore;
use super::paths::{split_object_key, validate_object_key};
use super::signing::UrlSigner;
use super::{StoreError, StoreResult};

/// Object store writing blobs to the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    signer: UrlSigner,
}

impl LocalObjectStore {
    /// Create a new store rooted at `root`.
    ///
    /// Does NOT create the directory. Call `initialize()` first.
    pub fn new(root: impl AsRef<Path>, signer: UrlSigner) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            signer,
        }
    }

    /// Create the root directory. Safe to call multiple times.
    pub async fn initialize(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn blob_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_object_key(key)?;
        Ok(self.root.join(key))
    }

    /// Read a blob's bytes.
    pub async fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.blob_path(key)?;
        Ok(fs::read(path).await?)
    }

    /// Check a signed media link against the current time.
    pub fn verify_link(&self, key: &str, expires: i64, signature: &str) -> StoreResult<()> {
        self.signer
            .verify(key, expires, signature, Utc::now().timestamp())
    }

    /// Write, read back and delete a file, confirming the blob directory is usable.
    pub async fn health_check(&self) -> StoreResult<()> {
        // Unique per call so concurrent checks never touch each other's file
        let marker = self.root.join(format!(".health_check.{}", Uuid::new_v4()));
        let data = b"health_check_data";

        fs::write(&marker, data).await?;
        let read = fs::read(&marker).await?;
        fs::remove_file(&marker).await?;

        if read != data {
            return Err(StoreError::UnexpectedResponse(
                "health check data mismatch".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn backend_tag(&self) -> &'static str {
        "localfs"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> StoreResult<String> {
        let path = self.blob_path(key)?;
        let (_, name) = split_object_key(key);
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::InvalidPath(format!("no parent for {key:?}")))?;
        fs::create_dir_all(parent).await?;

        // Write to a hidden temp file first, then rename for atomicity.
        // Each upload gets its own temp file; the last rename wins.
        let temp_path = parent.join(format!(".{name}.{}.partial", Uuid::new_v4()));
        fs::write(&temp_path, &bytes).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key, size = bytes.len(), "blob stored");
        Ok(key.to_string())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.blob_path(prefix)?
        };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                // Temp files and health-check files are hidden
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    async fn url_for(&self, key: &str) -> StoreResult<String> {
        let path = self.blob_path(key)?;
        fs::metadata(&path).await?;
        let url = self.signer.sign(key, Utc::now().timestamp())?;
        Ok(url.to_string())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.blob_path(key)?;
        fs::remove_file(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    async fn test_store() -> (LocalObjectStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let signer = UrlSigner::new(
            b"secret".to_vec(),
            Url::parse("http://localhost:8080").unwrap(),
            Duration::from_secs(3600),
        );
        let store = LocalObjectStore::new(dir.path().join("objects"), signer);
        store.initialize().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_read_and_overwrite() {
        let (store, _dir) = test_store().await;
        store.put("images/a.jpg", b"first".to_vec(), "image/jpeg").await.unwrap();
        store.put("images/a.jpg", b"second".to_vec(), "image/jpeg").await.unwrap();

        assert_eq!(store.read("images/a.jpg").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn list_returns_names_under_prefix_only() {
        let (store, _dir) = test_store().await;
        for name in ["a.jpg", "c.jpg", "b.jpg"] {
            store
                .put(&format!("images/{name}"), vec![1, 2, 3], "image/jpeg")
                .await
                .unwrap();
        }
        store.put("other/x.jpg", vec![1], "image/jpeg").await.unwrap();

        let mut names = store.list("images").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn list_of_missing_prefix_is_empty() {
        let (store, _dir) = test_store().await;
        assert!(store.list("images").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn url_for_signs_existing_blob() {
        let (store, _dir) = test_store().await;
        store.put("images/a.jpg", vec![9], "image/jpeg").await.unwrap();

        let url = Url::parse(&store.url_for("images/a.jpg").await.unwrap()).unwrap();
        assert_eq!(url.path(), "/v1/media/images/a.jpg");

        let expires: i64 = url
            .query_pairs()
            .find(|(k, _)| k == "expires")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap();
        let signature = url
            .query_pairs()
            .find(|(k, _)| k == "signature")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        store.verify_link("images/a.jpg", expires, &signature).unwrap();
    }

    #[tokio::test]
    async fn url_for_missing_blob_is_not_found() {
        let (store, _dir) = test_store().await;
        let result = store.url_for("images/missing.jpg").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        let (store, _dir) = test_store().await;
        store.put("images/c.jpg", vec![1], "image/jpeg").await.unwrap();
        store.delete("images/c.jpg").await.unwrap();

        assert!(store.list("images").await.unwrap().is_empty());
        let again = store.delete("images/c.jpg").await;
        assert!(matches!(again, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (store, _dir) = test_store().await;
        let result = store.put("images/../../etc/passwd", vec![1], "text/plain").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn health_check_works() {
        let (store, _dir) = test_store().await;
        store.health_check().await.expect("health check should pass");
    }

    #[tokio::test]
    async fn concurrent_uploads_to_one_key_all_succeed() {
        let (store, dir) = test_store().await;
        let payload = |byte: u8| vec![byte; 256 * 1024];

        for _ in 0..10 {
            let (a, b, c, d) = tokio::join!(
                store.put("images/cat.jpg", payload(1), "image/jpeg"),
                store.put("images/cat.jpg", payload(2), "image/jpeg"),
                store.put("images/cat.jpg", payload(3), "image/jpeg"),
                store.put("images/cat.jpg", payload(4), "image/jpeg"),
            );
            for result in [a, b, c, d] {
                assert_eq!(result.unwrap(), "images/cat.jpg");
            }
        }

        // One complete upload is left and no temp files linger
        let stored = store.read("images/cat.jpg").await.unwrap();
        assert_eq!(stored.len(), 256 * 1024);
        assert!(stored.iter().all(|b| *b == stored[0]));
        assert_eq!(store.list("images").await.unwrap(), vec!["cat.jpg"]);
        let mut entries = std::fs::read_dir(dir.path().join("objects/images")).unwrap();
        assert!(entries.all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".partial")));
    }

    #[tokio::test]
    async fn concurrent_health_checks_all_pass() {
        let (store, _dir) = test_store().await;
        let (a, b, c) = tokio::join!(store.health_check(), store.health_check(), store.health_check());
        a.unwrap();
        b.unwrap();
        c.unwrap();
    }
}
