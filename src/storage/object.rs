// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Object store client contract.
//!
//! An object store holds opaque blobs under `/`-separated keys. Listing is
//! unordered; callers that need an order sort the names themselves.

use async_trait::async_trait;

use super::StoreResult;

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Short backend name used in logs and health output.
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    /// Store `bytes` under `key`, silently replacing an existing blob.
    ///
    /// Returns the key the blob was stored under.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;

    /// Names of the blobs stored directly under `prefix`, in no particular order.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// A temporary URL from which the blob at `key` can be downloaded.
    async fn url_for(&self, key: &str) -> StoreResult<String>;

    /// Delete the blob at `key`. Fails with `NotFound` when it does not exist.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Content type for an object name, inferred from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
