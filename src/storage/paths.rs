// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Path constants and utilities for the store layout.
//!
//! Two layouts live here: the logical paths every backend shares (document
//! paths such as `donations/{key}` and object keys such as `images/{name}`),
//! and the on-disk layout used by the embedded backends.

use std::path::{Path, PathBuf};

use super::{StoreError, StoreResult};

/// Default base directory for the embedded backends.
pub const DATA_ROOT: &str = "./data";

/// Document collection holding item donation requests.
pub const DONATIONS_NODE: &str = "donations";

/// Document collection holding one goal record per month.
pub const DONATION_GOALS_NODE: &str = "donation_goals";

/// Object prefix shared by every gallery image.
pub const IMAGES_PREFIX: &str = "images";

/// Characters the remote database refuses inside a key.
const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

// ========== Logical Document Paths ==========

/// Path of a single donation request record.
pub fn donation(key: &str) -> String {
    format!("{DONATIONS_NODE}/{key}")
}

/// Path of the goal record for a month.
pub fn donation_goal(month: &str) -> String {
    format!("{DONATION_GOALS_NODE}/{month}")
}

// ========== Logical Object Keys ==========

/// Object key of a gallery image.
pub fn image(name: &str) -> String {
    format!("{IMAGES_PREFIX}/{name}")
}

/// Validate a `/`-separated document path.
///
/// Every segment must be non-empty and free of the characters the remote
/// database rejects in keys.
pub fn validate_document_path(path: &str) -> StoreResult<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidPath("empty path".to_string()));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(StoreError::InvalidPath(format!("empty segment in {path:?}")));
        }
        if segment
            .chars()
            .any(|c| c.is_control() || FORBIDDEN_KEY_CHARS.contains(&c))
        {
            return Err(StoreError::InvalidPath(format!(
                "forbidden character in {path:?}"
            )));
        }
    }
    Ok(())
}

/// Validate the final segment of an object key.
pub fn validate_object_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidPath("empty object name".to_string()));
    }
    if name.starts_with('.') {
        return Err(StoreError::InvalidPath(format!(
            "object name may not start with '.': {name:?}"
        )));
    }
    if name.contains('/') || name.contains('\\') || name.chars().any(char::is_control) {
        return Err(StoreError::InvalidPath(format!(
            "forbidden character in object name {name:?}"
        )));
    }
    Ok(())
}

/// Validate a full object key (`prefix/.../name`).
pub fn validate_object_key(key: &str) -> StoreResult<()> {
    let mut segments = key.split('/').peekable();
    if segments.peek().is_none() {
        return Err(StoreError::InvalidPath("empty object key".to_string()));
    }
    for segment in segments {
        validate_object_name(segment)?;
    }
    Ok(())
}

/// Split an object key into its prefix and final name.
pub fn split_object_key(key: &str) -> (&str, &str) {
    match key.rsplit_once('/') {
        Some((prefix, name)) => (prefix, name),
        None => ("", key),
    }
}

/// On-disk layout for the embedded backends.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl DataPaths {
    /// Create a new DataPaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path to the embedded document database file.
    pub fn documents_db(&self) -> PathBuf {
        self.root.join("documents.redb")
    }

    /// Directory holding object store blobs.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }
}
