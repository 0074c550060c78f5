// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Error type shared by every store backend.

use std::io;

/// Error type for document and object store operations.
///
/// Each variant is the single failure a store call reports. Stores never
/// retry; the caller decides what a failure means for its operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("remote store returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The remote service answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A signed media link was expired, malformed or forged.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The backend refused the call (used by the in-memory store to
    /// simulate an unreachable service).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(e.to_string())
        } else {
            StoreError::Io(e)
        }
    }
}

impl From<url::ParseError> for StoreError {
    fn from(e: url::ParseError) -> Self {
        StoreError::InvalidPath(e.to_string())
    }
}

impl StoreError {
    /// Whether this error means the addressed record or blob does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::NotFound(_) => true,
            StoreError::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
