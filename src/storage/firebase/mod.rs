// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Firebase-backed stores speaking the public REST APIs.
//!
//! - [`FirebaseDatabase`]: Realtime Database (`{database_url}/{path}.json`)
//! - [`FirebaseStorage`]: Cloud Storage for Firebase (`/v0/b/{bucket}/o`)
//!
//! Each trait call is exactly one HTTP exchange (listing follows page tokens
//! until the folder is exhausted). Nothing is retried.

pub mod database;
pub mod storage;

use std::time::Duration;

use url::Url;

use super::{StoreError, StoreResult};

pub use database::FirebaseDatabase;
pub use storage::FirebaseStorage;

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// URL with the query stripped, safe to log (auth tokens travel in queries).
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Send a request and turn a non-success status into `StoreError::Status`.
async fn send_checked(request: reqwest::RequestBuilder, url: &Url) -> StoreResult<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), url = %redacted(url), "firebase request failed");
        return Err(StoreError::Status {
            status: status.as_u16(),
            url: redacted(url),
        });
    }
    Ok(response)
}
