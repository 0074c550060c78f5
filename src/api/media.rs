// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Serves blobs from the local object store through signed links.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use crate::{
    error::ApiError,
    models::{ErrorResponse, MediaQuery},
    state::AppState,
    storage::content_type_for,
};

#[utoipa::path(
    get,
    path = "/v1/media/{key}",
    params(
        ("key" = String, Path, description = "Object key, e.g. images/cat.jpg"),
        MediaQuery
    ),
    tag = "Gallery",
    responses(
        (status = 200, description = "Blob bytes", content_type = "application/octet-stream"),
        (status = 403, description = "Expired or forged link", body = ErrorResponse),
        (status = 404, description = "No such blob, or blobs are not stored locally", body = ErrorResponse)
    )
)]
pub async fn serve_media(
    Path(key): Path<String>,
    Query(query): Query<MediaQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let media = state
        .media
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Media is not served by this instance"))?;

    media.verify_link(&key, query.expires, &query.signature)?;
    let bytes = media.read(&key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, max-age=300"),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    use crate::storage::{LocalObjectStore, ObjectStore, UrlSigner};

    fn query_of(url: &str) -> MediaQuery {
        let url = Url::parse(url).unwrap();
        let get = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .unwrap()
        };
        MediaQuery {
            expires: get("expires").parse().unwrap(),
            signature: get("signature"),
        }
    }

    async fn local_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let signer = UrlSigner::new(
            b"secret".to_vec(),
            Url::parse("http://localhost:8080").unwrap(),
            Duration::from_secs(60),
        );
        let media = Arc::new(LocalObjectStore::new(dir.path(), signer));
        media.initialize().await.unwrap();
        (AppState::in_memory().with_media(media), dir)
    }

    #[tokio::test]
    async fn signed_link_serves_blob() {
        let (state, _dir) = local_state().await;
        state.objects.put("images/a.png", b"png".to_vec(), "image/png").await.unwrap();
        let url = state.objects.url_for("images/a.png").await.unwrap();

        let response = serve_media(Path("images/a.png".into()), Query(query_of(&url)), State(state))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn tampered_link_is_forbidden() {
        let (state, _dir) = local_state().await;
        state.objects.put("images/a.png", b"png".to_vec(), "image/png").await.unwrap();
        let url = state.objects.url_for("images/a.png").await.unwrap();

        let result = serve_media(Path("images/b.png".into()), Query(query_of(&url)), State(state)).await;
        let Err(err) = result else {
            panic!("tampered link should be rejected");
        };
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn remote_backends_do_not_serve_media() {
        let state = AppState::in_memory();
        let query = MediaQuery {
            expires: 0,
            signature: String::new(),
        };
        let Err(err) = serve_media(Path("images/a.png".into()), Query(query), State(state)).await else {
            panic!("memory backend has no media route");
        };
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
