// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{ErrorResponse, GalleryQuery, UploadImageResponse, UploadQuery},
    state::AppState,
    storage::repository::GalleryImage,
};

#[utoipa::path(
    get,
    path = "/v1/gallery",
    params(GalleryQuery),
    tag = "Gallery",
    responses(
        (status = 200, description = "Images for the gallery grid, greatest name first", body = [GalleryImage]),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.gallery_slots)
        .min(state.gallery_slots);
    Ok(Json(state.gallery().urls_for_top_n(limit).await?))
}

#[utoipa::path(
    get,
    path = "/v1/admin/gallery",
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Every image name, greatest first", body = [String]),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_images(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.gallery().list_sorted_descending().await?))
}

#[utoipa::path(
    post,
    path = "/v1/admin/gallery",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw image bytes"),
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 201, description = "Image stored, replacing any image with the same name", body = UploadImageResponse),
        (status = 413, description = "Image larger than the upload limit"),
        (status = 422, description = "Empty body or invalid name", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    _admin: AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadImageResponse>), ApiError> {
    let name = state
        .gallery()
        .upload(body.to_vec(), query.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(UploadImageResponse { name })))
}

#[utoipa::path(
    get,
    path = "/v1/admin/gallery/{name}",
    params(
        ("name" = String, Path, description = "Image name")
    ),
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Download URL for the image", body = GalleryImage),
        (status = 404, description = "No such image", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_image(
    _admin: AdminOnly,
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GalleryImage>, ApiError> {
    Ok(Json(state.gallery().resolve(&name).await?))
}

#[utoipa::path(
    delete,
    path = "/v1/admin/gallery/{name}",
    params(
        ("name" = String, Path, description = "Image name")
    ),
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "No such image", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_image(
    _admin: AdminOnly,
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.gallery().delete_by_key(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn upload(state: &AppState, name: &str) {
        upload_image(
            AdminOnly,
            State(state.clone()),
            Query(UploadQuery { name: Some(name.into()) }),
            Bytes::from_static(b"\x89PNG"),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn gallery_limit_is_capped_by_slots() {
        let mut state = AppState::in_memory();
        state.gallery_slots = 2;
        for name in ["a.png", "b.png", "c.png"] {
            upload(&state, name).await;
        }

        let Json(images) = gallery(State(state.clone()), Query(GalleryQuery { limit: None }))
            .await
            .unwrap();
        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c.png", "b.png"]);

        let Json(images) = gallery(State(state), Query(GalleryQuery { limit: Some(1) }))
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn upload_resolve_and_delete() {
        let state = AppState::in_memory();
        upload(&state, "cat.png").await;

        let Json(image) = get_image(AdminOnly, Path("cat.png".into()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(image.url, "memory://images/cat.png");

        let status = delete_image(AdminOnly, Path("cat.png".into()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_image(AdminOnly, Path("cat.png".into()), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let Json(names) = list_images(AdminOnly, State(state)).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn empty_upload_is_unprocessable() {
        let state = AppState::in_memory();
        let err = upload_image(
            AdminOnly,
            State(state),
            Query(UploadQuery { name: None }),
            Bytes::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
