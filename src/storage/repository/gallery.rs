// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Gallery image repository.
//!
//! Images live at `images/{name}`. The public grid shows the first
//! [`GALLERY_SLOTS`] names in descending name order, which is "newest first"
//! only as far as the names sort that way.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{Field, RepositoryError, RepositoryResult, ValidationErrors};
use crate::storage::object::{content_type_for, ObjectStore};
use crate::storage::paths::{self, validate_object_name, IMAGES_PREFIX};

/// Number of image slots in the public gallery grid.
pub const GALLERY_SLOTS: usize = 48;

/// A gallery image with a temporary download URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GalleryImage {
    pub name: String,
    pub url: String,
}

/// Repository for gallery images.
pub struct GalleryRepository<'a, S: ?Sized> {
    store: &'a S,
}

fn checked_name(name: &str) -> RepositoryResult<&str> {
    let name = name.trim();
    validate_object_name(name)
        .map_err(|e| RepositoryError::Validation(ValidationErrors::single(Field::ImageName, e.to_string())))?;
    Ok(name)
}

impl<'a, S: ObjectStore + ?Sized> GalleryRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Store an image, returning the name it was stored under.
    ///
    /// Without a suggested name a random one is generated. An existing image
    /// with the same name is replaced.
    pub async fn upload(&self, bytes: Vec<u8>, suggested_name: Option<&str>) -> RepositoryResult<String> {
        let name = match suggested_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => checked_name(name)?.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        if bytes.is_empty() {
            return Err(RepositoryError::Validation(ValidationErrors::single(
                Field::ImageContent,
                "Please select an image to upload",
            )));
        }

        let size = bytes.len();
        self.store
            .put(&paths::image(&name), bytes, content_type_for(&name))
            .await
            .map_err(RepositoryError::Upload)?;

        tracing::info!(name = %name, size, "gallery image uploaded");
        Ok(name)
    }

    /// Every image name, greatest first.
    pub async fn list_sorted_descending(&self) -> RepositoryResult<Vec<String>> {
        let mut names = self
            .store
            .list(IMAGES_PREFIX)
            .await
            .map_err(RepositoryError::List)?;
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// URLs for the first `n` names of [`list_sorted_descending`](Self::list_sorted_descending).
    ///
    /// A name whose URL cannot be resolved is logged and left out; the
    /// remaining entries keep their order.
    pub async fn urls_for_top_n(&self, n: usize) -> RepositoryResult<Vec<GalleryImage>> {
        let names = self.list_sorted_descending().await?;

        let mut images = Vec::with_capacity(n.min(names.len()));
        for name in names.into_iter().take(n) {
            match self.store.url_for(&paths::image(&name)).await {
                Ok(url) => images.push(GalleryImage { name, url }),
                Err(e) => tracing::warn!(name = %name, error = %e, "skipping unresolvable gallery image"),
            }
        }
        Ok(images)
    }

    /// URL for a single image.
    pub async fn resolve(&self, name: &str) -> RepositoryResult<GalleryImage> {
        let name = checked_name(name)?;
        let url = self
            .store
            .url_for(&paths::image(name))
            .await
            .map_err(RepositoryError::Fetch)?;
        Ok(GalleryImage {
            name: name.to_string(),
            url,
        })
    }

    /// Delete one image. Callers list again afterwards; nothing is cached here.
    pub async fn delete_by_key(&self, name: &str) -> RepositoryResult<()> {
        let name = checked_name(name)?;
        self.store
            .delete(&paths::image(name))
            .await
            .map_err(|source| RepositoryError::Delete { deleted: 0, source })?;

        tracing::info!(name = %name, "gallery image deleted");
        Ok(())
    }
}
