// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use std::sync::Arc;

use crate::config::{Config, MonetaryLinks, StoreBackend, FIREBASE_REQUEST_TIMEOUT};
use crate::storage::repository::{
    Clock, DonationGoalRepository, DonationRequestRepository, GalleryRepository, SystemClock,
    GALLERY_SLOTS,
};
use crate::storage::{
    DataPaths, DocumentStore, EmbeddedDocumentStore, FirebaseDatabase, FirebaseStorage,
    LocalObjectStore, MemoryStore, ObjectStore, StoreResult, UrlSigner,
};

/// Largest gallery upload accepted when nothing else is configured.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// Set when blobs live on local disk and are served by the media route.
    pub media: Option<Arc<LocalObjectStore>>,
    pub admin_api_key: Option<Arc<str>>,
    pub clock: Arc<dyn Clock>,
    pub gallery_slots: usize,
    pub max_upload_bytes: usize,
    pub monetary_links: MonetaryLinks,
}

impl AppState {
    pub fn new(documents: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            documents,
            objects,
            media: None,
            admin_api_key: None,
            clock: Arc::new(SystemClock::from_offset_minutes(0)),
            gallery_slots: GALLERY_SLOTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            monetary_links: MonetaryLinks::default(),
        }
    }

    /// State backed by one in-process store for documents and objects.
    pub fn in_memory() -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::new()))
    }

    /// State backed by the given in-process store (lets tests inspect it).
    pub fn with_memory_store(store: Arc<MemoryStore>) -> Self {
        Self::new(store.clone(), store)
    }

    pub fn with_admin_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.admin_api_key = Some(key.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_media(mut self, media: Arc<LocalObjectStore>) -> Self {
        self.objects = media.clone();
        self.media = Some(media);
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_monetary_links(mut self, links: MonetaryLinks) -> Self {
        self.monetary_links = links;
        self
    }

    /// Build the stores the configuration selects.
    pub async fn from_config(config: &Config) -> StoreResult<Self> {
        let state = match config.backend {
            StoreBackend::Memory => Self::in_memory(),
            StoreBackend::Embedded => {
                let paths = DataPaths::new(&config.data_dir);
                let documents = Arc::new(EmbeddedDocumentStore::open(&paths.documents_db())?);
                let signer = UrlSigner::new(
                    config.media_url_secret.clone(),
                    config.public_base_url.clone(),
                    config.media_url_ttl,
                );
                let media = Arc::new(LocalObjectStore::new(paths.objects_dir(), signer));
                media.initialize().await?;
                Self::new(documents, media.clone()).with_media(media)
            }
            StoreBackend::Firebase => {
                let firebase = config.firebase.as_ref().ok_or_else(|| {
                    crate::storage::StoreError::Unavailable(
                        "firebase backend selected without firebase settings".to_string(),
                    )
                })?;
                let documents = Arc::new(FirebaseDatabase::new(
                    &firebase.database_url,
                    firebase.auth_token.clone(),
                    FIREBASE_REQUEST_TIMEOUT,
                )?);
                let objects = Arc::new(FirebaseStorage::new(
                    &firebase.storage_bucket,
                    firebase.auth_token.clone(),
                    FIREBASE_REQUEST_TIMEOUT,
                )?);
                Self::new(documents, objects)
            }
        };

        let mut state = state
            .with_clock(Arc::new(SystemClock::from_offset_minutes(
                config.utc_offset_minutes,
            )))
            .with_max_upload_bytes(config.max_upload_bytes)
            .with_monetary_links(config.monetary_links.clone());
        state.admin_api_key = config.admin_api_key.as_deref().map(Arc::from);

        tracing::info!(
            documents = state.documents.backend_tag(),
            objects = state.objects.backend_tag(),
            admin = state.admin_api_key.is_some(),
            "stores ready"
        );
        Ok(state)
    }

    pub fn donations(&self) -> DonationRequestRepository<'_, dyn DocumentStore> {
        DonationRequestRepository::new(self.documents.as_ref())
    }

    pub fn goals(&self) -> DonationGoalRepository<'_, dyn DocumentStore> {
        DonationGoalRepository::new(self.documents.as_ref())
    }

    pub fn gallery(&self) -> GalleryRepository<'_, dyn ObjectStore> {
        GalleryRepository::new(self.objects.as_ref())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_from_config() {
        let config = Config::from_lookup(|name| match name {
            "STORE_BACKEND" => Some("memory".to_string()),
            "ADMIN_API_KEY" => Some("key".to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::from_config(&config).await.unwrap();

        assert_eq!(state.documents.backend_tag(), "memory");
        assert_eq!(state.objects.backend_tag(), "memory");
        assert!(state.media.is_none());
        assert_eq!(state.admin_api_key.as_deref(), Some("key"));
    }

    #[tokio::test]
    async fn embedded_backend_serves_local_media() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().into_owned();
        let config = Config::from_lookup(|name| match name {
            "DATA_DIR" => Some(data_dir.clone()),
            _ => None,
        })
        .unwrap();
        let state = AppState::from_config(&config).await.unwrap();

        assert_eq!(state.documents.backend_tag(), "embedded");
        assert_eq!(state.objects.backend_tag(), "localfs");
        assert!(state.media.is_some());
        assert!(dir.path().join("objects").is_dir());
        assert!(dir.path().join("documents.redb").is_file());
    }
}
