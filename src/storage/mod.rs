// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! # Storage Module
//!
//! Two store contracts back every repository:
//!
//! - [`DocumentStore`]: JSON records at `/`-separated paths
//! - [`ObjectStore`]: binary blobs under `/`-separated keys
//!
//! ## Backends
//!
//! | Backend    | Documents               | Objects                 |
//! |------------|-------------------------|-------------------------|
//! | `embedded` | [`EmbeddedDocumentStore`] (redb) | [`LocalObjectStore`] (files) |
//! | `firebase` | [`FirebaseDatabase`]    | [`FirebaseStorage`]     |
//! | `memory`   | [`MemoryStore`]         | [`MemoryStore`]         |
//!
//! ## Logical Layout
//!
//! ```text
//! donations/{key}          # item donation requests (store-assigned keys)
//! donation_goals/{Month}   # one goal record per month
//! images/{name}            # gallery images
//! ```
//!
//! Every store call is a single attempt with a single outcome. Nothing is
//! cached or retried at this layer.

pub mod document;
pub mod embedded;
pub mod error;
pub mod firebase;
pub mod local_fs;
pub mod memory;
pub mod object;
pub mod paths;
pub mod repository;
pub mod signing;

pub use document::{DocumentStore, KeyedRecord};
pub use embedded::EmbeddedDocumentStore;
pub use error::{StoreError, StoreResult};
pub use firebase::{FirebaseDatabase, FirebaseStorage};
pub use local_fs::LocalObjectStore;
pub use memory::MemoryStore;
pub use object::{content_type_for, ObjectStore};
pub use paths::DataPaths;
pub use repository::{
    DonationGoal, DonationGoalRepository, DonationRequest, DonationRequestRepository,
    FoundRequests, GalleryImage, GalleryRepository, GoalProgress, Month, RepositoryError,
    StoredDonationRequest, ValidationErrors,
};
pub use signing::UrlSigner;
