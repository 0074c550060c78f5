// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Repository layer providing typed access to the stores.
//!
//! Each repository borrows a store, validates input before any store call,
//! and maps store failures onto [`RepositoryError`]. Repositories hold no
//! state between calls and never call each other.

pub mod donations;
pub mod error;
pub mod gallery;
pub mod goals;

pub use donations::{
    DonationRequest, DonationRequestRepository, FoundRequests, StoredDonationRequest,
    NO_SELECTION_PLACEHOLDER,
};
pub use error::{Field, FieldError, RepositoryError, RepositoryResult, ValidationErrors};
pub use gallery::{GalleryImage, GalleryRepository, GALLERY_SLOTS};
pub use goals::{
    current_month, Clock, DonationGoal, DonationGoalRepository, FixedClock, GoalProgress, Month,
    SystemClock, UnknownMonth,
};
