// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! # API Data Models
//!
//! Request and response bodies of the REST API. Repository types that are
//! returned as-is (`DonationRequest`, `DonationGoal`, `GoalProgress`,
//! `GalleryImage`) live next to their repositories.
//!
//! ## Model Categories
//!
//! - **Donations**: Item donation request submission, admin lookup and
//!   monetary payment links
//! - **Goals**: Monthly donation goal views and admin edits
//! - **Gallery**: Image listing, upload and media links

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::repository::{
    DonationGoal, FieldError, GoalProgress, Month, StoredDonationRequest,
};

// =============================================================================
// Error Model
// =============================================================================

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable failure message.
    pub error: String,
    /// Per-field validation failures (only for 422 responses).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

// =============================================================================
// Donation Models
// =============================================================================

/// Response to a successful donation request submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SubmitDonationResponse {
    /// Store-assigned key of the new request.
    pub key: String,
}

/// Lookup of donation requests by donor name.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DonorNameQuery {
    /// Donor name to match exactly.
    pub name: String,
}

/// Every request matching a donor name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FoundDonationsResponse {
    /// Matches in creation order.
    pub matches: Vec<StoredDonationRequest>,
    /// Key of the most recently created match.
    pub latest: Option<String>,
    /// Keys of matching records that could not be read; deleting by name
    /// removes them as well.
    pub unreadable: Vec<String>,
}

/// Where to send money instead of items.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MonetaryDonationLinks {
    /// Debit order mandate form.
    pub debit_order_url: String,
    /// Zapper pay link.
    pub zapper_url: String,
}

/// Result of deleting requests by donor name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeleteDonationsResponse {
    /// Number of requests removed.
    pub deleted: usize,
}

// =============================================================================
// Goal Models
// =============================================================================

/// A month's goal record with its computed progress.
///
/// `goal` and `progress` are null when nothing has been saved for the month.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GoalView {
    pub month: Month,
    pub goal: Option<DonationGoal>,
    pub progress: Option<GoalProgress>,
}

impl GoalView {
    pub fn new(month: Month, goal: Option<DonationGoal>) -> Self {
        let progress = goal.as_ref().map(GoalProgress::from_goal);
        Self {
            month,
            goal,
            progress,
        }
    }
}

/// Amounts to store for a month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveGoalRequest {
    /// Total donated so far (stored as entered).
    pub monthly_donations: String,
    /// Target amount (stored as entered).
    pub monthly_goal: String,
}

// =============================================================================
// Gallery Models
// =============================================================================

/// Size of the public gallery page.
#[derive(Debug, Deserialize, IntoParams)]
pub struct GalleryQuery {
    /// Number of images (at most the grid size).
    pub limit: Option<usize>,
}

/// Optional name for an uploaded image.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// File name; a random one is generated when omitted.
    pub name: Option<String>,
}

/// Response to a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UploadImageResponse {
    /// Name the image was stored under.
    pub name: String,
}

/// Signature part of a media link.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MediaQuery {
    /// Expiry as unix seconds.
    pub expires: i64,
    /// URL-safe base64 HMAC of the key and expiry.
    pub signature: String,
}
