// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Failures reported by the repositories.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::storage::StoreError;

/// Form field a validation message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Item,
    Contact,
    Email,
    Month,
    MonthlyDonations,
    MonthlyGoal,
    ImageName,
    ImageContent,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Item => "item",
            Field::Contact => "contact",
            Field::Email => "email",
            Field::Month => "month",
            Field::MonthlyDonations => "monthly_donations",
            Field::MonthlyGoal => "monthly_goal",
            Field::ImageName => "image_name",
            Field::ImageContent => "image_content",
        }
    }
}

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every field check that failed for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single failure.
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message attached to `field`, if it failed.
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing failed, otherwise the collected failures.
    pub fn into_result(self) -> Result<(), RepositoryError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field.as_str(), error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Error type for repository operations.
///
/// `Validation` is raised before any store call. Every other variant wraps
/// the single store failure that ended the operation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("failed to fetch data: {0}")]
    Fetch(#[source] StoreError),

    #[error("failed to list images: {0}")]
    List(#[source] StoreError),

    #[error("failed to save data: {0}")]
    Save(#[source] StoreError),

    #[error("failed to upload image: {0}")]
    Upload(#[source] StoreError),

    /// A delete failed after `deleted` records were already removed.
    #[error("failed to delete after removing {deleted} record(s): {source}")]
    Delete {
        deleted: usize,
        #[source]
        source: StoreError,
    },
}

impl RepositoryError {
    /// Whether the underlying store reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            RepositoryError::Validation(_) => false,
            RepositoryError::Fetch(e)
            | RepositoryError::List(e)
            | RepositoryError::Save(e)
            | RepositoryError::Upload(e)
            | RepositoryError::Delete { source: e, .. } => e.is_not_found(),
        }
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
