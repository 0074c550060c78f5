// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Item donation request repository.
//!
//! Requests are appended to `donations/` under store-assigned keys. Names are
//! not unique: lookups and deletes act on every record whose `name` matches.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{Field, RepositoryError, RepositoryResult, ValidationErrors};
use crate::storage::document::DocumentStore;
use crate::storage::paths::{self, DONATIONS_NODE};

/// Item value the donation form shows before anything is chosen.
pub const NO_SELECTION_PLACEHOLDER: &str = "Please Select an Item";

/// Required length of a contact number.
pub const CONTACT_DIGITS: usize = 10;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+@[a-z]+\.+[a-z]+$").ok());

fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// An item donation request as submitted by a donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DonationRequest {
    /// Donor's name and surname
    pub name: String,
    /// Donated item, from the catalogue or free text
    #[serde(default)]
    pub item: String,
    /// Ten-digit contact number
    #[serde(default)]
    pub contact: String,
    /// Donor's email address
    #[serde(default)]
    pub email: String,
}

impl DonationRequest {
    /// Copy with every field trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            item: self.item.trim().to_string(),
            contact: self.contact.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// Check every field, collecting all failures.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.name.is_empty() {
            errors.push(Field::Name, "Name and surname are required");
        }

        if self.item.is_empty() || self.item == NO_SELECTION_PLACEHOLDER {
            errors.push(Field::Item, "Please select an item");
        }

        if self.contact.is_empty() {
            errors.push(Field::Contact, "Contact number is required");
        } else if self.contact.len() != CONTACT_DIGITS
            || !self.contact.chars().all(|c| c.is_ascii_digit())
        {
            errors.push(Field::Contact, "Invalid contact number");
        }

        if self.email.is_empty() {
            errors.push(Field::Email, "Email address is required");
        } else if !is_valid_email(&self.email) {
            errors.push(Field::Email, "Invalid email address");
        }

        errors
    }
}

/// A stored request together with its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredDonationRequest {
    /// Store-assigned key under `donations/`
    pub key: String,
    #[serde(flatten)]
    pub request: DonationRequest,
}

/// Every request matching a name lookup, in key (creation) order.
///
/// Records that match the name but cannot be read as a request are listed
/// by key in `unreadable`; deleting by name removes those too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundRequests {
    matches: Vec<StoredDonationRequest>,
    unreadable: Vec<String>,
}

impl FoundRequests {
    pub fn all(&self) -> &[StoredDonationRequest] {
        &self.matches
    }

    /// Keys of matching records whose fields could not be read.
    pub fn unreadable(&self) -> &[String] {
        &self.unreadable
    }

    pub fn into_vec(self) -> Vec<StoredDonationRequest> {
        self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The most recently created match (greatest key).
    pub fn latest(&self) -> Option<&StoredDonationRequest> {
        self.matches.iter().max_by(|a, b| a.key.cmp(&b.key))
    }
}

/// Repository for donation requests.
pub struct DonationRequestRepository<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> DonationRequestRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and store a new request, returning its store-assigned key.
    ///
    /// Nothing reaches the store when validation fails.
    pub async fn submit(&self, request: &DonationRequest) -> RepositoryResult<String> {
        let request = request.trimmed();
        request.validate().into_result()?;

        let record = serde_json::to_value(&request)
            .map_err(|e| RepositoryError::Save(e.into()))?;
        let key = self
            .store
            .push(DONATIONS_NODE, &record)
            .await
            .map_err(RepositoryError::Save)?;

        tracing::info!(key = %key, item = %request.item, "donation request submitted");
        Ok(key)
    }

    /// Names of all requests in insertion order.
    ///
    /// An empty or absent collection is an empty list.
    pub async fn list_names(&self) -> RepositoryResult<Vec<String>> {
        let records = self
            .store
            .children(DONATIONS_NODE)
            .await
            .map_err(RepositoryError::Fetch)?;

        Ok(records
            .into_iter()
            .filter_map(|(_, record)| {
                record
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .collect())
    }

    /// Every request whose name equals `name`.
    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<FoundRequests> {
        let records = self
            .store
            .query_equal(DONATIONS_NODE, "name", name)
            .await
            .map_err(RepositoryError::Fetch)?;

        let mut matches = Vec::with_capacity(records.len());
        let mut unreadable = Vec::new();
        for (key, record) in records {
            match serde_json::from_value::<DonationRequest>(record) {
                Ok(request) => matches.push(StoredDonationRequest { key, request }),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "unreadable donation request");
                    unreadable.push(key);
                }
            }
        }
        matches.sort_by(|a, b| a.key.cmp(&b.key));
        unreadable.sort();

        Ok(FoundRequests {
            matches,
            unreadable,
        })
    }

    /// Delete every request whose name equals `name`, returning how many went.
    ///
    /// Deletes are independent; a failure part-way leaves earlier deletions
    /// in place and reports how many succeeded.
    pub async fn delete_by_name(&self, name: &str) -> RepositoryResult<usize> {
        let records = self
            .store
            .query_equal(DONATIONS_NODE, "name", name)
            .await
            .map_err(|source| RepositoryError::Delete { deleted: 0, source })?;

        let mut deleted = 0;
        for (key, _) in records {
            self.store
                .delete(&paths::donation(&key))
                .await
                .map_err(|source| RepositoryError::Delete { deleted, source })?;
            deleted += 1;
        }

        tracing::info!(deleted, "donation requests deleted");
        Ok(deleted)
    }
}
