// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::repository::{Field, FieldError, RepositoryError, UnknownMonth};
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Vec<FieldError>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let message = match &err {
            RepositoryError::Validation(errors) => {
                return Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    message: "validation failed".to_string(),
                    fields: errors.errors().to_vec(),
                };
            }
            RepositoryError::Fetch(_) => "Error fetching data!",
            RepositoryError::List(_) => "Failed to fetch image names!",
            RepositoryError::Save(_) => "Failed to save data!",
            RepositoryError::Upload(_) => "Failed to upload image!",
            RepositoryError::Delete { .. } => "Failed to delete!",
        };

        // Only a lookup or a delete can miss its target; a write that hits
        // NotFound (e.g. a vanished temp file) is a store failure
        let addresses_target = matches!(
            err,
            RepositoryError::Fetch(_) | RepositoryError::Delete { .. }
        );
        if addresses_target && err.is_not_found() {
            return Self::not_found("Not found");
        }

        tracing::error!(error = %err, "store operation failed");
        Self::bad_gateway(message)
    }
}

impl From<UnknownMonth> for ApiError {
    fn from(err: UnknownMonth) -> Self {
        let mut error = Self::bad_request(err.to_string());
        error.fields.push(FieldError {
            field: Field::Month,
            message: "Please select a month".to_string(),
        });
        error
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            e if e.is_not_found() => Self::not_found("Not found"),
            StoreError::InvalidSignature(reason) => Self::forbidden(reason),
            StoreError::InvalidPath(reason) => Self::bad_request(reason),
            e => {
                tracing::error!(error = %e, "store operation failed");
                Self::bad_gateway("Storage unavailable")
            }
        }
    }
}
