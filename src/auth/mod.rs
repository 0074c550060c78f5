// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! # Authentication Module
//!
//! Public routes (donation requests, goal views, gallery, media) are open.
//! Everything under `/v1/admin` requires `Authorization: Bearer <ADMIN_API_KEY>`.
//!
//! - No `ADMIN_API_KEY` configured: admin routes answer 403
//! - Missing, malformed or wrong token: 401

pub mod error;
pub mod extractor;

pub use error::AuthError;
pub use extractor::AdminOnly;
