// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Feeding The Furballs - Donation Data Service
//!
//! Keeps the charity's item donation requests, monthly donation goals and
//! gallery images in a document store and an object store, and exposes them
//! over HTTP.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Admin key guard for the management routes
//! - `config` - Environment configuration
//! - `storage` - Store clients (embedded, memory, Firebase) and repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
