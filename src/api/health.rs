// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::storage::paths;
use crate::storage::repository::current_month;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Document store reachability, tagged with the backend name.
    pub documents: String,
    /// Object store status. Only local blob storage is checked.
    pub objects: String,
}

/// Simple health check response for liveness checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Read this month's goal record as a reachability check.
async fn check_documents(state: &AppState) -> (bool, String) {
    let goal_path = paths::donation_goal(current_month(state.clock.as_ref()).name());
    let tag = state.documents.backend_tag();
    match state.documents.read(&goal_path).await {
        Ok(_) => (true, format!("ok ({tag})")),
        Err(e) => {
            tracing::warn!(error = %e, backend = tag, "document store check failed");
            (false, format!("unavailable ({tag})"))
        }
    }
}

async fn check_objects(state: &AppState) -> (bool, String) {
    let tag = state.objects.backend_tag();
    match &state.media {
        Some(media) => match media.health_check().await {
            Ok(()) => (true, format!("ok ({tag})")),
            Err(e) => {
                tracing::warn!(error = %e, backend = tag, "object store check failed");
                (false, format!("unavailable ({tag})"))
            }
        },
        None => (true, format!("not checked ({tag})")),
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (documents_ok, documents) = check_documents(&state).await;
    let (objects_ok, objects) = check_objects(&state).await;
    let all_ok = documents_ok && objects_ok;

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            documents,
            objects,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness handler.
///
/// Returns 200 only if the stores answer.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
