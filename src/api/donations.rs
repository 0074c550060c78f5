// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{
        DeleteDonationsResponse, DonorNameQuery, ErrorResponse, FoundDonationsResponse,
        MonetaryDonationLinks, SubmitDonationResponse,
    },
    state::AppState,
    storage::repository::DonationRequest,
};

#[utoipa::path(
    post,
    path = "/v1/donations",
    request_body = DonationRequest,
    tag = "Donations",
    responses(
        (status = 201, description = "Request stored", body = SubmitDonationResponse),
        (status = 422, description = "Invalid fields", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn submit_donation(
    State(state): State<AppState>,
    Json(request): Json<DonationRequest>,
) -> Result<(StatusCode, Json<SubmitDonationResponse>), ApiError> {
    let key = state.donations().submit(&request).await?;
    Ok((StatusCode::CREATED, Json(SubmitDonationResponse { key })))
}

/// Payment links for donors who give money rather than items.
#[utoipa::path(
    get,
    path = "/v1/donations/monetary",
    tag = "Donations",
    responses(
        (status = 200, description = "Debit order and Zapper links", body = MonetaryDonationLinks)
    )
)]
pub async fn monetary_links(State(state): State<AppState>) -> Json<MonetaryDonationLinks> {
    Json(MonetaryDonationLinks {
        debit_order_url: state.monetary_links.debit_order_url.clone(),
        zapper_url: state.monetary_links.zapper_url.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/admin/donations/names",
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Donor names in submission order", body = [String]),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_donor_names(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.donations().list_names().await?))
}

#[utoipa::path(
    get,
    path = "/v1/admin/donations",
    params(DonorNameQuery),
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Requests with this donor name", body = FoundDonationsResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn find_donations(
    _admin: AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<DonorNameQuery>,
) -> Result<Json<FoundDonationsResponse>, ApiError> {
    let found = state.donations().find_by_name(&query.name).await?;
    let latest = found.latest().map(|request| request.key.clone());
    let unreadable = found.unreadable().to_vec();
    Ok(Json(FoundDonationsResponse {
        matches: found.into_vec(),
        latest,
        unreadable,
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/admin/donations",
    params(DonorNameQuery),
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Requests deleted", body = DeleteDonationsResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_donations(
    _admin: AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<DonorNameQuery>,
) -> Result<Json<DeleteDonationsResponse>, ApiError> {
    let deleted = state.donations().delete_by_name(&query.name).await?;
    Ok(Json(DeleteDonationsResponse { deleted }))
}
