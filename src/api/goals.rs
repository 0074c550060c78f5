// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{ErrorResponse, GoalView, SaveGoalRequest},
    state::AppState,
    storage::repository::{current_month, Month},
};

async fn goal_view(state: &AppState, month: Month) -> Result<GoalView, ApiError> {
    let goal = state.goals().load(month).await?;
    Ok(GoalView::new(month, goal))
}

#[utoipa::path(
    get,
    path = "/v1/goals",
    tag = "Goals",
    responses(
        (status = 200, description = "Goal view for the current month", body = GoalView),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn current_goal(State(state): State<AppState>) -> Result<Json<GoalView>, ApiError> {
    let month = current_month(state.clock.as_ref());
    Ok(Json(goal_view(&state, month).await?))
}

#[utoipa::path(
    get,
    path = "/v1/goals/{month}",
    params(
        ("month" = String, Path, description = "English month name, any case")
    ),
    tag = "Goals",
    responses(
        (status = 200, description = "Goal view; goal and progress are null when unset", body = GoalView),
        (status = 400, description = "Unknown month", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn month_goal(
    Path(month): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GoalView>, ApiError> {
    let month: Month = month.parse()?;
    Ok(Json(goal_view(&state, month).await?))
}

#[utoipa::path(
    get,
    path = "/v1/admin/goals/{month}",
    params(
        ("month" = String, Path, description = "English month name, any case")
    ),
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Stored values for pre-filling the editor", body = GoalView),
        (status = 400, description = "Unknown month", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn admin_month_goal(
    _admin: AdminOnly,
    Path(month): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GoalView>, ApiError> {
    month_goal(Path(month), State(state)).await
}

#[utoipa::path(
    put,
    path = "/v1/admin/goals/{month}",
    params(
        ("month" = String, Path, description = "English month name, any case")
    ),
    request_body = SaveGoalRequest,
    tag = "Admin",
    security(("admin_key" = [])),
    responses(
        (status = 200, description = "Goal saved, replacing any earlier record", body = GoalView),
        (status = 400, description = "Unknown month", body = ErrorResponse),
        (status = 422, description = "Blank amounts", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn save_goal(
    _admin: AdminOnly,
    Path(month): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SaveGoalRequest>,
) -> Result<Json<GoalView>, ApiError> {
    let month: Month = month.parse()?;
    let goal = state
        .goals()
        .save(month, &request.monthly_donations, &request.monthly_goal)
        .await?;
    Ok(Json(GoalView::new(month, Some(goal))))
}
