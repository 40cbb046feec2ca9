//! The savings goal routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState,
    auth::Claims,
    models::{DatabaseID, GoalPriority, GoalStatus, GoalUpdate, NewGoal},
    pagination::{PageParams, Pagination},
    stores::{GoalQuery, GoalStore},
};

/// The fields the client sends to create a savings goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalData {
    /// A short name for the goal.
    pub title: String,
    /// A free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// The amount to save towards.
    pub target_amount: f64,
    /// A free-form grouping label.
    #[serde(default)]
    pub category: Option<String>,
    /// The day the user wants to reach the target by.
    pub target_date: NaiveDate,
    /// How urgently the user wants to reach the goal. Defaults to medium.
    #[serde(default)]
    pub priority: Option<GoalPriority>,
}

/// The status to filter the goal listing by.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalFilter {
    /// Only include goals with this status. Defaults to active goals.
    #[serde(default)]
    pub status: Option<GoalStatus>,
}

/// The body of a progress update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    /// The total saved towards the goal so far.
    pub current_amount: f64,
}

/// A route handler for creating a new savings goal.
pub async fn create_goal(
    State(mut state): State<AppState>,
    claims: Claims,
    Json(data): Json<GoalData>,
) -> Response {
    let new_goal = NewGoal {
        user_id: claims.user_id,
        title: data.title,
        description: data.description.unwrap_or_default(),
        target_amount: data.target_amount,
        category: data.category.unwrap_or_default(),
        target_date: data.target_date,
        priority: data.priority.unwrap_or_default(),
    };

    match state.goal_store.create(new_goal) {
        Ok(goal) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Goal created successfully",
                "goal": goal,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing a page of the user's goals, highest priority
/// first and then by nearest target date.
///
/// Only active goals are listed unless the `status` query parameter says
/// otherwise.
pub async fn get_goals(
    State(state): State<AppState>,
    claims: Claims,
    Query(filter): Query<GoalFilter>,
    Query(page_params): Query<PageParams>,
) -> Response {
    let query = GoalQuery {
        user_id: claims.user_id,
        status: Some(filter.status.unwrap_or_default()),
        limit: Some(page_params.limit),
        offset: page_params.offset(),
    };

    let goals = match state.goal_store.get_query(&query) {
        Ok(goals) => goals,
        Err(error) => return error.into_response(),
    };

    let total = match state.goal_store.count(&query) {
        Ok(total) => total,
        Err(error) => return error.into_response(),
    };

    Json(json!({
        "goals": goals,
        "pagination": Pagination::new(total, &page_params),
    }))
    .into_response()
}

/// A route handler for the progress report of every active goal.
pub async fn get_goal_progress(State(state): State<AppState>, claims: Claims) -> Response {
    let query = GoalQuery {
        status: Some(GoalStatus::Active),
        ..GoalQuery::new(claims.user_id)
    };

    match state.goal_store.get_query(&query) {
        Ok(goals) => {
            let today = Utc::now().date_naive();
            let reports: Vec<_> = goals.into_iter().map(|goal| goal.report(today)).collect();
            Json(reports).into_response()
        }
        Err(error) => error.into_response(),
    }
}

/// A route handler for fetching a single goal.
pub async fn get_goal(
    State(state): State<AppState>,
    claims: Claims,
    Path(goal_id): Path<DatabaseID>,
) -> Response {
    match state.goal_store.get(claims.user_id, goal_id) {
        Ok(goal) => Json(goal).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for editing a goal.
pub async fn update_goal(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(goal_id): Path<DatabaseID>,
    Json(update): Json<GoalUpdate>,
) -> Response {
    match state.goal_store.update(claims.user_id, goal_id, update) {
        Ok(goal) => Json(json!({
            "message": "Goal updated successfully",
            "goal": goal,
        }))
        .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for recording how much has been saved towards a goal.
///
/// Reaching the target amount marks the goal achieved.
pub async fn set_goal_progress(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(goal_id): Path<DatabaseID>,
    Json(data): Json<ProgressData>,
) -> Response {
    match state
        .goal_store
        .set_progress(claims.user_id, goal_id, data.current_amount)
    {
        Ok(goal) => Json(json!({
            "message": "Goal progress updated successfully",
            "goal": goal,
        }))
        .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for deleting a goal.
pub async fn delete_goal(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(goal_id): Path<DatabaseID>,
) -> Response {
    match state.goal_store.delete(claims.user_id, goal_id) {
        Ok(()) => Json(json!({ "message": "Goal deleted successfully" })).into_response(),
        Err(error) => error.into_response(),
    }
}
