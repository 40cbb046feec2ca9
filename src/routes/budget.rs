//! The budget routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState,
    auth::Claims,
    models::{
        Budget, BudgetPeriod, BudgetUpdate, DEFAULT_ALERT_THRESHOLD, DatabaseID, NewBudget,
    },
    pagination::{PageParams, Pagination},
    stores::{BudgetQuery, BudgetStore},
};

/// The fields the client sends to create a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetData {
    /// The expense category to limit.
    pub category: String,
    /// The spending limit for the window.
    pub amount: f64,
    /// The span of time the budget covers. Defaults to monthly.
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
    /// The first day of the budget window (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the budget window (inclusive).
    pub end_date: NaiveDate,
    /// The percentage of `amount` at which the budget enters the alert state.
    /// Defaults to [DEFAULT_ALERT_THRESHOLD].
    #[serde(default)]
    pub alert_threshold: Option<f64>,
}

/// A route handler for creating a new budget.
pub async fn create_budget(
    State(mut state): State<AppState>,
    claims: Claims,
    Json(data): Json<BudgetData>,
) -> Response {
    let new_budget = NewBudget {
        user_id: claims.user_id,
        category: data.category,
        amount: data.amount,
        period: data.period.unwrap_or_default(),
        start_date: data.start_date,
        end_date: data.end_date,
        alert_threshold: data.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
    };

    match state.budget_store.create(new_budget) {
        Ok(budget) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Budget created successfully",
                "budget": budget,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing a page of the user's budgets, most recently
/// created first.
pub async fn get_budgets(
    State(state): State<AppState>,
    claims: Claims,
    Query(page_params): Query<PageParams>,
) -> Response {
    let query = BudgetQuery {
        limit: Some(page_params.limit),
        offset: page_params.offset(),
        ..BudgetQuery::new(claims.user_id)
    };

    let budgets = match state.budget_store.get_query(&query) {
        Ok(budgets) => budgets,
        Err(error) => return error.into_response(),
    };

    let total = match state.budget_store.count(claims.user_id) {
        Ok(total) => total,
        Err(error) => return error.into_response(),
    };

    Json(json!({
        "budgets": budgets,
        "pagination": Pagination::new(total, &page_params),
    }))
    .into_response()
}

/// A route handler for the spending status of every active budget.
pub async fn get_budget_status(State(state): State<AppState>, claims: Claims) -> Response {
    match state.budget_store.get_active(claims.user_id) {
        Ok(budgets) => {
            let reports: Vec<_> = budgets.into_iter().map(Budget::report).collect();
            Json(reports).into_response()
        }
        Err(error) => error.into_response(),
    }
}

/// A route handler for fetching a single budget.
pub async fn get_budget(
    State(state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Response {
    match state.budget_store.get(claims.user_id, budget_id) {
        Ok(budget) => Json(budget).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for editing a budget's definition.
pub async fn update_budget(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
    Json(update): Json<BudgetUpdate>,
) -> Response {
    match state.budget_store.update(claims.user_id, budget_id, update) {
        Ok(budget) => Json(json!({
            "message": "Budget updated successfully",
            "budget": budget,
        }))
        .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for deleting a budget.
pub async fn delete_budget(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Response {
    match state.budget_store.delete(claims.user_id, budget_id) {
        Ok(()) => Json(json!({ "message": "Budget deleted successfully" })).into_response(),
        Err(error) => error.into_response(),
    }
}
