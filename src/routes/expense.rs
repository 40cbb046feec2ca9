//! The expense routes.
//!
//! Budget spending follows every write here automatically: the store applies,
//! rebalances or reverses the covering budget's `spent` total inside the same
//! transaction as the expense row.

use std::collections::BTreeMap;

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
    AppState, Error,
    auth::Claims,
    models::{DatabaseID, ExpenseUpdate, Frequency, NewExpense, PaymentMethod},
    pagination::{PageParams, Pagination},
    routes::DateRange,
    stores::{ExpenseQuery, ExpenseStore},
};

/// The fields the client sends to create an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseData {
    /// The amount spent. Must be greater than zero.
    pub amount: f64,
    /// The spending category, e.g. "Groceries".
    pub category: String,
    /// Free-form text describing the purchase.
    #[serde(default)]
    pub description: Option<String>,
    /// The day of the purchase. Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// How the purchase was paid. Defaults to [PaymentMethod::Card].
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Whether this expense repeats on a schedule.
    #[serde(default)]
    pub is_recurring: bool,
    /// How often the expense repeats. Required when `is_recurring` is set.
    #[serde(default)]
    pub recurring_frequency: Option<Frequency>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// The filters for listing expenses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilter {
    /// Only include expenses in this category.
    pub category: Option<String>,
    /// Only include expenses on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Only include expenses on or before this date.
    pub end_date: Option<NaiveDate>,
}

/// A route handler for creating a new expense.
pub async fn create_expense(
    State(mut state): State<AppState>,
    claims: Claims,
    Json(data): Json<ExpenseData>,
) -> Response {
    let recurring_frequency = if data.is_recurring {
        match data.recurring_frequency {
            Some(frequency) => Some(frequency),
            None => {
                return Error::Validation(
                    "recurringFrequency is required when isRecurring is set".to_owned(),
                )
                .into_response();
            }
        }
    } else {
        None
    };

    let new_expense = NewExpense {
        user_id: claims.user_id,
        amount: data.amount,
        category: data.category,
        description: data.description.unwrap_or_default(),
        date: data.date.unwrap_or_else(|| Utc::now().date_naive()),
        payment_method: data.payment_method.unwrap_or_default(),
        recurring_frequency,
        notes: data.notes.unwrap_or_default(),
    };

    match state.expense_store.create(new_expense) {
        Ok(expense) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Expense created successfully",
                "expense": expense,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing a page of the user's expenses, newest first.
pub async fn get_expenses(
    State(state): State<AppState>,
    claims: Claims,
    Query(filter): Query<ExpenseFilter>,
    Query(page_params): Query<PageParams>,
) -> Response {
    let query = ExpenseQuery {
        user_id: claims.user_id,
        category: filter.category,
        start_date: filter.start_date,
        end_date: filter.end_date,
        limit: Some(page_params.limit),
        offset: page_params.offset(),
    };

    let expenses = match state.expense_store.get_query(&query) {
        Ok(expenses) => expenses,
        Err(error) => return error.into_response(),
    };

    let total = match state.expense_store.count(&query) {
        Ok(total) => total,
        Err(error) => return error.into_response(),
    };

    Json(json!({
        "expenses": expenses,
        "pagination": Pagination::new(total, &page_params),
    }))
    .into_response()
}

/// A route handler for aggregate spending figures, optionally limited to a
/// date window.
pub async fn get_expense_stats(
    State(state): State<AppState>,
    claims: Claims,
    Query(range): Query<DateRange>,
) -> Response {
    let query = ExpenseQuery {
        start_date: range.start_date,
        end_date: range.end_date,
        ..ExpenseQuery::new(claims.user_id)
    };

    let expenses = match state.expense_store.get_query(&query) {
        Ok(expenses) => expenses,
        Err(error) => return error.into_response(),
    };

    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
    let mut by_category = BTreeMap::new();
    let mut by_payment_method = BTreeMap::new();

    for expense in &expenses {
        *by_category
            .entry(expense.category.clone())
            .or_insert(0.0) += expense.amount;
        *by_payment_method
            .entry(expense.payment_method.as_str())
            .or_insert(0.0) += expense.amount;
    }

    Json(json!({
        "totalExpenses": total,
        "byCategory": by_category,
        "byPaymentMethod": by_payment_method,
    }))
    .into_response()
}

/// A route handler for fetching a single expense by its database ID.
pub async fn get_expense(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<DatabaseID>,
) -> Response {
    match state.expense_store.get(claims.user_id, expense_id) {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for editing an expense.
pub async fn update_expense(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<DatabaseID>,
    Json(update): Json<ExpenseUpdate>,
) -> Response {
    match state.expense_store.update(claims.user_id, expense_id, update) {
        Ok(expense) => Json(json!({
            "message": "Expense updated successfully",
            "expense": expense,
        }))
        .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for deleting an expense.
pub async fn delete_expense(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<DatabaseID>,
) -> Response {
    match state.expense_store.delete(claims.user_id, expense_id) {
        Ok(()) => Json(json!({ "message": "Expense deleted successfully" })).into_response(),
        Err(error) => error.into_response(),
    }
}
