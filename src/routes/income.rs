//! The income routes.

use std::collections::{BTreeMap, BTreeSet};

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error,
    auth::Claims,
    models::{DEFAULT_INCOME_CATEGORY, DatabaseID, Frequency, IncomeUpdate, NewIncome},
    pagination::{PageParams, Pagination},
    routes::DateRange,
    stores::{IncomeQuery, IncomeStore},
};

/// The fields the client sends to create an income record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeData {
    /// Where the money came from, e.g. an employer's name.
    pub source: String,
    /// The amount received. Must be greater than zero.
    pub amount: f64,
    /// The day the money was received. Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free-form text describing the income.
    #[serde(default)]
    pub description: Option<String>,
    /// A grouping label. Defaults to [DEFAULT_INCOME_CATEGORY].
    #[serde(default)]
    pub category: Option<String>,
    /// Whether this income repeats on a schedule.
    #[serde(default)]
    pub is_recurring: bool,
    /// How often the income repeats. Required when `is_recurring` is set.
    #[serde(default)]
    pub recurring_frequency: Option<Frequency>,
}

/// A route handler for creating a new income record.
pub async fn create_income(
    State(mut state): State<AppState>,
    claims: Claims,
    Json(data): Json<IncomeData>,
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

    let new_income = NewIncome {
        user_id: claims.user_id,
        source: data.source,
        amount: data.amount,
        date: data.date.unwrap_or_else(|| Utc::now().date_naive()),
        description: data.description.unwrap_or_default(),
        category: data
            .category
            .unwrap_or_else(|| DEFAULT_INCOME_CATEGORY.to_owned()),
        recurring_frequency,
    };

    match state.income_store.create(new_income) {
        Ok(income) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Income created successfully",
                "income": income,
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing a page of the user's income records, newest
/// first.
pub async fn get_incomes(
    State(state): State<AppState>,
    claims: Claims,
    Query(range): Query<DateRange>,
    Query(page_params): Query<PageParams>,
) -> Response {
    let query = IncomeQuery {
        user_id: claims.user_id,
        start_date: range.start_date,
        end_date: range.end_date,
        limit: Some(page_params.limit),
        offset: page_params.offset(),
    };

    let incomes = match state.income_store.get_query(&query) {
        Ok(incomes) => incomes,
        Err(error) => return error.into_response(),
    };

    let total = match state.income_store.count(&query) {
        Ok(total) => total,
        Err(error) => return error.into_response(),
    };

    Json(json!({
        "incomes": incomes,
        "pagination": Pagination::new(total, &page_params),
    }))
    .into_response()
}

/// A route handler for aggregate income figures, optionally limited to a
/// date window.
///
/// The monthly average divides the total by the number of distinct calendar
/// months that actually contain income, so a single month of data does not
/// get diluted across the whole range.
pub async fn get_income_stats(
    State(state): State<AppState>,
    claims: Claims,
    Query(range): Query<DateRange>,
) -> Response {
    let query = IncomeQuery {
        start_date: range.start_date,
        end_date: range.end_date,
        ..IncomeQuery::new(claims.user_id)
    };

    let incomes = match state.income_store.get_query(&query) {
        Ok(incomes) => incomes,
        Err(error) => return error.into_response(),
    };

    let total: f64 = incomes.iter().map(|income| income.amount).sum();
    let mut by_source = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    let mut months = BTreeSet::new();

    for income in &incomes {
        *by_source.entry(income.source.clone()).or_insert(0.0) += income.amount;
        *by_category.entry(income.category.clone()).or_insert(0.0) += income.amount;
        months.insert((income.date.year(), income.date.month()));
    }

    let average_monthly_income = if months.is_empty() {
        0.0
    } else {
        let average = total / months.len() as f64;
        (average * 100.0).round() / 100.0
    };

    Json(json!({
        "totalIncome": total,
        "bySource": by_source,
        "byCategory": by_category,
        "averageMonthlyIncome": average_monthly_income,
    }))
    .into_response()
}

/// A route handler for editing an income record.
pub async fn update_income(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(income_id): Path<DatabaseID>,
    Json(update): Json<IncomeUpdate>,
) -> Response {
    match state.income_store.update(claims.user_id, income_id, update) {
        Ok(income) => Json(json!({
            "message": "Income updated successfully",
            "income": income,
        }))
        .into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for deleting an income record.
pub async fn delete_income(
    State(mut state): State<AppState>,
    claims: Claims,
    Path(income_id): Path<DatabaseID>,
) -> Response {
    match state.income_store.delete(claims.user_id, income_id) {
        Ok(()) => Json(json!({ "message": "Income deleted successfully" })).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod income_route_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::Utc;
    use serde_json::{Value, json};

    use crate::endpoints;
    use crate::routes::test_helpers::get_test_server_with_user;

    async fn create_income(server: &TestServer, token: &str, body: Value) -> Value {
        let response = server
            .post(endpoints::INCOMES)
            .authorization_bearer(token)
            .json(&body)
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["income"].clone()
    }

    #[tokio::test]
    async fn create_fills_in_defaults() {
        let (server, token) = get_test_server_with_user().await;

        let income = create_income(
            &server,
            &token,
            json!({ "source": "Acme Corp", "amount": 4200.0 }),
        )
        .await;

        assert_eq!(income["source"], "Acme Corp");
        assert_eq!(income["amount"], 4200.0);
        assert_eq!(income["category"], "Salary");
        assert_eq!(income["date"], Utc::now().date_naive().to_string());
        assert_eq!(income["recurringFrequency"], Value::Null);
    }

    #[tokio::test]
    async fn create_requires_frequency_when_recurring() {
        let (server, token) = get_test_server_with_user().await;

        let response = server
            .post(endpoints::INCOMES)
            .authorization_bearer(&token)
            .json(&json!({
                "source": "Acme Corp",
                "amount": 4200.0,
                "isRecurring": true,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_amount() {
        let (server, token) = get_test_server_with_user().await;

        let response = server
            .post(endpoints::INCOMES)
            .authorization_bearer(&token)
            .json(&json!({ "source": "Acme Corp", "amount": -1.0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_filters_by_date_window_and_paginates() {
        let (server, token) = get_test_server_with_user().await;
        for date in ["2025-05-01", "2025-06-01", "2025-06-20", "2025-07-01"] {
            create_income(
                &server,
                &token,
                json!({ "source": "Acme Corp", "amount": 1000.0, "date": date }),
            )
            .await;
        }

        let body = server
            .get(&format!(
                "{}?startDate=2025-06-01&endDate=2025-06-30&limit=1&page=2",
                endpoints::INCOMES
            ))
            .authorization_bearer(&token)
            .await
            .json::<Value>();

        assert_eq!(body["incomes"].as_array().unwrap().len(), 1);
        assert_eq!(body["incomes"][0]["date"], "2025-06-01");
        assert_eq!(
            body["pagination"],
            json!({ "total": 2, "pages": 2, "currentPage": 2 })
        );
    }

    #[tokio::test]
    async fn stats_sum_by_source_and_category() {
        let (server, token) = get_test_server_with_user().await;
        create_income(
            &server,
            &token,
            json!({ "source": "Acme Corp", "amount": 4000.0, "date": "2025-05-01" }),
        )
        .await;
        create_income(
            &server,
            &token,
            json!({ "source": "Acme Corp", "amount": 4000.0, "date": "2025-06-01" }),
        )
        .await;
        create_income(
            &server,
            &token,
            json!({
                "source": "Freelancing",
                "amount": 500.0,
                "category": "Side Income",
                "date": "2025-06-15",
            }),
        )
        .await;

        let stats = server
            .get(endpoints::INCOME_STATS)
            .authorization_bearer(&token)
            .await
            .json::<Value>();

        assert_eq!(stats["totalIncome"], 8500.0);
        assert_eq!(stats["bySource"]["Acme Corp"], 8000.0);
        assert_eq!(stats["bySource"]["Freelancing"], 500.0);
        assert_eq!(stats["byCategory"]["Salary"], 8000.0);
        assert_eq!(stats["byCategory"]["Side Income"], 500.0);
        // 8500 across May and June.
        assert_eq!(stats["averageMonthlyIncome"], 4250.0);
    }

    #[tokio::test]
    async fn stats_for_no_income_are_all_zero() {
        let (server, token) = get_test_server_with_user().await;

        let stats = server
            .get(endpoints::INCOME_STATS)
            .authorization_bearer(&token)
            .await
            .json::<Value>();

        assert_eq!(stats["totalIncome"], 0.0);
        assert_eq!(stats["averageMonthlyIncome"], 0.0);
    }

    #[tokio::test]
    async fn update_edits_fields() {
        let (server, token) = get_test_server_with_user().await;
        let income = create_income(
            &server,
            &token,
            json!({ "source": "Acme Corp", "amount": 4000.0 }),
        )
        .await;
        let income_id = income["id"].as_i64().unwrap();

        let response = server
            .put(&endpoints::format_endpoint(endpoints::INCOME, income_id))
            .authorization_bearer(&token)
            .json(&json!({ "amount": 4500.0, "source": "Acme Corporation" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Income updated successfully");
        assert_eq!(body["income"]["amount"], 4500.0);
        assert_eq!(body["income"]["source"], "Acme Corporation");
    }

    #[tokio::test]
    async fn update_unknown_income_returns_not_found() {
        let (server, token) = get_test_server_with_user().await;

        let response = server
            .put(&endpoints::format_endpoint(endpoints::INCOME, 999))
            .authorization_bearer(&token)
            .json(&json!({ "amount": 4500.0 }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_income() {
        let (server, token) = get_test_server_with_user().await;
        let income = create_income(
            &server,
            &token,
            json!({ "source": "Acme Corp", "amount": 4000.0 }),
        )
        .await;
        let income_id = income["id"].as_i64().unwrap();

        let response = server
            .delete(&endpoints::format_endpoint(endpoints::INCOME, income_id))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["message"],
            "Income deleted successfully"
        );

        let listing = server
            .get(endpoints::INCOMES)
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(listing["pagination"]["total"], 0);
    }
}
