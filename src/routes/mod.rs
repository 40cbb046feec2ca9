//! This module defines the REST API's routes and their handlers.
//!
//! Every route lives under `/api`. Apart from the health check, registration
//! and login, each handler authenticates the caller by extracting
//! [Claims](crate::auth::Claims) from the bearer token and scopes its queries
//! to that user.

mod auth;
mod budget;
mod expense;
mod goal;
mod income;

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{AppState, Error, endpoints};

/// An optional date window from a request's query string, shared by the list
/// and stats routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DateRange {
    /// Only include records on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Only include records on or before this date.
    pub end_date: Option<NaiveDate>,
}

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(auth::register))
        .route(endpoints::LOG_IN, post(auth::log_in))
        .route(endpoints::PROFILE, get(auth::get_profile))
        .route(
            endpoints::EXPENSES,
            get(expense::get_expenses).post(expense::create_expense),
        )
        .route(endpoints::EXPENSE_STATS, get(expense::get_expense_stats))
        .route(
            endpoints::EXPENSE,
            get(expense::get_expense)
                .put(expense::update_expense)
                .delete(expense::delete_expense),
        )
        .route(
            endpoints::INCOMES,
            get(income::get_incomes).post(income::create_income),
        )
        .route(endpoints::INCOME_STATS, get(income::get_income_stats))
        .route(
            endpoints::INCOME,
            put(income::update_income).delete(income::delete_income),
        )
        .route(
            endpoints::BUDGETS,
            get(budget::get_budgets).post(budget::create_budget),
        )
        .route(endpoints::BUDGET_STATUS, get(budget::get_budget_status))
        .route(
            endpoints::BUDGET,
            get(budget::get_budget)
                .put(budget::update_budget)
                .delete(budget::delete_budget),
        )
        .route(
            endpoints::GOALS,
            get(goal::get_goals).post(goal::create_goal),
        )
        .route(endpoints::GOAL_PROGRESS, get(goal::get_goal_progress))
        .route(
            endpoints::GOAL,
            get(goal::get_goal)
                .put(goal::update_goal)
                .delete(goal::delete_goal),
        )
        .route(endpoints::GOAL_SET_PROGRESS, put(goal::set_goal_progress))
        .fallback(get_404_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Confirm that the server is running without touching the database.
async fn get_health() -> Response {
    Json(json!({ "message": "Server is running" })).into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints};

    pub fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state =
            AppState::new(connection, "42").expect("Could not initialize the database.");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    /// Register a user through the API and return the server plus the user's
    /// bearer token.
    pub async fn get_test_server_with_user() -> (TestServer, String) {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "fullName": "Test User",
                "email": "test@test.com",
                "password": "averysafeandsecurepassword",
                "confirmPassword": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body = response.json::<Value>();
        let token = body["token"]
            .as_str()
            .expect("Register response should contain a token.")
            .to_owned();

        (server, token)
    }
}
