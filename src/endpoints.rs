//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}',
//! use [format_endpoint].

/// The liveness check, the only route that does not require authentication.
pub const HEALTH: &str = "/api/health";

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for the current user's profile.
pub const PROFILE: &str = "/api/auth/profile";

/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for aggregate expense figures.
pub const EXPENSE_STATS: &str = "/api/expenses/stats";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";

/// The route to list and create income records.
pub const INCOMES: &str = "/api/income";
/// The route for aggregate income figures.
pub const INCOME_STATS: &str = "/api/income/stats";
/// The route to access a single income record.
pub const INCOME: &str = "/api/income/{income_id}";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route for active budgets with their derived status.
pub const BUDGET_STATUS: &str = "/api/budgets/status";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// The route to list and create savings goals.
pub const GOALS: &str = "/api/goals";
/// The route for active goals with their derived progress.
pub const GOAL_PROGRESS: &str = "/api/goals/progress";
/// The route to access a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to set how much has been saved towards a goal.
pub const GOAL_SET_PROGRESS: &str = "/api/goals/{goal_id}/progress";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. For
/// example, in the endpoint path '/api/expenses/{expense_id}',
/// '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII
/// characters and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
