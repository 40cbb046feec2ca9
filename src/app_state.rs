//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    auth::AuthState,
    db::initialize,
    stores::{
        SQLiteBudgetStore, SQLiteExpenseStore, SQLiteGoalStore, SQLiteIncomeStore, SQLiteUserStore,
    },
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The store for registered users.
    pub user_store: SQLiteUserStore,
    /// The store for expenses.
    pub expense_store: SQLiteExpenseStore,
    /// The store for income records.
    pub income_store: SQLiteIncomeStore,
    /// The store for budgets.
    pub budget_store: SQLiteBudgetStore,
    /// The store for savings goals.
    pub goal_store: SQLiteGoalStore,
    /// The keys for signing and verifying auth tokens.
    pub auth_state: AuthState,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, jwt_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            user_store: SQLiteUserStore::new(connection.clone()),
            expense_store: SQLiteExpenseStore::new(connection.clone()),
            income_store: SQLiteIncomeStore::new(connection.clone()),
            budget_store: SQLiteBudgetStore::new(connection.clone()),
            goal_store: SQLiteGoalStore::new(connection),
            auth_state: AuthState::new(jwt_secret),
        })
    }
}

// this impl tells the Claims extractor how to access the token keys from our state
impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth_state.clone()
    }
}
