//! Defines the budget store trait and an implementation for the SQLite
//! backend.
//!
//! The `spent` column is owned by the [ledger](crate::ledger): it starts at
//! zero when a budget is created and is only ever changed by expense writes.
//! Nothing here recomputes it from the expense table.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Budget, BudgetUpdate, DatabaseID, NewBudget, UserID},
};

/// Pagination for querying a user's budgets.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetQuery {
    /// The user whose budgets to query.
    pub user_id: UserID,
    /// The maximum number of rows to return.
    pub limit: Option<usize>,
    /// The number of rows to skip.
    pub offset: usize,
}

impl BudgetQuery {
    /// A query matching every budget owned by `user_id`.
    pub fn new(user_id: UserID) -> Self {
        Self {
            user_id,
            limit: None,
            offset: 0,
        }
    }
}

/// Handles the creation, retrieval and editing of budgets.
pub trait BudgetStore {
    /// Create a new budget with nothing spent against it yet.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the budget does not pass
    /// [NewBudget::validate], or an [Error::SqlError] if an SQL related error
    /// occurred.
    fn create(&mut self, budget: NewBudget) -> Result<Budget, Error>;

    /// Get the budget with the given `id`, owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the budget does not exist or belongs
    /// to another user.
    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Budget, Error>;

    /// Query for budgets, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_query(&self, query: &BudgetQuery) -> Result<Vec<Budget>, Error>;

    /// Count the budgets owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn count(&self, user_id: UserID) -> Result<usize, Error>;

    /// Get every active budget owned by `user_id`, most recently created
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_active(&self, user_id: UserID) -> Result<Vec<Budget>, Error>;

    /// Apply `update` to the budget with the given `id`.
    ///
    /// The category and `spent` total are untouched.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the budget does not exist or belongs
    /// to another user, or an [Error::Validation] if the updated fields are
    /// invalid.
    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: BudgetUpdate,
    ) -> Result<Budget, Error>;

    /// Delete the budget with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the budget does not exist or belongs
    /// to another user.
    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error>;
}

/// Stores budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new budget store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const BUDGET_COLUMNS: &str = "id, user_id, category, amount, spent, period, start_date, \
     end_date, alert_threshold, is_active, created_at";

impl BudgetStore for SQLiteBudgetStore {
    fn create(&mut self, budget: NewBudget) -> Result<Budget, Error> {
        budget.validate()?;

        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO budget (user_id, category, amount, spent, period, start_date,
                     end_date, alert_threshold, is_active, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, 1, ?8)
                 RETURNING {BUDGET_COLUMNS}"
            ))?
            .query_row(
                (
                    budget.user_id.as_i64(),
                    &budget.category,
                    budget.amount,
                    budget.period.as_str(),
                    budget.start_date,
                    budget.end_date,
                    budget.alert_threshold,
                    Utc::now(),
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Budget, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), Self::map_row)
            .map_err(|error| error.into())
    }

    fn get_query(&self, query: &BudgetQuery) -> Result<Vec<Budget>, Error> {
        let mut sql_parts = vec![format!(
            "SELECT {BUDGET_COLUMNS} FROM budget
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC"
        )];

        if let Some(limit) = query.limit {
            sql_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
        }

        self.connection
            .lock()
            .unwrap()
            .prepare(&sql_parts.join(" "))?
            .query_map([query.user_id.as_i64()], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(Error::from))
            .collect()
    }

    fn count(&self, user_id: UserID) -> Result<usize, Error> {
        self.connection
            .lock()
            .unwrap()
            .query_row(
                "SELECT COUNT(id) FROM budget WHERE user_id = ?1",
                [user_id.as_i64()],
                |row| row.get::<_, i64>(0).map(|count| count as usize),
            )
            .map_err(|error| error.into())
    }

    fn get_active(&self, user_id: UserID) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget
                 WHERE user_id = ?1 AND is_active = 1
                 ORDER BY created_at DESC, id DESC"
            ))?
            .query_map([user_id.as_i64()], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(Error::from))
            .collect()
    }

    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: BudgetUpdate,
    ) -> Result<Budget, Error> {
        let budget = self.get(user_id, id)?;

        let updated = budget.with_update(update)?;

        self.connection.lock().unwrap().execute(
            "UPDATE budget
             SET amount = ?1, period = ?2, start_date = ?3, end_date = ?4,
                 alert_threshold = ?5, is_active = ?6
             WHERE id = ?7 AND user_id = ?8",
            (
                updated.amount,
                updated.period.as_str(),
                updated.start_date,
                updated.end_date,
                updated.alert_threshold,
                updated.is_active,
                updated.id,
                updated.user_id.as_i64(),
            ),
        )?;

        Ok(updated)
    }

    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteBudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                    category TEXT NOT NULL,
                    amount REAL NOT NULL,
                    spent REAL NOT NULL DEFAULT 0,
                    period TEXT NOT NULL,
                    start_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    alert_threshold REAL NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_budget_user_category
             ON budget(user_id, category, is_active)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteBudgetStore {
    type ReturnType = Budget;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let category = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let spent = row.get(offset + 4)?;
        let raw_period: String = row.get(offset + 5)?;
        let start_date = row.get(offset + 6)?;
        let end_date = row.get(offset + 7)?;
        let alert_threshold = row.get(offset + 8)?;
        let is_active = row.get(offset + 9)?;
        let created_at = row.get(offset + 10)?;

        Ok(Budget {
            id,
            user_id,
            category,
            amount,
            spent,
            period: raw_period.parse().unwrap_or_default(),
            start_date,
            end_date,
            alert_threshold,
            is_active,
            created_at,
        })
    }
}

#[cfg(test)]
mod budget_store_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use chrono::NaiveDate;
    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{BudgetPeriod, BudgetUpdate, NewBudget, PasswordHash, UserID},
        stores::{SQLiteUserStore, UserStore},
    };

    use super::{BudgetQuery, BudgetStore, SQLiteBudgetStore};

    fn get_store() -> (SQLiteBudgetStore, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let connection = Arc::new(Mutex::new(connection));

        let user = SQLiteUserStore::new(connection.clone())
            .create(
                EmailAddress::from_str("test@test.com").unwrap(),
                "Test User".to_owned(),
                PasswordHash::new_unchecked("hunter2"),
            )
            .unwrap();

        (SQLiteBudgetStore::new(connection), user.id)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn new_budget(user_id: UserID, category: &str) -> NewBudget {
        NewBudget {
            user_id,
            category: category.to_owned(),
            amount: 400.0,
            period: BudgetPeriod::Monthly,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 30),
            alert_threshold: 80.0,
        }
    }

    #[test]
    fn create_starts_with_zero_spent_and_active() {
        let (mut store, user_id) = get_store();

        let budget = store.create(new_budget(user_id, "Groceries")).unwrap();

        assert!(budget.id > 0);
        assert_eq!(budget.spent, 0.0);
        assert!(budget.is_active);
        assert_eq!(budget.category, "Groceries");
        assert_eq!(budget.period, BudgetPeriod::Monthly);
    }

    #[test]
    fn create_rejects_inverted_window() {
        let (mut store, user_id) = get_store();

        let result = store.create(NewBudget {
            start_date: date(2025, 6, 30),
            end_date: date(2025, 6, 1),
            ..new_budget(user_id, "Groceries")
        });

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn get_fails_for_another_users_budget() {
        let (mut store, user_id) = get_store();
        let budget = store.create(new_budget(user_id, "Groceries")).unwrap();

        let got = store.get(UserID::new(user_id.as_i64() + 1), budget.id);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_query_returns_newest_first_with_limit_and_offset() {
        let (mut store, user_id) = get_store();
        let first = store.create(new_budget(user_id, "Groceries")).unwrap();
        let second = store.create(new_budget(user_id, "Dining")).unwrap();
        let third = store.create(new_budget(user_id, "Transport")).unwrap();

        let all = store.get_query(&BudgetQuery::new(user_id)).unwrap();
        assert_eq!(all, vec![third, second.clone(), first]);

        let page = store
            .get_query(&BudgetQuery {
                limit: Some(1),
                offset: 1,
                ..BudgetQuery::new(user_id)
            })
            .unwrap();
        assert_eq!(page, vec![second]);
    }

    #[test]
    fn count_returns_number_of_budgets() {
        let (mut store, user_id) = get_store();
        store.create(new_budget(user_id, "Groceries")).unwrap();
        store.create(new_budget(user_id, "Dining")).unwrap();

        assert_eq!(store.count(user_id), Ok(2));
    }

    #[test]
    fn get_active_excludes_deactivated_budgets() {
        let (mut store, user_id) = get_store();
        let kept = store.create(new_budget(user_id, "Groceries")).unwrap();
        let disabled = store.create(new_budget(user_id, "Dining")).unwrap();
        store
            .update(
                user_id,
                disabled.id,
                BudgetUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let active = store.get_active(user_id).unwrap();

        assert_eq!(active, vec![kept]);
    }

    #[test]
    fn update_changes_definition_but_not_spent() {
        let (mut store, user_id) = get_store();
        let budget = store.create(new_budget(user_id, "Groceries")).unwrap();
        store
            .connection
            .lock()
            .unwrap()
            .execute("UPDATE budget SET spent = 50 WHERE id = ?1", [budget.id])
            .unwrap();

        let updated = store
            .update(
                user_id,
                budget.id,
                BudgetUpdate {
                    amount: Some(500.0),
                    alert_threshold: Some(90.0),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, 500.0);
        assert_eq!(updated.alert_threshold, 90.0);

        let got = store.get(user_id, budget.id).unwrap();
        assert_eq!(got.spent, 50.0);
        assert_eq!(got.amount, 500.0);
    }

    #[test]
    fn update_fails_on_unknown_id() {
        let (mut store, user_id) = get_store();

        let result = store.update(user_id, 999, BudgetUpdate::default());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_budget() {
        let (mut store, user_id) = get_store();
        let budget = store.create(new_budget(user_id, "Groceries")).unwrap();

        store.delete(user_id, budget.id).unwrap();

        assert_eq!(store.get(user_id, budget.id), Err(Error::NotFound));
        assert_eq!(store.delete(user_id, budget.id), Err(Error::NotFound));
    }
}
