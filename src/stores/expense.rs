//! Defines the expense store trait and an implementation for the SQLite
//! backend.
//!
//! Every write goes through the budget ledger in the same transaction as the
//! expense row itself, so budget spending can never observe a half-applied
//! write. Ledger failures are logged and swallowed: the expense operation
//! succeeds or fails on its own merits.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    ledger,
    models::{DatabaseID, Expense, ExpenseUpdate, Frequency, NewExpense, UserID},
    recurring::RecurringStore,
};

/// Filters for querying a user's expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// The user whose expenses to query.
    pub user_id: UserID,
    /// Only include expenses in this category.
    pub category: Option<String>,
    /// Only include expenses on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Only include expenses on or before this date.
    pub end_date: Option<NaiveDate>,
    /// The maximum number of rows to return.
    pub limit: Option<usize>,
    /// The number of rows to skip.
    pub offset: usize,
}

impl ExpenseQuery {
    /// A query matching every expense owned by `user_id`.
    pub fn new(user_id: UserID) -> Self {
        Self {
            user_id,
            category: None,
            start_date: None,
            end_date: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Handles the creation, retrieval and editing of expenses.
pub trait ExpenseStore {
    /// Create a new expense and apply it to the covering budget.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the expense does not pass
    /// [NewExpense::validate], or an [Error::SqlError] if an SQL related
    /// error occurred.
    fn create(&mut self, expense: NewExpense) -> Result<Expense, Error>;

    /// Get the expense with the given `id`, owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the expense does not exist or belongs
    /// to another user.
    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Expense, Error>;

    /// Query for expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_query(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, Error>;

    /// Count the expenses matching `query`, ignoring its limit and offset.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn count(&self, query: &ExpenseQuery) -> Result<usize, Error>;

    /// Apply `update` to the expense with the given `id` and move its spent
    /// effect to the budget covering the new values.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the expense does not exist or belongs
    /// to another user, or an [Error::Validation] if the updated fields are
    /// invalid.
    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: ExpenseUpdate,
    ) -> Result<Expense, Error>;

    /// Delete the expense with the given `id` and reverse its effect on the
    /// covering budget.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the expense does not exist or belongs
    /// to another user.
    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error>;
}

/// Stores expenses in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new expense store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const EXPENSE_COLUMNS: &str = "id, user_id, amount, category, description, date, \
     payment_method, recurring_frequency, notes, created_at, updated_at";

/// Build the WHERE clause and its parameters for `query`.
fn build_filter(query: &ExpenseQuery) -> (String, Vec<Value>) {
    let mut clauses = vec!["user_id = ?1".to_owned()];
    let mut parameters = vec![Value::Integer(query.user_id.as_i64())];

    if let Some(category) = &query.category {
        clauses.push(format!("category = ?{}", parameters.len() + 1));
        parameters.push(Value::Text(category.clone()));
    }

    if let Some(start_date) = query.start_date {
        clauses.push(format!("date >= ?{}", parameters.len() + 1));
        parameters.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = query.end_date {
        clauses.push(format!("date <= ?{}", parameters.len() + 1));
        parameters.push(Value::Text(end_date.to_string()));
    }

    (String::from("WHERE ") + &clauses.join(" AND "), parameters)
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Create and insert a new expense, adjusting the covering budget's
    /// spent total in the same transaction.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    fn create(&mut self, expense: NewExpense) -> Result<Expense, Error> {
        expense.validate()?;

        let connection = self.connection.lock().unwrap();
        let transaction = connection.unchecked_transaction()?;

        let now = Utc::now();
        let created = transaction
            .prepare(&format!(
                "INSERT INTO expense (user_id, amount, category, description, date,
                     payment_method, recurring_frequency, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 RETURNING {EXPENSE_COLUMNS}"
            ))?
            .query_row(
                (
                    expense.user_id.as_i64(),
                    expense.amount,
                    &expense.category,
                    &expense.description,
                    expense.date,
                    expense.payment_method.as_str(),
                    expense.recurring_frequency.map(|frequency| frequency.as_str()),
                    &expense.notes,
                    now,
                    now,
                ),
                Self::map_row,
            )?;

        if let Err(error) = ledger::apply_expense(&transaction, &created) {
            tracing::warn!(
                "could not update budget spending for expense {}: {error}",
                created.id
            );
        }

        transaction.commit()?;

        Ok(created)
    }

    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Expense, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), Self::map_row)
            .map_err(|error| error.into())
    }

    fn get_query(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, Error> {
        let (where_clause, parameters) = build_filter(query);

        let mut sql_parts = vec![
            format!("SELECT {EXPENSE_COLUMNS} FROM expense"),
            where_clause,
            "ORDER BY date DESC, id DESC".to_owned(),
        ];

        if let Some(limit) = query.limit {
            sql_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
        }

        self.connection
            .lock()
            .unwrap()
            .prepare(&sql_parts.join(" "))?
            .query_map(params_from_iter(parameters.iter()), Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn count(&self, query: &ExpenseQuery) -> Result<usize, Error> {
        let (where_clause, parameters) = build_filter(query);

        self.connection
            .lock()
            .unwrap()
            .query_row(
                &format!("SELECT COUNT(id) FROM expense {where_clause}"),
                params_from_iter(parameters.iter()),
                |row| row.get::<_, i64>(0).map(|count| count as usize),
            )
            .map_err(|error| error.into())
    }

    /// Apply `update` to the stored expense.
    ///
    /// The covering budget's spent total follows: the old values are
    /// reversed and the new values applied in the same transaction as the
    /// row update.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: ExpenseUpdate,
    ) -> Result<Expense, Error> {
        let before = self.get(user_id, id)?;

        let mut after = before.with_update(update)?;
        after.updated_at = Utc::now();

        let connection = self.connection.lock().unwrap();
        let transaction = connection.unchecked_transaction()?;

        transaction.execute(
            "UPDATE expense
             SET amount = ?1, category = ?2, description = ?3, date = ?4,
                 payment_method = ?5, notes = ?6, updated_at = ?7
             WHERE id = ?8 AND user_id = ?9",
            (
                after.amount,
                &after.category,
                &after.description,
                after.date,
                after.payment_method.as_str(),
                &after.notes,
                after.updated_at,
                after.id,
                after.user_id.as_i64(),
            ),
        )?;

        if let Err(error) = ledger::rebalance_expense(&transaction, &before, &after) {
            tracing::warn!(
                "could not rebalance budget spending for expense {}: {error}",
                after.id
            );
        }

        transaction.commit()?;

        Ok(after)
    }

    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error> {
        let expense = self.get(user_id, id)?;

        let connection = self.connection.lock().unwrap();
        let transaction = connection.unchecked_transaction()?;

        transaction.execute(
            "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
            (expense.id, expense.user_id.as_i64()),
        )?;

        if let Err(error) = ledger::reverse_expense(&transaction, &expense) {
            tracing::warn!(
                "could not reverse budget spending for expense {}: {error}",
                expense.id
            );
        }

        transaction.commit()?;

        Ok(())
    }
}

impl RecurringStore for SQLiteExpenseStore {
    type Template = Expense;

    fn recurring_templates(&self) -> Result<Vec<Expense>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expense
                 WHERE recurring_frequency IS NOT NULL
                 ORDER BY id ASC"
            ))?
            .query_map([], Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn anchor_date(&self, template: &Expense) -> Result<Option<NaiveDate>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT date FROM expense
                 WHERE user_id = ?1 AND category = ?2 AND id != ?3
                 ORDER BY date DESC, id DESC
                 LIMIT 1",
            )?
            .query_row(
                (template.user_id.as_i64(), &template.category, template.id),
                |row| row.get(0),
            )
            .optional()
            .map_err(|error| error.into())
    }

    fn create_occurrence(&mut self, template: &Expense, date: NaiveDate) -> Result<(), Error> {
        self.create(NewExpense {
            user_id: template.user_id,
            amount: template.amount,
            category: template.category.clone(),
            description: template.description.clone(),
            date,
            payment_method: template.payment_method,
            recurring_frequency: template.recurring_frequency,
            notes: template.notes.clone(),
        })
        .map(|_| ())
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expense (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                    amount REAL NOT NULL,
                    category TEXT NOT NULL,
                    description TEXT NOT NULL,
                    date TEXT NOT NULL,
                    payment_method TEXT NOT NULL,
                    recurring_frequency TEXT,
                    notes TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let amount = row.get(offset + 2)?;
        let category = row.get(offset + 3)?;
        let description = row.get(offset + 4)?;
        let date = row.get(offset + 5)?;
        let raw_payment_method: String = row.get(offset + 6)?;
        let raw_frequency: Option<String> = row.get(offset + 7)?;
        let notes = row.get(offset + 8)?;
        let created_at = row.get(offset + 9)?;
        let updated_at = row.get(offset + 10)?;

        Ok(Expense {
            id,
            user_id,
            amount,
            category,
            description,
            date,
            payment_method: raw_payment_method.parse().unwrap_or_default(),
            recurring_frequency: raw_frequency.map(|text| Frequency::parse_lenient(&text)),
            notes,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod expense_store_tests {
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
        models::{
            BudgetPeriod, ExpenseUpdate, Frequency, NewBudget, NewExpense, PasswordHash,
            PaymentMethod, UserID,
        },
        recurring::RecurringStore,
        stores::{BudgetStore, SQLiteBudgetStore, SQLiteUserStore, UserStore},
    };

    use super::{ExpenseQuery, ExpenseStore, SQLiteExpenseStore};

    fn get_stores() -> (SQLiteExpenseStore, SQLiteBudgetStore, UserID) {
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

        (
            SQLiteExpenseStore::new(connection.clone()),
            SQLiteBudgetStore::new(connection),
            user.id,
        )
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn new_expense(user_id: UserID, category: &str, amount: f64, day: NaiveDate) -> NewExpense {
        NewExpense {
            user_id,
            amount,
            category: category.to_owned(),
            description: "test expense".to_owned(),
            date: day,
            payment_method: PaymentMethod::Card,
            recurring_frequency: None,
            notes: String::new(),
        }
    }

    fn june_budget(user_id: UserID, category: &str, amount: f64) -> NewBudget {
        NewBudget {
            user_id,
            category: category.to_owned(),
            amount,
            period: BudgetPeriod::Monthly,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 30),
            alert_threshold: 80.0,
        }
    }

    #[test]
    fn create_returns_inserted_expense() {
        let (mut store, _, user_id) = get_stores();

        let expense = store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 1)))
            .unwrap();

        assert!(expense.id > 0);
        assert_eq!(expense.user_id, user_id);
        assert_eq!(expense.amount, 25.0);
        assert_eq!(expense.category, "Groceries");
        assert_eq!(expense.date, date(2025, 6, 1));
        assert_eq!(expense.payment_method, PaymentMethod::Card);
        assert_eq!(expense.recurring_frequency, None);
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        let (mut store, _, user_id) = get_stores();

        let result = store.create(new_expense(user_id, "Groceries", 0.0, date(2025, 6, 1)));

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn create_adds_amount_to_covering_budget() {
        let (mut store, mut budget_store, user_id) = get_stores();
        let budget = budget_store
            .create(june_budget(user_id, "Groceries", 400.0))
            .unwrap();

        store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 15)))
            .unwrap();

        let got = budget_store.get(user_id, budget.id).unwrap();
        assert_eq!(got.spent, 25.0);
    }

    #[test]
    fn create_without_covering_budget_still_succeeds() {
        let (mut store, _, user_id) = get_stores();

        let result = store.create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 15)));

        assert!(result.is_ok());
    }

    #[test]
    fn get_fails_for_another_users_expense() {
        let (mut store, _, user_id) = get_stores();
        let expense = store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 1)))
            .unwrap();

        let got = store.get(UserID::new(user_id.as_i64() + 1), expense.id);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_query_filters_by_category() {
        let (mut store, _, user_id) = get_stores();
        store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 1)))
            .unwrap();
        store
            .create(new_expense(user_id, "Dining", 40.0, date(2025, 6, 2)))
            .unwrap();

        let got = store
            .get_query(&ExpenseQuery {
                category: Some("Dining".to_owned()),
                ..ExpenseQuery::new(user_id)
            })
            .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].category, "Dining");
    }

    #[test]
    fn get_query_filters_by_date_range() {
        let (mut store, _, user_id) = get_stores();
        for day in [1, 10, 20, 30] {
            store
                .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, day)))
                .unwrap();
        }

        let got = store
            .get_query(&ExpenseQuery {
                start_date: Some(date(2025, 6, 10)),
                end_date: Some(date(2025, 6, 20)),
                ..ExpenseQuery::new(user_id)
            })
            .unwrap();

        let days: Vec<NaiveDate> = got.iter().map(|expense| expense.date).collect();
        assert_eq!(days, vec![date(2025, 6, 20), date(2025, 6, 10)]);
    }

    #[test]
    fn get_query_returns_newest_first_with_limit_and_offset() {
        let (mut store, _, user_id) = get_stores();
        for day in 1..=5 {
            store
                .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, day)))
                .unwrap();
        }

        let got = store
            .get_query(&ExpenseQuery {
                limit: Some(2),
                offset: 2,
                ..ExpenseQuery::new(user_id)
            })
            .unwrap();

        let days: Vec<NaiveDate> = got.iter().map(|expense| expense.date).collect();
        assert_eq!(days, vec![date(2025, 6, 3), date(2025, 6, 2)]);
    }

    #[test]
    fn count_ignores_limit_and_offset() {
        let (mut store, _, user_id) = get_stores();
        for day in 1..=5 {
            store
                .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, day)))
                .unwrap();
        }

        let count = store
            .count(&ExpenseQuery {
                limit: Some(2),
                ..ExpenseQuery::new(user_id)
            })
            .unwrap();

        assert_eq!(count, 5);
    }

    #[test]
    fn update_overwrites_fields_and_bumps_updated_at() {
        let (mut store, _, user_id) = get_stores();
        let expense = store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 1)))
            .unwrap();

        let updated = store
            .update(
                user_id,
                expense.id,
                ExpenseUpdate {
                    amount: Some(30.0),
                    notes: Some("refunded later".to_owned()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, 30.0);
        assert_eq!(updated.notes, "refunded later");
        assert_eq!(updated.category, expense.category);
        assert!(updated.updated_at > expense.updated_at);

        assert_eq!(store.get(user_id, expense.id), Ok(updated));
    }

    #[test]
    fn update_moves_spent_between_budgets() {
        let (mut store, mut budget_store, user_id) = get_stores();
        let groceries = budget_store
            .create(june_budget(user_id, "Groceries", 400.0))
            .unwrap();
        let dining = budget_store
            .create(june_budget(user_id, "Dining", 200.0))
            .unwrap();

        let expense = store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 15)))
            .unwrap();

        store
            .update(
                user_id,
                expense.id,
                ExpenseUpdate {
                    category: Some("Dining".to_owned()),
                    amount: Some(40.0),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(budget_store.get(user_id, groceries.id).unwrap().spent, 0.0);
        assert_eq!(budget_store.get(user_id, dining.id).unwrap().spent, 40.0);
    }

    #[test]
    fn update_fails_on_unknown_id() {
        let (mut store, _, user_id) = get_stores();

        let result = store.update(user_id, 999, ExpenseUpdate::default());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_reverses_budget_spending() {
        let (mut store, mut budget_store, user_id) = get_stores();
        let budget = budget_store
            .create(june_budget(user_id, "Groceries", 400.0))
            .unwrap();
        let expense = store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 15)))
            .unwrap();

        store.delete(user_id, expense.id).unwrap();

        assert_eq!(store.get(user_id, expense.id), Err(Error::NotFound));
        assert_eq!(budget_store.get(user_id, budget.id).unwrap().spent, 0.0);
    }

    #[test]
    fn delete_fails_on_second_attempt() {
        let (mut store, _, user_id) = get_stores();
        let expense = store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 1)))
            .unwrap();

        store.delete(user_id, expense.id).unwrap();

        assert_eq!(store.delete(user_id, expense.id), Err(Error::NotFound));
    }

    #[test]
    fn recurring_templates_returns_only_flagged_rows() {
        let (mut store, _, user_id) = get_stores();
        store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 1)))
            .unwrap();
        let template = store
            .create(NewExpense {
                recurring_frequency: Some(Frequency::Weekly),
                ..new_expense(user_id, "Rent", 300.0, date(2025, 6, 1))
            })
            .unwrap();

        let templates = store.recurring_templates().unwrap();

        assert_eq!(templates, vec![template]);
    }

    #[test]
    fn anchor_date_is_none_without_other_records() {
        let (mut store, _, user_id) = get_stores();
        let template = store
            .create(NewExpense {
                recurring_frequency: Some(Frequency::Weekly),
                ..new_expense(user_id, "Rent", 300.0, date(2025, 6, 1))
            })
            .unwrap();

        assert_eq!(store.anchor_date(&template), Ok(None));
    }

    #[test]
    fn anchor_date_returns_latest_other_date_in_category() {
        let (mut store, _, user_id) = get_stores();
        let template = store
            .create(NewExpense {
                recurring_frequency: Some(Frequency::Weekly),
                ..new_expense(user_id, "Rent", 300.0, date(2025, 6, 20))
            })
            .unwrap();
        store
            .create(new_expense(user_id, "Rent", 300.0, date(2025, 6, 8)))
            .unwrap();
        store
            .create(new_expense(user_id, "Rent", 300.0, date(2025, 6, 15)))
            .unwrap();
        // A different category must not act as an anchor.
        store
            .create(new_expense(user_id, "Groceries", 25.0, date(2025, 6, 18)))
            .unwrap();

        assert_eq!(store.anchor_date(&template), Ok(Some(date(2025, 6, 15))));
    }

    #[test]
    fn create_occurrence_clones_the_template() {
        let (mut store, _, user_id) = get_stores();
        let template = store
            .create(NewExpense {
                recurring_frequency: Some(Frequency::Weekly),
                notes: "flat 4B".to_owned(),
                ..new_expense(user_id, "Rent", 300.0, date(2025, 6, 1))
            })
            .unwrap();

        store
            .create_occurrence(&template, date(2025, 6, 8))
            .unwrap();

        let expenses = store.get_query(&ExpenseQuery::new(user_id)).unwrap();
        assert_eq!(expenses.len(), 2);

        let occurrence = &expenses[0];
        assert_eq!(occurrence.date, date(2025, 6, 8));
        assert_eq!(occurrence.amount, template.amount);
        assert_eq!(occurrence.category, template.category);
        assert_eq!(occurrence.notes, template.notes);
        assert_eq!(occurrence.recurring_frequency, Some(Frequency::Weekly));
    }

    #[test]
    fn unknown_frequency_text_is_read_as_monthly() {
        let (store, _, user_id) = get_stores();
        store
            .connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO expense (user_id, amount, category, description, date,
                     payment_method, recurring_frequency, notes, created_at, updated_at)
                 VALUES (?1, 12.0, 'Groceries', '', '2025-06-01', 'Card', 'Fortnightly', '',
                     '2025-06-01T00:00:00+00:00', '2025-06-01T00:00:00+00:00')",
                [user_id.as_i64()],
            )
            .unwrap();

        let templates = store.recurring_templates().unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].recurring_frequency, Some(Frequency::Monthly));
    }
}
