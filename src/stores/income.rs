//! Defines the income store trait and an implementation for the SQLite
//! backend.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Frequency, Income, IncomeUpdate, NewIncome, UserID},
    recurring::RecurringStore,
};

/// Filters for querying a user's income records.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeQuery {
    /// The user whose income to query.
    pub user_id: UserID,
    /// Only include income received on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Only include income received on or before this date.
    pub end_date: Option<NaiveDate>,
    /// The maximum number of rows to return.
    pub limit: Option<usize>,
    /// The number of rows to skip.
    pub offset: usize,
}

impl IncomeQuery {
    /// A query matching every income record owned by `user_id`.
    pub fn new(user_id: UserID) -> Self {
        Self {
            user_id,
            start_date: None,
            end_date: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Handles the creation, retrieval and editing of income records.
pub trait IncomeStore {
    /// Create a new income record.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the income does not pass
    /// [NewIncome::validate], or an [Error::SqlError] if an SQL related error
    /// occurred.
    fn create(&mut self, income: NewIncome) -> Result<Income, Error>;

    /// Get the income record with the given `id`, owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the record does not exist or belongs
    /// to another user.
    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Income, Error>;

    /// Query for income records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_query(&self, query: &IncomeQuery) -> Result<Vec<Income>, Error>;

    /// Count the income records matching `query`, ignoring its limit and
    /// offset.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn count(&self, query: &IncomeQuery) -> Result<usize, Error>;

    /// Apply `update` to the income record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the record does not exist or belongs
    /// to another user, or an [Error::Validation] if the updated fields are
    /// invalid.
    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: IncomeUpdate,
    ) -> Result<Income, Error>;

    /// Delete the income record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the record does not exist or belongs
    /// to another user.
    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error>;
}

/// Stores income records in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteIncomeStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteIncomeStore {
    /// Create a new income store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const INCOME_COLUMNS: &str =
    "id, user_id, source, amount, date, description, category, recurring_frequency, \
     created_at, updated_at";

fn build_filter(query: &IncomeQuery) -> (String, Vec<Value>) {
    let mut clauses = vec!["user_id = ?1".to_owned()];
    let mut parameters = vec![Value::Integer(query.user_id.as_i64())];

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

impl IncomeStore for SQLiteIncomeStore {
    fn create(&mut self, income: NewIncome) -> Result<Income, Error> {
        income.validate()?;

        let now = Utc::now();

        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO income (user_id, source, amount, date, description, category,
                     recurring_frequency, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 RETURNING {INCOME_COLUMNS}"
            ))?
            .query_row(
                (
                    income.user_id.as_i64(),
                    &income.source,
                    income.amount,
                    income.date,
                    &income.description,
                    &income.category,
                    income.recurring_frequency.map(|frequency| frequency.as_str()),
                    now,
                    now,
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Income, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {INCOME_COLUMNS} FROM income WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), Self::map_row)
            .map_err(|error| error.into())
    }

    fn get_query(&self, query: &IncomeQuery) -> Result<Vec<Income>, Error> {
        let (where_clause, parameters) = build_filter(query);

        let mut sql_parts = vec![
            format!("SELECT {INCOME_COLUMNS} FROM income"),
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
            .map(|maybe_income| maybe_income.map_err(Error::from))
            .collect()
    }

    fn count(&self, query: &IncomeQuery) -> Result<usize, Error> {
        let (where_clause, parameters) = build_filter(query);

        self.connection
            .lock()
            .unwrap()
            .query_row(
                &format!("SELECT COUNT(id) FROM income {where_clause}"),
                params_from_iter(parameters.iter()),
                |row| row.get::<_, i64>(0).map(|count| count as usize),
            )
            .map_err(|error| error.into())
    }

    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: IncomeUpdate,
    ) -> Result<Income, Error> {
        let income = self.get(user_id, id)?;

        let mut updated = income.with_update(update)?;
        updated.updated_at = Utc::now();

        self.connection.lock().unwrap().execute(
            "UPDATE income
             SET source = ?1, amount = ?2, date = ?3, description = ?4, category = ?5,
                 updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            (
                &updated.source,
                updated.amount,
                updated.date,
                &updated.description,
                &updated.category,
                updated.updated_at,
                updated.id,
                updated.user_id.as_i64(),
            ),
        )?;

        Ok(updated)
    }

    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM income WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl RecurringStore for SQLiteIncomeStore {
    type Template = Income;

    fn recurring_templates(&self) -> Result<Vec<Income>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {INCOME_COLUMNS} FROM income
                 WHERE recurring_frequency IS NOT NULL
                 ORDER BY id ASC"
            ))?
            .query_map([], Self::map_row)?
            .map(|maybe_income| maybe_income.map_err(Error::from))
            .collect()
    }

    fn anchor_date(&self, template: &Income) -> Result<Option<NaiveDate>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT date FROM income
                 WHERE user_id = ?1 AND source = ?2 AND id != ?3
                 ORDER BY date DESC, id DESC
                 LIMIT 1",
            )?
            .query_row(
                (template.user_id.as_i64(), &template.source, template.id),
                |row| row.get(0),
            )
            .optional()
            .map_err(|error| error.into())
    }

    fn create_occurrence(&mut self, template: &Income, date: NaiveDate) -> Result<(), Error> {
        self.create(NewIncome {
            user_id: template.user_id,
            source: template.source.clone(),
            amount: template.amount,
            date,
            description: template.description.clone(),
            category: template.category.clone(),
            recurring_frequency: template.recurring_frequency,
        })
        .map(|_| ())
    }
}

impl CreateTable for SQLiteIncomeStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS income (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                    source TEXT NOT NULL,
                    amount REAL NOT NULL,
                    date TEXT NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT NOT NULL,
                    recurring_frequency TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_income_user_date ON income(user_id, date)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteIncomeStore {
    type ReturnType = Income;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let source = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let date = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;
        let category = row.get(offset + 6)?;
        let raw_frequency: Option<String> = row.get(offset + 7)?;
        let created_at = row.get(offset + 8)?;
        let updated_at = row.get(offset + 9)?;

        Ok(Income {
            id,
            user_id,
            source,
            amount,
            date,
            description,
            category,
            recurring_frequency: raw_frequency.map(|text| Frequency::parse_lenient(&text)),
            created_at,
            updated_at,
        })
    }
}
