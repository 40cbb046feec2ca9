//! Defines the savings goal store trait and an implementation for the SQLite
//! backend.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Goal, GoalStatus, GoalUpdate, NewGoal, UserID},
};

/// Filters for querying a user's goals.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalQuery {
    /// The user whose goals to query.
    pub user_id: UserID,
    /// Only include goals with this status.
    pub status: Option<GoalStatus>,
    /// The maximum number of rows to return.
    pub limit: Option<usize>,
    /// The number of rows to skip.
    pub offset: usize,
}

impl GoalQuery {
    /// A query matching every goal owned by `user_id`.
    pub fn new(user_id: UserID) -> Self {
        Self {
            user_id,
            status: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Handles the creation, retrieval and editing of savings goals.
pub trait GoalStore {
    /// Create a new goal with nothing saved towards it yet.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the goal does not pass
    /// [NewGoal::validate], or an [Error::SqlError] if an SQL related error
    /// occurred.
    fn create(&mut self, goal: NewGoal) -> Result<Goal, Error>;

    /// Get the goal with the given `id`, owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the goal does not exist or belongs to
    /// another user.
    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Goal, Error>;

    /// Query for goals, highest priority first and then by nearest target
    /// date.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_query(&self, query: &GoalQuery) -> Result<Vec<Goal>, Error>;

    /// Count the goals matching `query`, ignoring its limit and offset.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn count(&self, query: &GoalQuery) -> Result<usize, Error>;

    /// Apply `update` to the goal with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the goal does not exist or belongs to
    /// another user, or an [Error::Validation] if the updated fields are
    /// invalid.
    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: GoalUpdate,
    ) -> Result<Goal, Error>;

    /// Set how much has been saved towards the goal with the given `id`,
    /// marking it achieved once the target is reached.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the goal does not exist or belongs to
    /// another user, or an [Error::Validation] if `current_amount` is
    /// negative.
    fn set_progress(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        current_amount: f64,
    ) -> Result<Goal, Error>;

    /// Delete the goal with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the goal does not exist or belongs to
    /// another user.
    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error>;
}

/// Stores savings goals in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteGoalStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteGoalStore {
    /// Create a new goal store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn write_progress(&mut self, goal: &Goal) -> Result<(), Error> {
        self.connection.lock().unwrap().execute(
            "UPDATE goal SET current_amount = ?1, status = ?2 WHERE id = ?3 AND user_id = ?4",
            (
                goal.current_amount,
                goal.status.as_str(),
                goal.id,
                goal.user_id.as_i64(),
            ),
        )?;

        Ok(())
    }
}

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_amount, current_amount, \
     category, target_date, priority, status, created_at";

/// Goals are listed by priority, not alphabetically, so the text column has
/// to be mapped back onto its rank.
const GOAL_ORDERING: &str = "ORDER BY CASE priority
         WHEN 'High' THEN 0
         WHEN 'Medium' THEN 1
         ELSE 2
     END, target_date ASC, id ASC";

/// Build the WHERE clause and its parameters for `query`.
fn build_filter(query: &GoalQuery) -> (String, Vec<Value>) {
    let mut clauses = vec!["user_id = ?1".to_owned()];
    let mut parameters = vec![Value::Integer(query.user_id.as_i64())];

    if let Some(status) = query.status {
        clauses.push(format!("status = ?{}", parameters.len() + 1));
        parameters.push(Value::Text(status.as_str().to_owned()));
    }

    (String::from("WHERE ") + &clauses.join(" AND "), parameters)
}

impl GoalStore for SQLiteGoalStore {
    fn create(&mut self, goal: NewGoal) -> Result<Goal, Error> {
        goal.validate()?;

        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO goal (user_id, title, description, target_amount, current_amount,
                     category, target_date, priority, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?9)
                 RETURNING {GOAL_COLUMNS}"
            ))?
            .query_row(
                (
                    goal.user_id.as_i64(),
                    &goal.title,
                    &goal.description,
                    goal.target_amount,
                    &goal.category,
                    goal.target_date,
                    goal.priority.as_str(),
                    GoalStatus::Active.as_str(),
                    Utc::now(),
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn get(&self, user_id: UserID, id: DatabaseID) -> Result<Goal, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), Self::map_row)
            .map_err(|error| error.into())
    }

    fn get_query(&self, query: &GoalQuery) -> Result<Vec<Goal>, Error> {
        let (where_clause, parameters) = build_filter(query);

        let mut sql_parts = vec![
            format!("SELECT {GOAL_COLUMNS} FROM goal"),
            where_clause,
            GOAL_ORDERING.to_owned(),
        ];

        if let Some(limit) = query.limit {
            sql_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
        }

        self.connection
            .lock()
            .unwrap()
            .prepare(&sql_parts.join(" "))?
            .query_map(params_from_iter(parameters.iter()), Self::map_row)?
            .map(|maybe_goal| maybe_goal.map_err(Error::from))
            .collect()
    }

    fn count(&self, query: &GoalQuery) -> Result<usize, Error> {
        let (where_clause, parameters) = build_filter(query);

        self.connection
            .lock()
            .unwrap()
            .query_row(
                &format!("SELECT COUNT(id) FROM goal {where_clause}"),
                params_from_iter(parameters.iter()),
                |row| row.get::<_, i64>(0).map(|count| count as usize),
            )
            .map_err(|error| error.into())
    }

    fn update(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        update: GoalUpdate,
    ) -> Result<Goal, Error> {
        let goal = self.get(user_id, id)?;

        let updated = goal.with_update(update)?;

        self.connection.lock().unwrap().execute(
            "UPDATE goal
             SET title = ?1, description = ?2, target_amount = ?3, current_amount = ?4,
                 category = ?5, target_date = ?6, priority = ?7, status = ?8
             WHERE id = ?9 AND user_id = ?10",
            (
                &updated.title,
                &updated.description,
                updated.target_amount,
                updated.current_amount,
                &updated.category,
                updated.target_date,
                updated.priority.as_str(),
                updated.status.as_str(),
                updated.id,
                updated.user_id.as_i64(),
            ),
        )?;

        Ok(updated)
    }

    fn set_progress(
        &mut self,
        user_id: UserID,
        id: DatabaseID,
        current_amount: f64,
    ) -> Result<Goal, Error> {
        let goal = self.get(user_id, id)?;

        let updated = goal.with_progress(current_amount)?;
        self.write_progress(&updated)?;

        Ok(updated)
    }

    fn delete(&mut self, user_id: UserID, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteGoalStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS goal (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    target_amount REAL NOT NULL,
                    current_amount REAL NOT NULL DEFAULT 0,
                    category TEXT NOT NULL,
                    target_date TEXT NOT NULL,
                    priority TEXT NOT NULL,
                    status TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_goal_user_status ON goal(user_id, status)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteGoalStore {
    type ReturnType = Goal;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let title = row.get(offset + 2)?;
        let description = row.get(offset + 3)?;
        let target_amount = row.get(offset + 4)?;
        let current_amount = row.get(offset + 5)?;
        let category = row.get(offset + 6)?;
        let target_date = row.get(offset + 7)?;
        let raw_priority: String = row.get(offset + 8)?;
        let raw_status: String = row.get(offset + 9)?;
        let created_at = row.get(offset + 10)?;

        Ok(Goal {
            id,
            user_id,
            title,
            description,
            target_amount,
            current_amount,
            category,
            target_date,
            priority: raw_priority.parse().unwrap_or_default(),
            status: raw_status.parse().unwrap_or_default(),
            created_at,
        })
    }
}
