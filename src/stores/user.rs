//! Defines the user store trait and an implementation for the SQLite backend.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use email_address::EmailAddress;
use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{PasswordHash, User, UserID},
};

/// Handles the creation and retrieval of user accounts.
pub trait UserStore {
    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmailTaken] if a user with `email` already exists,
    /// or an [Error::SqlError] if an SQL related error occurred.
    fn create(
        &mut self,
        email: EmailAddress,
        full_name: String,
        password_hash: PasswordHash,
    ) -> Result<User, Error>;

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if no user with the given ID exists.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Get a user by their email.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if no user with the given email exists.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;
}

/// Stores user accounts in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const USER_COLUMNS: &str = "id, email, full_name, password_hash, created_at";

impl UserStore for SQLiteUserStore {
    /// Create and insert a new user into the database.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    fn create(
        &mut self,
        email: EmailAddress,
        full_name: String,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO user (email, full_name, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {USER_COLUMNS}"
            ))?
            .query_row(
                (
                    email.to_string(),
                    full_name,
                    password_hash.to_string(),
                    Utc::now(),
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    /// Get the user from the database that has the specified `id`.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    fn get(&self, id: UserID) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM user WHERE id = :id"
            ))?
            .query_row(&[(":id", &id.as_i64())], Self::map_row)
            .map_err(|error| error.into())
    }

    /// Get the user from the database that has the specified `email` address.
    ///
    /// # Panics
    ///
    /// Panics if the database lock is already acquired by the same thread or
    /// is poisoned.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM user WHERE email = :email"
            ))?
            .query_row(&[(":email", &email.to_string())], Self::map_row)
            .map_err(|error| error.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    email TEXT UNIQUE NOT NULL,
                    full_name TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = UserID::new(row.get(offset)?);
        let raw_email: String = row.get(offset + 1)?;
        let full_name = row.get(offset + 2)?;
        let raw_password_hash: String = row.get(offset + 3)?;
        let created_at = row.get(offset + 4)?;

        Ok(User {
            id,
            email: EmailAddress::new_unchecked(raw_email),
            full_name,
            password_hash: PasswordHash::new_unchecked(&raw_password_hash),
            created_at,
        })
    }
}
