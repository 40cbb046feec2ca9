/*! This module defines and implements traits for interacting with the application's database. */

use rusqlite::{Connection, Error, Row, Transaction, TransactionBehavior};

use crate::stores::{
    SQLiteBudgetStore, SQLiteExpenseStore, SQLiteGoalStore, SQLiteIncomeStore, SQLiteUserStore,
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model if it does not already exist.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
///
/// # Examples
/// ```
/// use rusqlite::{Connection, Error, Row};
///
/// use fintrack_rs::db::MapRow;
///
/// struct Foo {
///     id: i64,
///     desc: String,
/// }
///
/// impl MapRow for Foo {
///     type ReturnType = Self;
///
///     fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, Error> {
///         Ok(Self {
///             id: row.get(offset)?,
///             desc: row.get(offset + 1)?,
///         })
///     }
/// }
///
/// fn example(conn: &Connection) -> Result<Foo, fintrack_rs::Error> {
///     conn.prepare("SELECT id, desc FROM foo WHERE id = :id")?
///         .query_row(&[(":id", &1)], Foo::map_row)
///         .map_err(|e| e.into())
/// }
/// ```
pub trait MapRow {
    /// The type that the implementation maps a database row to.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading columns starting at `offset`.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Create the application's tables and enable foreign key enforcement.
///
/// Safe to call on a database that has already been initialized, e.g. when the
/// server restarts with an existing database file.
///
/// # Errors
///
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), crate::Error> {
    // The pragma must run outside the schema transaction, SQLite ignores it
    // mid-transaction.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    SQLiteUserStore::create_table(&transaction)?;
    SQLiteExpenseStore::create_table(&transaction)?;
    SQLiteIncomeStore::create_table(&transaction)?;
    SQLiteBudgetStore::create_table(&transaction)?;
    SQLiteGoalStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
