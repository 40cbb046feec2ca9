//! Keeps each budget's running `spent` total in line with expense writes.
//!
//! These functions are called by the expense store inside the same SQLite
//! transaction as the expense insert, update or delete that triggered them.
//! At most one budget receives any adjustment: the covering budget is the
//! active budget owned by the expense's user, in the expense's category,
//! whose window contains the expense date. When several budgets match, the
//! most recently created one wins, with the higher id breaking ties.
//!
//! A missing covering budget is not an error. The expense is recorded either
//! way and the ledger simply has nothing to adjust.

use rusqlite::Connection;

use crate::{Error, models::Expense};

/// Add the expense's amount to the covering budget's `spent` total.
///
/// Does nothing if no budget covers the expense.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the update fails.
pub fn apply_expense(connection: &Connection, expense: &Expense) -> Result<(), Error> {
    connection.execute(
        "UPDATE budget
         SET spent = spent + ?1
         WHERE id = (
             SELECT id FROM budget
             WHERE user_id = ?2 AND category = ?3 AND is_active = 1
                 AND start_date <= ?4 AND end_date >= ?4
             ORDER BY created_at DESC, id DESC
             LIMIT 1
         )",
        (
            expense.amount,
            expense.user_id.as_i64(),
            &expense.category,
            expense.date,
        ),
    )?;

    Ok(())
}

/// Subtract the expense's amount from the covering budget's `spent` total,
/// flooring the result at zero.
///
/// The floor guards against drift: deleting an expense recorded before its
/// budget existed, or deleting twice, must not drive `spent` negative.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the update fails.
pub fn reverse_expense(connection: &Connection, expense: &Expense) -> Result<(), Error> {
    connection.execute(
        "UPDATE budget
         SET spent = MAX(0, spent - ?1)
         WHERE id = (
             SELECT id FROM budget
             WHERE user_id = ?2 AND category = ?3 AND is_active = 1
                 AND start_date <= ?4 AND end_date >= ?4
             ORDER BY created_at DESC, id DESC
             LIMIT 1
         )",
        (
            expense.amount,
            expense.user_id.as_i64(),
            &expense.category,
            expense.date,
        ),
    )?;

    Ok(())
}

/// Move the spent effect of an edited expense from the budget covering its
/// old values to the budget covering its new values.
///
/// The two may be the same budget, in which case the net effect is the
/// amount difference.
///
/// # Errors
///
/// Returns an [Error::SqlError] if either update fails.
pub fn rebalance_expense(
    connection: &Connection,
    before: &Expense,
    after: &Expense,
) -> Result<(), Error> {
    reverse_expense(connection, before)?;
    apply_expense(connection, after)
}
