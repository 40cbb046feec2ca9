//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).
//!
//! Each store pairs a trait describing the operations route handlers need
//! with a SQLite implementation over a shared connection. The expense store
//! additionally keeps budget spending in step with every write, and the
//! expense and income stores can both act as recurring template sources for
//! [crate::recurring].

mod budget;
mod expense;
mod goal;
mod income;
mod user;

pub use budget::{BudgetQuery, BudgetStore, SQLiteBudgetStore};
pub use expense::{ExpenseQuery, ExpenseStore, SQLiteExpenseStore};
pub use goal::{GoalQuery, GoalStore, SQLiteGoalStore};
pub use income::{IncomeQuery, IncomeStore, SQLiteIncomeStore};
pub use user::{SQLiteUserStore, UserStore};
