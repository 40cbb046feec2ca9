//! Defines the domain models of the application and their business rules.
//!
//! Models own validation and the pure derivations (budget status, goal
//! progress, recurrence date math) so that the stores and route handlers
//! stay free of arithmetic.

mod budget;
mod expense;
mod goal;
mod income;
mod password;
mod recurrence;
mod user;

pub use budget::{
    Budget, BudgetPeriod, BudgetReport, BudgetStatus, BudgetUpdate, DEFAULT_ALERT_THRESHOLD,
    NewBudget,
};
pub use expense::{Expense, ExpenseUpdate, NewExpense, PaymentMethod};
pub use goal::{Goal, GoalPriority, GoalReport, GoalStatus, GoalUpdate, NewGoal};
pub use income::{DEFAULT_INCOME_CATEGORY, Income, IncomeUpdate, NewIncome};
pub use password::{PasswordHash, ValidatedPassword};
pub use recurrence::{Frequency, FrequencyError};
pub use user::{User, UserID};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
