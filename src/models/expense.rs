//! The expense record, its payment method, and the rules for creating and
//! editing expenses.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, Frequency, UserID},
};

/// How an expense was paid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Debit or credit card.
    #[default]
    Card,
    /// A direct bank transfer.
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    /// App-based wallets such as PayPal or Apple Pay.
    #[serde(rename = "Digital Wallet")]
    DigitalWallet,
}

impl PaymentMethod {
    /// The canonical text form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::DigitalWallet => "Digital Wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Cash" => Ok(PaymentMethod::Cash),
            "Card" => Ok(PaymentMethod::Card),
            "Bank Transfer" => Ok(PaymentMethod::BankTransfer),
            "Digital Wallet" => Ok(PaymentMethod::DigitalWallet),
            other => Err(format!("\"{other}\" is not a valid payment method")),
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single spending record belonging to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The expense's ID in the application database.
    pub id: DatabaseID,
    /// The user that owns this expense.
    pub user_id: UserID,
    /// How much was spent. Always greater than zero.
    pub amount: f64,
    /// The spending category, matched against budget categories.
    pub category: String,
    /// A free-form description.
    pub description: String,
    /// The day the expense occurred.
    pub date: NaiveDate,
    /// How the expense was paid.
    pub payment_method: PaymentMethod,
    /// How often this expense repeats.
    ///
    /// `None` marks a one-off expense. `Some` marks a recurring template that
    /// schedule processing clones forward over time.
    pub recurring_frequency: Option<Frequency>,
    /// Free-form notes.
    pub notes: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Return a copy of this expense with `update` applied.
    ///
    /// Fields left as `None` in `update` keep their current value. The repeat
    /// schedule is deliberately not editable: templates are created as such
    /// and removed by deleting them.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the updated fields do not pass the
    /// same checks as [NewExpense::validate].
    pub fn with_update(&self, update: ExpenseUpdate) -> Result<Expense, Error> {
        let merged = Expense {
            amount: update.amount.unwrap_or(self.amount),
            category: update.category.unwrap_or_else(|| self.category.clone()),
            description: update
                .description
                .unwrap_or_else(|| self.description.clone()),
            date: update.date.unwrap_or(self.date),
            payment_method: update.payment_method.unwrap_or(self.payment_method),
            notes: update.notes.unwrap_or_else(|| self.notes.clone()),
            ..self.clone()
        };

        validate_amount(merged.amount)?;
        validate_category(&merged.category)?;

        Ok(merged)
    }
}

/// The data needed to create a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The user that will own the expense.
    pub user_id: UserID,
    /// How much was spent.
    pub amount: f64,
    /// The spending category.
    pub category: String,
    /// A free-form description.
    pub description: String,
    /// The day the expense occurred.
    pub date: NaiveDate,
    /// How the expense was paid.
    pub payment_method: PaymentMethod,
    /// The repeat schedule, or `None` for a one-off expense.
    pub recurring_frequency: Option<Frequency>,
    /// Free-form notes.
    pub notes: String,
}

impl NewExpense {
    /// Check the business rules for an expense.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the amount is not a positive number
    /// or the category is blank.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)?;
        validate_category(&self.category)
    }
}

/// A partial update to an expense. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    /// The new amount.
    pub amount: Option<f64>,
    /// The new spending category.
    pub category: Option<String>,
    /// The new description.
    pub description: Option<String>,
    /// The new date.
    pub date: Option<NaiveDate>,
    /// The new payment method.
    pub payment_method: Option<PaymentMethod>,
    /// The new notes.
    pub notes: Option<String>,
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation(
            "amount must be a number greater than zero".to_owned(),
        ));
    }

    Ok(())
}

fn validate_category(category: &str) -> Result<(), Error> {
    if category.trim().is_empty() {
        return Err(Error::Validation("category must not be empty".to_owned()));
    }

    Ok(())
}
