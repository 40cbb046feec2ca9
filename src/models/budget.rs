//! The budget model and the derivation of its spending status.
//!
//! A budget carries a `spent` accumulator that the ledger maintains as
//! expenses are written. Everything shown to the client beyond that raw
//! number (percentage used, remaining headroom, alert status) is derived
//! here, on demand, and never stored.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// The alert threshold (percent of the budget amount) used when the client
/// does not set one.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// The span of time a budget covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetPeriod {
    /// A budget that resets every week.
    Weekly,
    /// A budget that resets every month.
    #[default]
    Monthly,
    /// A budget that resets every year.
    Yearly,
}

impl BudgetPeriod {
    /// The canonical text form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Yearly => "Yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Weekly" => Ok(BudgetPeriod::Weekly),
            "Monthly" => Ok(BudgetPeriod::Monthly),
            "Yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(format!("\"{other}\" is not a valid budget period")),
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit for one category over a window of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The budget's ID in the application database.
    pub id: DatabaseID,
    /// The user that owns this budget.
    pub user_id: UserID,
    /// The expense category this budget limits.
    pub category: String,
    /// The spending limit for the window.
    pub amount: f64,
    /// How much has been spent so far.
    ///
    /// Starts at zero when the budget is created and is maintained
    /// incrementally by the ledger as expenses are written; it is never
    /// recomputed from the expense table.
    pub spent: f64,
    /// The span of time the budget covers.
    pub period: BudgetPeriod,
    /// The first day of the budget window (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the budget window (inclusive).
    pub end_date: NaiveDate,
    /// The percentage of `amount` at which the budget enters the alert state.
    pub alert_threshold: f64,
    /// Whether the ledger should still track this budget.
    pub is_active: bool,
    /// When the budget was created.
    pub created_at: DateTime<Utc>,
}

/// The data needed to create a new budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The user that will own the budget.
    pub user_id: UserID,
    /// The expense category to limit.
    pub category: String,
    /// The spending limit.
    pub amount: f64,
    /// The span of time the budget covers.
    pub period: BudgetPeriod,
    /// The first day of the budget window (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the budget window (inclusive).
    pub end_date: NaiveDate,
    /// The percentage of `amount` at which the budget enters the alert state.
    pub alert_threshold: f64,
}

impl NewBudget {
    /// Check the business rules for a budget.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the amount or alert threshold is not
    /// a positive number, the category is blank, or the window ends before it
    /// starts.
    pub fn validate(&self) -> Result<(), Error> {
        if self.category.trim().is_empty() {
            return Err(Error::Validation("category must not be empty".to_owned()));
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::Validation(
                "amount must be a number greater than zero".to_owned(),
            ));
        }

        if !self.alert_threshold.is_finite() || self.alert_threshold <= 0.0 {
            return Err(Error::Validation(
                "alertThreshold must be a number greater than zero".to_owned(),
            ));
        }

        if self.end_date < self.start_date {
            return Err(Error::Validation(
                "endDate must not be before startDate".to_owned(),
            ));
        }

        Ok(())
    }
}

/// A partial update to a budget's definition. `None` fields keep their
/// current value.
///
/// The category and the `spent` accumulator are deliberately not editable:
/// changing the category would orphan the spending already recorded against
/// it, and `spent` belongs to the ledger alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    /// The new spending limit.
    pub amount: Option<f64>,
    /// The new period.
    pub period: Option<BudgetPeriod>,
    /// The new window start.
    pub start_date: Option<NaiveDate>,
    /// The new window end.
    pub end_date: Option<NaiveDate>,
    /// The new alert threshold.
    pub alert_threshold: Option<f64>,
    /// Whether the ledger should keep tracking this budget.
    pub is_active: Option<bool>,
}

impl Budget {
    /// Return a copy of this budget with `update` applied.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the updated fields do not pass the
    /// same checks as [NewBudget::validate].
    pub fn with_update(&self, update: BudgetUpdate) -> Result<Budget, Error> {
        let merged = Budget {
            amount: update.amount.unwrap_or(self.amount),
            period: update.period.unwrap_or(self.period),
            start_date: update.start_date.unwrap_or(self.start_date),
            end_date: update.end_date.unwrap_or(self.end_date),
            alert_threshold: update.alert_threshold.unwrap_or(self.alert_threshold),
            is_active: update.is_active.unwrap_or(self.is_active),
            ..self.clone()
        };

        NewBudget {
            user_id: merged.user_id,
            category: merged.category.clone(),
            amount: merged.amount,
            period: merged.period,
            start_date: merged.start_date,
            end_date: merged.end_date,
            alert_threshold: merged.alert_threshold,
        }
        .validate()?;

        Ok(merged)
    }

    /// Derive the spending report for this budget.
    pub fn report(self) -> BudgetReport {
        BudgetReport::new(self)
    }
}

/// How a budget's spending compares to its limit and alert threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    /// Spending is below the alert threshold.
    Normal,
    /// Spending has reached the alert threshold but not exceeded the limit.
    Alert,
    /// Spending has exceeded the limit.
    Exceeded,
}

/// A budget together with its derived spending figures.
///
/// The derivation uses the unrounded percentage for the status comparisons
/// and only rounds the displayed value, so a budget at 100.4% of its limit
/// reports as exceeded even though the rounded figure reads 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    /// The underlying budget.
    #[serde(flatten)]
    pub budget: Budget,
    /// Spending as a rounded percentage of the limit.
    pub percentage_used: u32,
    /// How much of the limit is left, floored at zero.
    pub remaining: f64,
    /// The alert status.
    pub status: BudgetStatus,
}

impl BudgetReport {
    /// Derive the spending figures for `budget`.
    pub fn new(budget: Budget) -> Self {
        let percentage_used = (budget.spent / budget.amount) * 100.0;

        let status = if percentage_used > 100.0 {
            BudgetStatus::Exceeded
        } else if percentage_used >= budget.alert_threshold {
            BudgetStatus::Alert
        } else {
            BudgetStatus::Normal
        };

        Self {
            percentage_used: percentage_used.round() as u32,
            remaining: (budget.amount - budget.spent).max(0.0),
            status,
            budget,
        }
    }
}
