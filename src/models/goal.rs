//! The savings goal model and the derivation of its progress figures.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// How urgently a user wants to reach a goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalPriority {
    /// Nice to have.
    Low,
    /// The default priority.
    #[default]
    Medium,
    /// Listed before all other goals.
    High,
}

impl GoalPriority {
    /// The canonical text form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => "Low",
            GoalPriority::Medium => "Medium",
            GoalPriority::High => "High",
        }
    }
}

impl FromStr for GoalPriority {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Low" => Ok(GoalPriority::Low),
            "Medium" => Ok(GoalPriority::Medium),
            "High" => Ok(GoalPriority::High),
            other => Err(format!("\"{other}\" is not a valid goal priority")),
        }
    }
}

impl Display for GoalPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a goal is still being saved towards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    /// Still being saved towards.
    #[default]
    Active,
    /// The target amount has been reached.
    Achieved,
}

impl GoalStatus {
    /// The canonical text form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "Active",
            GoalStatus::Achieved => "Achieved",
        }
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Active" => Ok(GoalStatus::Active),
            "Achieved" => Ok(GoalStatus::Achieved),
            other => Err(format!("\"{other}\" is not a valid goal status")),
        }
    }
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something a user is saving money towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// The goal's ID in the application database.
    pub id: DatabaseID,
    /// The user that owns this goal.
    pub user_id: UserID,
    /// A short name for the goal.
    pub title: String,
    /// A free-form description.
    pub description: String,
    /// The amount being saved towards. Always greater than zero.
    pub target_amount: f64,
    /// How much has been saved so far.
    pub current_amount: f64,
    /// A free-form grouping label, e.g. "Travel".
    pub category: String,
    /// The day the user wants to reach the target by.
    pub target_date: NaiveDate,
    /// How urgently the user wants to reach the goal.
    pub priority: GoalPriority,
    /// Whether the goal is still being saved towards.
    pub status: GoalStatus,
    /// When the goal was created.
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Return a copy of this goal with its saved amount set to
    /// `current_amount`, flipping the status to [GoalStatus::Achieved] once
    /// the target is reached.
    ///
    /// The flip is one way: lowering the amount afterwards does not reopen an
    /// achieved goal.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `current_amount` is negative or not
    /// a number.
    pub fn with_progress(&self, current_amount: f64) -> Result<Goal, Error> {
        if !current_amount.is_finite() || current_amount < 0.0 {
            return Err(Error::Validation(
                "currentAmount must be a non-negative number".to_owned(),
            ));
        }

        let mut updated = self.clone();
        updated.current_amount = current_amount;

        if current_amount >= updated.target_amount {
            updated.status = GoalStatus::Achieved;
        }

        Ok(updated)
    }

    /// Return a copy of this goal with `update` applied.
    ///
    /// Unlike [Goal::with_progress], setting `current_amount` here does not
    /// change the status: the client owns the status field on a full edit.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the updated fields do not pass the
    /// same checks as [NewGoal::validate].
    pub fn with_update(&self, update: GoalUpdate) -> Result<Goal, Error> {
        let merged = Goal {
            title: update.title.unwrap_or_else(|| self.title.clone()),
            description: update
                .description
                .unwrap_or_else(|| self.description.clone()),
            target_amount: update.target_amount.unwrap_or(self.target_amount),
            current_amount: update.current_amount.unwrap_or(self.current_amount),
            category: update.category.unwrap_or_else(|| self.category.clone()),
            target_date: update.target_date.unwrap_or(self.target_date),
            priority: update.priority.unwrap_or(self.priority),
            status: update.status.unwrap_or(self.status),
            ..self.clone()
        };

        validate_title_and_target(&merged.title, merged.target_amount)?;

        if !merged.current_amount.is_finite() || merged.current_amount < 0.0 {
            return Err(Error::Validation(
                "currentAmount must be a non-negative number".to_owned(),
            ));
        }

        Ok(merged)
    }

    /// Derive the progress report for this goal as of `today`.
    pub fn report(self, today: NaiveDate) -> GoalReport {
        GoalReport::new(self, today)
    }
}

/// The data needed to create a new goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// The user that will own the goal.
    pub user_id: UserID,
    /// A short name for the goal.
    pub title: String,
    /// A free-form description.
    pub description: String,
    /// The amount to save towards.
    pub target_amount: f64,
    /// A free-form grouping label.
    pub category: String,
    /// The day the user wants to reach the target by.
    pub target_date: NaiveDate,
    /// How urgently the user wants to reach the goal.
    pub priority: GoalPriority,
}

impl NewGoal {
    /// Check the business rules for a goal.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the title is blank or the target
    /// amount is not a positive number.
    pub fn validate(&self) -> Result<(), Error> {
        validate_title_and_target(&self.title, self.target_amount)
    }
}

/// A partial update to a goal. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    /// The new title.
    pub title: Option<String>,
    /// The new description.
    pub description: Option<String>,
    /// The new target amount.
    pub target_amount: Option<f64>,
    /// The new saved amount.
    pub current_amount: Option<f64>,
    /// The new category.
    pub category: Option<String>,
    /// The new target date.
    pub target_date: Option<NaiveDate>,
    /// The new priority.
    pub priority: Option<GoalPriority>,
    /// The new status.
    pub status: Option<GoalStatus>,
}

fn validate_title_and_target(title: &str, target_amount: f64) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".to_owned()));
    }

    if !target_amount.is_finite() || target_amount <= 0.0 {
        return Err(Error::Validation(
            "targetAmount must be a number greater than zero".to_owned(),
        ));
    }

    Ok(())
}

/// A goal together with its derived progress figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalReport {
    /// The underlying goal.
    #[serde(flatten)]
    pub goal: Goal,
    /// Saved amount as a rounded percentage of the target.
    pub progress: u32,
    /// Days until the target date, floored at zero.
    pub days_remaining: i64,
    /// How much needs to be saved per month to reach the target in time,
    /// rounded to two decimal places. Zero once the target date has passed.
    pub monthly_required: f64,
}

impl GoalReport {
    /// Derive the progress figures for `goal` as of `today`.
    pub fn new(goal: Goal, today: NaiveDate) -> Self {
        let days_remaining = (goal.target_date - today).num_days();
        let progress = ((goal.current_amount / goal.target_amount) * 100.0).round() as u32;

        let monthly_required = if days_remaining > 0 {
            let per_month =
                (goal.target_amount - goal.current_amount) / (days_remaining as f64 / 30.0);
            (per_month * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            goal,
            progress,
            days_remaining: days_remaining.max(0),
            monthly_required,
        }
    }
}


#[cfg(test)]
mod goal_report_tests {
    use chrono::{NaiveDate, Utc};

    use crate::models::UserID;

    use super::{Goal, GoalPriority, GoalReport, GoalStatus};

    fn goal_with_target_date(target_date: NaiveDate) -> Goal {
        Goal {
            id: 1,
            user_id: UserID::new(1),
            title: "Emergency fund".to_owned(),
            description: String::new(),
            target_amount: 1000.0,
            current_amount: 400.0,
            category: "Savings".to_owned(),
            target_date,
            priority: GoalPriority::Medium,
            status: GoalStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn report_computes_progress_and_required_saving() {
        let report = GoalReport::new(goal_with_target_date(date(2025, 8, 30)), date(2025, 7, 1));

        assert_eq!(report.progress, 40);
        assert_eq!(report.days_remaining, 60);
        // 600 remaining over two months.
        assert_eq!(report.monthly_required, 300.0);
    }

    #[test]
    fn report_rounds_required_saving_to_cents() {
        let report = GoalReport::new(goal_with_target_date(date(2025, 7, 8)), date(2025, 7, 1));

        // 600 remaining over 7 days: 600 / (7 / 30) = 2571.428...
        assert_eq!(report.monthly_required, 2571.43);
    }

    #[test]
    fn report_clamps_days_remaining_for_past_target() {
        let report = GoalReport::new(goal_with_target_date(date(2025, 6, 1)), date(2025, 7, 1));

        assert_eq!(report.days_remaining, 0);
        assert_eq!(report.monthly_required, 0.0);
    }

    #[test]
    fn report_on_target_day_requires_nothing_more() {
        let report = GoalReport::new(goal_with_target_date(date(2025, 7, 1)), date(2025, 7, 1));

        assert_eq!(report.days_remaining, 0);
        assert_eq!(report.monthly_required, 0.0);
    }

    #[test]
    fn report_serialises_goal_fields_inline() {
        let value = serde_json::to_value(GoalReport::new(
            goal_with_target_date(date(2025, 8, 30)),
            date(2025, 7, 1),
        ))
        .unwrap();

        assert_eq!(value["title"], "Emergency fund");
        assert_eq!(value["progress"], 40);
        assert_eq!(value["daysRemaining"], 60);
    }
}
