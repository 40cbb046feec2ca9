//! The income record and the rules for creating and editing income.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, Frequency, UserID},
};

/// The default category assigned to income when the client does not name one.
pub const DEFAULT_INCOME_CATEGORY: &str = "Salary";

/// Money received by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    /// The income's ID in the application database.
    pub id: DatabaseID,
    /// The user that received this income.
    pub user_id: UserID,
    /// Where the money came from, e.g. an employer name.
    pub source: String,
    /// How much was received. Always greater than zero.
    pub amount: f64,
    /// The day the income was received.
    pub date: NaiveDate,
    /// A free-form description.
    pub description: String,
    /// The income category, e.g. "Salary" or "Freelance".
    pub category: String,
    /// How often this income repeats.
    ///
    /// `None` marks a one-off payment. `Some` marks a recurring template that
    /// schedule processing clones forward over time.
    pub recurring_frequency: Option<Frequency>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Income {
    /// Return a copy of this income with `update` applied.
    ///
    /// Fields left as `None` in `update` keep their current value. The repeat
    /// schedule is deliberately not editable: templates are created as such
    /// and removed by deleting them.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the updated fields do not pass the
    /// same checks as [NewIncome::validate].
    pub fn with_update(&self, update: IncomeUpdate) -> Result<Income, Error> {
        let merged = Income {
            source: update.source.unwrap_or_else(|| self.source.clone()),
            amount: update.amount.unwrap_or(self.amount),
            date: update.date.unwrap_or(self.date),
            description: update
                .description
                .unwrap_or_else(|| self.description.clone()),
            category: update.category.unwrap_or_else(|| self.category.clone()),
            ..self.clone()
        };

        merged.check_fields()?;

        Ok(merged)
    }

    fn check_fields(&self) -> Result<(), Error> {
        validate_source_and_amount(&self.source, self.amount)
    }
}

/// The data needed to record new income.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    /// The user that received the income.
    pub user_id: UserID,
    /// Where the money came from.
    pub source: String,
    /// How much was received.
    pub amount: f64,
    /// The day the income was received.
    pub date: NaiveDate,
    /// A free-form description.
    pub description: String,
    /// The income category.
    pub category: String,
    /// The repeat schedule, or `None` for a one-off payment.
    pub recurring_frequency: Option<Frequency>,
}

impl NewIncome {
    /// Check the business rules for an income record.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the amount is not a positive number
    /// or the source is blank.
    pub fn validate(&self) -> Result<(), Error> {
        validate_source_and_amount(&self.source, self.amount)
    }
}

/// A partial update to an income record. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeUpdate {
    /// The new source.
    pub source: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new date.
    pub date: Option<NaiveDate>,
    /// The new description.
    pub description: Option<String>,
    /// The new category.
    pub category: Option<String>,
}

fn validate_source_and_amount(source: &str, amount: f64) -> Result<(), Error> {
    if source.trim().is_empty() {
        return Err(Error::Validation("source must not be empty".to_owned()));
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation(
            "amount must be a number greater than zero".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod income_tests {
    use chrono::{NaiveDate, Utc};

    use crate::{
        Error,
        models::{Frequency, UserID},
    };

    use super::{Income, IncomeUpdate, NewIncome};

    fn new_income(source: &str, amount: f64) -> NewIncome {
        NewIncome {
            user_id: UserID::new(1),
            source: source.to_owned(),
            amount,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            description: String::new(),
            category: "Salary".to_owned(),
            recurring_frequency: None,
        }
    }

    fn income() -> Income {
        let now = Utc::now();

        Income {
            id: 1,
            user_id: UserID::new(1),
            source: "Acme Corp".to_owned(),
            amount: 4200.0,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            description: String::new(),
            category: "Salary".to_owned(),
            recurring_frequency: Some(Frequency::Monthly),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validate_accepts_positive_amount_and_source() {
        assert_eq!(new_income("Acme Corp", 4200.0).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_blank_source() {
        assert!(matches!(
            new_income("   ", 4200.0).validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_non_positive_amount() {
        assert!(matches!(
            new_income("Acme Corp", 0.0).validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn with_update_overwrites_only_given_fields() {
        let original = income();

        let updated = original
            .with_update(IncomeUpdate {
                amount: Some(4500.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.amount, 4500.0);
        assert_eq!(updated.source, original.source);
        assert_eq!(updated.category, original.category);
        assert_eq!(updated.recurring_frequency, Some(Frequency::Monthly));
    }

    #[test]
    fn with_update_rejects_blank_source() {
        let result = income().with_update(IncomeUpdate {
            source: Some(String::new()),
            ..Default::default()
        });

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
