//! The repeat schedule shared by recurring income and expense templates.

use std::{fmt::Display, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error returned when parsing text that is not a recognised frequency.
#[derive(Debug, Error, PartialEq)]
#[error("\"{0}\" is not a valid frequency")]
pub struct FrequencyError(pub String);

/// How often a recurring income or expense repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Repeats every day.
    Daily,
    /// Repeats every seven days.
    Weekly,
    /// Repeats every calendar month (variable length).
    Monthly,
    /// Repeats every calendar year.
    Yearly,
}

impl Frequency {
    /// Calculate the date of the occurrence following one that fell on `date`.
    ///
    /// Monthly and yearly steps clamp to the last day of shorter months, so a
    /// schedule anchored on the 31st lands on Feb 28 (Feb 29 in leap years).
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date + Days::new(1),
            Frequency::Weekly => date + Days::new(7),
            Frequency::Monthly => date + Months::new(1),
            Frequency::Yearly => date + Months::new(12),
        }
    }

    /// Parse a frequency read back from storage.
    ///
    /// Unrecognised text maps to [Frequency::Monthly] so that one bad row
    /// cannot wedge schedule processing for everyone else.
    pub fn parse_lenient(text: &str) -> Self {
        Self::from_str(text).unwrap_or_else(|error| {
            tracing::warn!("{error}, falling back to {}", Frequency::Monthly);
            Frequency::Monthly
        })
    }

    /// The canonical text form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = FrequencyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Daily" => Ok(Frequency::Daily),
            "Weekly" => Ok(Frequency::Weekly),
            "Monthly" => Ok(Frequency::Monthly),
            "Yearly" => Ok(Frequency::Yearly),
            other => Err(FrequencyError(other.to_owned())),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
