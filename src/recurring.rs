//! Materialises new occurrences of recurring income and expenses.
//!
//! A record whose recurring frequency is set acts as a template. On each
//! processing run, every template is projected forward from its anchor: the
//! most recent *other* record with the same owner and label (category for
//! expenses, source for income). If advancing the anchor by one period lands
//! on or before today, exactly one new occurrence is created for that date.
//!
//! A template with no anchor is skipped, so recurrence only starts once a
//! first occurrence has actually been recorded. Multiple elapsed periods are
//! not backfilled: each run creates at most one occurrence per template, and
//! later runs catch up one period at a time. Once a template is up to date, a
//! run creates nothing, so processing is safe to repeat.

use std::time::Duration;

use chrono::{NaiveDate, Utc};

use crate::{
    Error,
    models::{DatabaseID, Expense, Frequency, Income, UserID},
};

/// A transaction record that can act as a recurring template.
pub trait RecurringTemplate {
    /// The template's ID in the application database.
    fn id(&self) -> DatabaseID;

    /// The user that owns the template.
    fn user_id(&self) -> UserID;

    /// The label occurrences are grouped by when deriving the anchor.
    fn label(&self) -> &str;

    /// How often the template repeats.
    fn frequency(&self) -> Frequency;
}

impl RecurringTemplate for Expense {
    fn id(&self) -> DatabaseID {
        self.id
    }

    fn user_id(&self) -> UserID {
        self.user_id
    }

    fn label(&self) -> &str {
        &self.category
    }

    fn frequency(&self) -> Frequency {
        self.recurring_frequency.unwrap_or(Frequency::Monthly)
    }
}

impl RecurringTemplate for Income {
    fn id(&self) -> DatabaseID {
        self.id
    }

    fn user_id(&self) -> UserID {
        self.user_id
    }

    fn label(&self) -> &str {
        &self.source
    }

    fn frequency(&self) -> Frequency {
        self.recurring_frequency.unwrap_or(Frequency::Monthly)
    }
}

/// The store operations the processor needs to project templates forward.
pub trait RecurringStore {
    /// The record type this store materialises occurrences for.
    type Template: RecurringTemplate;

    /// All templates flagged as recurring, across every user.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if the query fails.
    fn recurring_templates(&self) -> Result<Vec<Self::Template>, Error>;

    /// The date of the most recent record with the template's owner and
    /// label, excluding the template itself. Ties on the date are broken by
    /// the highest id.
    ///
    /// Returns `None` when no other record exists.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if the query fails.
    fn anchor_date(&self, template: &Self::Template) -> Result<Option<NaiveDate>, Error>;

    /// Insert a new occurrence cloned from `template`, dated `date`.
    ///
    /// The clone carries the template's recurring frequency, so it can serve
    /// as the anchor for later runs.
    ///
    /// # Errors
    ///
    /// Returns an [Error::SqlError] if the insert fails.
    fn create_occurrence(
        &mut self,
        template: &Self::Template,
        date: NaiveDate,
    ) -> Result<(), Error>;
}

/// The outcome of one processing pass over one store's templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// How many occurrences were created.
    pub created: usize,
    /// How many templates failed and were skipped.
    pub failed: usize,
}

/// Process every recurring template in `store`, creating at most one new
/// occurrence per template.
///
/// A template that fails is logged and skipped, never aborting the rest of
/// the run.
pub fn process_templates<S>(store: &mut S, today: NaiveDate) -> ProcessingSummary
where
    S: RecurringStore,
{
    let templates = match store.recurring_templates() {
        Ok(templates) => templates,
        Err(error) => {
            tracing::error!("could not load recurring templates: {error}");
            return ProcessingSummary::default();
        }
    };

    let mut summary = ProcessingSummary::default();

    for template in &templates {
        match process_template(store, template, today) {
            Ok(true) => summary.created += 1,
            Ok(false) => {}
            Err(error) => {
                summary.failed += 1;
                tracing::error!(
                    "could not process recurring template {} for user {}: {error}",
                    template.id(),
                    template.user_id()
                );
            }
        }
    }

    summary
}

/// Decide whether `template` is due and create its next occurrence if so.
///
/// Returns whether an occurrence was created.
fn process_template<S>(
    store: &mut S,
    template: &S::Template,
    today: NaiveDate,
) -> Result<bool, Error>
where
    S: RecurringStore,
{
    let Some(anchor) = store.anchor_date(template)? else {
        return Ok(false);
    };

    let next_date = template.frequency().advance(anchor);

    if next_date > today {
        return Ok(false);
    }

    store.create_occurrence(template, next_date)?;

    Ok(true)
}

/// Run one processing pass: income templates first, then expense templates.
pub fn run_recurring_processing<I, E>(
    income_store: &mut I,
    expense_store: &mut E,
    today: NaiveDate,
) -> (ProcessingSummary, ProcessingSummary)
where
    I: RecurringStore,
    E: RecurringStore,
{
    (
        process_templates(income_store, today),
        process_templates(expense_store, today),
    )
}

/// Run recurring processing immediately and then once per `period`.
///
/// This function never returns; spawn it as a background tokio task. Each
/// pass runs to completion before the next tick is awaited, so passes never
/// overlap. "Today" is re-read from the UTC clock at the start of each pass.
pub async fn recurring_worker<I, E>(mut income_store: I, mut expense_store: E, period: Duration)
where
    I: RecurringStore,
    E: RecurringStore,
{
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        let today = Utc::now().date_naive();
        let (income, expenses) =
            run_recurring_processing(&mut income_store, &mut expense_store, today);

        tracing::info!(
            "recurring processing complete: {} income and {} expense occurrences created, {} failures",
            income.created,
            expenses.created,
            income.failed + expenses.failed
        );
    }
}
