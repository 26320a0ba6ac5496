use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::chart::DATE_KEY;

/// A single funding event: a firm put `amount` into `project` on `date`.
///
/// Construct through [`InvestmentEvent::new`] or from a [`RawInvestment`] so
/// the invariants hold: `amount` is finite and non-negative, `project` is
/// non-empty and not the reserved chart key `"date"`. Several events may
/// share a project and even a date (multiple tranches on one day); the
/// series builder sums those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentEvent {
    /// Day of the investment (no time component)
    pub date: NaiveDate,

    /// Amount invested, in USD
    pub amount: f64,

    /// Funding round label ("Seed", "Series A", ...), free text
    pub round: String,

    /// Portfolio project receiving the investment
    pub project: String,
}

impl InvestmentEvent {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        round: impl Into<String>,
        project: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let event = Self {
            date,
            amount,
            round: round.into(),
            project: project.into(),
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the amount and project invariants.
    ///
    /// Fields are public, so the series builder re-checks every event before
    /// folding it.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.amount.is_finite() {
            return Err(CoreError::DataError(format!(
                "amount for project '{}' on {} is not a finite number",
                self.project, self.date
            )));
        }
        if self.amount < 0.0 {
            return Err(CoreError::DataError(format!(
                "amount for project '{}' on {} is negative: {}",
                self.project, self.date, self.amount
            )));
        }
        if self.project.trim().is_empty() {
            return Err(CoreError::DataError(format!(
                "investment on {} has an empty project name",
                self.date
            )));
        }
        if self.project == DATE_KEY {
            return Err(CoreError::DataError(format!(
                "investment on {}: project name '{DATE_KEY}' is reserved for the chart row date",
                self.date
            )));
        }
        Ok(())
    }
}

/// An investment record as it arrives from outside, before validation.
///
/// `date` is either a plain `YYYY-MM-DD` date or an RFC 3339 timestamp
/// (e.g. `2023-01-15T00:00:00.000Z`); timestamps are reduced to their UTC date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInvestment {
    pub date: String,
    pub amount: f64,
    pub round: String,
    pub project: String,
}

impl RawInvestment {
    pub fn new(
        date: impl Into<String>,
        amount: f64,
        round: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount,
            round: round.into(),
            project: project.into(),
        }
    }
}

impl TryFrom<RawInvestment> for InvestmentEvent {
    type Error = CoreError;

    fn try_from(raw: RawInvestment) -> Result<Self, Self::Error> {
        let date = parse_event_date(&raw.date)?;
        InvestmentEvent::new(date, raw.amount, raw.round, raw.project)
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_event_date(input: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc().date())
        .map_err(|_| CoreError::DataError(format!("unparseable date: '{input}'")))
}

/// Validate a whole batch of raw records. The first bad record aborts the batch.
pub fn validate_all(raw: Vec<RawInvestment>) -> Result<Vec<InvestmentEvent>, CoreError> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, r)| {
            InvestmentEvent::try_from(r).map_err(|e| match e {
                CoreError::DataError(msg) => CoreError::DataError(format!("record {idx}: {msg}")),
                other => other,
            })
        })
        .collect()
}
