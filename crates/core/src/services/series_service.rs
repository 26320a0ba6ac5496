use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::chart::{ProjectSeries, SeriesPoint, SeriesSet};
use crate::models::investment::{self, InvestmentEvent, RawInvestment};
use crate::services::date_grid::monthly_grid;

/// Mean Gregorian month length in days (365.2425 / 12).
pub const AVG_DAYS_PER_MONTH: f64 = 30.436_875;

/// Illustrative post-investment growth curve.
///
/// The monthly rate is a deterministic function of the sample date:
/// `base_monthly_rate + variation * max(0, sin(days_from_ce(date)))`,
/// so it stays inside `[base, base + variation]` and the same date always
/// yields the same rate. This is a visual aid, not a valuation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthModel {
    /// Guaranteed monthly growth (0.005 = 0.5% per month)
    pub base_monthly_rate: f64,

    /// Extra monthly growth added on "good" dates, at most this much
    pub variation: f64,
}

impl Default for GrowthModel {
    fn default() -> Self {
        Self {
            base_monthly_rate: 0.005,
            variation: 0.0025,
        }
    }
}

impl GrowthModel {
    /// A model with a constant rate (no date-driven variation).
    pub fn flat(monthly_rate: f64) -> Self {
        Self {
            base_monthly_rate: monthly_rate,
            variation: 0.0,
        }
    }

    /// Monthly growth rate used when compounding into `date`.
    pub fn monthly_rate(&self, date: NaiveDate) -> f64 {
        let phase = f64::from(date.num_days_from_ce()).sin();
        self.base_monthly_rate + self.variation * phase.max(0.0)
    }

    /// Grow `value` from `from` to `to`, compounding monthly at the rate of
    /// `to`. Fractional months compound fractionally; a non-positive span
    /// leaves the value untouched.
    pub fn compound(&self, value: f64, from: NaiveDate, to: NaiveDate) -> f64 {
        let days = (to - from).num_days();
        if days <= 0 {
            return value;
        }
        let months = days as f64 / AVG_DAYS_PER_MONTH;
        value * (1.0 + self.monthly_rate(to)).powf(months)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let in_range = |r: f64| r.is_finite() && (0.0..1.0).contains(&r);
        if !in_range(self.base_monthly_rate) {
            return Err(CoreError::ValidationError(format!(
                "base_monthly_rate must be in [0, 1), got {}",
                self.base_monthly_rate
            )));
        }
        if !in_range(self.variation) {
            return Err(CoreError::ValidationError(format!(
                "variation must be in [0, 1), got {}",
                self.variation
            )));
        }
        Ok(())
    }
}

/// Turns a sparse investment list into dense per-project series.
///
/// For each project:
/// 1. Same-day tranches are summed into a single step.
/// 2. Sample dates are the grid dates from the first investment onward,
///    plus the project's own investment dates.
/// 3. Up to and including the last investment the value is the plain
///    running total (no growth between real events).
/// 4. After the last investment each sample compounds the previous one
///    with [`GrowthModel::compound`].
#[derive(Debug, Clone, Default)]
pub struct SeriesBuilder {
    growth: GrowthModel,
}

impl SeriesBuilder {
    pub fn new(growth: GrowthModel) -> Self {
        Self { growth }
    }

    pub fn growth(&self) -> &GrowthModel {
        &self.growth
    }

    /// Build the project list, date grid and every project's series.
    ///
    /// Every event is validated before anything is folded; the first invalid
    /// one aborts the build with `CoreError::DataError`. So does a summed or
    /// grown value that no longer fits in a `u64`. An empty event list is
    /// valid and yields an empty `SeriesSet`.
    pub fn build(&self, events: &[InvestmentEvent], now: NaiveDate) -> Result<SeriesSet, CoreError> {
        for event in events {
            event.validate()?;
        }
        if events.is_empty() {
            return Ok(SeriesSet::default());
        }

        let grid = monthly_grid(events, now);

        let mut tranches: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        for event in events {
            *tranches
                .entry(event.project.as_str())
                .or_default()
                .entry(event.date)
                .or_insert(0.0) += event.amount;
        }

        let series: BTreeMap<String, ProjectSeries> = tranches
            .iter()
            .map(|(project, by_date)| {
                self.project_series(project, by_date, &grid)
                    .map(|series| (project.to_string(), series))
            })
            .collect::<Result<_, _>>()?;
        let projects: Vec<String> = series.keys().cloned().collect();

        debug!(
            events = events.len(),
            projects = projects.len(),
            grid_len = grid.len(),
            "built investment series"
        );

        Ok(SeriesSet {
            projects,
            grid,
            series,
        })
    }

    /// Validate raw records, then [`build`](Self::build).
    pub fn build_from_raw(
        &self,
        raw: Vec<RawInvestment>,
        now: NaiveDate,
    ) -> Result<SeriesSet, CoreError> {
        let events = investment::validate_all(raw)?;
        self.build(&events, now)
    }

    fn project_series(
        &self,
        project: &str,
        by_date: &BTreeMap<NaiveDate, f64>,
        grid: &[NaiveDate],
    ) -> Result<ProjectSeries, CoreError> {
        let (Some(&first), Some(&last)) = (by_date.keys().next(), by_date.keys().next_back())
        else {
            return Ok(ProjectSeries {
                project: project.to_string(),
                points: Vec::new(),
            });
        };

        let samples: BTreeSet<NaiveDate> = grid
            .iter()
            .copied()
            .filter(|date| *date >= first)
            .chain(by_date.keys().copied())
            .collect();

        let mut points = Vec::with_capacity(samples.len());
        let mut value = 0.0;
        let mut prev = first;
        for date in samples {
            if date <= last {
                if let Some(amount) = by_date.get(&date) {
                    value += amount;
                }
            } else {
                value = self.growth.compound(value, prev, date);
            }
            prev = date;
            let units = to_units(value).ok_or_else(|| {
                CoreError::DataError(format!(
                    "value for project '{project}' on {date} does not fit in a u64: {value}"
                ))
            })?;
            points.push(SeriesPoint { date, value: units });
        }

        Ok(ProjectSeries {
            project: project.to_string(),
            points,
        })
    }
}

/// 2^64, the first whole value a `u64` cannot hold.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Round to whole units, clamping at zero. `None` when the value is not
/// finite or too large for a `u64`.
fn to_units(value: f64) -> Option<u64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.max(0.0).round();
    (rounded < U64_LIMIT).then_some(rounded as u64)
}
