use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::selection::Selection;

/// Key of the date column in a serialized [`ChartRow`]. Project values share
/// the row object, so no project may use this name.
pub const DATE_KEY: &str = "date";

/// One sample of a project's synthesized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,

    /// Cumulative invested capital plus simulated growth, rounded to whole USD
    pub value: u64,
}

/// Dense, date-ordered series for a single project.
///
/// Starts at the project's first investment: a project never has a point
/// before it received money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSeries {
    pub project: String,
    pub points: Vec<SeriesPoint>,
}

impl ProjectSeries {
    /// Value on an exact date, if the series has a point there. O(log n).
    pub fn value_at(&self, date: NaiveDate) -> Option<u64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }
}

/// Everything the series builder derives from one event list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSet {
    /// Distinct project names, sorted
    pub projects: Vec<String>,

    /// Canonical monthly sample dates, first investment to "now"
    pub grid: Vec<NaiveDate>,

    /// Per-project series, keyed by project name
    pub series: BTreeMap<String, ProjectSeries>,
}

impl SeriesSet {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, project: &str) -> Option<&ProjectSeries> {
        self.series.get(project)
    }
}

/// One row of multi-line chart data.
///
/// Serializes flat, the shape line-chart widgets expect:
/// `{"date": "2023-01-15", "Alpha": 1500000, "Beta": 2000000}`.
/// A project with no point on `date` has no key at all; that means
/// "no data", which is not the same as an explicit zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    pub date: NaiveDate,

    #[serde(flatten)]
    pub values: BTreeMap<String, u64>,
}

impl ChartRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, project: &str) -> Option<u64> {
        self.values.get(project).copied()
    }
}

/// Chart payload for one firm, handed to the renderer as-is.
///
/// The renderer owns colors, legends, tooltips and axis formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentChart {
    pub firm: String,

    /// All distinct projects of the firm (for the legend / selector)
    pub projects: Vec<String>,

    /// Which projects the rows were built for
    pub selection: Selection,

    /// Shared with the chart cache; repeated renders do not copy the rows
    pub rows: Arc<Vec<ChartRow>>,
}

impl InvestmentChart {
    /// Nothing to draw: the firm has no investments, or the selection matched none.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
