use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::chart::{ChartRow, InvestmentChart, ProjectSeries, SeriesSet};
use crate::models::selection::Selection;

/// Merges per-project series into chart rows.
///
/// The core computes all the numbers; the frontend only renders.
/// Rows cover only the dates where at least one active project has a
/// point, so the chart never implies data before a project existed.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Combine the series of every project active under `selection`.
    ///
    /// - empty `set` → no rows, whatever the selection
    /// - `Subset` with no names → one date-only row per grid date
    /// - names absent from `set` contribute nothing
    pub fn combine(&self, selection: &Selection, set: &SeriesSet) -> Vec<ChartRow> {
        if set.is_empty() {
            return Vec::new();
        }
        match selection {
            Selection::All => self.combine_projects(set.projects.iter().map(String::as_str), set),
            Selection::Subset(names) if names.is_empty() => {
                set.grid.iter().map(|date| ChartRow::new(*date)).collect()
            }
            Selection::Subset(names) => self.combine_projects(names.iter().map(String::as_str), set),
        }
    }

    /// Combine an explicit list of project names.
    ///
    /// One row per date in the union of the named series, ascending; each
    /// row carries a value only for projects that have a point on that date.
    pub fn combine_projects<'a>(
        &self,
        active: impl IntoIterator<Item = &'a str>,
        set: &SeriesSet,
    ) -> Vec<ChartRow> {
        let active: Vec<&ProjectSeries> = active
            .into_iter()
            .filter_map(|project| set.get(project))
            .collect();

        let dates: BTreeSet<NaiveDate> = active.iter().flat_map(|s| s.dates()).collect();

        dates
            .into_iter()
            .map(|date| {
                let mut row = ChartRow::new(date);
                for series in &active {
                    if let Some(value) = series.value_at(date) {
                        row.values.insert(series.project.clone(), value);
                    }
                }
                row
            })
            .collect()
    }

    /// Package rows with the project list and selection for the renderer.
    pub fn chart(&self, firm: &str, selection: &Selection, set: &SeriesSet) -> InvestmentChart {
        InvestmentChart {
            firm: firm.to_string(),
            projects: set.projects.clone(),
            selection: selection.clone(),
            rows: Arc::new(self.combine(selection, set)),
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
