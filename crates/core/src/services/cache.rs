use chrono::NaiveDate;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::chart::{ChartRow, InvestmentChart, SeriesSet};
use crate::models::investment::InvestmentEvent;
use crate::models::selection::Selection;
use crate::services::chart_service::ChartService;
use crate::services::series_service::SeriesBuilder;

/// Hit/miss counters, mostly for tests and debug output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub series_hits: u64,
    pub series_misses: u64,
    pub rows_hits: u64,
    pub rows_misses: u64,
}

struct CachedSeries {
    fingerprint: u64,
    now: NaiveDate,
    set: Arc<SeriesSet>,
}

struct CachedRows {
    generation: u64,
    selection: Selection,
    rows: Arc<Vec<ChartRow>>,
}

/// Memoizes the two pipeline stages for one event list.
///
/// - The `SeriesSet` is rebuilt only when the events' content fingerprint
///   or "now" changes.
/// - Rows are recombined only when the series were rebuilt or the
///   selection changed.
///
/// Results are handed out as `Arc`s, so repeated renders share one copy.
pub struct ChartCache {
    builder: SeriesBuilder,
    combiner: ChartService,
    series: Option<CachedSeries>,
    rows: Option<CachedRows>,
    /// Bumped on every series rebuild; rows remember which one they came from
    generation: u64,
    stats: CacheStats,
}

impl ChartCache {
    pub fn new(builder: SeriesBuilder) -> Self {
        Self {
            builder,
            combiner: ChartService::new(),
            series: None,
            rows: None,
            generation: 0,
            stats: CacheStats::default(),
        }
    }

    /// Series for `events` as of `now`, rebuilt only if either changed.
    pub fn series(
        &mut self,
        events: &[InvestmentEvent],
        now: NaiveDate,
    ) -> Result<Arc<SeriesSet>, CoreError> {
        let fingerprint = fingerprint(events);
        if let Some(cached) = &self.series {
            if cached.fingerprint == fingerprint && cached.now == now {
                self.stats.series_hits += 1;
                debug!(fingerprint, "series cache hit");
                return Ok(Arc::clone(&cached.set));
            }
        }

        self.stats.series_misses += 1;
        debug!(fingerprint, %now, "series cache miss");
        let set = Arc::new(self.builder.build(events, now)?);
        self.generation += 1;
        self.series = Some(CachedSeries {
            fingerprint,
            now,
            set: Arc::clone(&set),
        });
        Ok(set)
    }

    /// Chart rows for `events` under `selection`.
    pub fn rows(
        &mut self,
        events: &[InvestmentEvent],
        now: NaiveDate,
        selection: &Selection,
    ) -> Result<Arc<Vec<ChartRow>>, CoreError> {
        self.series_and_rows(events, now, selection)
            .map(|(_, rows)| rows)
    }

    /// Renderer payload for `firm`: one series lookup, rows shared with the cache.
    pub fn chart(
        &mut self,
        firm: &str,
        events: &[InvestmentEvent],
        now: NaiveDate,
        selection: &Selection,
    ) -> Result<InvestmentChart, CoreError> {
        let (set, rows) = self.series_and_rows(events, now, selection)?;
        Ok(InvestmentChart {
            firm: firm.to_string(),
            projects: set.projects.clone(),
            selection: selection.clone(),
            rows,
        })
    }

    fn series_and_rows(
        &mut self,
        events: &[InvestmentEvent],
        now: NaiveDate,
        selection: &Selection,
    ) -> Result<(Arc<SeriesSet>, Arc<Vec<ChartRow>>), CoreError> {
        let set = self.series(events, now)?;

        if let Some(cached) = &self.rows {
            if cached.generation == self.generation && &cached.selection == selection {
                self.stats.rows_hits += 1;
                return Ok((set, Arc::clone(&cached.rows)));
            }
        }

        self.stats.rows_misses += 1;
        let rows = Arc::new(self.combiner.combine(selection, &set));
        self.rows = Some(CachedRows {
            generation: self.generation,
            selection: selection.clone(),
            rows: Arc::clone(&rows),
        });
        Ok((set, rows))
    }

    /// Drop everything cached; the next call recomputes.
    pub fn invalidate(&mut self) {
        self.series = None;
        self.rows = None;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for ChartCache {
    fn default() -> Self {
        Self::new(SeriesBuilder::default())
    }
}

/// Content hash of an event list (order-sensitive).
pub fn fingerprint(events: &[InvestmentEvent]) -> u64 {
    let mut hasher = DefaultHasher::new();
    events.len().hash(&mut hasher);
    for event in events {
        event.date.hash(&mut hasher);
        event.amount.to_bits().hash(&mut hasher);
        event.round.hash(&mut hasher);
        event.project.hash(&mut hasher);
    }
    hasher.finish()
}
