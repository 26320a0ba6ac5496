use chrono::{Months, NaiveDate};

use crate::models::investment::InvestmentEvent;

/// Canonical monthly sample dates for a set of investments.
///
/// Starts at the earliest investment and steps one calendar month at a time
/// (same day-of-month, clipped to the end of shorter months) until the first
/// date that reaches or passes `now`, which is included. Every step is
/// computed from the start date, so a clipped Feb 28 does not drag the
/// following months down to the 28th.
///
/// - no events → empty grid
/// - earliest investment after `now` → just `[start]`
pub fn monthly_grid(events: &[InvestmentEvent], now: NaiveDate) -> Vec<NaiveDate> {
    let Some(start) = events.iter().map(|e| e.date).min() else {
        return Vec::new();
    };
    grid_from(start, now)
}

/// Monthly grid between an explicit start and `now` (see [`monthly_grid`]).
pub fn grid_from(start: NaiveDate, now: NaiveDate) -> Vec<NaiveDate> {
    if start > now {
        return vec![start];
    }

    let mut dates = Vec::new();
    let mut step: u32 = 0;
    loop {
        let Some(date) = start.checked_add_months(Months::new(step)) else {
            break;
        };
        dates.push(date);
        if date >= now {
            break;
        }
        step += 1;
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn start_equal_to_now_is_single_point() {
        assert_eq!(grid_from(d(2024, 3, 1), d(2024, 3, 1)), vec![d(2024, 3, 1)]);
    }

    #[test]
    fn end_of_month_is_anchored_to_start() {
        let grid = grid_from(d(2024, 1, 31), d(2024, 4, 15));
        assert_eq!(
            grid,
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
        );
    }
}
