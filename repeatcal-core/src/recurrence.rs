//! Expansion of a recurring seed into its concrete occurrences.
//!
//! Day-based rules step by a fixed number of days. Month- and year-based
//! rules keep the seed's day (and month) and skip periods where it does not
//! exist instead of clamping, so a seed on the 31st never lands on the 30th.

use chrono::{Datelike, Days, NaiveDate};

use crate::calendar_math::days_in_month;
use crate::event::{EventSeed, RepeatKind};

/// Expand `seed` into every occurrence up to its rule's end date (inclusive).
///
/// Returns nothing for non-repeating seeds and for rules without an end date.
pub fn generate(seed: &EventSeed) -> Vec<EventSeed> {
    let Some(recurrence) = seed.repeat.recurrence() else {
        return Vec::new();
    };
    let Some(end) = recurrence.end_date else {
        return Vec::new();
    };
    let interval = recurrence.interval.get();

    match seed.repeat.kind() {
        RepeatKind::None => Vec::new(),
        RepeatKind::Daily => daily(seed, seed.date, end, interval),
        RepeatKind::Weekly => weekly(seed, seed.date, end, interval),
        RepeatKind::Monthly => monthly(seed, seed.date, end, interval),
        RepeatKind::Yearly => yearly(seed, seed.date, end, interval),
    }
}

/// Every `interval` days from `start` through `end`.
pub fn daily(seed: &EventSeed, start: NaiveDate, end: NaiveDate, interval: u32) -> Vec<EventSeed> {
    step_days(seed, start, end, u64::from(interval))
}

/// Every `interval` weeks from `start` through `end`, on `start`'s weekday.
pub fn weekly(seed: &EventSeed, start: NaiveDate, end: NaiveDate, interval: u32) -> Vec<EventSeed> {
    step_days(seed, start, end, u64::from(interval) * 7)
}

fn step_days(seed: &EventSeed, start: NaiveDate, end: NaiveDate, step: u64) -> Vec<EventSeed> {
    let mut events = Vec::new();
    let mut current = Some(start);

    while let Some(date) = current.filter(|d| *d <= end) {
        events.push(seed.on(date));
        current = date.checked_add_days(Days::new(step));
    }

    events
}

/// Every `interval` months from `start` through `end`, on `start`'s day of month.
///
/// Months without that day are skipped. A Feb 29 start only ever lands in February.
pub fn monthly(seed: &EventSeed, start: NaiveDate, end: NaiveDate, interval: u32) -> Vec<EventSeed> {
    let target_day = start.day();
    let leap_day = start.month() == 2 && target_day == 29;
    let base = i64::from(start.year()) * 12 + i64::from(start.month0());
    let mut events = Vec::new();

    for step in 0.. {
        let Some((year, month)) = month_at(base + step * i64::from(interval)) else {
            break;
        };
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            break;
        };
        if first > end {
            break;
        }

        if leap_day && month != 2 {
            continue;
        }
        if target_day > days_in_month(year, month) {
            continue;
        }

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, target_day).filter(|d| *d <= end) {
            events.push(seed.on(date));
        }
    }

    events
}

/// Every `interval` years from `start` through `end`, on `start`'s month and day.
///
/// Years where that day does not exist (Feb 29 outside leap years) are skipped.
pub fn yearly(seed: &EventSeed, start: NaiveDate, end: NaiveDate, interval: u32) -> Vec<EventSeed> {
    let (target_month, target_day) = (start.month(), start.day());
    let mut events = Vec::new();

    for step in 0.. {
        let Some(year) = i32::try_from(i64::from(start.year()) + step * i64::from(interval)).ok()
        else {
            break;
        };
        let Some(new_year) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            break;
        };
        if new_year > end {
            break;
        }

        if target_day > days_in_month(year, target_month) {
            continue;
        }

        if let Some(date) =
            NaiveDate::from_ymd_opt(year, target_month, target_day).filter(|d| *d <= end)
        {
            events.push(seed.on(date));
        }
    }

    events
}

/// Split an absolute month index (`year * 12 + month0`) into year and 1-based month.
fn month_at(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}
