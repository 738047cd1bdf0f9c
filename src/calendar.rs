use crate::models::{Attempt, CalendarDay, CalendarMonth, Streaks};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

pub fn start_of_day<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

pub fn practice_days<'a, Tz: TimeZone>(
    attempts: impl IntoIterator<Item = &'a Attempt>,
    tz: &Tz,
) -> BTreeSet<NaiveDate> {
    attempts
        .into_iter()
        .map(|attempt| start_of_day(&attempt.timestamp, tz))
        .collect()
}

pub fn attempt_counts<'a, Tz: TimeZone>(
    attempts: impl IntoIterator<Item = &'a Attempt>,
    tz: &Tz,
) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for attempt in attempts {
        *counts.entry(start_of_day(&attempt.timestamp, tz)).or_insert(0) += 1;
    }
    counts
}

/// Consecutive practice days ending at `today`. Zero when `today` itself has
/// no practice, even if yesterday did.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut check = Some(today);
    while let Some(day) = check {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        check = day.pred_opt();
    }
    streak
}

pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

pub fn streaks(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streaks {
    Streaks {
        current: current_streak(days, today),
        longest: longest_streak(days),
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Sunday-first rows covering the month that contains `anchor`. Cells outside
/// the month are `None`. Only dates inside the month are ever computed, so
/// this holds up at the edges of the representable range.
pub fn month_grid(anchor: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = anchor.with_day(1) else {
        return Vec::new();
    };
    let mut rows: Vec<[Option<NaiveDate>; 7]> = Vec::new();
    let mut next = Some(first);

    while let Some(day) = next.filter(|d| d.month() == first.month()) {
        let column = day.weekday().num_days_from_sunday() as usize;
        if rows.is_empty() || column == 0 {
            rows.push([None; 7]);
        }
        if let Some(row) = rows.last_mut() {
            row[column] = Some(day);
        }
        next = day.succ_opt();
    }
    rows
}

pub fn build_calendar_month(
    anchor: NaiveDate,
    practice: &BTreeSet<NaiveDate>,
    today: NaiveDate,
) -> CalendarMonth {
    let weeks: Vec<[Option<CalendarDay>; 7]> = month_grid(anchor)
        .into_iter()
        .map(|row| {
            row.map(|cell| {
                cell.map(|date| CalendarDay {
                    date,
                    practiced: practice.contains(&date),
                    is_today: date == today,
                })
            })
        })
        .collect();

    let practiced_days = weeks
        .iter()
        .flatten()
        .flatten()
        .filter(|day| day.practiced)
        .count();

    CalendarMonth {
        month: anchor.format("%Y-%m").to_string(),
        weeks,
        practiced_days,
    }
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}
