use crate::calendar::week_start;
use crate::models::{HeatCell, Heatmap};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

pub const DEFAULT_WEEKS_BACK: u32 = 12;
pub const MAX_WEEKS_BACK: u32 = 520;

pub fn intensity(attempts: usize) -> u8 {
    match attempts {
        0 => 0,
        1..=5 => 1,
        6..=15 => 2,
        16..=30 => 3,
        _ => 4,
    }
}

/// Sunday-first weeks ending with the week that contains `reference`.
///
/// The window proper starts `weeks_back - 1` weeks before `reference`; cells
/// before that day or after `reference` are `None` so renderers can tell
/// "outside the window" apart from "no attempts". Unlike a plain
/// Sunday-aligned grid, the first row is therefore usually partly blank:
/// days between its Sunday and the window start are `None`. `weeks_back` is
/// capped at [`MAX_WEEKS_BACK`].
pub fn week_buckets(reference: NaiveDate, weeks_back: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let weeks_back = weeks_back.min(MAX_WEEKS_BACK);
    if weeks_back == 0 {
        return Vec::new();
    }

    let window_start = reference - Duration::weeks(i64::from(weeks_back) - 1);
    let mut weeks = Vec::with_capacity(weeks_back as usize);
    let mut row_start = week_start(window_start);

    while row_start <= reference {
        let mut row = [None; 7];
        for (offset, cell) in row.iter_mut().enumerate() {
            let day = row_start + Duration::days(offset as i64);
            if day >= window_start && day <= reference {
                *cell = Some(day);
            }
        }
        weeks.push(row);
        row_start += Duration::weeks(1);
    }
    weeks
}

pub fn build_heatmap(
    counts: &BTreeMap<NaiveDate, usize>,
    reference: NaiveDate,
    weeks_back: u32,
) -> Heatmap {
    let weeks = week_buckets(reference, weeks_back)
        .into_iter()
        .map(|row| {
            row.map(|cell| {
                cell.map(|date| {
                    let attempts = counts.get(&date).copied().unwrap_or(0);
                    HeatCell {
                        date,
                        attempts,
                        level: intensity(attempts),
                    }
                })
            })
        })
        .collect();

    Heatmap {
        reference,
        weeks,
        practice_days: counts.values().filter(|&&count| count > 0).count(),
    }
}
