use crate::calendar::{attempt_counts, practice_days, start_of_day, streaks};
use crate::models::{
    Aggregate, AnalyticsResponse, Attempt, DailyRate, DisciplineRanking, RankedRoutine, Routine,
    RoutineDetail, RoutineSummary,
};
use crate::registry::Registry;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub const RECENT_ATTEMPTS: usize = 20;

/// Whole-number success percentage. Zero attempts yields 0.
pub fn rate(successes: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (successes as f64 * 100.0 / total as f64).round() as u8
}

pub fn accuracy<'a>(attempts: impl IntoIterator<Item = &'a Attempt>) -> u8 {
    let (successes, total) = attempts
        .into_iter()
        .fold((0usize, 0usize), |(s, t), a| (s + usize::from(a.is_success()), t + 1));
    rate(successes, total)
}

pub fn aggregate<'a>(routines: impl IntoIterator<Item = &'a Routine>) -> Aggregate {
    let mut total_attempts = 0usize;
    let mut total_successes = 0usize;
    for routine in routines {
        total_attempts += routine.attempts.len();
        total_successes += routine.successes();
    }

    Aggregate {
        total_attempts,
        total_successes,
        total_misses: total_attempts - total_successes,
        overall_rate: rate(total_successes, total_attempts),
    }
}

/// Highest accuracy first. Ties keep their input order.
pub fn rank<'a>(routines: impl IntoIterator<Item = &'a Routine>) -> Vec<&'a Routine> {
    let mut sorted: Vec<&Routine> = routines.into_iter().collect();
    sorted.sort_by_key(|routine| Reverse(accuracy(&routine.attempts)));
    sorted
}

pub fn ranked<'a>(routines: impl IntoIterator<Item = &'a Routine>) -> Vec<RankedRoutine> {
    rank(routines)
        .into_iter()
        .enumerate()
        .map(|(index, routine)| RankedRoutine {
            rank: index + 1,
            id: routine.id,
            name: routine.name.clone(),
            accuracy: accuracy(&routine.attempts),
            attempts: routine.attempts.len(),
        })
        .collect()
}

pub fn rankings_by_discipline(registry: &Registry) -> Vec<DisciplineRanking> {
    registry
        .by_discipline()
        .into_iter()
        .map(|(discipline, routines)| DisciplineRanking {
            discipline: discipline.to_string(),
            routines: ranked(routines),
        })
        .collect()
}

/// Per-day accuracy in ascending day order. Days without attempts are skipped.
pub fn daily_series<'a, Tz: TimeZone>(
    attempts: impl IntoIterator<Item = &'a Attempt>,
    tz: &Tz,
) -> Vec<DailyRate> {
    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for attempt in attempts {
        let entry = days.entry(start_of_day(&attempt.timestamp, tz)).or_default();
        entry.0 += 1;
        if attempt.is_success() {
            entry.1 += 1;
        }
    }

    days.into_iter()
        .map(|(day, (attempts, successes))| DailyRate {
            day,
            attempts,
            successes,
            rate: rate(successes, attempts),
        })
        .collect()
}

/// Newest first, by timestamp. Equal timestamps list the later-logged one first.
pub fn recent_attempts(routine: &Routine, limit: usize) -> Vec<Attempt> {
    let mut recent: Vec<&Attempt> = routine.attempts.iter().rev().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.into_iter().take(limit).cloned().collect()
}

pub fn summarize(routine: &Routine) -> RoutineSummary {
    let successes = routine.successes();
    RoutineSummary {
        id: routine.id,
        name: routine.name.clone(),
        discipline: routine.discipline.clone(),
        attempts: routine.attempts.len(),
        successes,
        misses: routine.attempts.len() - successes,
        accuracy: rate(successes, routine.attempts.len()),
    }
}

pub fn routine_detail<Tz: TimeZone>(routine: &Routine, tz: &Tz) -> RoutineDetail {
    RoutineDetail {
        summary: summarize(routine),
        daily_series: daily_series(&routine.attempts, tz),
        recent_attempts: recent_attempts(routine, RECENT_ATTEMPTS),
    }
}

pub fn build_analytics(registry: &Registry) -> AnalyticsResponse {
    build_analytics_at(Utc::now(), &Local, registry)
}

pub fn build_analytics_at<Tz: TimeZone>(
    now: DateTime<Utc>,
    tz: &Tz,
    registry: &Registry,
) -> AnalyticsResponse {
    let today = start_of_day(&now, tz);
    let days = practice_days(registry.all_attempts(), tz);

    AnalyticsResponse {
        overall: aggregate(registry.routines()),
        streaks: streaks(&days, today),
        practice_days: days.len(),
        rankings: rankings_by_discipline(registry),
    }
}

pub fn daily_counts<Tz: TimeZone>(registry: &Registry, tz: &Tz) -> BTreeMap<NaiveDate, usize> {
    attempt_counts(registry.all_attempts(), tz)
}
