//! Shareable training report.
//!
//! A [`Report`] is an owned snapshot: once captured it never looks at the
//! registry again, so it can be rendered later without seeing newer state.

use crate::calendar::{practice_days, start_of_day, streaks};
use crate::models::{Aggregate, DisciplineRanking, Streaks};
use crate::registry::Registry;
use crate::stats::{aggregate, rankings_by_discipline};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Write;

pub const TOP_PER_DISCIPLINE: usize = 3;
pub const FOOTER: &str = "Generated by Martial Arts Tracker";

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub date: NaiveDate,
    pub overall: Aggregate,
    pub streaks: Streaks,
    pub top_routines: Vec<DisciplineRanking>,
}

impl Report {
    pub fn capture<Tz: TimeZone>(registry: &Registry, now: DateTime<Utc>, tz: &Tz) -> Self {
        let today = start_of_day(&now, tz);
        let days = practice_days(registry.all_attempts(), tz);

        let top_routines = rankings_by_discipline(registry)
            .into_iter()
            .map(|mut group| {
                group.routines.truncate(TOP_PER_DISCIPLINE);
                group
            })
            .collect();

        Self {
            date: today,
            overall: aggregate(registry.routines()),
            streaks: streaks(&days, today),
            top_routines,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "MARTIAL ARTS TRAINING REPORT");
        let _ = writeln!(out, "{}", self.date.format("%B %-d, %Y"));
        let _ = writeln!(out);
        let _ = writeln!(out, "OVERALL PERFORMANCE");
        let _ = writeln!(out, "• Success Rate: {}%", self.overall.overall_rate);
        let _ = writeln!(out, "• Total Attempts: {}", self.overall.total_attempts);
        let _ = writeln!(out, "• Successes: {}", self.overall.total_successes);
        let _ = writeln!(out, "• Misses: {}", self.overall.total_misses);
        let _ = writeln!(out);
        let _ = writeln!(out, "PRACTICE STREAKS");
        let _ = writeln!(out, "• Current Streak: {} {}", self.streaks.current, days_label(self.streaks.current));
        let _ = writeln!(out, "• Longest Streak: {} {}", self.streaks.longest, days_label(self.streaks.longest));
        let _ = writeln!(out);
        let _ = writeln!(out, "TOP ROUTINES BY SUCCESS RATE");

        for group in &self.top_routines {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", group.discipline.to_uppercase());
            for routine in &group.routines {
                let _ = writeln!(
                    out,
                    "#{} {} - {}% ({} attempts)",
                    routine.rank, routine.name, routine.accuracy, routine.attempts
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "---");
        out.push_str(FOOTER);
        out
    }
}

fn days_label(count: u32) -> &'static str {
    if count == 1 { "day" } else { "days" }
}
