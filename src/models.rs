use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_DISCIPLINE: &str = "Nunchucks";

/// Result of a single attempt. Persisted as a plain boolean (`true` = success).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Outcome {
    Success,
    Miss,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" => Some(Outcome::Success),
            "miss" => Some(Outcome::Miss),
            _ => None,
        }
    }
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        if value { Outcome::Success } else { Outcome::Miss }
    }
}

impl From<Outcome> for bool {
    fn from(value: Outcome) -> Self {
        value.is_success()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
}

impl Attempt {
    pub fn at(timestamp: DateTime<Utc>, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub name: String,
    pub discipline: String,
    pub attempts: Vec<Attempt>,
}

impl Routine {
    pub fn new(name: impl Into<String>, discipline: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            discipline: discipline.into(),
            attempts: Vec::new(),
        }
    }

    pub fn add_attempt(&mut self, attempt: Attempt) {
        self.attempts.push(attempt);
    }

    pub fn successes(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_success()).count()
    }

    pub fn misses(&self) -> usize {
        self.attempts.len() - self.successes()
    }
}

#[derive(Debug, Deserialize)]
pub struct NewRoutineRequest {
    pub name: String,
    #[serde(default)]
    pub discipline: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogAttemptRequest {
    pub outcome: String,
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub weeks: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`
    pub month: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineSummary {
    pub id: Uuid,
    pub name: String,
    pub discipline: String,
    pub attempts: usize,
    pub successes: usize,
    pub misses: usize,
    pub accuracy: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisciplineGroup {
    pub discipline: String,
    pub routines: Vec<RoutineSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRate {
    pub day: NaiveDate,
    pub attempts: usize,
    pub successes: usize,
    pub rate: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoutineDetail {
    #[serde(flatten)]
    pub summary: RoutineSummary,
    pub daily_series: Vec<DailyRate>,
    pub recent_attempts: Vec<Attempt>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub total_attempts: usize,
    pub total_successes: usize,
    pub total_misses: usize,
    pub overall_rate: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRoutine {
    pub rank: usize,
    pub id: Uuid,
    pub name: String,
    pub accuracy: u8,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineRanking {
    pub discipline: String,
    pub routines: Vec<RankedRoutine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub overall: Aggregate,
    pub streaks: Streaks,
    pub practice_days: usize,
    pub rankings: Vec<DisciplineRanking>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatCell {
    pub date: NaiveDate,
    pub attempts: usize,
    pub level: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Heatmap {
    pub reference: NaiveDate,
    /// One row per week, Sunday first. `None` cells fall outside the window.
    pub weeks: Vec<[Option<HeatCell>; 7]>,
    pub practice_days: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub practiced: bool,
    pub is_today: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: String,
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
    pub practiced_days: usize,
}
