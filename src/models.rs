use std::fmt::Display;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Training focus of a program day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Push,
    Pull,
    Legs,
    Full,
    Rest,
}

impl DayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Legs => "legs",
            Self::Full => "full",
            Self::Rest => "rest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Pull => "PULL",
            Self::Legs => "LEGS",
            Self::Full => "FULL BODY",
            Self::Rest => "REST",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        <Self as clap::ValueEnum>::from_str(s.trim(), true).ok()
    }
}

impl Display for DayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One weekly training slot.
/// `id` stays `None` until storage assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDay {
    pub id: Option<String>,
    pub day_of_week: u8,
    pub name: String,
    pub kind: DayKind,
    pub exercises: Vec<ExercisePlan>,
}

impl ProgramDay {
    pub fn is_rest(&self) -> bool {
        self.kind == DayKind::Rest
    }

    pub fn total_target_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.target_sets).sum()
    }

    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }
}

/// A planned exercise within a day. `order` is zero-based and contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub name: String,
    pub target_sets: u32,
    pub target_reps: String,
    #[serde(default)]
    pub note: String,
    pub order: u32,
}

/// A saved training session.
/// Logs are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    pub day_index: Option<u8>,
    pub name: String,
    pub date: DateTime<Local>,
    pub exercise_count: u32,
    pub exercises: Vec<LoggedExercise>,
}

impl WorkoutLog {
    /// First exercise whose name matches case-insensitively.
    pub fn exercise(&self, name: &str) -> Option<&LoggedExercise> {
        self.exercises.iter().find(|e| same_name(&e.name, name))
    }
}

/// Comparison key for exercise names. Folds case over the full Unicode range.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn same_name(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}

/// Payload handed to the repository when a workout is finished.
/// Numbers are already coerced; id and date are assigned on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutLog {
    pub day_index: Option<u8>,
    pub name: String,
    pub exercises: Vec<LoggedExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedExercise {
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub order: u32,
    pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
    pub index: u32,
    pub kg: f64,
    pub reps: u32,
    pub done: bool,
}

pub const MIN_BODY_WEIGHT: f64 = 20.0;
pub const MAX_BODY_WEIGHT: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyWeightEntry {
    pub id: String,
    pub weight: f64,
    pub date: DateTime<Local>,
    #[serde(default)]
    pub note: String,
}

/// Raw set input of an in-progress workout.
/// Fields hold whatever was typed until the workout is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetInput {
    pub kg: String,
    pub reps: String,
    pub done: bool,
}

/// Exercise of an in-progress workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftExercise {
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub target_reps: String,
    pub sets: Vec<SetInput>,
}

pub fn weekday_name(day_of_week: u8) -> &'static str {
    DAY_NAMES.get(day_of_week as usize).copied().unwrap_or("?")
}

/// Accepts `0`..`6` (Monday = 0), full names and three-letter prefixes.
pub fn parse_weekday(s: &str) -> Option<u8> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u8>() {
        return (n < 7).then_some(n);
    }

    let lower = s.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    DAY_NAMES
        .iter()
        .position(|d| d.to_ascii_lowercase().starts_with(&lower))
        .map(|i| i as u8)
}
