//! Serializable view models for each screen, built from already-loaded data.

use chrono::{DateTime, Datelike, Duration, Local};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    error::{CoreError, CoreResult},
    history::HistoryIndex,
    metrics::{
        BestSet, ProgressionRules, SetLike, Suggestion, best_one_rep_max, current_streak,
        format_duration, log_volume, max_weight, suggested_progressive_weight, total_volume,
    },
    models::{BodyWeightEntry, DayKind, LoggedSet, WorkoutLog, name_key, same_name, weekday_name},
    program::Program,
    session::ActiveWorkout,
};

pub const RECENT_LOGS: usize = 8;
pub const RECENT_BODY_WEIGHT_ROWS: usize = 30;
const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    pub id: String,
    pub name: String,
    pub date: DateTime<Local>,
    pub exercise_count: u32,
    pub volume: f64,
}

impl From<&WorkoutLog> for LogSummary {
    fn from(log: &WorkoutLog) -> Self {
        Self {
            id: log.id.clone(),
            name: log.name.clone(),
            date: log.date,
            exercise_count: log.exercise_count,
            volume: log_volume(log),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DayStatus {
    Training {
        name: String,
        kind: DayKind,
        exercise_count: usize,
        total_sets: u32,
    },
    Rest {
        name: String,
    },
    Unplanned,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day_of_week: u8,
    pub weekday: &'static str,
    pub is_today: bool,
    #[serde(flatten)]
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub total_logs: usize,
    pub week_volume: f64,
    pub streak: u32,
    pub month_logs: usize,
    pub days: Vec<DaySummary>,
    pub recent: Vec<LogSummary>,
}

pub fn day_of_week(date: DateTime<Local>) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

pub fn home(program: &Program, logs: &[WorkoutLog], now: DateTime<Local>) -> HomeView {
    let week_start = now - Duration::days(WEEK_DAYS);
    let month_start = now - Duration::days(MONTH_DAYS);
    let today = day_of_week(now);

    let days = (0..7u8)
        .map(|dow| {
            let status = match program.day(dow) {
                Some(day) if day.is_rest() => DayStatus::Rest { name: day.name.clone() },
                Some(day) => DayStatus::Training {
                    name: day.name.clone(),
                    kind: day.kind,
                    exercise_count: day.exercises.len(),
                    total_sets: day.total_target_sets(),
                },
                None => DayStatus::Unplanned,
            };
            DaySummary {
                day_of_week: dow,
                weekday: weekday_name(dow),
                is_today: dow == today,
                status,
            }
        })
        .collect();

    let history = HistoryIndex::new(logs);

    HomeView {
        total_logs: logs.len(),
        week_volume: logs.iter().filter(|l| l.date > week_start).map(log_volume).sum(),
        streak: current_streak(logs, now.date_naive()),
        month_logs: logs.iter().filter(|l| l.date > month_start).count(),
        days,
        recent: history
            .logs()
            .iter()
            .take(RECENT_LOGS)
            .map(|l| LogSummary::from(*l))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideStats {
    pub sets: usize,
    pub max_kg: f64,
    pub volume: f64,
}

impl SideStats {
    fn of(sets: &[LoggedSet]) -> Self {
        Self {
            sets: sets.len(),
            max_kg: max_weight(sets),
            volume: total_volume(sets),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedExercise {
    pub name: String,
    pub a: Option<SideStats>,
    pub b: Option<SideStats>,
    pub max_kg_delta: Option<f64>,
    pub volume_delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub a: LogSummary,
    pub b: LogSummary,
    pub exercises: Vec<ComparedExercise>,
    pub volume_delta: f64,
}

/// Side-by-side comparison of two logs. Deltas are `b - a`.
pub fn comparison(logs: &[WorkoutLog], id_a: &str, id_b: &str) -> CoreResult<ComparisonView> {
    let find = |id: &str| {
        logs.iter()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::validation(format!("select a workout to compare (`{id}` not found)")))
    };
    let a = find(id_a)?;
    let b = find(id_b)?;

    let exercises = a
        .exercises
        .iter()
        .chain(&b.exercises)
        .map(|e| e.name.as_str())
        .unique_by(|name| name_key(name))
        .map(|name| {
            let sa = a.exercise(name).map(|e| SideStats::of(&e.sets));
            let sb = b.exercise(name).map(|e| SideStats::of(&e.sets));
            let (max_kg_delta, volume_delta) = match (sa, sb) {
                (Some(x), Some(y)) => (Some(y.max_kg - x.max_kg), Some(y.volume - x.volume)),
                _ => (None, None),
            };
            ComparedExercise {
                name: name.to_string(),
                a: sa,
                b: sb,
                max_kg_delta,
                volume_delta,
            }
        })
        .collect();

    let a = LogSummary::from(a);
    let b = LogSummary::from(b);
    Ok(ComparisonView {
        volume_delta: b.volume - a.volume,
        a,
        b,
        exercises,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub date: DateTime<Local>,
    pub max_kg: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub exercise: String,
    /// Oldest first.
    pub points: Vec<ProgressPoint>,
    pub best_set: Option<BestSet>,
    pub latest_max_kg: Option<f64>,
    pub all_time_max_kg: f64,
    pub is_personal_record: bool,
}

pub fn progress(history: &HistoryIndex<'_>, exercise: &str) -> ProgressView {
    let occurrences = history.all_occurrences(exercise);

    let points: Vec<ProgressPoint> = occurrences
        .iter()
        .rev()
        .map(|o| ProgressPoint {
            date: o.date,
            max_kg: o.max_kg,
            volume: o.total_volume,
        })
        .collect();

    let all_time_max_kg = points.iter().map(|p| p.max_kg).fold(0.0, f64::max);
    let latest_max_kg = points.last().map(|p| p.max_kg);

    ProgressView {
        exercise: exercise.to_string(),
        best_set: occurrences.first().and_then(|o| best_one_rep_max(o.sets)),
        is_personal_record: points.len() > 1
            && latest_max_kg.is_some_and(|kg| kg >= all_time_max_kg),
        latest_max_kg,
        all_time_max_kg,
        points,
    }
}

/// Keep the selected name while it still exists, otherwise fall back to the first.
pub fn resolve_selection(names: &[String], selected: Option<&str>) -> Option<String> {
    selected
        .and_then(|s| names.iter().find(|n| same_name(n, s)))
        .or_else(|| names.first())
        .cloned()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyWeightRow {
    pub id: String,
    pub date: DateTime<Local>,
    pub weight: f64,
    pub note: String,
    /// Change versus the entry before this one.
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyWeightView {
    pub latest: Option<BodyWeightEntry>,
    pub net_change: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Oldest first.
    pub series: Vec<(DateTime<Local>, f64)>,
    /// Newest first.
    pub recent: Vec<BodyWeightRow>,
}

/// `entries` in any order. Equal timestamps keep their input order, so rows line
/// up with repository positions (`date DESC, rowid DESC`).
pub fn body_weight(entries: &[BodyWeightEntry]) -> BodyWeightView {
    let mut newest: Vec<&BodyWeightEntry> = entries.iter().collect();
    newest.sort_by(|a, b| b.date.cmp(&a.date));

    let weights = || newest.iter().map(|e| e.weight);
    let net_change = match (newest.first(), newest.last()) {
        (Some(last), Some(first)) if newest.len() > 1 => Some(last.weight - first.weight),
        _ => None,
    };

    let recent = newest
        .iter()
        .enumerate()
        .take(RECENT_BODY_WEIGHT_ROWS)
        .map(|(i, e)| BodyWeightRow {
            id: e.id.clone(),
            date: e.date,
            weight: e.weight,
            note: e.note.clone(),
            change: newest.get(i + 1).map(|prev| e.weight - prev.weight),
        })
        .collect();

    BodyWeightView {
        latest: newest.first().map(|e| (*e).clone()),
        net_change,
        min: weights().reduce(f64::min),
        max: weights().reduce(f64::max),
        series: newest.iter().rev().map(|e| (e.date, e.weight)).collect(),
        recent,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetRow {
    pub kg: String,
    pub reps: String,
    pub done: bool,
    /// Same set index in the last session of this exercise.
    pub previous: Option<LoggedSet>,
    pub volume_delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRow {
    pub name: String,
    pub note: String,
    pub target_reps: String,
    pub all_done: bool,
    pub sets: Vec<SetRow>,
    pub suggestion: Option<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveWorkoutView {
    pub name: String,
    pub day_index: Option<u8>,
    pub started_at: DateTime<Local>,
    pub elapsed: String,
    pub done_sets: usize,
    pub total_sets: usize,
    pub exercises: Vec<ExerciseRow>,
}

pub fn active_workout(
    workout: &ActiveWorkout,
    history: &HistoryIndex<'_>,
    rules: &ProgressionRules,
    now: DateTime<Local>,
) -> ActiveWorkoutView {
    let exercises = workout
        .exercises
        .iter()
        .map(|ex| {
            let last = history.most_recent_occurrence(&ex.name);
            let sets = ex
                .sets
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let previous = last.and_then(|l| l.sets.get(i)).copied();
                    let entered = !s.kg.trim().is_empty() && !s.reps.trim().is_empty();
                    SetRow {
                        kg: s.kg.clone(),
                        reps: s.reps.clone(),
                        done: s.done,
                        volume_delta: previous
                            .filter(|_| entered)
                            .map(|p| s.volume() - p.volume()),
                        previous,
                    }
                })
                .collect();

            ExerciseRow {
                name: ex.name.clone(),
                note: ex.note.clone(),
                target_reps: ex.target_reps.clone(),
                all_done: !ex.sets.is_empty() && ex.sets.iter().all(|s| s.done),
                sets,
                suggestion: suggested_progressive_weight(history, &ex.name, rules),
            }
        })
        .collect();

    ActiveWorkoutView {
        name: workout.name.clone(),
        day_index: workout.day_index,
        started_at: workout.started_at,
        elapsed: format_duration(now - workout.started_at),
        done_sets: workout.done_sets(),
        total_sets: workout.total_sets(),
        exercises,
    }
}
