use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::{
    history::HistoryIndex,
    models::{LoggedSet, SetInput, WorkoutLog},
};

/// How far back `current_streak` looks.
pub const STREAK_LOOKBACK_DAYS: u64 = 30;

pub static DEFAULT_HEAVY_LIFTS: Lazy<Vec<String>> = Lazy::new(|| {
    ["squat", "deadlift", "leg press", "hip thrust", "lunge"]
        .into_iter()
        .map(String::from)
        .collect()
});

/// Parse a typed-in weight. Anything unparseable or negative is 0.
pub fn parse_kg(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Parse a typed-in rep count, truncating decimals. Anything else is 0.
pub fn parse_reps(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 1.0 => v.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Numeric view of a set, whether logged or still being typed in.
pub trait SetLike {
    fn kg(&self) -> f64;
    fn reps(&self) -> u32;

    fn volume(&self) -> f64 {
        self.kg() * self.reps() as f64
    }
}

impl SetLike for LoggedSet {
    fn kg(&self) -> f64 {
        if self.kg.is_finite() { self.kg.max(0.0) } else { 0.0 }
    }

    fn reps(&self) -> u32 {
        self.reps
    }
}

impl SetLike for SetInput {
    fn kg(&self) -> f64 {
        parse_kg(&self.kg)
    }

    fn reps(&self) -> u32 {
        parse_reps(&self.reps)
    }
}

/// Epley estimate, rounded to a whole number.
pub fn estimate_one_rep_max(kg: f64, reps: u32) -> f64 {
    if kg <= 0.0 || reps == 0 {
        return 0.0;
    }
    (kg * (1.0 + reps as f64 / 30.0)).round()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestSet {
    pub one_rm: f64,
    pub kg: f64,
    pub reps: u32,
}

/// Highest per-set 1RM estimate. Earlier sets win ties.
pub fn best_one_rep_max<S: SetLike>(sets: &[S]) -> Option<BestSet> {
    let mut best: Option<BestSet> = None;
    for set in sets {
        let candidate = BestSet {
            one_rm: estimate_one_rep_max(set.kg(), set.reps()),
            kg: set.kg(),
            reps: set.reps(),
        };
        match best {
            Some(b) if b.one_rm >= candidate.one_rm => {}
            _ => best = Some(candidate),
        }
    }
    best
}

pub fn total_volume<S: SetLike>(sets: &[S]) -> f64 {
    sets.iter().map(SetLike::volume).sum()
}

pub fn max_weight<S: SetLike>(sets: &[S]) -> f64 {
    sets.iter().map(SetLike::kg).fold(0.0, f64::max)
}

pub fn average_weight<S: SetLike>(sets: &[S]) -> f64 {
    if sets.is_empty() {
        return 0.0;
    }
    sets.iter().map(SetLike::kg).sum::<f64>() / sets.len() as f64
}

pub fn log_volume(log: &WorkoutLog) -> f64 {
    log.exercises.iter().map(|e| total_volume(&e.sets)).sum()
}

/// Consecutive days with at least one log, walking back from `today`.
///
/// Today may still be empty; any earlier gap ends the streak.
pub fn current_streak(logs: &[WorkoutLog], today: NaiveDate) -> u32 {
    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        if logs.iter().any(|l| l.date.date_naive() == day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

/// Increment table for the progressive-overload suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionRules {
    /// Lower-case substrings that mark a heavy lower-body lift.
    pub heavy_lifts: Vec<String>,
    pub heavy_increment: f64,
    pub default_increment: f64,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            heavy_lifts: DEFAULT_HEAVY_LIFTS.clone(),
            heavy_increment: 5.0,
            default_increment: 2.5,
        }
    }
}

impl ProgressionRules {
    pub fn increment_for(&self, exercise: &str) -> f64 {
        let name = exercise.to_lowercase();
        if self
            .heavy_lifts
            .iter()
            .any(|lift| !lift.is_empty() && name.contains(&lift.to_lowercase()))
        {
            self.heavy_increment
        } else {
            self.default_increment
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Suggestion {
    pub suggested: f64,
    pub last_average: f64,
    pub increment: f64,
}

pub fn round_to_half(v: f64) -> f64 {
    (v * 2.0).round() / 2.0
}

/// Last session's average load plus a fixed increment, rounded to 0.5.
pub fn suggested_progressive_weight(
    history: &HistoryIndex<'_>,
    exercise: &str,
    rules: &ProgressionRules,
) -> Option<Suggestion> {
    let last = history.most_recent_occurrence(exercise)?;
    let last_average = average_weight(&last.sets);
    let increment = rules.increment_for(exercise);

    Some(Suggestion {
        suggested: round_to_half(last_average + increment),
        last_average,
        increment,
    })
}

pub fn format_duration(duration: chrono::Duration) -> String {
    let duration = duration.max(chrono::Duration::zero());
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let seconds = duration.num_seconds() % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoggedExercise;
    use chrono::{Local, TimeZone};

    fn set(kg: f64, reps: u32) -> LoggedSet {
        LoggedSet { index: 0, kg, reps, done: true }
    }

    fn log_on(id: &str, day: NaiveDate, exercises: Vec<LoggedExercise>) -> WorkoutLog {
        let date = Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .unwrap();
        WorkoutLog {
            id: id.to_string(),
            day_index: None,
            name: "Session".to_string(),
            date,
            exercise_count: exercises.len() as u32,
            exercises,
        }
    }

    fn exercise(name: &str, sets: Vec<LoggedSet>) -> LoggedExercise {
        LoggedExercise { name: name.to_string(), note: String::new(), order: 0, sets }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_one_rep_max() {
        assert_eq!(estimate_one_rep_max(0.0, 5), 0.0);
        assert_eq!(estimate_one_rep_max(100.0, 0), 0.0);
        assert_eq!(estimate_one_rep_max(-20.0, 5), 0.0);
        assert_eq!(estimate_one_rep_max(100.0, 10), 133.0);
        assert_eq!(estimate_one_rep_max(100.0, 1), 103.0);
    }

    #[test]
    fn test_best_one_rep_max_picks_highest_estimate() {
        let sets = vec![set(100.0, 5), set(90.0, 10), set(110.0, 1)];
        let best = best_one_rep_max(&sets).unwrap();
        assert_eq!(best.one_rm, 120.0);
        assert_eq!(best.kg, 90.0);
        assert_eq!(best.reps, 10);
        assert!(best_one_rep_max::<LoggedSet>(&[]).is_none());
    }

    #[test]
    fn test_volume() {
        assert_eq!(total_volume::<LoggedSet>(&[]), 0.0);
        assert_eq!(total_volume(&[set(100.0, 5), set(80.0, 10)]), 1300.0);
    }

    #[test]
    fn test_volume_of_raw_inputs_treats_garbage_as_zero() {
        let inputs = vec![
            SetInput { kg: "100".into(), reps: "5".into(), done: false },
            SetInput { kg: "abc".into(), reps: "10".into(), done: false },
            SetInput { kg: "-40".into(), reps: "3".into(), done: false },
            SetInput { kg: "20".into(), reps: "".into(), done: false },
        ];
        assert_eq!(total_volume(&inputs), 500.0);
    }

    #[test]
    fn test_max_weight_is_zero_when_empty_and_monotonic() {
        assert_eq!(max_weight::<LoggedSet>(&[]), 0.0);

        let mut sets = vec![set(60.0, 8), set(70.0, 6)];
        let before = max_weight(&sets);
        sets.push(set(75.0, 3));
        assert!(max_weight(&sets) >= before);
        assert_eq!(max_weight(&sets), 75.0);
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(parse_kg(" 82.5 "), 82.5);
        assert_eq!(parse_kg(""), 0.0);
        assert_eq!(parse_kg("NaN"), 0.0);
        assert_eq!(parse_kg("-5"), 0.0);
        assert_eq!(parse_reps("8"), 8);
        assert_eq!(parse_reps("8.9"), 8);
        assert_eq!(parse_reps("-3"), 0);
        assert_eq!(parse_reps("ten"), 0);
    }

    #[test]
    fn test_streak_today_and_yesterday() {
        let logs = vec![
            log_on("a", today(), vec![]),
            log_on("b", today().pred_opt().unwrap(), vec![]),
        ];
        assert_eq!(current_streak(&logs, today()), 2);
    }

    #[test]
    fn test_streak_stops_at_first_gap_after_yesterday() {
        let logs = vec![
            log_on("a", today() - Days::new(1), vec![]),
            log_on("b", today() - Days::new(3), vec![]),
        ];
        assert_eq!(current_streak(&logs, today()), 1);
    }

    #[test]
    fn test_streak_without_logs() {
        assert_eq!(current_streak(&[], today()), 0);
    }

    #[test]
    fn test_streak_is_bounded_by_lookback() {
        let logs: Vec<WorkoutLog> = (0..40)
            .map(|i| log_on(&i.to_string(), today() - Days::new(i), vec![]))
            .collect();
        assert_eq!(current_streak(&logs, today()), STREAK_LOOKBACK_DAYS as u32);
    }

    #[test]
    fn test_suggestion_for_heavy_lift() {
        let logs = vec![log_on(
            "a",
            today(),
            vec![exercise("Squat", vec![set(95.0, 5), set(100.0, 5), set(105.0, 5)])],
        )];
        let history = HistoryIndex::new(&logs);
        let s = suggested_progressive_weight(&history, "Squat", &ProgressionRules::default())
            .unwrap();
        assert_eq!(s, Suggestion { suggested: 105.0, last_average: 100.0, increment: 5.0 });
    }

    #[test]
    fn test_suggestion_for_upper_body_lift() {
        let logs = vec![log_on(
            "a",
            today(),
            vec![exercise("Bench Press", vec![set(80.0, 8), set(82.0, 8)])],
        )];
        let history = HistoryIndex::new(&logs);
        let s = suggested_progressive_weight(&history, "bench press", &ProgressionRules::default())
            .unwrap();
        assert_eq!(s.suggested, 83.5);
        assert_eq!(s.last_average, 81.0);
        assert_eq!(s.increment, 2.5);
    }

    #[test]
    fn test_suggestion_uses_most_recent_occurrence() {
        let logs = vec![
            log_on("old", today() - Days::new(7), vec![exercise("Deadlift", vec![set(140.0, 5)])]),
            log_on("new", today(), vec![exercise("Deadlift", vec![set(150.0, 5)])]),
        ];
        let history = HistoryIndex::new(&logs);
        let s = suggested_progressive_weight(&history, "Romanian Deadlift", &ProgressionRules::default());
        assert!(s.is_none());

        let s = suggested_progressive_weight(&history, "Deadlift", &ProgressionRules::default())
            .unwrap();
        assert_eq!(s.suggested, 155.0);
    }

    #[test]
    fn test_no_suggestion_without_history() {
        let history = HistoryIndex::new(&[]);
        assert!(
            suggested_progressive_weight(&history, "Squat", &ProgressionRules::default()).is_none()
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_duration(chrono::Duration::seconds(-5)), "00:00:00");
    }
}
