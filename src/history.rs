//! Lookups over the saved workout history.

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Serialize;
use strsim::jaro_winkler;

use crate::{
    metrics::{max_weight, total_volume},
    models::{LoggedExercise, LoggedSet, WorkoutLog, name_key},
};

/// One appearance of an exercise in the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence<'a> {
    pub log_id: &'a str,
    pub date: DateTime<Local>,
    pub sets: &'a [LoggedSet],
    pub max_kg: f64,
    pub total_volume: f64,
}

/// Logs sorted newest first, built once per data refresh.
#[derive(Debug, Clone)]
pub struct HistoryIndex<'a> {
    logs: Vec<&'a WorkoutLog>,
}

impl<'a> HistoryIndex<'a> {
    pub fn new(logs: &'a [WorkoutLog]) -> Self {
        let mut logs: Vec<&WorkoutLog> = logs.iter().collect();
        // Stable sort keeps repository order for equal timestamps.
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Self { logs }
    }

    pub fn logs(&self) -> &[&'a WorkoutLog] {
        &self.logs
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// The exercise as performed in the newest log that contains it.
    pub fn most_recent_occurrence(&self, exercise: &str) -> Option<&'a LoggedExercise> {
        self.logs.iter().find_map(|log| log.exercise(exercise))
    }

    /// Every log containing the exercise, newest first.
    pub fn all_occurrences(&self, exercise: &str) -> Vec<Occurrence<'a>> {
        self.logs
            .iter()
            .filter_map(|log| {
                log.exercise(exercise).map(|ex| Occurrence {
                    log_id: log.id.as_str(),
                    date: log.date,
                    sets: ex.sets.as_slice(),
                    max_kg: max_weight(&ex.sets),
                    total_volume: total_volume(&ex.sets),
                })
            })
            .collect()
    }

    pub fn exercise_names(&self) -> Vec<String> {
        distinct_exercise_names(self.logs.iter().copied())
    }

    /// Closest known exercise name if it is a convincing match.
    pub fn closest_exercise_name(&self, input: &str) -> Option<String> {
        const MIN_SCORE: f64 = 0.85;

        let needle = input.to_lowercase();
        self.exercise_names()
            .into_iter()
            .map(|name| {
                let score = jaro_winkler(&needle, &name.to_lowercase());
                (name, score)
            })
            .filter(|(_, score)| *score >= MIN_SCORE)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name)
    }
}

/// Exercise names in first-seen order across `logs`, one spelling per name.
pub fn distinct_exercise_names<'a>(logs: impl IntoIterator<Item = &'a WorkoutLog>) -> Vec<String> {
    logs.into_iter()
        .flat_map(|log| log.exercises.iter().map(|e| e.name.clone()))
        .unique_by(|name| name_key(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log(id: &str, day: u32, exercises: &[(&str, &[(f64, u32)])]) -> WorkoutLog {
        WorkoutLog {
            id: id.to_string(),
            day_index: Some(0),
            name: format!("Log {id}"),
            date: Local.with_ymd_and_hms(2026, 10, day, 18, 0, 0).unwrap(),
            exercise_count: exercises.len() as u32,
            exercises: exercises
                .iter()
                .enumerate()
                .map(|(i, (name, sets))| LoggedExercise {
                    name: name.to_string(),
                    note: String::new(),
                    order: i as u32,
                    sets: sets
                        .iter()
                        .enumerate()
                        .map(|(j, (kg, reps))| LoggedSet {
                            index: j as u32,
                            kg: *kg,
                            reps: *reps,
                            done: true,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn sample() -> Vec<WorkoutLog> {
        // Deliberately out of date order.
        vec![
            log("mid", 10, &[("Bench Press", &[(80.0, 8)]), ("Row", &[(60.0, 10)])]),
            log("new", 14, &[("bench press", &[(82.5, 8), (85.0, 6)])]),
            log("old", 3, &[("Squat", &[(100.0, 5)]), ("Bench Press", &[(77.5, 8)])]),
        ]
    }

    #[test]
    fn test_most_recent_occurrence_is_case_insensitive() {
        let logs = sample();
        let history = HistoryIndex::new(&logs);

        let ex = history.most_recent_occurrence("BENCH PRESS").unwrap();
        assert_eq!(ex.sets.len(), 2);
        assert_eq!(ex.sets[1].kg, 85.0);

        assert_eq!(history.most_recent_occurrence("Squat").unwrap().sets[0].kg, 100.0);
        assert!(history.most_recent_occurrence("Bench").is_none());
    }

    #[test]
    fn test_all_occurrences_newest_first() {
        let logs = sample();
        let history = HistoryIndex::new(&logs);

        let occ = history.all_occurrences("Bench Press");
        let ids: Vec<_> = occ.iter().map(|o| o.log_id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(occ[0].max_kg, 85.0);
        assert_eq!(occ[0].total_volume, 82.5 * 8.0 + 85.0 * 6.0);
        assert!(history.all_occurrences("Deadlift").is_empty());
    }

    #[test]
    fn test_distinct_names_keep_first_seen_spelling() {
        let logs = sample();
        assert_eq!(distinct_exercise_names(&logs), vec!["Bench Press", "Row", "Squat"]);
    }

    #[test]
    fn test_non_ascii_names_match_across_case() {
        let logs = vec![
            log("a", 5, &[("Şınav", &[(10.0, 12)]), ("Übung", &[(20.0, 8)])]),
            log("b", 7, &[("şınav", &[(12.0, 12)])]),
        ];
        let history = HistoryIndex::new(&logs);

        assert_eq!(history.most_recent_occurrence("Şınav").unwrap().sets[0].kg, 12.0);
        assert_eq!(history.all_occurrences("şınav").len(), 2);
        assert!(history.most_recent_occurrence("übung").is_some());
        assert_eq!(history.exercise_names(), vec!["şınav", "Übung"]);
    }

    #[test]
    fn test_closest_exercise_name() {
        let logs = sample();
        let history = HistoryIndex::new(&logs);
        assert_eq!(history.closest_exercise_name("Squats").as_deref(), Some("Squat"));
        assert_eq!(history.closest_exercise_name("Overhead Press"), None);
    }
}
