//! The workout being performed right now.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{CoreError, CoreResult},
    metrics::{parse_kg, parse_reps},
    models::{DraftExercise, LoggedExercise, LoggedSet, NewWorkoutLog, ProgramDay, SetInput},
    repository::Repository,
};

pub const DEFAULT_NEW_SETS: u32 = 3;
pub const DEFAULT_NEW_REPS: &str = "10";

/// Draft of a workout in progress. Inputs stay raw strings until saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWorkout {
    pub day_index: Option<u8>,
    pub name: String,
    pub started_at: DateTime<Local>,
    pub exercises: Vec<DraftExercise>,
}

impl ActiveWorkout {
    pub fn from_day(day: &ProgramDay, now: DateTime<Local>) -> Self {
        let exercises = day
            .exercises
            .iter()
            .map(|plan| DraftExercise {
                name: plan.name.clone(),
                note: plan.note.clone(),
                target_reps: plan.target_reps.clone(),
                sets: vec![SetInput::default(); plan.target_sets.max(1) as usize],
            })
            .collect();

        Self {
            day_index: Some(day.day_of_week),
            name: day.name.clone(),
            started_at: now,
            exercises,
        }
    }

    pub fn exercise(&self, ex: usize) -> CoreResult<&DraftExercise> {
        self.exercises
            .get(ex)
            .ok_or_else(|| CoreError::validation(format!("no exercise #{}", ex + 1)))
    }

    fn exercise_mut(&mut self, ex: usize) -> CoreResult<&mut DraftExercise> {
        self.exercises
            .get_mut(ex)
            .ok_or_else(|| CoreError::validation(format!("no exercise #{}", ex + 1)))
    }

    fn set_mut(&mut self, ex: usize, set: usize) -> CoreResult<&mut SetInput> {
        let exercise = self.exercise_mut(ex)?;
        let name = exercise.name.clone();
        exercise
            .sets
            .get_mut(set)
            .ok_or_else(|| CoreError::validation(format!("`{name}` has no set #{}", set + 1)))
    }

    pub fn done_sets(&self) -> usize {
        self.exercises.iter().flat_map(|e| &e.sets).filter(|s| s.done).count()
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Coerce the raw inputs into a storable log. Unparseable numbers become 0.
    pub fn to_new_log(&self) -> NewWorkoutLog {
        let exercises = self
            .exercises
            .iter()
            .enumerate()
            .map(|(order, ex)| LoggedExercise {
                name: ex.name.clone(),
                note: ex.note.clone(),
                order: order as u32,
                sets: ex
                    .sets
                    .iter()
                    .enumerate()
                    .map(|(index, s)| LoggedSet {
                        index: index as u32,
                        kg: parse_kg(&s.kg),
                        reps: parse_reps(&s.reps),
                        done: s.done,
                    })
                    .collect(),
            })
            .collect();

        NewWorkoutLog {
            day_index: self.day_index,
            name: self.name.clone(),
            exercises,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkoutState {
    #[default]
    NotStarted,
    InProgress(ActiveWorkout),
    Saving,
    Saved {
        log_id: String,
    },
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct WorkoutSession {
    state: WorkoutState,
}

impl WorkoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveWorkout> {
        match &self.state {
            WorkoutState::InProgress(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.active().is_some()
    }

    fn active_mut(&mut self) -> CoreResult<&mut ActiveWorkout> {
        match &mut self.state {
            WorkoutState::InProgress(w) => Ok(w),
            _ => Err(CoreError::validation("no workout in progress")),
        }
    }

    /// Replace the current state, returning a workout that was still running.
    fn begin(&mut self, workout: ActiveWorkout) -> Option<ActiveWorkout> {
        let previous = match std::mem::replace(&mut self.state, WorkoutState::InProgress(workout)) {
            WorkoutState::InProgress(old) => Some(old),
            _ => None,
        };
        if let Some(old) = &previous {
            warn!(discarded = %old.name, "workout in progress was replaced");
        }
        previous
    }

    pub fn start(
        &mut self,
        day: &ProgramDay,
        now: DateTime<Local>,
    ) -> CoreResult<Option<ActiveWorkout>> {
        if day.is_rest() {
            return Err(CoreError::validation(format!(
                "{} is a rest day",
                day.weekday_name()
            )));
        }
        info!(day = day.weekday_name(), name = %day.name, "workout started");
        Ok(self.begin(ActiveWorkout::from_day(day, now)))
    }

    pub fn start_ad_hoc(
        &mut self,
        name: &str,
        now: DateTime<Local>,
    ) -> CoreResult<Option<ActiveWorkout>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("workout name is required"));
        }
        info!(name, "ad-hoc workout started");
        Ok(self.begin(ActiveWorkout {
            day_index: None,
            name: name.to_string(),
            started_at: now,
            exercises: Vec::new(),
        }))
    }

    pub fn resume(&mut self, workout: ActiveWorkout) {
        self.state = WorkoutState::InProgress(workout);
    }

    pub fn set_kg(&mut self, ex: usize, set: usize, kg: &str) -> CoreResult<()> {
        self.active_mut()?.set_mut(ex, set)?.kg = kg.trim().to_string();
        Ok(())
    }

    pub fn set_reps(&mut self, ex: usize, set: usize, reps: &str) -> CoreResult<()> {
        self.active_mut()?.set_mut(ex, set)?.reps = reps.trim().to_string();
        Ok(())
    }

    pub fn set_done(&mut self, ex: usize, set: usize, done: bool) -> CoreResult<()> {
        self.active_mut()?.set_mut(ex, set)?.done = done;
        Ok(())
    }

    pub fn toggle_done(&mut self, ex: usize, set: usize) -> CoreResult<bool> {
        let s = self.active_mut()?.set_mut(ex, set)?;
        s.done = !s.done;
        Ok(s.done)
    }

    pub fn add_set(&mut self, ex: usize) -> CoreResult<usize> {
        let exercise = self.active_mut()?.exercise_mut(ex)?;
        exercise.sets.push(SetInput::default());
        Ok(exercise.sets.len())
    }

    /// Drops the last set unless it is the only one.
    pub fn remove_last_set(&mut self, ex: usize) -> CoreResult<bool> {
        let exercise = self.active_mut()?.exercise_mut(ex)?;
        if exercise.sets.len() <= 1 {
            return Ok(false);
        }
        exercise.sets.pop();
        Ok(true)
    }

    pub fn add_exercise(
        &mut self,
        name: &str,
        sets: Option<u32>,
        target_reps: Option<&str>,
    ) -> CoreResult<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("exercise name is required"));
        }
        let workout = self.active_mut()?;

        let sets = sets.filter(|n| *n > 0).unwrap_or(DEFAULT_NEW_SETS);
        let target_reps = target_reps
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_NEW_REPS);

        workout.exercises.push(DraftExercise {
            name: name.to_string(),
            note: String::new(),
            target_reps: target_reps.to_string(),
            sets: vec![SetInput::default(); sets as usize],
        });
        Ok(workout.exercises.len())
    }

    /// Write `kg` into every set of one exercise.
    pub fn apply_weight(&mut self, ex: usize, kg: f64) -> CoreResult<()> {
        if !kg.is_finite() || kg < 0.0 {
            return Err(CoreError::validation(format!("invalid weight {kg}")));
        }
        let exercise = self.active_mut()?.exercise_mut(ex)?;
        for s in &mut exercise.sets {
            s.kg = kg.to_string();
        }
        Ok(())
    }

    pub fn discard(&mut self) -> Option<ActiveWorkout> {
        match std::mem::replace(&mut self.state, WorkoutState::Discarded) {
            WorkoutState::InProgress(w) => {
                info!(name = %w.name, "workout discarded");
                Some(w)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Save the workout. On failure the draft is restored untouched.
    pub async fn finish<R: Repository>(&mut self, repo: &R) -> CoreResult<String> {
        let workout = match std::mem::replace(&mut self.state, WorkoutState::Saving) {
            WorkoutState::InProgress(w) => w,
            other => {
                self.state = other;
                return Err(CoreError::validation("no workout in progress"));
            }
        };

        match repo.save_workout_log(&workout.to_new_log()).await {
            Ok(log_id) => {
                info!(id = %log_id, name = %workout.name, "workout saved");
                self.state = WorkoutState::Saved { log_id: log_id.clone() };
                Ok(log_id)
            }
            Err(e) => {
                warn!(error = %e, "saving workout failed, draft kept");
                self.state = WorkoutState::InProgress(workout);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{SqliteRepository, open_in_memory},
        models::{BodyWeightEntry, DayKind, WorkoutLog},
        program::{PlanInput, build_day},
        repository::{DEFAULT_LOG_LIMIT, FixedIdentity},
    };

    struct FailingRepo;

    impl Repository for FailingRepo {
        async fn load_program(&self) -> CoreResult<Vec<ProgramDay>> {
            Ok(Vec::new())
        }
        async fn save_program_day(&self, _: &ProgramDay, _: Option<&str>) -> CoreResult<String> {
            Err(CoreError::Repository("offline".into()))
        }
        async fn delete_program_day(&self, _: &str) -> CoreResult<()> {
            Err(CoreError::Repository("offline".into()))
        }
        async fn load_logs(&self, _: u32) -> CoreResult<Vec<WorkoutLog>> {
            Ok(Vec::new())
        }
        async fn save_workout_log(&self, _: &NewWorkoutLog) -> CoreResult<String> {
            Err(CoreError::Repository("offline".into()))
        }
        async fn load_body_weight_entries(&self, _: u32) -> CoreResult<Vec<BodyWeightEntry>> {
            Ok(Vec::new())
        }
        async fn save_body_weight_entry(&self, _: f64, _: &str) -> CoreResult<String> {
            Err(CoreError::Repository("offline".into()))
        }
        async fn delete_body_weight_entry(&self, _: &str) -> CoreResult<()> {
            Err(CoreError::Repository("offline".into()))
        }
    }

    fn plan(name: &str, sets: u32) -> PlanInput {
        PlanInput { name: name.to_string(), sets, reps: "8".to_string(), note: String::new() }
    }

    fn push_day() -> ProgramDay {
        build_day(0, "Push", DayKind::Push, vec![plan("Bench Press", 3), plan("Dips", 2)]).unwrap()
    }

    fn started() -> WorkoutSession {
        let mut session = WorkoutSession::new();
        session.start(&push_day(), Local::now()).unwrap();
        session
    }

    #[test]
    fn test_start_snapshots_target_sets() {
        let session = started();
        let w = session.active().unwrap();
        assert_eq!(w.day_index, Some(0));
        assert_eq!(w.exercises.len(), 2);
        assert_eq!(w.exercises[0].sets.len(), 3);
        assert_eq!(w.exercises[1].sets.len(), 2);
        assert!(w.exercises[0].sets.iter().all(|s| *s == SetInput::default()));
    }

    #[test]
    fn test_rest_day_cannot_start() {
        let rest = build_day(6, "Off", DayKind::Rest, vec![]).unwrap();
        let mut session = WorkoutSession::new();
        assert!(matches!(session.start(&rest, Local::now()), Err(CoreError::Validation(_))));
        assert_eq!(session.state(), &WorkoutState::NotStarted);
    }

    #[test]
    fn test_starting_again_returns_overwritten_workout() {
        let mut session = started();
        session.set_kg(0, 0, "80").unwrap();

        let old = session.start_ad_hoc("Arms", Local::now()).unwrap().unwrap();
        assert_eq!(old.exercises[0].sets[0].kg, "80");
        assert_eq!(session.active().unwrap().name, "Arms");
        assert!(session.active().unwrap().exercises.is_empty());
    }

    #[test]
    fn test_edits_require_workout_in_progress() {
        let mut session = WorkoutSession::new();
        assert!(matches!(session.set_kg(0, 0, "80"), Err(CoreError::Validation(_))));
        assert!(matches!(session.add_exercise("Curl", None, None), Err(CoreError::Validation(_))));
        assert_eq!(session.discard(), None);
        assert_eq!(session.state(), &WorkoutState::NotStarted);
    }

    #[test]
    fn test_set_editing() {
        let mut session = started();
        session.set_kg(0, 1, " 82.5 ").unwrap();
        session.set_reps(0, 1, "8").unwrap();
        assert!(session.toggle_done(0, 1).unwrap());
        assert!(!session.toggle_done(0, 1).unwrap());
        session.set_done(0, 1, true).unwrap();

        let set = &session.active().unwrap().exercises[0].sets[1];
        assert_eq!(set, &SetInput { kg: "82.5".into(), reps: "8".into(), done: true });

        assert!(matches!(session.set_kg(0, 3, "1"), Err(CoreError::Validation(_))));
        assert!(matches!(session.set_kg(5, 0, "1"), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_add_and_remove_sets() {
        let mut session = started();
        assert_eq!(session.add_set(1).unwrap(), 3);
        assert!(session.remove_last_set(1).unwrap());
        assert!(session.remove_last_set(1).unwrap());
        assert!(!session.remove_last_set(1).unwrap());
        assert_eq!(session.active().unwrap().exercises[1].sets.len(), 1);
    }

    #[test]
    fn test_add_exercise_defaults() {
        let mut session = started();
        assert_eq!(session.add_exercise("Lateral Raise", None, None).unwrap(), 3);
        assert_eq!(session.add_exercise("Curl", Some(0), Some(" ")).unwrap(), 4);
        session.add_exercise("Shrug", Some(5), Some("12-15")).unwrap();

        let w = session.active().unwrap();
        assert_eq!(w.exercises[2].sets.len(), 3);
        assert_eq!(w.exercises[2].target_reps, "10");
        assert_eq!(w.exercises[3].sets.len(), 3);
        assert_eq!(w.exercises[4].sets.len(), 5);
        assert_eq!(w.exercises[4].target_reps, "12-15");

        assert!(matches!(session.add_exercise("  ", None, None), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_apply_weight_fills_every_set() {
        let mut session = started();
        session.apply_weight(0, 83.5).unwrap();
        assert!(session.active().unwrap().exercises[0].sets.iter().all(|s| s.kg == "83.5"));
        assert!(session.active().unwrap().exercises[1].sets.iter().all(|s| s.kg.is_empty()));
    }

    #[test]
    fn test_to_new_log_coerces_numbers() {
        let mut session = started();
        session.set_kg(0, 0, "abc").unwrap();
        session.set_reps(0, 0, "8.7").unwrap();
        session.set_kg(0, 1, "-5").unwrap();
        session.set_reps(0, 1, "").unwrap();

        let log = session.active().unwrap().to_new_log();
        assert_eq!(log.exercises[0].sets[0], LoggedSet { index: 0, kg: 0.0, reps: 8, done: false });
        assert_eq!(log.exercises[0].sets[1].kg, 0.0);
        assert_eq!(log.exercises[0].sets[1].reps, 0);
        assert_eq!(log.exercises[1].order, 1);
    }

    #[tokio::test]
    async fn test_finish_saves_and_round_trips() {
        let pool = open_in_memory().await.unwrap();
        let repo = SqliteRepository::new(pool, FixedIdentity::user("ana"));

        let mut session = started();
        session.set_kg(0, 0, "80").unwrap();
        session.set_reps(0, 0, "8").unwrap();
        session.set_done(0, 0, true).unwrap();
        session.set_kg(1, 1, "x").unwrap();
        let expected = session.active().unwrap().to_new_log();

        let id = session.finish(&repo).await.unwrap();
        assert_eq!(session.state(), &WorkoutState::Saved { log_id: id.clone() });

        let logs = repo.load_logs(DEFAULT_LOG_LIMIT).await.unwrap();
        assert_eq!(logs[0].id, id);
        assert_eq!(logs[0].exercises, expected.exercises);
        assert_eq!(logs[0].exercises[1].sets[1].kg, 0.0);
    }

    #[tokio::test]
    async fn test_failed_finish_keeps_draft() {
        let mut session = started();
        session.set_kg(0, 2, "100").unwrap();
        let before = session.active().cloned();

        let err = session.finish(&FailingRepo).await.unwrap_err();
        assert!(err.is_repository());
        assert_eq!(session.active().cloned(), before);
    }

    #[tokio::test]
    async fn test_finish_without_workout() {
        let mut session = WorkoutSession::new();
        assert!(matches!(session.finish(&FailingRepo).await, Err(CoreError::Validation(_))));

        let mut session = started();
        assert!(session.discard().is_some());
        assert_eq!(session.state(), &WorkoutState::Discarded);
        assert!(matches!(session.finish(&FailingRepo).await, Err(CoreError::Validation(_))));
    }
}
