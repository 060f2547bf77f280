use std::{collections::HashMap, path::Path, str::FromStr};

use chrono::{DateTime, Local, SecondsFormat, Utc};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{CoreError, CoreResult},
    models::{
        BodyWeightEntry, DayKind, ExercisePlan, LoggedExercise, LoggedSet, MAX_BODY_WEIGHT,
        MIN_BODY_WEIGHT, NewWorkoutLog, ProgramDay, WorkoutLog, weekday_name,
    },
    repository::{IdentityProvider, Repository},
};

pub type DB = SqlitePool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS program_days (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL,
        day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
        name        TEXT NOT NULL,
        kind        TEXT NOT NULL,
        UNIQUE (user_id, day_of_week)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS program_exercises (
        id          TEXT PRIMARY KEY,
        day_id      TEXT NOT NULL REFERENCES program_days(id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        target_sets INTEGER NOT NULL CHECK (target_sets >= 1),
        target_reps TEXT NOT NULL,
        note        TEXT NOT NULL DEFAULT '',
        order_index INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workout_logs (
        id             TEXT PRIMARY KEY,
        user_id        TEXT NOT NULL,
        day_index      INTEGER,
        name           TEXT NOT NULL,
        date           TEXT NOT NULL,
        exercise_count INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_workout_logs_user_date ON workout_logs (user_id, date)",
    r#"
    CREATE TABLE IF NOT EXISTS log_exercises (
        id          TEXT PRIMARY KEY,
        log_id      TEXT NOT NULL REFERENCES workout_logs(id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        note        TEXT NOT NULL DEFAULT '',
        order_index INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS log_sets (
        id          TEXT PRIMARY KEY,
        exercise_id TEXT NOT NULL REFERENCES log_exercises(id) ON DELETE CASCADE,
        set_index   INTEGER NOT NULL,
        kg          REAL NOT NULL DEFAULT 0,
        reps        INTEGER NOT NULL DEFAULT 0,
        done        INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS body_weight_entries (
        id      TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        weight  REAL NOT NULL,
        date    TEXT NOT NULL,
        note    TEXT NOT NULL DEFAULT ''
    )
    "#,
];

pub async fn open(path: impl AsRef<Path>) -> CoreResult<DB> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database; the data lives as long as the pool.
pub async fn open_in_memory() -> CoreResult<DB> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

async fn init_schema(pool: &DB) -> CoreResult<()> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_stamp(raw: &str) -> CoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Local))
        .map_err(|e| CoreError::Repository(format!("bad timestamp `{raw}`: {e}")))
}

fn to_u8(v: i64, what: &str) -> CoreResult<u8> {
    u8::try_from(v).map_err(|_| CoreError::Repository(format!("{what} out of range: {v}")))
}

fn to_u32(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

fn clean_kg(kg: f64) -> f64 {
    if kg.is_finite() && kg > 0.0 { kg } else { 0.0 }
}

/// Maps the `UNIQUE (user_id, day_of_week)` violation to a validation error.
fn slot_taken(day_of_week: u8) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |err| match &err {
        // 2067 = SQLITE_CONSTRAINT_UNIQUE
        sqlx::Error::Database(db_err) if db_err.code() == Some("2067".into()) => {
            CoreError::validation(format!("{} already has a planned day", weekday_name(day_of_week)))
        }
        _ => err.into(),
    }
}

fn check_day(day: &ProgramDay) -> CoreResult<()> {
    if day.day_of_week > 6 {
        return Err(CoreError::validation(format!(
            "day {} is outside 0..=6",
            day.day_of_week
        )));
    }
    if day.name.trim().is_empty() {
        return Err(CoreError::validation("day name is required"));
    }
    for ex in &day.exercises {
        if ex.name.trim().is_empty() {
            return Err(CoreError::validation("exercise name is required"));
        }
        if ex.target_sets < 1 {
            return Err(CoreError::validation(format!("`{}` needs at least one set", ex.name)));
        }
    }
    Ok(())
}

/// SQLite-backed repository scoped to the current identity.
#[derive(Debug, Clone)]
pub struct SqliteRepository<I> {
    pool: DB,
    identity: I,
}

impl<I: IdentityProvider> SqliteRepository<I> {
    pub fn new(pool: DB, identity: I) -> Self {
        Self { pool, identity }
    }

    pub fn pool(&self) -> &DB {
        &self.pool
    }

    fn user(&self) -> CoreResult<String> {
        self.identity.require_user()
    }
}

fn day_from_row(r: &SqliteRow) -> CoreResult<ProgramDay> {
    let kind: String = r.try_get("kind")?;
    Ok(ProgramDay {
        id: Some(r.try_get("id")?),
        day_of_week: to_u8(r.try_get("day_of_week")?, "day_of_week")?,
        name: r.try_get("name")?,
        kind: DayKind::parse(&kind)
            .ok_or_else(|| CoreError::Repository(format!("unknown day kind `{kind}`")))?,
        exercises: Vec::new(),
    })
}

fn body_weight_from_row(r: &SqliteRow) -> CoreResult<BodyWeightEntry> {
    let date: String = r.try_get("date")?;
    Ok(BodyWeightEntry {
        id: r.try_get("id")?,
        weight: r.try_get("weight")?,
        date: parse_stamp(&date)?,
        note: r.try_get("note")?,
    })
}

impl<I: IdentityProvider> Repository for SqliteRepository<I> {
    async fn load_program(&self) -> CoreResult<Vec<ProgramDay>> {
        let user = self.user()?;

        let day_rows = sqlx::query(
            r#"
            SELECT id, day_of_week, name, kind
            FROM   program_days
            WHERE  user_id = ?
            ORDER  BY day_of_week
            "#,
        )
        .bind(&user)
        .fetch_all(&self.pool)
        .await?;

        let ex_rows = sqlx::query(
            r#"
            SELECT pe.day_id, pe.name, pe.target_sets, pe.target_reps, pe.note, pe.order_index
            FROM   program_exercises pe
            JOIN   program_days pd ON pd.id = pe.day_id
            WHERE  pd.user_id = ?
            ORDER  BY pe.day_id, pe.order_index
            "#,
        )
        .bind(&user)
        .fetch_all(&self.pool)
        .await?;

        let mut by_day: HashMap<String, Vec<ExercisePlan>> = HashMap::new();
        for r in &ex_rows {
            by_day
                .entry(r.try_get("day_id")?)
                .or_default()
                .push(ExercisePlan {
                    name: r.try_get("name")?,
                    target_sets: to_u32(r.try_get("target_sets")?),
                    target_reps: r.try_get("target_reps")?,
                    note: r.try_get("note")?,
                    order: to_u32(r.try_get("order_index")?),
                });
        }

        let mut days = Vec::with_capacity(day_rows.len());
        for r in &day_rows {
            let mut day = day_from_row(r)?;
            if let Some(id) = &day.id {
                day.exercises = by_day.remove(id).unwrap_or_default();
            }
            days.push(day);
        }

        debug!(user = %user, days = days.len(), "loaded program");
        Ok(days)
    }

    async fn save_program_day(
        &self,
        day: &ProgramDay,
        existing_id: Option<&str>,
    ) -> CoreResult<String> {
        let user = self.user()?;
        check_day(day)?;

        // Dropping the transaction on an early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let day_id = match existing_id {
            Some(id) => {
                let res = sqlx::query(
                    r#"
                    UPDATE program_days
                    SET    day_of_week = ?, name = ?, kind = ?
                    WHERE  id = ? AND user_id = ?
                    "#,
                )
                .bind(day.day_of_week as i64)
                .bind(day.name.trim())
                .bind(day.kind.as_str())
                .bind(id)
                .bind(&user)
                .execute(&mut *tx)
                .await
                .map_err(slot_taken(day.day_of_week))?;

                if res.rows_affected() == 0 {
                    return Err(CoreError::NotFound(format!("program day `{id}`")));
                }

                sqlx::query("DELETE FROM program_exercises WHERE day_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                id.to_string()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"INSERT INTO program_days (id, user_id, day_of_week, name, kind)
                       VALUES (?1, ?2, ?3, ?4, ?5)"#,
                )
                .bind(&id)
                .bind(&user)
                .bind(day.day_of_week as i64)
                .bind(day.name.trim())
                .bind(day.kind.as_str())
                .execute(&mut *tx)
                .await
                .map_err(slot_taken(day.day_of_week))?;
                id
            }
        };

        if !day.is_rest() {
            for (order_idx, ex) in day.exercises.iter().enumerate() {
                sqlx::query(
                    r#"INSERT INTO program_exercises
                         (id, day_id, name, target_sets, target_reps, note, order_index)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&day_id)
                .bind(ex.name.trim())
                .bind(ex.target_sets as i64)
                .bind(&ex.target_reps)
                .bind(&ex.note)
                .bind(order_idx as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        info!(
            day = weekday_name(day.day_of_week),
            id = %day_id,
            replaced = existing_id.is_some(),
            "saved program day"
        );
        Ok(day_id)
    }

    async fn delete_program_day(&self, id: &str) -> CoreResult<()> {
        let user = self.user()?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM program_exercises
            WHERE  day_id IN (SELECT id FROM program_days WHERE id = ? AND user_id = ?)
            "#,
        )
        .bind(id)
        .bind(&user)
        .execute(&mut *tx)
        .await?;

        let res = sqlx::query("DELETE FROM program_days WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&user)
            .execute(&mut *tx)
            .await?;

        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("program day `{id}`")));
        }

        tx.commit().await?;
        info!(id, "deleted program day");
        Ok(())
    }

    async fn load_logs(&self, limit: u32) -> CoreResult<Vec<WorkoutLog>> {
        let user = self.user()?;

        let log_rows = sqlx::query(
            r#"
            SELECT id, day_index, name, date, exercise_count
            FROM   workout_logs
            WHERE  user_id = ?
            ORDER  BY date DESC, rowid DESC
            LIMIT  ?
            "#,
        )
        .bind(&user)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let set_rows = sqlx::query(
            r#"
            SELECT le.log_id, le.id AS exercise_id, le.name, le.note, le.order_index,
                   ls.set_index, ls.kg, ls.reps, ls.done
            FROM   log_exercises le
            LEFT   JOIN log_sets ls ON ls.exercise_id = le.id
            WHERE  le.log_id IN (
                       SELECT id FROM workout_logs
                       WHERE  user_id = ?
                       ORDER  BY date DESC, rowid DESC
                       LIMIT  ?
                   )
            ORDER  BY le.log_id, le.order_index, ls.set_index
            "#,
        )
        .bind(&user)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        // Rows arrive grouped by exercise, so a set belongs to the last exercise seen.
        let mut flat: Vec<(String, String, LoggedExercise)> = Vec::new();
        for r in &set_rows {
            let log_id: String = r.try_get("log_id")?;
            let exercise_id: String = r.try_get("exercise_id")?;

            let is_new = flat.last().is_none_or(|(_, last_id, _)| *last_id != exercise_id);
            if is_new {
                flat.push((
                    log_id,
                    exercise_id,
                    LoggedExercise {
                        name: r.try_get("name")?,
                        note: r.try_get("note")?,
                        order: to_u32(r.try_get("order_index")?),
                        sets: Vec::new(),
                    },
                ));
            }

            let set_index: Option<i64> = r.try_get("set_index")?;
            if let (Some(index), Some((_, _, ex))) = (set_index, flat.last_mut()) {
                let kg: Option<f64> = r.try_get("kg")?;
                let reps: Option<i64> = r.try_get("reps")?;
                let done: Option<bool> = r.try_get("done")?;
                ex.sets.push(LoggedSet {
                    index: to_u32(index),
                    kg: clean_kg(kg.unwrap_or(0.0)),
                    reps: to_u32(reps.unwrap_or(0)),
                    done: done.unwrap_or(false),
                });
            }
        }

        let mut by_log: HashMap<String, Vec<LoggedExercise>> = HashMap::new();
        for (log_id, _, ex) in flat {
            by_log.entry(log_id).or_default().push(ex);
        }

        let mut logs = Vec::with_capacity(log_rows.len());
        for r in &log_rows {
            let id: String = r.try_get("id")?;
            let date: String = r.try_get("date")?;
            let day_index: Option<i64> = r.try_get("day_index")?;
            logs.push(WorkoutLog {
                exercises: by_log.remove(&id).unwrap_or_default(),
                id,
                day_index: day_index.map(|d| to_u8(d, "day_index")).transpose()?,
                name: r.try_get("name")?,
                date: parse_stamp(&date)?,
                exercise_count: to_u32(r.try_get("exercise_count")?),
            });
        }

        debug!(user = %user, logs = logs.len(), "loaded workout logs");
        Ok(logs)
    }

    async fn save_workout_log(&self, log: &NewWorkoutLog) -> CoreResult<String> {
        let user = self.user()?;
        if log.name.trim().is_empty() {
            return Err(CoreError::validation("workout name is required"));
        }

        let log_id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO workout_logs (id, user_id, day_index, name, date, exercise_count)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(&log_id)
        .bind(&user)
        .bind(log.day_index.map(i64::from))
        .bind(log.name.trim())
        .bind(now_stamp())
        .bind(log.exercises.len() as i64)
        .execute(&mut *tx)
        .await?;

        for (order_idx, ex) in log.exercises.iter().enumerate() {
            let exercise_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"INSERT INTO log_exercises (id, log_id, name, note, order_index)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
            )
            .bind(&exercise_id)
            .bind(&log_id)
            .bind(&ex.name)
            .bind(&ex.note)
            .bind(order_idx as i64)
            .execute(&mut *tx)
            .await?;

            for (set_idx, set) in ex.sets.iter().enumerate() {
                sqlx::query(
                    r#"INSERT INTO log_sets (id, exercise_id, set_index, kg, reps, done)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&exercise_id)
                .bind(set_idx as i64)
                .bind(clean_kg(set.kg))
                .bind(set.reps as i64)
                .bind(set.done)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        info!(id = %log_id, exercises = log.exercises.len(), "saved workout log");
        Ok(log_id)
    }

    async fn load_body_weight_entries(&self, limit: u32) -> CoreResult<Vec<BodyWeightEntry>> {
        let user = self.user()?;
        let rows = sqlx::query(
            r#"
            SELECT id, weight, date, note
            FROM   body_weight_entries
            WHERE  user_id = ?
            ORDER  BY date DESC, rowid DESC
            LIMIT  ?
            "#,
        )
        .bind(&user)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(body_weight_from_row).collect()
    }

    async fn save_body_weight_entry(&self, weight: f64, note: &str) -> CoreResult<String> {
        let user = self.user()?;
        if !weight.is_finite() || !(MIN_BODY_WEIGHT..=MAX_BODY_WEIGHT).contains(&weight) {
            return Err(CoreError::validation(format!(
                "weight must be between {MIN_BODY_WEIGHT} and {MAX_BODY_WEIGHT} kg"
            )));
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"INSERT INTO body_weight_entries (id, user_id, weight, date, note)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(&id)
        .bind(&user)
        .bind(weight)
        .bind(now_stamp())
        .bind(note.trim())
        .execute(&self.pool)
        .await?;

        info!(id = %id, weight, "saved body weight entry");
        Ok(id)
    }

    async fn delete_body_weight_entry(&self, id: &str) -> CoreResult<()> {
        let user = self.user()?;
        let res = sqlx::query("DELETE FROM body_weight_entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&user)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("body weight entry `{id}`")));
        }
        info!(id, "deleted body weight entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        program::{PlanInput, build_day},
        repository::{DEFAULT_BODY_WEIGHT_LIMIT, DEFAULT_LOG_LIMIT, FixedIdentity},
    };

    async fn repo(user: &str) -> SqliteRepository<FixedIdentity> {
        let pool = open_in_memory().await.unwrap();
        SqliteRepository::new(pool, FixedIdentity::user(user))
    }

    fn plan(name: &str, sets: u32) -> PlanInput {
        PlanInput { name: name.to_string(), sets, reps: "8-10".to_string(), note: String::new() }
    }

    fn push_day(dow: u8) -> ProgramDay {
        build_day(dow, "Push", DayKind::Push, vec![plan("Bench Press", 4), plan("Dips", 3)])
            .unwrap()
    }

    fn new_log(name: &str, exercises: Vec<(&str, Vec<(f64, u32, bool)>)>) -> NewWorkoutLog {
        NewWorkoutLog {
            day_index: Some(0),
            name: name.to_string(),
            exercises: exercises
                .into_iter()
                .enumerate()
                .map(|(i, (ex, sets))| LoggedExercise {
                    name: ex.to_string(),
                    note: String::new(),
                    order: i as u32,
                    sets: sets
                        .into_iter()
                        .enumerate()
                        .map(|(j, (kg, reps, done))| LoggedSet { index: j as u32, kg, reps, done })
                        .collect(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_program_day_round_trip() {
        let repo = repo("ana").await;
        let id = repo.save_program_day(&push_day(0), None).await.unwrap();

        let program = repo.load_program().await.unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program[0].id.as_deref(), Some(id.as_str()));
        let names: Vec<_> = program[0].exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bench Press", "Dips"]);
        assert_eq!(program[0].exercises[1].order, 1);
    }

    #[tokio::test]
    async fn test_replace_rewrites_exercises() {
        let repo = repo("ana").await;
        let id = repo.save_program_day(&push_day(0), None).await.unwrap();

        let edited =
            build_day(0, "Push heavy", DayKind::Push, vec![plan("Overhead Press", 5)]).unwrap();
        let same = repo.save_program_day(&edited, Some(&id)).await.unwrap();
        assert_eq!(same, id);

        let program = repo.load_program().await.unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program[0].name, "Push heavy");
        assert_eq!(program[0].exercises.len(), 1);
        assert_eq!(program[0].exercises[0].name, "Overhead Press");
    }

    #[tokio::test]
    async fn test_second_day_on_same_weekday_is_rejected() {
        let repo = repo("ana").await;
        repo.save_program_day(&push_day(2), None).await.unwrap();

        let err = repo.save_program_day(&push_day(2), None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(repo.load_program().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let repo = repo("ana").await;
        let err = repo.save_program_day(&push_day(1), Some("nope")).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(repo.load_program().await.unwrap().is_empty());

        let err = repo.delete_program_day("nope").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let err = repo.delete_body_weight_entry("nope").await.unwrap_err();
        assert!(err.is_repository());
    }

    #[tokio::test]
    async fn test_delete_day_cascades() {
        let repo = repo("ana").await;
        let id = repo.save_program_day(&push_day(0), None).await.unwrap();
        repo.delete_program_day(&id).await.unwrap();

        assert!(repo.load_program().await.unwrap().is_empty());
        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM program_exercises")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn test_workout_log_round_trip_keeps_order() {
        let repo = repo("ana").await;
        let log = new_log(
            "Push A",
            vec![
                ("Bench Press", vec![(80.0, 8, true), (82.5, 6, true), (85.0, 4, false)]),
                ("Dips", vec![(0.0, 12, true)]),
                ("Lateral Raise", vec![]),
            ],
        );
        let id = repo.save_workout_log(&log).await.unwrap();

        let logs = repo.load_logs(DEFAULT_LOG_LIMIT).await.unwrap();
        assert_eq!(logs.len(), 1);
        let saved = &logs[0];
        assert_eq!(saved.id, id);
        assert_eq!(saved.exercise_count, 3);
        assert_eq!(saved.day_index, Some(0));
        assert_eq!(saved.exercises, log.exercises);
    }

    #[tokio::test]
    async fn test_logs_newest_first_and_limited() {
        let repo = repo("ana").await;
        for name in ["first", "second", "third"] {
            repo.save_workout_log(&new_log(name, vec![("Squat", vec![(100.0, 5, true)])]))
                .await
                .unwrap();
        }

        let logs = repo.load_logs(2).await.unwrap();
        let names: Vec<_> = logs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second"]);
        assert!(logs.iter().all(|l| l.exercises.len() == 1));
    }

    #[tokio::test]
    async fn test_data_is_scoped_per_user() {
        let ana = repo("ana").await;
        let bo = SqliteRepository::new(ana.pool().clone(), FixedIdentity::user("bo"));

        let day_id = ana.save_program_day(&push_day(0), None).await.unwrap();
        ana.save_workout_log(&new_log("Push", vec![])).await.unwrap();
        ana.save_body_weight_entry(80.0, "").await.unwrap();

        assert!(bo.load_program().await.unwrap().is_empty());
        assert!(bo.load_logs(DEFAULT_LOG_LIMIT).await.unwrap().is_empty());
        assert!(bo.load_body_weight_entries(DEFAULT_BODY_WEIGHT_LIMIT).await.unwrap().is_empty());
        assert!(matches!(
            bo.delete_program_day(&day_id).await,
            Err(CoreError::NotFound(_))
        ));

        // Bo may plan the same weekday.
        bo.save_program_day(&push_day(0), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_every_call_requires_identity() {
        let pool = open_in_memory().await.unwrap();
        let repo = SqliteRepository::new(pool, FixedIdentity::anonymous());

        assert_eq!(repo.load_program().await, Err(CoreError::Unauthorized));
        assert_eq!(repo.save_program_day(&push_day(0), None).await, Err(CoreError::Unauthorized));
        assert_eq!(repo.delete_program_day("x").await, Err(CoreError::Unauthorized));
        assert_eq!(repo.load_logs(10).await, Err(CoreError::Unauthorized));
        assert_eq!(
            repo.save_workout_log(&new_log("x", vec![])).await,
            Err(CoreError::Unauthorized)
        );
        assert_eq!(repo.load_body_weight_entries(10).await, Err(CoreError::Unauthorized));
        assert_eq!(repo.save_body_weight_entry(80.0, "").await, Err(CoreError::Unauthorized));
        assert_eq!(repo.delete_body_weight_entry("x").await, Err(CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_body_weight_range_and_order() {
        let repo = repo("ana").await;
        for bad in [19.9, 300.5, f64::NAN] {
            assert!(matches!(
                repo.save_body_weight_entry(bad, "").await,
                Err(CoreError::Validation(_))
            ));
        }

        repo.save_body_weight_entry(20.0, "low").await.unwrap();
        let id = repo.save_body_weight_entry(300.0, " high ").await.unwrap();

        let entries = repo.load_body_weight_entries(DEFAULT_BODY_WEIGHT_LIMIT).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].note, "high");

        repo.delete_body_weight_entry(&id).await.unwrap();
        assert_eq!(repo.load_body_weight_entries(10).await.unwrap().len(), 1);
    }
}
