use std::{collections::HashSet, fmt::Display};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{CoreError, CoreResult},
    models::{DayKind, ExercisePlan, ProgramDay, same_name, weekday_name},
};

/// A user's weekly program, kept sorted by day of week.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    days: Vec<ProgramDay>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramViolation {
    DuplicateDay { day_of_week: u8 },
    DayOutOfRange { day_of_week: u8 },
    EmptyDayName { day_of_week: u8 },
    EmptyExerciseName { day_of_week: u8, position: usize },
    NonContiguousOrder { day_of_week: u8 },
    NoTargetSets { day_of_week: u8, exercise: String },
    RestDayWithExercises { day_of_week: u8 },
}

impl Display for ProgramViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateDay { day_of_week } => {
                write!(f, "{} is planned more than once", weekday_name(*day_of_week))
            }
            Self::DayOutOfRange { day_of_week } => {
                write!(f, "day index {} is outside 0..=6", day_of_week)
            }
            Self::EmptyDayName { day_of_week } => {
                write!(f, "{} has no name", weekday_name(*day_of_week))
            }
            Self::EmptyExerciseName { day_of_week, position } => write!(
                f,
                "{}: exercise #{} has no name",
                weekday_name(*day_of_week),
                position + 1
            ),
            Self::NonContiguousOrder { day_of_week } => write!(
                f,
                "{}: exercise order is not contiguous from 0",
                weekday_name(*day_of_week)
            ),
            Self::NoTargetSets { day_of_week, exercise } => write!(
                f,
                "{}: `{}` needs at least one set",
                weekday_name(*day_of_week),
                exercise
            ),
            Self::RestDayWithExercises { day_of_week } => {
                write!(f, "{} is a rest day but lists exercises", weekday_name(*day_of_week))
            }
        }
    }
}

impl Program {
    pub fn new(mut days: Vec<ProgramDay>) -> Self {
        days.sort_by_key(|d| d.day_of_week);
        Self { days }
    }

    pub fn days(&self) -> &[ProgramDay] {
        &self.days
    }

    pub fn into_days(self) -> Vec<ProgramDay> {
        self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day_of_week: u8) -> Option<&ProgramDay> {
        self.days.iter().find(|d| d.day_of_week == day_of_week)
    }

    pub fn training_days(&self) -> impl Iterator<Item = &ProgramDay> {
        self.days.iter().filter(|d| !d.is_rest())
    }

    pub fn validate(&self) -> Vec<ProgramViolation> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();

        for day in &self.days {
            let dow = day.day_of_week;
            if !seen.insert(dow) {
                out.push(ProgramViolation::DuplicateDay { day_of_week: dow });
            }
            if dow > 6 {
                out.push(ProgramViolation::DayOutOfRange { day_of_week: dow });
            }
            out.extend(day_violations(day));
        }
        out
    }

    /// Insert the template day unless the slot is already taken.
    pub fn apply_template(mut self, day_of_week: u8, template: &DayTemplate) -> Program {
        if self.day(day_of_week).is_some() {
            debug!(day_of_week, "template day skipped, slot already planned");
            return self;
        }

        self.days.push(template.to_day(day_of_week));
        self.days.sort_by_key(|d| d.day_of_week);
        self
    }

    pub fn apply_week_template(self, template: &WeekTemplate) -> Program {
        template
            .days
            .iter()
            .fold(self, |program, slot| program.apply_template(slot.day, &slot.template))
    }

    /// Put `day` into its weekday slot, taking over the id of the day it replaces.
    ///
    /// The incoming id is ignored: slots are keyed by day of week. Returns the
    /// id the caller must pass to the repository as `existing_id`.
    pub fn upsert_day(&mut self, mut day: ProgramDay) -> Option<String> {
        match self.days.iter_mut().find(|d| d.day_of_week == day.day_of_week) {
            Some(slot) => {
                day.id = slot.id.clone();
                *slot = day;
                slot.id.clone()
            }
            None => {
                day.id = None;
                self.days.push(day);
                self.days.sort_by_key(|d| d.day_of_week);
                None
            }
        }
    }

    pub fn remove_day(&mut self, day_of_week: u8) -> Option<ProgramDay> {
        let pos = self.days.iter().position(|d| d.day_of_week == day_of_week)?;
        Some(self.days.remove(pos))
    }
}

fn day_violations(day: &ProgramDay) -> Vec<ProgramViolation> {
    let dow = day.day_of_week;
    let mut out = Vec::new();

    if day.name.trim().is_empty() {
        out.push(ProgramViolation::EmptyDayName { day_of_week: dow });
    }
    if day.is_rest() && !day.exercises.is_empty() {
        out.push(ProgramViolation::RestDayWithExercises { day_of_week: dow });
    }

    let mut orders: Vec<u32> = day.exercises.iter().map(|e| e.order).collect();
    orders.sort_unstable();
    if orders.iter().enumerate().any(|(i, o)| *o != i as u32) {
        out.push(ProgramViolation::NonContiguousOrder { day_of_week: dow });
    }

    for (position, ex) in day.exercises.iter().enumerate() {
        if ex.name.trim().is_empty() {
            out.push(ProgramViolation::EmptyExerciseName { day_of_week: dow, position });
        }
        if ex.target_sets < 1 {
            out.push(ProgramViolation::NoTargetSets {
                day_of_week: dow,
                exercise: ex.name.clone(),
            });
        }
    }
    out
}

/// Exercise as entered for a program day, before ordering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanInput {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    #[serde(default)]
    pub note: String,
}

/// Normalize user input into a program day.
///
/// Names are trimmed, order is renumbered from 0 and rest days drop their
/// exercises.
pub fn build_day(
    day_of_week: u8,
    name: &str,
    kind: DayKind,
    exercises: Vec<PlanInput>,
) -> CoreResult<ProgramDay> {
    if day_of_week > 6 {
        return Err(CoreError::validation(format!("day {day_of_week} is outside 0..=6")));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::validation("day name is required"));
    }

    let exercises = if kind == DayKind::Rest {
        Vec::new()
    } else {
        exercises
    };

    let mut plans = Vec::with_capacity(exercises.len());
    for (order, ex) in exercises.into_iter().enumerate() {
        let ex_name = ex.name.trim();
        if ex_name.is_empty() {
            return Err(CoreError::validation(format!("exercise #{} has no name", order + 1)));
        }
        if ex.sets < 1 {
            return Err(CoreError::validation(format!("`{ex_name}` needs at least one set")));
        }
        let reps = ex.reps.trim();
        plans.push(ExercisePlan {
            name: ex_name.to_string(),
            target_sets: ex.sets,
            target_reps: if reps.is_empty() { "10".to_string() } else { reps.to_string() },
            note: ex.note.trim().to_string(),
            order: order as u32,
        });
    }

    Ok(ProgramDay {
        id: None,
        day_of_week,
        name: name.to_string(),
        kind,
        exercises: plans,
    })
}

/// One day of a built-in template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DayTemplate {
    pub name: String,
    pub kind: DayKind,
    #[serde(default)]
    pub exercises: Vec<PlanInput>,
}

impl DayTemplate {
    fn to_day(&self, day_of_week: u8) -> ProgramDay {
        let exercises = if self.kind == DayKind::Rest {
            Vec::new()
        } else {
            self.exercises
                .iter()
                .enumerate()
                .map(|(order, ex)| ExercisePlan {
                    name: ex.name.clone(),
                    target_sets: ex.sets.max(1),
                    target_reps: ex.reps.clone(),
                    note: ex.note.clone(),
                    order: order as u32,
                })
                .collect()
        };

        ProgramDay {
            id: None,
            day_of_week,
            name: self.name.clone(),
            kind: self.kind,
            exercises,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateSlot {
    pub day: u8,
    #[serde(flatten)]
    pub template: DayTemplate,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeekTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub days: Vec<TemplateSlot>,
}

#[derive(Deserialize)]
struct TemplateFile {
    template: Vec<WeekTemplate>,
}

static TEMPLATES: Lazy<Vec<WeekTemplate>> = Lazy::new(|| {
    let file: TemplateFile =
        toml::from_str(include_str!("templates.toml")).expect("built-in templates must parse");
    file.template
});

pub fn templates() -> &'static [WeekTemplate] {
    &TEMPLATES
}

pub fn template(name: &str) -> Option<&'static WeekTemplate> {
    let name = name.trim();
    TEMPLATES.iter().find(|t| same_name(&t.name, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, sets: u32) -> PlanInput {
        PlanInput { name: name.to_string(), sets, reps: "8".to_string(), note: String::new() }
    }

    fn day(dow: u8, name: &str) -> ProgramDay {
        build_day(dow, name, DayKind::Push, vec![plan("Bench Press", 3)]).unwrap()
    }

    #[test]
    fn test_builtin_templates_parse_and_validate() {
        assert!(templates().len() >= 3);
        for t in templates() {
            let program = Program::default().apply_week_template(t);
            assert!(program.validate().is_empty(), "template {} is invalid", t.name);
            assert_eq!(program.days().len(), t.days.len());
        }
        assert!(template("Push-Pull-Legs").is_some());
        assert!(template("bro-split").is_none());
    }

    #[test]
    fn test_apply_template_is_idempotent() {
        let tpl = DayTemplate {
            name: "Legs".to_string(),
            kind: DayKind::Legs,
            exercises: vec![plan("Squat", 4)],
        };

        let once = Program::default().apply_template(2, &tpl);
        let twice = once.clone().apply_template(2, &tpl);
        assert_eq!(once, twice);
        assert_eq!(twice.days().len(), 1);
        assert_eq!(twice.day(2).unwrap().exercises[0].name, "Squat");
    }

    #[test]
    fn test_apply_template_never_overwrites() {
        let mut program = Program::default();
        program.upsert_day(day(0, "My Monday"));

        let tpl = template("push-pull-legs").unwrap();
        let program = program.apply_week_template(tpl);
        assert_eq!(program.day(0).unwrap().name, "My Monday");
        assert_eq!(program.day(1).unwrap().name, "Pull A");
        assert_eq!(program.days().len(), 7);
    }

    #[test]
    fn test_upsert_keeps_one_day_per_weekday() {
        let mut program = Program::default();
        let edits = [(0, "A"), (3, "B"), (0, "C"), (6, "D"), (3, "E"), (0, "F")];
        for (dow, name) in edits {
            program.upsert_day(day(dow, name));
        }

        let dows: Vec<u8> = program.days().iter().map(|d| d.day_of_week).collect();
        assert_eq!(dows, vec![0, 3, 6]);
        assert_eq!(program.day(0).unwrap().name, "F");
        assert!(program.validate().is_empty());
    }

    #[test]
    fn test_upsert_takes_over_existing_id() {
        let mut stored = day(1, "Pull");
        stored.id = Some("day-1".to_string());
        let mut program = Program::new(vec![stored]);

        let existing = program.upsert_day(day(1, "Pull v2"));
        assert_eq!(existing.as_deref(), Some("day-1"));
        assert_eq!(program.day(1).unwrap().id.as_deref(), Some("day-1"));
        assert_eq!(program.upsert_day(day(2, "Legs")), None);
    }

    #[test]
    fn test_remove_and_training_days() {
        let tpl = template("push-pull-legs").unwrap();
        let mut program = Program::default().apply_week_template(tpl);
        assert_eq!(program.training_days().count(), 6);

        let removed = program.remove_day(6).unwrap();
        assert!(removed.is_rest());
        assert!(program.remove_day(6).is_none());
        assert_eq!(program.into_days().len(), 6);
    }

    #[test]
    fn test_validate_reports_violations() {
        let mut a = day(0, "Push");
        a.exercises.push(ExercisePlan {
            name: "Dips".to_string(),
            target_sets: 0,
            target_reps: "10".to_string(),
            note: String::new(),
            order: 3,
        });
        let b = day(0, "Push again");
        let mut rest = day(5, "Off");
        rest.kind = DayKind::Rest;

        let violations = Program::new(vec![a, b, rest]).validate();
        assert!(violations.contains(&ProgramViolation::DuplicateDay { day_of_week: 0 }));
        assert!(violations.contains(&ProgramViolation::NonContiguousOrder { day_of_week: 0 }));
        assert!(violations.contains(&ProgramViolation::NoTargetSets {
            day_of_week: 0,
            exercise: "Dips".to_string()
        }));
        assert!(violations.contains(&ProgramViolation::RestDayWithExercises { day_of_week: 5 }));
    }

    #[test]
    fn test_build_day_normalizes_input() {
        let d = build_day(
            4,
            "  Upper ",
            DayKind::Full,
            vec![plan(" Row ", 3), PlanInput { reps: " ".into(), ..plan("Curl", 2) }],
        )
        .unwrap();
        assert_eq!(d.name, "Upper");
        assert_eq!(d.exercises[0].name, "Row");
        assert_eq!(d.exercises[1].order, 1);
        assert_eq!(d.exercises[1].target_reps, "10");

        let rest = build_day(6, "Sunday", DayKind::Rest, vec![plan("Walk", 1)]).unwrap();
        assert!(rest.exercises.is_empty());
    }

    #[test]
    fn test_build_day_rejects_bad_input() {
        assert!(matches!(
            build_day(0, " ", DayKind::Push, vec![]),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            build_day(7, "X", DayKind::Push, vec![]),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            build_day(0, "X", DayKind::Push, vec![plan("Bench", 0)]),
            Err(CoreError::Validation(_))
        ));
    }
}
