use clap::{Parser, Subcommand};
use ironlog::{
    models::{DayKind, parse_weekday},
    program::PlanInput,
    session::DEFAULT_NEW_SETS,
};

#[derive(Parser)]
#[command(name = "ironlog", version, about = "Weekly training planner and workout log")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// User id to act as (overrides the `user` config key)
    #[arg(global = true, long, env = "IRONLOG_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Weekly overview, streak and recent workouts
    #[command(visible_alias = "h")]
    Home,

    /// Weekly program management
    #[command(subcommand, visible_alias = "p")]
    Program(ProgramCmd),

    /// Workout in progress
    #[command(subcommand, visible_alias = "w")]
    Workout(WorkoutCmd),

    /// Saved workouts
    #[command(subcommand, visible_alias = "l")]
    Log(LogCmd),

    /// Compare two saved workouts - Usage: compare [A] [B]
    #[command(visible_alias = "cmp")]
    Compare {
        /// Position of the first workout (from `log list`)
        #[arg(default_value_t = 1)]
        a: usize,

        /// Position of the second workout (from `log list`)
        #[arg(default_value_t = 2)]
        b: usize,
    },

    /// Progress of a single exercise over time
    #[command(visible_alias = "pr")]
    Progress {
        /// Exercise name (defaults to the most recent one)
        exercise: Vec<String>,

        /// Show progression graph
        #[arg(short, long)]
        graph: bool,
    },

    /// Body weight tracking
    #[command(subcommand)]
    Bw(BwCmd),

    /// View or edit ironlog config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum ProgramCmd {
    /// Show the whole week
    #[command(visible_alias = "l")]
    List,

    /// Show a single day in detail
    #[command(visible_alias = "s")]
    Show {
        /// Day of week: 0-6 (Monday = 0) or a name like `mon`
        #[arg(value_parser = parse_day)]
        day: u8,
    },

    /// Create or replace the plan for one weekday
    #[command(override_usage = "program set-day <DAY> --name <NAME> --kind <KIND> [-e NAME:SETS:REPS[:NOTE]]...")]
    SetDay {
        #[arg(value_parser = parse_day)]
        day: u8,

        /// Day name, e.g. "Push A"
        #[arg(short, long)]
        name: String,

        #[arg(short, long, value_enum)]
        kind: DayKind,

        /// Planned exercise as NAME:SETS:REPS[:NOTE], repeatable
        #[arg(short, long = "exercise", value_parser = parse_plan)]
        exercises: Vec<PlanInput>,
    },

    /// Remove the plan for one weekday
    #[command(visible_alias = "d")]
    Delete {
        #[arg(value_parser = parse_day)]
        day: u8,
    },

    /// List built-in weekly templates
    #[command(visible_alias = "t")]
    Templates,

    /// Fill empty weekdays from a built-in template
    Template {
        /// Template name (from `program templates`)
        name: String,
    },

    /// Check the program for inconsistencies
    Check,
}

#[derive(Subcommand)]
pub enum WorkoutCmd {
    /// Start the planned workout for a day (defaults to today)
    #[command(visible_alias = "s")]
    Start {
        #[arg(value_parser = parse_day)]
        day: Option<u8>,
    },

    /// Start an empty workout outside the program
    StartAdhoc {
        /// Workout name
        name: String,
    },

    /// Show the workout in progress
    #[command(visible_alias = "i")]
    Show,

    /// Enter weight and/or reps for a set - Usage: workout set EX SET [--kg KG] [--reps REPS]
    #[command(visible_alias = "e")]
    Set {
        /// 1-based exercise index (same order shown in `workout show`)
        #[arg(value_name = "EX")]
        exercise: usize,

        /// 1-based set index
        #[arg(value_name = "SET")]
        set: usize,

        #[arg(short, long)]
        kg: Option<String>,

        #[arg(short, long)]
        reps: Option<String>,
    },

    /// Mark a set as done
    #[command(visible_alias = "d")]
    Done {
        #[arg(value_name = "EX")]
        exercise: usize,

        #[arg(value_name = "SET")]
        set: usize,

        /// Mark the set as not done instead
        #[arg(short, long)]
        undo: bool,
    },

    /// Append an empty set to an exercise
    AddSet {
        #[arg(value_name = "EX")]
        exercise: usize,
    },

    /// Drop the last set of an exercise (keeps at least one)
    RemoveSet {
        #[arg(value_name = "EX")]
        exercise: usize,
    },

    /// Add an exercise to the workout
    AddEx {
        name: String,

        /// Number of sets
        #[arg(short, long, default_value_t = DEFAULT_NEW_SETS)]
        sets: u32,

        /// Target reps, e.g. "8-10"
        #[arg(short, long)]
        reps: Option<String>,
    },

    /// Suggest the next working weight from the last session
    Suggest {
        #[arg(value_name = "EX")]
        exercise: usize,

        /// Write the suggested weight into every set
        #[arg(short, long)]
        apply: bool,
    },

    /// Save the workout to the log
    #[command(visible_alias = "f")]
    Finish,

    /// Throw the workout away without saving
    #[command(visible_alias = "c")]
    Cancel,
}

#[derive(Subcommand)]
pub enum LogCmd {
    /// List saved workouts, newest first
    #[command(visible_alias = "l")]
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Show one saved workout
    #[command(visible_alias = "s")]
    Show {
        /// Position from `log list`
        n: usize,
    },
}

#[derive(Subcommand)]
pub enum BwCmd {
    /// Record today's body weight in kg
    #[command(visible_alias = "a")]
    Add {
        weight: f64,

        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Show body weight history
    #[command(visible_alias = "l")]
    List {
        /// Show weight graph
        #[arg(short, long)]
        graph: bool,
    },

    /// Delete an entry
    #[command(visible_alias = "d")]
    Delete {
        /// Position from `bw list`
        n: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}

fn parse_day(s: &str) -> Result<u8, String> {
    parse_weekday(s).ok_or_else(|| format!("`{s}` is not a day (use 0-6 or a name like `mon`)"))
}

/// `NAME:SETS:REPS[:NOTE]`; sets default to 3 and reps to "10" when left empty.
fn parse_plan(s: &str) -> Result<PlanInput, String> {
    let mut parts = s.splitn(4, ':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err("exercise name is required".to_string());
    }

    let sets = match parts.next() {
        None | Some("") => DEFAULT_NEW_SETS,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("`{raw}` is not a set count"))?,
    };

    Ok(PlanInput {
        name: name.to_string(),
        sets,
        reps: parts.next().unwrap_or_default().to_string(),
        note: parts.next().unwrap_or_default().to_string(),
    })
}
