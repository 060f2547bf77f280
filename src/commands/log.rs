use anyhow::Result;
use colored::Colorize;
use ironlog::{
    metrics::{best_one_rep_max, log_volume, total_volume},
    models::WorkoutLog,
    repository::Repository,
    types::{emit, pad_plain, plain_len, trim_num},
    views::LogSummary,
};

use super::{Ctx, fmt_date, fmt_datetime, nth};
use crate::cli::LogCmd;

fn print_list(logs: &[LogSummary]) {
    if logs.is_empty() {
        println!("{}", "  (no workouts logged yet)".dimmed());
        return;
    }
    println!("{}", "Workouts:".cyan().bold());

    let idx_w = logs.len().to_string().len();
    let left: Vec<String> = logs
        .iter()
        .enumerate()
        .map(|(i, l)| {
            format!(" {} • {}", format!("{:>idx_w$}", i + 1).yellow(), l.name.bold())
        })
        .collect();
    let pad = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);

    for (l, log) in left.iter().zip(logs) {
        println!(
            "{} {} {} {}",
            pad_plain(l, pad),
            "|".blue(),
            fmt_date(log.date).dimmed(),
            format!("– {} exercises, {} kg", log.exercise_count, trim_num(log.volume)).dimmed()
        );
    }
}

fn print_log(log: &WorkoutLog) {
    println!(
        "{} {} {}",
        "Workout:".cyan().bold(),
        log.name.bold(),
        format!("– {} • {} kg", fmt_datetime(log.date), trim_num(log_volume(log))).dimmed()
    );

    for (i, ex) in log.exercises.iter().enumerate() {
        let best = best_one_rep_max(&ex.sets)
            .filter(|b| b.one_rm > 0.0)
            .map(|b| format!(" • est. 1RM {} kg", trim_num(b.one_rm)))
            .unwrap_or_default();
        println!(
            "\n{} {} {}",
            format!("{}.", i + 1).yellow(),
            ex.name.bold(),
            format!("({} kg{})", trim_num(total_volume(&ex.sets)), best).dimmed()
        );
        if !ex.note.is_empty() {
            println!("   {}", ex.note.dimmed());
        }
        for set in &ex.sets {
            let mark = if set.done { "●".green() } else { "○".dimmed() };
            println!("   {} Set {}: {} kg × {}", mark, set.index + 1, trim_num(set.kg), set.reps);
        }
    }
}

pub async fn handle(cmd: LogCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        LogCmd::List { limit } => {
            let logs = ctx.repo.load_logs(limit).await?;
            let list: Vec<LogSummary> = logs.iter().map(LogSummary::from).collect();
            emit(ctx.fmt, &list, || print_list(&list));
        }

        LogCmd::Show { n } => {
            let logs = ctx.logs().await?;
            let log = nth(&logs, n, "workout")?;
            emit(ctx.fmt, log, || print_log(log));
        }
    }
    Ok(())
}
