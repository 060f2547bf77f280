use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use ironlog::{
    types::{emit, trim_num},
    views::{self, DayStatus, HomeView},
};

use super::{Ctx, fmt_date};

fn pretty_print(view: &HomeView, in_progress: Option<&str>) {
    println!(
        "{} {} workouts • {} kg this week • {} in the last 30 days • streak {}",
        "Overview:".cyan().bold(),
        view.total_logs.to_string().bold(),
        trim_num(view.week_volume).bold(),
        view.month_logs,
        format!("{} day(s)", view.streak).green().bold(),
    );

    if let Some(name) = in_progress {
        println!(
            "{} workout `{}` in progress - `ironlog workout show`",
            "info:".blue().bold(),
            name
        );
    }

    println!("\n{}", "This week:".cyan().bold());
    for day in &view.days {
        let marker = if day.is_today { "▶".yellow().bold() } else { " ".normal() };
        let weekday = format!("{:<9}", day.weekday);
        let weekday = if day.is_today { weekday.bold() } else { weekday.normal() };
        let detail = match &day.status {
            DayStatus::Training { name, kind, exercise_count, total_sets } => format!(
                "{} {} – {} exercises, {} sets",
                name.bold(),
                format!("[{}]", kind.label()).magenta(),
                exercise_count,
                total_sets
            ),
            DayStatus::Rest { name } => format!("{} {}", name, "[REST]".dimmed()),
            DayStatus::Unplanned => "(nothing planned)".dimmed().to_string(),
        };
        println!(" {} {} {}", marker, weekday, detail);
    }

    println!("\n{}", "Recent workouts:".cyan().bold());
    if view.recent.is_empty() {
        println!("{}", "  (no workouts logged yet)".dimmed());
        return;
    }
    for (i, log) in view.recent.iter().enumerate() {
        println!(
            " {} • {} {} {}",
            format!("{:>2}", i + 1).yellow(),
            log.name.bold(),
            fmt_date(log.date).dimmed(),
            format!("{} exercises, {} kg", log.exercise_count, trim_num(log.volume)).dimmed()
        );
    }
}

pub async fn handle(ctx: &Ctx) -> Result<()> {
    let program = ctx.program().await?;
    let logs = ctx.logs().await?;
    let view = views::home(&program, &logs, Local::now());

    let draft = ctx.drafts.load(&ctx.user()?)?;
    emit(ctx.fmt, &view, || pretty_print(&view, draft.as_ref().map(|w| w.name.as_str())));
    Ok(())
}
