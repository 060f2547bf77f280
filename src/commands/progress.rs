use anyhow::Result;
use colored::Colorize;
use ironlog::{
    history::HistoryIndex,
    models::same_name,
    types::{emit, trim_num},
    views::{self, ProgressView},
};

use super::{Ctx, fmt_date, graph::print_graph};

fn pretty_print(view: &ProgressView, graph: bool) {
    println!(
        "{} {} {}",
        "Progress:".cyan().bold(),
        view.exercise.bold(),
        format!("– {} sessions", view.points.len()).dimmed()
    );
    if view.is_personal_record {
        println!("{}", " 🏆 personal record in the latest session".yellow().bold());
    }
    if let Some(best) = view.best_set {
        println!(
            " est. 1RM {} kg (from {} kg × {})",
            trim_num(best.one_rm).bold(),
            trim_num(best.kg),
            best.reps
        );
    }
    println!(" all-time max {} kg", trim_num(view.all_time_max_kg));

    if graph {
        let series: Vec<_> = view.points.iter().map(|p| (p.date, p.max_kg)).collect();
        print_graph(&series, &format!("{} max kg", view.exercise));
        return;
    }

    for p in &view.points {
        println!(
            "  {}  {:>7} kg max  {:>9} kg",
            fmt_date(p.date).dimmed(),
            trim_num(p.max_kg),
            trim_num(p.volume)
        );
    }
}

pub async fn handle(exercise: Vec<String>, graph: bool, ctx: &Ctx) -> Result<()> {
    let logs = ctx.logs().await?;
    let history = HistoryIndex::new(&logs);

    let names = history.exercise_names();

    let wanted = exercise.join(" ");
    let selected = (!wanted.trim().is_empty()).then_some(wanted.trim());

    if let Some(w) = selected {
        if !names.iter().any(|n| same_name(n, w)) {
            match history.closest_exercise_name(w) {
                Some(s) => println!(
                    "{} no history for `{}` -- did you mean: `{}`?",
                    "warning:".yellow().bold(),
                    w,
                    s.green()
                ),
                None => println!("{} no history for `{}`", "warning:".yellow().bold(), w),
            }
            return Ok(());
        }
    }

    let Some(name) = views::resolve_selection(&names, selected) else {
        println!("{}", "  (no workouts logged yet)".dimmed());
        return Ok(());
    };

    let view = views::progress(&history, &name);
    emit(ctx.fmt, &view, || pretty_print(&view, graph));
    Ok(())
}
