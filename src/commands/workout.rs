use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use ironlog::{
    error::CoreError,
    history::HistoryIndex,
    metrics::{suggested_progressive_weight, total_volume},
    models::weekday_name,
    session::WorkoutSession,
    types::{emit, signed, trim_num},
    views::{self, ActiveWorkoutView, day_of_week},
};
use tracing::warn;

use super::{Ctx, index};
use crate::cli::WorkoutCmd;

fn pretty_print(view: &ActiveWorkoutView) {
    println!(
        "{} {} {}",
        "Workout:".cyan().bold(),
        view.name.bold(),
        format!(
            "– started {} ({} elapsed), {}/{} sets done",
            view.started_at.format("%H:%M"),
            view.elapsed,
            view.done_sets,
            view.total_sets
        )
        .dimmed()
    );

    if view.exercises.is_empty() {
        println!("{}", "  (no exercises - add one with `ironlog workout add-ex`)".dimmed());
        return;
    }

    for (ex_idx, ex) in view.exercises.iter().enumerate() {
        let check = if ex.all_done { " ✓".green().bold() } else { "".normal() };
        println!(
            "\n{} {} {}{}",
            format!("{}.", ex_idx + 1).yellow(),
            ex.name.bold(),
            format!("(target {} reps)", ex.target_reps).dimmed(),
            check
        );
        if !ex.note.is_empty() {
            println!("   {}", ex.note.dimmed());
        }

        for (set_idx, set) in ex.sets.iter().enumerate() {
            let mark = if set.done { "●".green() } else { "○".dimmed() };
            let kg = if set.kg.is_empty() { "-" } else { set.kg.as_str() };
            let reps = if set.reps.is_empty() { "-" } else { set.reps.as_str() };
            let mut line = format!("   {} Set {}: {} kg × {}", mark, set_idx + 1, kg, reps);

            if let Some(prev) = &set.previous {
                line.push_str(
                    &format!(" (last: {} kg × {})", trim_num(prev.kg), prev.reps)
                        .dimmed()
                        .to_string(),
                );
            }
            if let Some(delta) = set.volume_delta {
                let d = format!(" {} kg vol", signed(delta));
                let d = if delta > 0.0 {
                    d.green()
                } else if delta < 0.0 {
                    d.red()
                } else {
                    d.normal()
                };
                line.push_str(&d.to_string());
            }
            println!("{}", line);
        }

        if let Some(s) = ex.suggestion {
            println!(
                "   {} try {} kg (last avg {} kg, +{})",
                "↑".blue().bold(),
                trim_num(s.suggested).bold(),
                trim_num(s.last_average),
                trim_num(s.increment)
            );
        }
    }
}

pub async fn handle(cmd: WorkoutCmd, ctx: &Ctx) -> Result<()> {
    let user = ctx.user()?;
    let mut session = WorkoutSession::new();
    if let Some(draft) = ctx.drafts.load(&user)? {
        session.resume(draft);
    }

    match cmd {
        WorkoutCmd::Start { day } => {
            let now = Local::now();
            let dow = day.unwrap_or_else(|| day_of_week(now));
            let program = ctx.program().await?;
            let planned = program.day(dow).ok_or_else(|| {
                CoreError::validation(format!(
                    "nothing planned on {} - use `ironlog workout start-adhoc <NAME>`",
                    weekday_name(dow)
                ))
            })?;

            if let Some(old) = session.start(planned, now)? {
                warn!(user = %user, name = %old.name, "unsaved workout overwritten");
                println!(
                    "{} unsaved workout `{}` was discarded",
                    "warning:".yellow().bold(),
                    old.name
                );
            }
            return show_after_save(&session, ctx, &user, "workout started").await;
        }

        WorkoutCmd::StartAdhoc { name } => {
            if let Some(old) = session.start_ad_hoc(&name, Local::now())? {
                warn!(user = %user, name = %old.name, "unsaved workout overwritten");
                println!(
                    "{} unsaved workout `{}` was discarded",
                    "warning:".yellow().bold(),
                    old.name
                );
            }
            return show_after_save(&session, ctx, &user, "workout started").await;
        }

        WorkoutCmd::Show => {
            let Some(workout) = session.active() else {
                println!(
                    "{} no workout in progress - start one with `ironlog workout start`",
                    "info:".blue().bold()
                );
                return Ok(());
            };
            let logs = ctx.logs().await?;
            let history = HistoryIndex::new(&logs);
            let view = views::active_workout(workout, &history, &ctx.rules, Local::now());
            emit(ctx.fmt, &view, || pretty_print(&view));
            return Ok(());
        }

        WorkoutCmd::Set { exercise, set, kg, reps } => {
            if kg.is_none() && reps.is_none() {
                return Err(CoreError::validation("nothing to change - pass --kg and/or --reps").into());
            }
            let (ex, s) = (index(exercise, "exercise")?, index(set, "set")?);
            if let Some(kg) = &kg {
                session.set_kg(ex, s, kg)?;
            }
            if let Some(reps) = &reps {
                session.set_reps(ex, s, reps)?;
            }
            println!("{} updated set {}-{}", "ok:".green().bold(), exercise, set);
        }

        WorkoutCmd::Done { exercise, set, undo } => {
            session.set_done(index(exercise, "exercise")?, index(set, "set")?, !undo)?;
            let state = if undo { "not done" } else { "done" };
            println!("{} set {}-{} marked {}", "ok:".green().bold(), exercise, set, state);
        }

        WorkoutCmd::AddSet { exercise } => {
            let count = session.add_set(index(exercise, "exercise")?)?;
            println!("{} exercise {} now has {} sets", "ok:".green().bold(), exercise, count);
        }

        WorkoutCmd::RemoveSet { exercise } => {
            if session.remove_last_set(index(exercise, "exercise")?)? {
                println!("{} removed last set of exercise {}", "ok:".green().bold(), exercise);
            } else {
                println!(
                    "{} exercise {} keeps its only set",
                    "warning:".yellow().bold(),
                    exercise
                );
                return Ok(());
            }
        }

        WorkoutCmd::AddEx { name, sets, reps } => {
            let logs = ctx.logs().await?;
            let history = HistoryIndex::new(&logs);
            if history.most_recent_occurrence(&name).is_none() {
                if let Some(known) = history.closest_exercise_name(&name) {
                    println!(
                        "{} `{}` is new -- did you mean: `{}`?",
                        "info:".blue().bold(),
                        name,
                        known.green()
                    );
                }
            }

            let pos = session.add_exercise(&name, Some(sets), reps.as_deref())?;
            println!("{} added `{}` as exercise {}", "ok:".green().bold(), name.trim(), pos);
        }

        WorkoutCmd::Suggest { exercise, apply } => {
            let ex = index(exercise, "exercise")?;
            let name = match session.active() {
                Some(w) => w.exercise(ex)?.name.clone(),
                None => return Err(CoreError::validation("no workout in progress").into()),
            };

            let logs = ctx.logs().await?;
            let history = HistoryIndex::new(&logs);
            let Some(s) = suggested_progressive_weight(&history, &name, &ctx.rules) else {
                println!("{} no history for `{}` yet", "info:".blue().bold(), name);
                return Ok(());
            };

            println!(
                "{} {} kg for `{}` (last avg {} kg, +{})",
                "suggest:".blue().bold(),
                trim_num(s.suggested).bold(),
                name,
                trim_num(s.last_average),
                trim_num(s.increment)
            );
            if !apply {
                return Ok(());
            }
            session.apply_weight(ex, s.suggested)?;
            println!("{} applied to every set", "ok:".green().bold());
        }

        WorkoutCmd::Finish => {
            let summary = session.active().map(|w| {
                let volume: f64 =
                    w.to_new_log().exercises.iter().map(|e| total_volume(&e.sets)).sum();
                (w.name.clone(), volume, Local::now() - w.started_at)
            });

            // A failed save leaves the draft file untouched.
            let log_id = session.finish(&ctx.repo).await?;
            ctx.drafts.settle(&user);

            if let Some((name, volume, took)) = summary {
                println!(
                    "{} saved `{}` – {} kg in {} minutes (id: {})",
                    "ok:".green().bold(),
                    name,
                    trim_num(volume),
                    took.num_minutes(),
                    log_id
                );
            }
            return Ok(());
        }

        WorkoutCmd::Cancel => {
            match session.discard() {
                Some(w) => {
                    ctx.drafts.clear(&user)?;
                    println!("{} discarded `{}`", "ok:".green().bold(), w.name);
                }
                None => println!("{} no workout in progress", "info:".blue().bold()),
            }
            return Ok(());
        }
    }

    // Every edit that reaches here changed the draft.
    if let Some(w) = session.active() {
        ctx.drafts.save(&user, w)?;
    }
    Ok(())
}

async fn show_after_save(
    session: &WorkoutSession,
    ctx: &Ctx,
    user: &str,
    msg: &str,
) -> Result<()> {
    let Some(workout) = session.active() else {
        return Ok(());
    };
    ctx.drafts.save(user, workout)?;

    let logs = ctx.logs().await?;
    let history = HistoryIndex::new(&logs);
    let view = views::active_workout(workout, &history, &ctx.rules, Local::now());
    emit(ctx.fmt, &view, || {
        println!("{} {}", "ok:".green().bold(), msg);
        pretty_print(&view);
    });
    Ok(())
}
