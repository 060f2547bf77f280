use anyhow::Result;
use colored::Colorize;
use ironlog::{
    error::CoreError,
    models::{ProgramDay, weekday_name},
    program::{self, Program, build_day},
    repository::Repository,
    types::{emit, pad_plain, plain_len},
};
use serde::Serialize;
use strsim::jaro_winkler;

use super::Ctx;
use crate::cli::ProgramCmd;

#[derive(Serialize)]
struct TemplateJson<'a> {
    name: &'a str,
    description: &'a str,
    days: Vec<(u8, &'a str)>,
}

fn print_day(day: &ProgramDay) {
    println!(
        "{} {} {}",
        format!("{}:", day.weekday_name()).cyan().bold(),
        day.name.bold(),
        format!("[{}]", day.kind.label()).magenta()
    );
    if day.is_rest() {
        println!("{}", "  rest day".dimmed());
        return;
    }
    if day.exercises.is_empty() {
        println!("{}", "  (no exercises)".dimmed());
        return;
    }

    let left: Vec<String> = day
        .exercises
        .iter()
        .map(|e| format!(" {} • {}", format!("{}", e.order + 1).yellow(), e.name.bold()))
        .collect();
    let pad = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);

    for (l, e) in left.iter().zip(&day.exercises) {
        let note = if e.note.is_empty() {
            String::new()
        } else {
            format!(" – {}", e.note).dimmed().to_string()
        };
        println!(
            "{} {} {} × {}{}",
            pad_plain(l, pad),
            "|".blue(),
            e.target_sets,
            e.target_reps,
            note
        );
    }
}

fn pretty_print(program: &Program) {
    if program.is_empty() {
        println!("{}", "  (no program yet - try `ironlog program templates`)".dimmed());
        return;
    }
    println!("{}", "Program:".cyan().bold());
    for dow in 0..7u8 {
        match program.day(dow) {
            Some(day) if day.is_rest() => {
                println!(" {:<9} {} {}", weekday_name(dow), day.name, "[REST]".dimmed())
            }
            Some(day) => println!(
                " {:<9} {} {} {}",
                weekday_name(dow),
                day.name.bold(),
                format!("[{}]", day.kind.label()).magenta(),
                format!("{} exercises, {} sets", day.exercises.len(), day.total_target_sets())
                    .dimmed()
            ),
            None => println!(" {:<9} {}", weekday_name(dow), "-".dimmed()),
        }
    }
}

fn suggest_template(name: &str) -> Option<&'static str> {
    const MIN_SCORE: f64 = 0.80;
    program::templates()
        .iter()
        .map(|t| (t.name.as_str(), jaro_winkler(&name.to_lowercase(), &t.name)))
        .filter(|(_, score)| *score >= MIN_SCORE)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n)
}

pub async fn handle(cmd: ProgramCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        ProgramCmd::List => {
            let program = ctx.program().await?;
            emit(ctx.fmt, &program, || pretty_print(&program));
        }

        ProgramCmd::Show { day } => {
            let program = ctx.program().await?;
            match program.day(day) {
                Some(d) => emit(ctx.fmt, d, || print_day(d)),
                None => println!(
                    "{} nothing planned on {}",
                    "warning:".yellow().bold(),
                    weekday_name(day)
                ),
            }
        }

        ProgramCmd::SetDay { day, name, kind, exercises } => {
            let program = ctx.program().await?;
            let new_day = build_day(day, &name, kind, exercises)?;
            let existing = program.day(day).and_then(|d| d.id.clone());

            let id = ctx.repo.save_program_day(&new_day, existing.as_deref()).await?;
            let verb = if existing.is_some() { "replaced" } else { "planned" };
            println!(
                "{} {} {} `{}` (id: {})",
                "ok:".green().bold(),
                verb,
                weekday_name(day),
                new_day.name,
                id
            );
        }

        ProgramCmd::Delete { day } => {
            let program = ctx.program().await?;
            let id = program
                .day(day)
                .and_then(|d| d.id.clone())
                .ok_or_else(|| {
                    CoreError::validation(format!("nothing planned on {}", weekday_name(day)))
                })?;
            ctx.repo.delete_program_day(&id).await?;
            println!("{} removed {}", "ok:".green().bold(), weekday_name(day));
        }

        ProgramCmd::Templates => {
            let list: Vec<TemplateJson> = program::templates()
                .iter()
                .map(|t| TemplateJson {
                    name: &t.name,
                    description: &t.description,
                    days: t.days.iter().map(|s| (s.day, s.template.name.as_str())).collect(),
                })
                .collect();

            emit(ctx.fmt, &list, || {
                println!("{}", "Templates:".cyan().bold());
                for t in &list {
                    println!(" • {} {}", t.name.bold(), format!("– {}", t.description).dimmed());
                    for (dow, name) in &t.days {
                        println!("     {:<9} {}", weekday_name(*dow), name);
                    }
                }
            });
        }

        ProgramCmd::Template { name } => {
            let Some(tpl) = program::template(&name) else {
                match suggest_template(&name) {
                    Some(s) => println!(
                        "{} no template `{}` -- did you mean: `{}`?",
                        "error:".red().bold(),
                        name,
                        s.green()
                    ),
                    None => println!(
                        "{} no template `{}` - see `ironlog program templates`",
                        "error:".red().bold(),
                        name
                    ),
                }
                return Ok(());
            };

            let filled = ctx.program().await?.apply_week_template(tpl);
            let mut added = 0;
            for day in filled.days().iter().filter(|d| d.id.is_none()) {
                ctx.repo.save_program_day(day, None).await?;
                println!(
                    "  {} {}",
                    format!("{:<9}", day.weekday_name()).yellow(),
                    day.name.bold()
                );
                added += 1;
            }

            let skipped = tpl.days.len() - added;
            println!(
                "{} applied `{}`: {} day(s) added, {} kept",
                "ok:".green().bold(),
                tpl.name,
                added,
                skipped
            );
        }

        ProgramCmd::Check => {
            let program = ctx.program().await?;
            let issues: Vec<String> = program.validate().iter().map(|v| v.to_string()).collect();
            emit(ctx.fmt, &issues, || {
                if issues.is_empty() {
                    println!("{} program looks good", "ok:".green().bold());
                }
                for issue in &issues {
                    println!("{} {}", "warning:".yellow().bold(), issue);
                }
            });
        }
    }
    Ok(())
}
