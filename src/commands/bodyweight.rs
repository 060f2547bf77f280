use anyhow::Result;
use colored::Colorize;
use ironlog::{
    repository::{DEFAULT_BODY_WEIGHT_LIMIT, Repository},
    types::{emit, signed, trim_num},
    views::{self, BodyWeightView},
};

use super::{Ctx, fmt_date, graph::print_graph, nth};
use crate::cli::BwCmd;

fn change(v: Option<f64>) -> String {
    match v {
        Some(d) if d > 0.0 => signed(d).red().to_string(),
        Some(d) if d < 0.0 => signed(d).green().to_string(),
        Some(d) => signed(d),
        None => String::new(),
    }
}

fn pretty_print(view: &BodyWeightView, graph: bool) {
    let Some(latest) = &view.latest else {
        println!("{}", "  (no body weight entries yet)".dimmed());
        return;
    };

    println!(
        "{} {} kg {}",
        "Body weight:".cyan().bold(),
        trim_num(latest.weight).bold(),
        fmt_date(latest.date).dimmed()
    );
    if let (Some(min), Some(max)) = (view.min, view.max) {
        println!(" range {} – {} kg", trim_num(min), trim_num(max));
    }
    if view.net_change.is_some() {
        println!(" overall {} kg", change(view.net_change));
    }

    if graph {
        print_graph(&view.series, "Body weight (kg)");
        return;
    }

    println!();
    for (i, row) in view.recent.iter().enumerate() {
        let note = if row.note.is_empty() {
            String::new()
        } else {
            format!(" – {}", row.note).dimmed().to_string()
        };
        println!(
            " {} • {} {:>6} kg {}{}",
            format!("{:>2}", i + 1).yellow(),
            fmt_date(row.date).dimmed(),
            trim_num(row.weight),
            change(row.change),
            note
        );
    }
}

pub async fn handle(cmd: BwCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        BwCmd::Add { weight, note } => {
            let id = ctx.repo.save_body_weight_entry(weight, &note).await?;
            println!("{} recorded {} kg (id: {})", "ok:".green().bold(), trim_num(weight), id);
        }

        BwCmd::List { graph } => {
            let entries = ctx.repo.load_body_weight_entries(DEFAULT_BODY_WEIGHT_LIMIT).await?;
            let view = views::body_weight(&entries);
            emit(ctx.fmt, &view, || pretty_print(&view, graph));
        }

        BwCmd::Delete { n } => {
            let entries = ctx.repo.load_body_weight_entries(DEFAULT_BODY_WEIGHT_LIMIT).await?;
            let entry = nth(&entries, n, "entry")?;
            ctx.repo.delete_body_weight_entry(&entry.id).await?;
            println!(
                "{} deleted {} kg from {}",
                "ok:".green().bold(),
                trim_num(entry.weight),
                fmt_date(entry.date)
            );
        }
    }
    Ok(())
}
