use anyhow::Result;
use colored::Colorize;
use ironlog::{
    types::{emit, signed, trim_num},
    views::{self, ComparisonView, SideStats},
};

use super::{Ctx, fmt_date, nth};

fn side(stats: Option<SideStats>) -> String {
    match stats {
        Some(s) => format!("{} kg max, {} kg", trim_num(s.max_kg), trim_num(s.volume)),
        None => "-".to_string(),
    }
}

fn delta(v: Option<f64>) -> String {
    match v {
        Some(d) if d > 0.0 => signed(d).green().to_string(),
        Some(d) if d < 0.0 => signed(d).red().to_string(),
        Some(d) => signed(d),
        None => String::new(),
    }
}

fn pretty_print(view: &ComparisonView) {
    println!(
        "{} {} ({}) {} {} ({})",
        "Compare:".cyan().bold(),
        view.a.name.bold(),
        fmt_date(view.a.date).dimmed(),
        "→".blue(),
        view.b.name.bold(),
        fmt_date(view.b.date).dimmed()
    );

    let name_w = view.exercises.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);
    for ex in &view.exercises {
        println!(
            " {:<name_w$}  {:<22} {:<22} {}",
            ex.name,
            side(ex.a),
            side(ex.b),
            delta(ex.max_kg_delta)
        );
    }
    println!(
        "\n {} {} kg → {} kg ({})",
        "Volume:".bold(),
        trim_num(view.a.volume),
        trim_num(view.b.volume),
        delta(Some(view.volume_delta))
    );
}

pub async fn handle(a: usize, b: usize, ctx: &Ctx) -> Result<()> {
    let logs = ctx.logs().await?;
    let id_a = nth(&logs, a, "workout")?.id.clone();
    let id_b = nth(&logs, b, "workout")?.id.clone();

    let view = views::comparison(&logs, &id_a, &id_b)?;
    emit(ctx.fmt, &view, || pretty_print(&view));
    Ok(())
}
