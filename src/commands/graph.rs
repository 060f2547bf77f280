use chrono::{DateTime, Local};
use colored::Colorize;

/// ASCII line chart of `data` (oldest first).
pub fn ascii_graph(
    data: &[(DateTime<Local>, f64)],
    width: usize,
    height: usize,
    title: &str,
) -> Vec<String> {
    if data.len() < 2 {
        return vec!["Not enough data for a graph".to_string()];
    }
    let width = width.max(2);
    let height = height.max(2);

    let min_value = data.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max_value = data.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let range = max_value - min_value;

    if range == 0.0 {
        return vec!["No variation in data".to_string()];
    }

    let col = |i: usize| (i as f64 / (data.len() - 1) as f64 * (width - 1) as f64) as usize;
    let row = |v: f64| height - 1 - ((v - min_value) / range * (height - 1) as f64) as usize;

    let mut grid = vec![vec![' '; width]; height];

    for (i, (_, value)) in data.iter().enumerate() {
        let (x, y) = (col(i), row(*value));
        grid[y][x] = '●';

        if i > 0 {
            let (prev_x, prev_y) = (col(i - 1), row(data[i - 1].1));
            let dx = x as isize - prev_x as isize;
            let dy = y as isize - prev_y as isize;
            let steps = dx.abs().max(dy.abs());

            for step in 1..steps {
                let px = (prev_x as isize + dx * step / steps) as usize;
                let py = (prev_y as isize + dy * step / steps) as usize;
                if px < width && py < height && grid[py][px] == ' ' {
                    grid[py][px] = '·';
                }
            }
        }
    }

    let step = range / (height - 1) as f64;
    let mut out = Vec::with_capacity(height + 4);
    out.push(format!("\n{}", title.bold()));
    out.push("─".repeat(width + 7));

    for (i, cells) in grid.iter().enumerate() {
        let value = min_value + step * (height - 1 - i) as f64;
        out.push(format!("{:5.1} │{}", value, cells.iter().collect::<String>()));
    }

    out.push(format!("      └{}", "─".repeat(width)));
    if let (Some(first), Some(last)) = (data.first(), data.last()) {
        let first = first.0.format("%Y-%m-%d").to_string();
        let last = last.0.format("%Y-%m-%d").to_string();
        let gap = (width + 1).saturating_sub(first.len() + last.len()).max(2);
        out.push(format!("       {}{}{}", first, " ".repeat(gap), last));
    }
    out
}

/// Print a graph sized to the terminal.
pub fn print_graph(data: &[(DateTime<Local>, f64)], title: &str) {
    let (term_width, term_height) = term_size::dimensions().unwrap_or((80, 24));
    let width = (term_width / 2).min(60);
    let height = (term_height / 2).min(15);

    for line in ascii_graph(data, width, height, title) {
        println!("{}", line);
    }
}
