use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

impl OutputFmt {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Print `value` as JSON, or run `pretty` for the colored text rendering.
pub fn emit<T: Serialize + ?Sized>(fmt: OutputFmt, value: &T, pretty: impl FnOnce()) {
    match fmt {
        OutputFmt::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("error: could not serialize output: {e}"),
        },
        OutputFmt::Text => pretty(),
    }
}

/// Visible width of `s`, skipping ANSI color sequences.
pub fn plain_len(s: &str) -> usize {
    let mut n = 0;
    let mut esc = false;
    for c in s.chars() {
        match (esc, c) {
            (true, 'm') => esc = false,
            (true, _) => {}
            (false, '\x1B') => esc = true,
            (false, _) => n += 1,
        }
    }
    n
}

/// Left-align `s` to `width` visible columns.
pub fn pad_plain(s: &str, width: usize) -> String {
    let visible = plain_len(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(visible)))
}

/// `+2.5` / `-1` / `0`, trimming a trailing `.0`.
pub fn signed(v: f64) -> String {
    let s = trim_num(v.abs());
    if v > 0.0 {
        format!("+{s}")
    } else if v < 0.0 {
        format!("-{s}")
    } else {
        s
    }
}

pub fn trim_num(v: f64) -> String {
    let s = format!("{v:.1}");
    s.strip_suffix(".0").map(str::to_string).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;

    #[test]
    fn test_plain_len_ignores_colors() {
        colored::control::set_override(true);
        let s = format!("{} kg", "82.5".green().bold());
        assert_eq!(plain_len(&s), 7);
        assert_eq!(plain_len(&pad_plain(&s, 10)), 10);
        colored::control::unset_override();
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(trim_num(100.0), "100");
        assert_eq!(trim_num(82.5), "82.5");
        assert_eq!(signed(2.5), "+2.5");
        assert_eq!(signed(-1.0), "-1");
        assert_eq!(signed(0.0), "0");
    }
}
