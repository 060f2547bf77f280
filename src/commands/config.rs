use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use ironlog::{
    config::{Config, KNOWN_KEYS},
    types::{OutputFmt, emit, pad_plain},
};

use crate::cli::ConfigCmd;

fn is_known(key: &str) -> bool {
    KNOWN_KEYS.contains(&key)
}

fn unknown_key_hint(key: &str) {
    println!(
        "{} ironlog does not read `{}`; known keys: {}",
        "warning:".yellow().bold(),
        key,
        KNOWN_KEYS.join(", ")
    );
}

/// Known keys first (set or not), then anything else found in the file.
fn print_settings(cfg: &Config) {
    println!("{}", "Settings:".cyan().bold());
    let width = KNOWN_KEYS.iter().map(|k| k.len()).max().unwrap_or(0);
    for key in KNOWN_KEYS {
        let value = match cfg.get(key) {
            Some(v) => v.to_string(),
            None => "(default)".dimmed().to_string(),
        };
        println!("  {} {}", pad_plain(&key.green().to_string(), width), value);
    }

    let extra: Vec<_> = cfg.map.iter().filter(|(k, _)| !is_known(k)).collect();
    if !extra.is_empty() {
        println!("{}", "Unused:".yellow().bold());
        for (k, v) in extra {
            println!("  {} {}", k.dimmed(), v.dimmed());
        }
    }
}

pub fn handle(cmd: ConfigCmd, mut cfg: Config, config_path: &Path, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ConfigCmd::List => emit(fmt, &cfg, || print_settings(&cfg)),

        ConfigCmd::Get { key } => match cfg.get(&key) {
            Some(val) => println!("{}", val),
            None if is_known(&key) => {
                println!("{} `{}` is unset, the default applies", "info:".blue().bold(), key)
            }
            None => unknown_key_hint(&key),
        },

        ConfigCmd::Set { key, val } => {
            if !is_known(&key) {
                unknown_key_hint(&key);
            }
            let previous = cfg.map.insert(key.clone(), val.clone());
            cfg.save(config_path)?;
            match previous {
                Some(old) if old != val => println!(
                    "{} `{}` changed from `{}` to `{}`",
                    "ok:".green().bold(),
                    key.green(),
                    old,
                    val
                ),
                _ => println!("{} `{}` = `{}`", "ok:".green().bold(), key.green(), val),
            }
        }

        ConfigCmd::Unset { key } => match cfg.map.remove(&key) {
            Some(_) => {
                cfg.save(config_path)?;
                println!("{} `{}` reset to its default", "ok:".green().bold(), key.green());
            }
            None => println!("{} `{}` was not set", "info:".blue().bold(), key),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironlog::config::{KEY_DB_PATH, KEY_USER};

    #[test]
    fn test_known_keys() {
        assert!(is_known(KEY_USER));
        assert!(is_known(KEY_DB_PATH));
        assert!(!is_known("colour"));
    }
}
