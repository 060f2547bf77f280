use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use ironlog::{
    config::{Config, config_path, data_dir},
    db::{SqliteRepository, open},
    error::CoreError,
    repository::FixedIdentity,
    storage::DraftStore,
    types::OutputFmt,
};
use tracing_subscriber::EnvFilter;

use commands::Ctx;

mod cli;
mod commands;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let fmt = OutputFmt::from_flag(cli.json);

    let cfg_path = config_path()?;
    let config = Config::load(&cfg_path)?;

    if let Commands::Config(cmd) = cli.cmd {
        return commands::config::handle(cmd, config, &cfg_path, fmt);
    }

    let user = cli
        .user
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .or_else(|| config.user());

    let db_path = config.db_path()?;
    if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let pool = open(&db_path)
        .await
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let ctx = Ctx {
        fmt,
        repo: SqliteRepository::new(pool, FixedIdentity::new(user.clone())),
        rules: config.progression_rules(),
        drafts: DraftStore::new(data_dir()?.join("drafts")),
        user,
    };

    let res = match cli.cmd {
        Commands::Home => commands::home::handle(&ctx).await,
        Commands::Program(cmd) => commands::program::handle(cmd, &ctx).await,
        Commands::Workout(cmd) => commands::workout::handle(cmd, &ctx).await,
        Commands::Log(cmd) => commands::log::handle(cmd, &ctx).await,
        Commands::Compare { a, b } => commands::compare::handle(a, b, &ctx).await,
        Commands::Progress { exercise, graph } => {
            commands::progress::handle(exercise, graph, &ctx).await
        }
        Commands::Bw(cmd) => commands::bodyweight::handle(cmd, &ctx).await,
        Commands::Config(_) => Ok(()),
    };

    match res {
        Err(e) => match e.downcast_ref::<CoreError>() {
            Some(CoreError::Validation(msg)) => {
                println!("{} {}", "error:".red().bold(), msg);
                Ok(())
            }
            Some(CoreError::Unauthorized) => {
                eprintln!(
                    "{} no user set - pass `--user <ID>`, set IRONLOG_USER or run `ironlog config set user <ID>`",
                    "error:".red().bold()
                );
                std::process::exit(1);
            }
            _ => Err(e),
        },
        ok => ok,
    }
}
