use anyhow::Result;
use clap::Parser;
use inkwell_common::observability::{init_logging, LogConfig};

mod cli;
mod commands;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins), then CLI flags on top
    let mut cfg = cli::load_config(cli.config.as_deref())?;

    let log_path = init_logging(LogConfig {
        app_name: "inkwell",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::debug!(log = %log_path.display(), "logging initialised");

    match cli.command {
        Command::Extract(args) => {
            args.apply(&mut cfg);
            commands::extract(&cfg, &args.url).await
        }
        Command::Login(args) => {
            args.browser.apply(&mut cfg);
            commands::login(&cfg, &args.url).await
        }
    }
}
