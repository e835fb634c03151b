//! Pharmatrace CLI - Provenance lookups and anomaly checks for medicine batches.

use anyhow::Context;
use clap::Parser;
use pharmatrace_cli::cli::ConfigAction;
use pharmatrace_cli::commands;
use pharmatrace_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = Config::resolve_path(cli.config.as_deref())?;

    // `config init` must be able to replace a broken file
    let config = match &cli.command {
        Command::Config(args) if matches!(args.action, ConfigAction::Init { .. }) => None,
        _ => Some(
            Config::load_from(&path)
                .with_context(|| format!("failed to load {}", path.display()))?,
        ),
    };

    // Determine output format and color
    let settings = config.as_ref().map(|c| c.settings.clone()).unwrap_or_default();
    let format = cli.format.map(Into::into).unwrap_or(settings.format);
    let color_enabled = !cli.no_color && settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let config = config.unwrap_or_default();
    let code = match cli.command {
        Command::Lookup(args) => {
            let item = args.item.clone();
            let verdict = commands::execute_lookup(args, &config, &formatter)
                .await
                .with_context(|| format!("lookup of item '{}' failed", item))?;
            commands::exit_code(&verdict)
        }
        Command::Check(args) => {
            let file = args.file.clone();
            let verdict = commands::execute_check(args, &config, &formatter)
                .await
                .with_context(|| format!("check of {} failed", file.display()))?;
            commands::exit_code(&verdict)
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, &path, &formatter)?;
            0
        }
    };

    Ok(code)
}

/// Log to stderr so stdout carries only the result.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
