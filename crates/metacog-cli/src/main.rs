use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use metacog_core::MetacogConfig;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "metacog",
    version,
    about = "Track identity, substrate and ritual practice; run stratagems and record outcomes"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    /// Directory holding state, history and journal files
    #[arg(long, global = true, env = "METACOG_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config =
        MetacogConfig::resolve(cli.home.clone()).context("Failed to locate the metacog home")?;
    tracing::debug!("Using store at {}", config.home().display());

    match &cli.command {
        commands::Commands::Become(args) => commands::identity::run(args, &config, cli.format),
        commands::Commands::Drugs(args) => commands::substrate::run(args, &config, cli.format),
        commands::Commands::Ritual(args) => commands::ritual::run(args, &config, cli.format),
        commands::Commands::Stratagem(args) => commands::stratagem::run(args, &config, cli.format),
        commands::Commands::Outcome(args) => commands::outcome::run(args, &config, cli.format),
        commands::Commands::Session(args) => commands::session::run(args, &config, cli.format),
        commands::Commands::Journal(args) => commands::journal::run(args, &config, cli.format),
        commands::Commands::Status => commands::status::run(&config, cli.format),
        commands::Commands::History(args) => commands::history::run(args, &config, cli.format),
        commands::Commands::Reflect => commands::reflect::run(&config, cli.format),
        commands::Commands::Reset => commands::reset::run(&config, cli.format),
        commands::Commands::Repair => commands::repair::run(&config, cli.format),
        commands::Commands::Version => commands::version::run(cli.format),
    }
}
