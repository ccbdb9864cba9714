use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use metacog_core::stratagem;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::format::{format_advance, format_catalog, format_progress, format_step};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct StratagemArgs {
    #[command(subcommand)]
    pub command: StratagemCommand,
}

#[derive(Subcommand)]
pub enum StratagemCommand {
    /// Start a stratagem (pivot, mirror, stack, anchor, reset)
    Start(StartArgs),
    /// Advance to the next step
    Next,
    /// Show current stratagem position
    Status,
    /// Abandon the active stratagem
    Abort,
    /// List available stratagems
    List,
}

#[derive(Args)]
pub struct StartArgs {
    /// Stratagem to start
    pub name: String,

    /// Replace an active stratagem
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &StratagemArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);

    match &args.command {
        StratagemCommand::Start(start) => {
            let step = store.transaction(|state| stratagem::start(state, &start.name, start.force))?;
            println!("{}", format_step(&step, format));
        }
        StratagemCommand::Next => {
            let advance = store.transaction(stratagem::advance)?;
            println!("{}", format_advance(&advance, format));
        }
        StratagemCommand::Status => {
            let state = store.load().context("Failed to load state")?;
            let progress = stratagem::status(&state)?;
            println!("{}", format_progress(progress.as_ref(), format));
        }
        StratagemCommand::Abort => {
            let name = store.transaction(stratagem::abort)?;
            output::emit(&format!("Stratagem {name} aborted."), format);
        }
        StratagemCommand::List => {
            println!("{}", format_catalog(stratagem::catalog(), format));
        }
    }
    Ok(())
}
