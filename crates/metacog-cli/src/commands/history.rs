use anyhow::{Context, Result};
use clap::Args;
use metacog_core::session::filter_by_session;
use metacog_core::{HistoryEntry, MetacogConfig, StateStore};

use crate::output::format::format_history;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct HistoryArgs {
    /// Include entries rotated out to the archive
    #[arg(long)]
    pub full: bool,

    /// Only entries recorded during this session
    #[arg(long)]
    pub session: Option<String>,
}

pub fn run(args: &HistoryArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    let entries: Vec<HistoryEntry> = if args.full {
        store
            .load_full_history()
            .context("Failed to read full history")?
    } else {
        store.load().context("Failed to load state")?.history
    };

    let shown: Vec<&HistoryEntry> = match &args.session {
        Some(name) => filter_by_session(&entries, name),
        None => entries.iter().collect(),
    };
    println!("{}", format_history(&shown, format));
    Ok(())
}
