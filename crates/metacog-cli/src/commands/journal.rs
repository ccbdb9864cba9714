use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use metacog_core::journal::{filter_journal, last_n};
use metacog_core::{JournalEntry, MetacogConfig, StateStore};

use crate::output::format::format_journal;
use crate::output::{self, OutputFormat};

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct JournalArgs {
    #[command(subcommand)]
    pub command: Option<JournalCommand>,

    /// The insight to record
    pub insight: Option<String>,

    /// Tag this insight (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Subcommand)]
pub enum JournalCommand {
    /// List journal entries
    List(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only entries carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Only entries recorded during this session
    #[arg(long)]
    pub session: Option<String>,

    /// Show only the last N entries
    #[arg(long, default_value_t = 0)]
    pub last: usize,
}

pub fn run(args: &JournalArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);

    if let Some(JournalCommand::List(list)) = &args.command {
        let entries = store.load_journal().context("Failed to read journal")?;
        let filtered = filter_journal(&entries, list.tag.as_deref(), list.session.as_deref());
        println!("{}", format_journal(last_n(&filtered, list.last), format));
        return Ok(());
    }

    let Some(insight) = args.insight.as_deref().filter(|s| !s.trim().is_empty()) else {
        anyhow::bail!("provide an insight to record, or use `metacog journal list`");
    };

    let state = store.load().context("Failed to load state")?;
    let entry = JournalEntry::new(insight, state.session, args.tags.clone());
    store
        .append_journal(&entry)
        .context("Failed to append to journal")?;

    let mut message = format!("Journal: {}", entry.insight);
    if let Some(session) = &entry.session {
        message.push_str(&format!(" (session: {session})"));
    }
    output::emit(&message, format);
    Ok(())
}
