use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use metacog_core::session;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a named session; later history is labelled with it
    Start {
        /// Session name
        name: String,
    },
    /// End the active session
    End,
    /// List sessions seen in history
    List,
}

pub fn run(args: &SessionArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);

    match &args.command {
        SessionCommand::Start { name } => {
            let name = store.transaction(|state| session::start_session(state, name))?;
            output::emit(&format!("Session \"{name}\" started."), format);
        }
        SessionCommand::End => {
            let name = store.transaction(session::end_session)?;
            output::emit(&format!("Session \"{name}\" ended."), format);
        }
        SessionCommand::List => {
            let state = store.load().context("Failed to load state")?;
            let names = session::list_sessions(&state.history);
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&names).unwrap_or_default());
                }
                OutputFormat::Text if names.is_empty() => println!("No sessions recorded."),
                OutputFormat::Text => {
                    println!("{} sessions:", names.len());
                    for name in &names {
                        let active = if state.session.as_deref() == Some(name.as_str()) {
                            " (active)"
                        } else {
                            ""
                        };
                        println!("  {name}{active}");
                    }
                }
            }
        }
    }
    Ok(())
}
