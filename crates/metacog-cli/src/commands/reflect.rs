use anyhow::{Context, Result};
use metacog_core::{reflect, MetacogConfig, StateStore};

use crate::output::format::format_reflection;
use crate::output::OutputFormat;

pub fn run(config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    let state = store.load().context("Failed to load state")?;

    let journal = match store.load_journal() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Skipping journal in reflection: {e}");
            Vec::new()
        }
    };

    let reflection = reflect(&state.history, &journal);
    println!("{}", format_reflection(&reflection, format));
    Ok(())
}
