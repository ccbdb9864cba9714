use anyhow::{Context, Result};
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

pub fn run(config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    let repaired = store.repair().context("Failed to repair state file")?;

    let message = if repaired {
        "State file repaired."
    } else {
        "State file is healthy. Nothing to repair."
    };
    output::emit(message, format);
    Ok(())
}
