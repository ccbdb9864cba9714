use anyhow::{Context, Result};
use metacog_core::stratagem;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::format::format_status;
use crate::output::OutputFormat;

pub fn run(config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    let state = store.load().context("Failed to load state")?;

    // An active stratagem this build doesn't know still gets reported by name.
    let progress = stratagem::status(&state).ok().flatten();
    println!("{}", format_status(&state, progress.as_ref(), format));
    Ok(())
}
