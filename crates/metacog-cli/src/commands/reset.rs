use anyhow::Result;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

pub fn run(config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    store.transaction(|state| {
        state.reset();
        Ok(())
    })?;
    output::emit(
        "State reset. Identity, substrate and stratagem cleared; history kept.",
        format,
    );
    Ok(())
}
