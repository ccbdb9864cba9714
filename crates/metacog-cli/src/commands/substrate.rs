use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Args;
use metacog_core::practice;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct DrugsArgs {
    /// The agent of change
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub substance: String,

    /// The mechanism of action
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub method: String,

    /// The texture of the augmented state
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub qualia: String,
}

pub fn run(args: &DrugsArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    let substrate = store
        .transaction(|state| {
            Ok(practice::apply_drugs(
                state,
                &args.substance,
                &args.method,
                &args.qualia,
            ))
        })
        .context("Failed to record drugs")?;

    output::emit(
        &format!(
            "{} ingested. Taking action via {}. Producing subjective experience: {}",
            substrate.substance, substrate.method, substrate.qualia
        ),
        format,
    );
    Ok(())
}
