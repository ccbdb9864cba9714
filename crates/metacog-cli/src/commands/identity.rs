use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Args;
use metacog_core::practice;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct BecomeArgs {
    /// The persona to inhabit
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub name: String,

    /// The structural framework of perception
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub lens: String,

    /// The context to occupy
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub env: String,
}

pub fn run(args: &BecomeArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    let identity = store
        .transaction(|state| Ok(practice::apply_become(state, &args.name, &args.lens, &args.env)))
        .context("Failed to record become")?;

    output::emit(
        &format!(
            "You are now {} seeing through {} in {}",
            identity.name, identity.lens, identity.env
        ),
        format,
    );
    Ok(())
}
