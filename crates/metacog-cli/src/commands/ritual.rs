use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Args;
use metacog_core::practice;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct RitualArgs {
    /// The threshold being crossed
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub threshold: String,

    /// Steps in the sequence (repeat for multiple)
    #[arg(long, required = true, value_parser = NonEmptyStringValueParser::new())]
    pub steps: Vec<String>,

    /// What becomes true on the other side
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub result: String,
}

pub fn run(args: &RitualArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);
    store
        .transaction(|state| {
            practice::apply_ritual(state, &args.threshold, &args.steps, &args.result);
            Ok(())
        })
        .context("Failed to record ritual")?;

    let mut out = format!("[RITUAL EXECUTED]\nThreshold: {}\nSequence:\n", args.threshold);
    for (i, step) in args.steps.iter().enumerate() {
        out.push_str(&format!("{}. {step}\n", i + 1));
    }
    out.push_str("The working is complete. Reality has shifted in accordance with the will.\n");
    out.push_str(&format!("\n{} is taking hold.", args.result));

    output::emit(&out, format);
    Ok(())
}
