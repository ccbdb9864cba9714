use anyhow::Result;
use clap::Args;
use metacog_core::outcome;
use metacog_core::{MetacogConfig, StateStore};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct OutcomeArgs {
    /// productive or unproductive
    #[arg(long)]
    pub result: String,

    /// What changed (optional)
    #[arg(long, default_value = "")]
    pub shift: String,

    /// Update the most recent outcome instead of recording a new one
    #[arg(long)]
    pub amend: bool,
}

pub fn run(args: &OutcomeArgs, config: &MetacogConfig, format: OutputFormat) -> Result<()> {
    let store = StateStore::from_config(config);

    let message = if args.amend {
        let name = store
            .transaction(|state| outcome::amend_outcome(state, &args.result, &args.shift))?;
        format!("Outcome amended to {} ({name}).", args.result)
    } else {
        let target = store
            .transaction(|state| outcome::record_outcome(state, &args.result, &args.shift))?;
        format!("Outcome recorded: {} ({}).", args.result, target.name())
    };

    output::emit(&message, format);
    Ok(())
}
