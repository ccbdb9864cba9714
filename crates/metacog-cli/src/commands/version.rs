use anyhow::Result;
use metacog_core::model::SCHEMA_VERSION;
use metacog_core::stratagem;

use crate::output::{self, OutputFormat};

pub fn run(format: OutputFormat) -> Result<()> {
    let keys: Vec<&str> = stratagem::catalog().iter().map(|def| def.key).collect();
    output::emit(
        &format!(
            "metacog v{}\nstate schema: v{SCHEMA_VERSION}\nstratagems: {}",
            env!("CARGO_PKG_VERSION"),
            keys.join(" ")
        ),
        format,
    );
    Ok(())
}
