pub mod format;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a one-line confirmation, wrapped as `{"output": ...}` for JSON.
pub fn emit(message: &str, fmt: OutputFormat) {
    println!("{}", format::format_message(message, fmt));
}
