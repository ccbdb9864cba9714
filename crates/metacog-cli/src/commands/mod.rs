pub mod history;
pub mod identity;
pub mod journal;
pub mod outcome;
pub mod reflect;
pub mod repair;
pub mod reset;
pub mod ritual;
pub mod session;
pub mod status;
pub mod stratagem;
pub mod substrate;
pub mod version;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Step into a new identity
    Become(identity::BecomeArgs),
    /// Alter cognitive parameters
    Drugs(substrate::DrugsArgs),
    /// Cross a threshold via a structured sequence
    Ritual(ritual::RitualArgs),
    /// Run a multi-step stratagem
    Stratagem(stratagem::StratagemArgs),
    /// Record how the last stratagem or freestyle practice went
    Outcome(outcome::OutcomeArgs),
    /// Start, end or list named sessions
    Session(session::SessionArgs),
    /// Record or review practice insights
    Journal(journal::JournalArgs),
    /// Show current identity, substrate and stratagem
    Status,
    /// Show recorded history
    History(history::HistoryArgs),
    /// Show practice patterns and advisories
    Reflect,
    /// Clear identity, substrate and stratagem (history is kept)
    Reset,
    /// Replace an unreadable state file with a fresh one
    Repair,
    /// Print version information
    Version,
}
