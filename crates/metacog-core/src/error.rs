use thiserror::Error;

use crate::model::PrimitiveKind;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(
        "state file version {found} requires a newer metacog (this build understands v{supported}). Upgrade metacog to continue"
    )]
    IncompatibleVersion { found: u32, supported: u32 },

    #[error("state file corrupted: {0}\n  Run `metacog repair` to replace it with a fresh state")]
    CorruptState(String),

    #[error("unknown stratagem '{name}'. Available: {available}")]
    UnknownStratagem { name: String, available: String },

    #[error(
        "{title} is active (step {step}/{total}).\n  Use `metacog stratagem abort` to abandon it, or\n  Use `metacog stratagem start {requested} --force` to replace it"
    )]
    StratagemAlreadyActive {
        title: String,
        step: usize,
        total: usize,
        requested: String,
    },

    #[error("no active stratagem. Start one with `metacog stratagem start <name>`")]
    NoActiveStratagem,

    #[error(
        "expected '{expected}' call before advancing (step {step} of {title}).\n  Run `metacog {expected} ...` first, then `metacog stratagem next`"
    )]
    StepNotSatisfied {
        expected: PrimitiveKind,
        step: usize,
        title: String,
    },

    #[error("outcome already recorded for {stratagem}. Use `metacog outcome --amend` to update it")]
    OutcomeAlreadyRecorded { stratagem: String },

    #[error("no completed stratagem or freestyle primitives found in history")]
    NothingToRecordAgainst,

    #[error("no outcome to amend")]
    NoOutcomeToAmend,

    #[error("result must be 'productive' or 'unproductive', got '{0}'")]
    InvalidResult(String),

    #[error("cannot acquire state lock: {0}")]
    Lock(#[source] std::io::Error),

    #[error("session name cannot be empty")]
    InvalidSessionName,

    #[error("session '{name}' is already active. End it first with `metacog session end`")]
    SessionAlreadyActive { name: String },

    #[error("no active session")]
    NoActiveSession,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
