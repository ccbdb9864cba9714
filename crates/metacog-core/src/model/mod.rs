pub mod history;
pub mod journal;
pub mod state;

pub use history::{
    Action, HistoryEntry, OutcomeResult, PrimitiveKind, SessionEvent, SpanBoundary, SpanStatus,
    StratagemEvent,
};
pub use journal::JournalEntry;
pub use state::{ActiveStratagem, Identity, SessionId, State, Substrate, SCHEMA_VERSION};
