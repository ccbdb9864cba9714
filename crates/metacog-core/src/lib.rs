pub mod config;
pub mod error;
pub mod journal;
pub mod model;
pub mod outcome;
pub mod practice;
pub mod reflect;
pub mod session;
pub mod storage;
pub mod stratagem;

pub use config::MetacogConfig;
pub use error::CoreError;
pub use model::{HistoryEntry, JournalEntry, State};
pub use outcome::{amend_outcome, record_outcome, OutcomeTarget};
pub use reflect::{advisories, reflect, Advisory, Reflection};
pub use storage::StateStore;
