pub mod jsonl;
pub mod lock;
pub mod state_store;

pub use lock::StoreLock;
pub use state_store::{StateStore, MAX_HISTORY_ENTRIES};
