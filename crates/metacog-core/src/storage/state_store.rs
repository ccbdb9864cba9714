use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::MetacogConfig;
use crate::error::CoreError;
use crate::model::{HistoryEntry, JournalEntry, State, SCHEMA_VERSION};

use super::jsonl;
use super::lock::StoreLock;

/// Live history is capped at this many entries; older ones move to the archive.
pub const MAX_HISTORY_ENTRIES: usize = 500;

const STATE_FILE: &str = "state.json";
const STATE_TMP_FILE: &str = ".state.json.tmp";
const LOCK_FILE: &str = ".state.lock";
const EVENT_LOG_FILE: &str = "history.jsonl";
const ARCHIVE_FILE: &str = "history-archive.jsonl";
const JOURNAL_FILE: &str = "journal.jsonl";

/// Only the version field, read before anything else is parsed.
#[derive(Deserialize)]
struct VersionHeader {
    #[serde(default)]
    version: u32,
}

/// Single-writer, crash-consistent store for the state document and its logs.
///
/// Every public operation takes the exclusive store lock for its whole
/// duration, reads included.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Open a store rooted at `dir`. Nothing is touched on disk until first use.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &MetacogConfig) -> Self {
        Self::open(config.home())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILE)
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.dir.join(EVENT_LOG_FILE)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.dir.join(JOURNAL_FILE)
    }

    /// Block until the store's exclusive lock is held.
    pub fn lock(&self) -> Result<StoreLock, CoreError> {
        StoreLock::acquire(&self.dir.join(LOCK_FILE))
    }

    /// Load the current state. A missing file yields a fresh state.
    pub fn load(&self) -> Result<State, CoreError> {
        let _lock = self.lock()?;
        self.load_unlocked()
    }

    /// Persist `state`, archiving history beyond [`MAX_HISTORY_ENTRIES`].
    pub fn save(&self, state: &mut State) -> Result<(), CoreError> {
        let _lock = self.lock()?;
        self.save_unlocked(state)
    }

    /// Lock, load, run `f`, and save only if `f` succeeds. The lock is
    /// released on every path; a failing `f` leaves the file untouched.
    pub fn transaction<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut State) -> Result<T, CoreError>,
    {
        let _lock = self.lock()?;
        let mut state = self.load_unlocked()?;
        let before = state.history.len();

        let value = f(&mut state)?;

        let appended = state
            .history
            .get(before..)
            .map(<[HistoryEntry]>::to_vec)
            .unwrap_or_default();
        self.save_unlocked(&mut state)?;
        if !appended.is_empty() {
            self.append_event_log(&appended);
        }
        Ok(value)
    }

    /// Replace an unreadable state file with a fresh one. Returns `true` if
    /// a repair happened, `false` if the current state already loads.
    pub fn repair(&self) -> Result<bool, CoreError> {
        let _lock = self.lock()?;
        match self.load_unlocked() {
            Ok(_) => Ok(false),
            Err(e) => {
                tracing::info!("Repairing state file {}: {e}", self.state_path().display());
                let mut fresh = State::new();
                self.save_unlocked(&mut fresh)?;
                Ok(true)
            }
        }
    }

    /// Append one insight to the journal.
    pub fn append_journal(&self, entry: &JournalEntry) -> Result<(), CoreError> {
        let _lock = self.lock()?;
        jsonl::append(&self.journal_path(), [entry])?;
        Ok(())
    }

    /// Read the journal, skipping malformed lines.
    pub fn load_journal(&self) -> Result<Vec<JournalEntry>, CoreError> {
        let _lock = self.lock()?;
        jsonl::read_tolerant(&self.journal_path())
    }

    /// Archived history followed by the live history, read under one lock
    /// so a concurrent rotation can't drop or duplicate entries.
    pub fn load_full_history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        let _lock = self.lock()?;
        let mut entries: Vec<HistoryEntry> = jsonl::read_tolerant(&self.archive_path())?;
        entries.extend(self.load_unlocked()?.history);
        Ok(entries)
    }

    fn load_unlocked(&self) -> Result<State, CoreError> {
        let path = self.state_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting fresh", path.display());
                return Ok(State::new());
            }
            Err(e) => return Err(e.into()),
        };

        let header: VersionHeader = serde_json::from_slice(&data)
            .map_err(|e| CoreError::CorruptState(format!("invalid JSON: {e}")))?;
        if header.version > SCHEMA_VERSION {
            return Err(CoreError::IncompatibleVersion {
                found: header.version,
                supported: SCHEMA_VERSION,
            });
        }

        serde_json::from_slice(&data).map_err(|e| CoreError::CorruptState(e.to_string()))
    }

    fn save_unlocked(&self, state: &mut State) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir)?;
        self.archive_and_trim(state);

        let json = serde_json::to_string_pretty(state)?;
        let tmp_path = self.dir.join(STATE_TMP_FILE);
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, self.state_path())?;
        tracing::debug!(
            entries = state.history.len(),
            "Saved state to {}",
            self.state_path().display()
        );
        Ok(())
    }

    /// Move the oldest overflow entries to the archive log. Archival is
    /// best-effort: the live history is trimmed even if the write fails.
    fn archive_and_trim(&self, state: &mut State) {
        let len = state.history.len();
        if len <= MAX_HISTORY_ENTRIES {
            return;
        }
        let overflow: Vec<HistoryEntry> =
            state.history.drain(..len - MAX_HISTORY_ENTRIES).collect();
        match jsonl::append(&self.archive_path(), &overflow) {
            Ok(n) => tracing::info!("Archived {n} history entries"),
            Err(e) => tracing::warn!(
                "Could not archive {} history entries to {}: {e}",
                overflow.len(),
                self.archive_path().display()
            ),
        }
    }

    fn append_event_log(&self, entries: &[HistoryEntry]) {
        if let Err(e) = jsonl::append(&self.event_log_path(), entries) {
            tracing::warn!("Could not append to event log: {e}");
        }
    }
}
