use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::history::{HistoryEntry, PrimitiveKind, SpanStatus};

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

/// Opaque identifier of a state document, stable for its whole lifetime.
/// Generated as a hyphenated UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Who the user is currently being. Replaced wholesale on every `become`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub lens: String,
    pub env: String,
}

/// What the user is currently running on. Replaced wholesale on every `drugs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substrate {
    pub substance: String,
    pub method: String,
    pub qualia: String,
}

/// A stratagem in progress. `steps_completed` only holds primitives recorded
/// since the current step began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStratagem {
    pub name: String,
    pub step: usize,
    #[serde(default)]
    pub steps_completed: BTreeSet<PrimitiveKind>,
    pub started_at: DateTime<Utc>,
}

impl ActiveStratagem {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            step: 0,
            steps_completed: BTreeSet::new(),
            started_at: Utc::now(),
        }
    }
}

/// The single mutable document persisted as `state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: u32,
    pub session_id: SessionId,
    /// Active named session label, stamped onto new history entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate: Option<Substrate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratagem: Option<ActiveStratagem>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl State {
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            session_id: SessionId::new(),
            session: None,
            identity: None,
            substrate: None,
            stratagem: None,
            history: Vec::new(),
        }
    }

    /// Append to history, filling in the timestamp and active session label
    /// when the entry doesn't carry its own.
    pub fn add_history(&mut self, mut entry: HistoryEntry) {
        if entry.timestamp.is_none() {
            entry.timestamp = Some(Utc::now());
        }
        if entry.session.is_none() {
            entry.session = self.session.clone();
        }
        self.history.push(entry);
    }

    /// Soft reset: drop identity, substrate and the active stratagem. The
    /// session id, session label and history survive.
    pub fn reset(&mut self) {
        if let Some(active) = self.stratagem.take() {
            self.add_history(HistoryEntry::stratagem_closed(
                &active.name,
                SpanStatus::Abandoned,
                active.step,
            ));
        }
        self.identity = None;
        self.substrate = None;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::Action;

    fn become_entry(name: &str) -> HistoryEntry {
        HistoryEntry::new(Action::Become {
            name: name.into(),
            lens: "lens".into(),
            env: "env".into(),
        })
    }

    #[test]
    fn test_new_state() {
        let s = State::new();
        assert_eq!(s.version, SCHEMA_VERSION);
        assert_eq!(s.session_id.as_str().len(), 36);
        assert!(s.history.is_empty());
    }

    #[test]
    fn test_add_history_stamps_timestamp_and_session() {
        let mut s = State::new();
        s.session = Some("api-redesign".into());
        s.add_history(become_entry("Ada"));
        let entry = &s.history[0];
        assert!(entry.timestamp.is_some());
        assert_eq!(entry.session.as_deref(), Some("api-redesign"));
    }

    #[test]
    fn test_add_history_keeps_explicit_session() {
        let mut s = State::new();
        s.session = Some("outer".into());
        let mut entry = become_entry("Ada");
        entry.session = Some("inner".into());
        s.add_history(entry);
        assert_eq!(s.history[0].session.as_deref(), Some("inner"));
    }

    #[test]
    fn test_reset_is_soft() {
        let mut s = State::new();
        s.session = Some("deep-work".into());
        s.identity = Some(Identity {
            name: "Ada".into(),
            lens: "logic".into(),
            env: "lab".into(),
        });
        s.substrate = Some(Substrate {
            substance: "coffee".into(),
            method: "focus".into(),
            qualia: "crisp".into(),
        });
        s.add_history(become_entry("Ada"));
        let id = s.session_id.clone();

        s.reset();

        assert!(s.identity.is_none());
        assert!(s.substrate.is_none());
        assert!(s.stratagem.is_none());
        assert_eq!(s.session_id, id);
        assert_eq!(s.session.as_deref(), Some("deep-work"));
        assert_eq!(s.history.len(), 1);
    }

    #[test]
    fn test_reset_closes_active_stratagem() {
        let mut s = State::new();
        let mut active = ActiveStratagem::new("pivot");
        active.step = 2;
        s.stratagem = Some(active);

        s.reset();

        assert!(s.stratagem.is_none());
        let last = s.history.last().unwrap();
        assert_eq!(last.status, Some(SpanStatus::Abandoned));
        assert_eq!(last.step_at, Some(2));
    }

    #[test]
    fn test_state_serde_keys() {
        let mut s = State::new();
        s.stratagem = Some(ActiveStratagem::new("mirror"));
        s.stratagem
            .as_mut()
            .unwrap()
            .steps_completed
            .insert(PrimitiveKind::Become);
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["session_id"].is_string());
        assert!(value.get("identity").is_none());
        assert_eq!(value["stratagem"]["name"], "mirror");
        assert_eq!(value["stratagem"]["steps_completed"][0], "become");
        assert!(value["history"].as_array().unwrap().is_empty());

        let parsed: State = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, s);
    }
}
