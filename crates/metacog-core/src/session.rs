//! Named sessions: a label stamped onto every history entry while active.

use crate::error::CoreError;
use crate::model::{Action, HistoryEntry, SessionEvent, State};

/// Begin a named session. Surrounding whitespace is ignored.
pub fn start_session(state: &mut State, name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidSessionName);
    }
    if let Some(active) = &state.session {
        return Err(CoreError::SessionAlreadyActive {
            name: active.clone(),
        });
    }

    state.session = Some(name.to_string());
    state.add_history(HistoryEntry::new(Action::Session {
        name: name.to_string(),
        event: Some(SessionEvent::Started),
    }));
    Ok(name.to_string())
}

/// End the active session and return its name.
pub fn end_session(state: &mut State) -> Result<String, CoreError> {
    let name = state.session.clone().ok_or(CoreError::NoActiveSession)?;
    state.add_history(HistoryEntry::new(Action::Session {
        name: name.clone(),
        event: Some(SessionEvent::Ended),
    }));
    state.session = None;
    Ok(name)
}

/// Distinct session names, in the order they were first started.
pub fn list_sessions(history: &[HistoryEntry]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for entry in history {
        if let Action::Session {
            name,
            event: Some(SessionEvent::Started),
        } = &entry.action
        {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

pub fn filter_by_session<'a>(history: &'a [HistoryEntry], name: &str) -> Vec<&'a HistoryEntry> {
    history
        .iter()
        .filter(|h| h.session.as_deref() == Some(name))
        .collect()
}
