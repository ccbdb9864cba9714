//! Outcome attribution.
//!
//! An outcome is never told what it belongs to. The target is inferred by
//! scanning history backward, so eligibility always follows from the trace
//! itself rather than from live stratagem state.

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Action, HistoryEntry, OutcomeResult, SpanBoundary, State};

/// Attribution name for practice done outside any stratagem.
pub const FREESTYLE: &str = "freestyle";

/// What an outcome was attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum OutcomeTarget {
    Stratagem(String),
    Freestyle,
}

impl OutcomeTarget {
    pub fn name(&self) -> &str {
        match self {
            Self::Stratagem(name) => name,
            Self::Freestyle => FREESTYLE,
        }
    }
}

/// Most recent `completed` marker: (index, stratagem name).
pub fn last_completed_stratagem(history: &[HistoryEntry]) -> Option<(usize, &str)> {
    history
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, h)| h.completed_stratagem().map(|name| (i, name)))
}

/// Whether any outcome record sits after `idx`.
pub fn has_outcome_after(history: &[HistoryEntry], idx: usize) -> bool {
    history
        .iter()
        .skip(idx + 1)
        .any(HistoryEntry::is_outcome)
}

/// Whether `idx` falls inside a stratagem span: the nearest boundary before
/// it is a `started` marker.
pub fn is_inside_span(history: &[HistoryEntry], idx: usize) -> bool {
    history[..idx.min(history.len())]
        .iter()
        .rev()
        .find_map(HistoryEntry::span_boundary)
        == Some(SpanBoundary::Open)
}

/// Most recent primitive outside any span with no outcome after it.
pub fn last_freestyle_primitive(history: &[HistoryEntry]) -> Option<usize> {
    // Everything at or before the last outcome is already covered.
    let floor = history.iter().rposition(HistoryEntry::is_outcome);
    history
        .iter()
        .enumerate()
        .rev()
        .take_while(|(i, _)| floor.map_or(true, |f| *i > f))
        .find(|(i, h)| h.primitive_kind().is_some() && !is_inside_span(history, *i))
        .map(|(i, _)| i)
}

/// Decide which unit of practice a new outcome belongs to.
pub fn resolve_target(history: &[HistoryEntry]) -> Result<OutcomeTarget, CoreError> {
    let completed = last_completed_stratagem(history);
    if let Some((idx, name)) = completed {
        if !has_outcome_after(history, idx) {
            return Ok(OutcomeTarget::Stratagem(name.to_string()));
        }
    }

    if last_freestyle_primitive(history).is_some() {
        return Ok(OutcomeTarget::Freestyle);
    }

    match completed {
        Some((_, name)) => Err(CoreError::OutcomeAlreadyRecorded {
            stratagem: name.to_string(),
        }),
        None => Err(CoreError::NothingToRecordAgainst),
    }
}

/// Validate `result`, resolve the target and append the outcome record.
pub fn record_outcome(
    state: &mut State,
    result: &str,
    shift: &str,
) -> Result<OutcomeTarget, CoreError> {
    let result: OutcomeResult = result.parse()?;
    let target = resolve_target(&state.history)?;

    state.add_history(HistoryEntry::new(Action::Outcome {
        result,
        stratagem: target.name().to_string(),
        shift: Some(shift.to_string()).filter(|s| !s.is_empty()),
    }));
    tracing::debug!(target = target.name(), %result, "Recorded outcome");
    Ok(target)
}

/// Rewrite the most recent outcome in place. An empty `shift` clears it.
/// Returns the name the amended outcome is attached to.
pub fn amend_outcome(state: &mut State, result: &str, shift: &str) -> Result<String, CoreError> {
    let new_result: OutcomeResult = result.parse()?;

    let entry = state
        .history
        .iter_mut()
        .rev()
        .find(|h| h.is_outcome())
        .ok_or(CoreError::NoOutcomeToAmend)?;

    match &mut entry.action {
        Action::Outcome {
            result,
            stratagem,
            shift: stored_shift,
        } => {
            *result = new_result;
            *stored_shift = Some(shift.to_string()).filter(|s| !s.is_empty());
            Ok(stratagem.clone())
        }
        _ => Err(CoreError::NoOutcomeToAmend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SpanStatus, StratagemEvent};

    fn become_() -> HistoryEntry {
        HistoryEntry::new(Action::Become {
            name: "test".into(),
            lens: "l".into(),
            env: "e".into(),
        })
    }

    fn drugs() -> HistoryEntry {
        HistoryEntry::new(Action::Drugs {
            substance: "s".into(),
            method: "m".into(),
            qualia: "q".into(),
        })
    }

    fn started(name: &str) -> HistoryEntry {
        HistoryEntry::stratagem_event(name, StratagemEvent::Started)
    }

    fn completed(name: &str) -> HistoryEntry {
        HistoryEntry::stratagem_event(name, StratagemEvent::Completed)
    }

    fn outcome(name: &str) -> HistoryEntry {
        HistoryEntry::new(Action::Outcome {
            result: OutcomeResult::Productive,
            stratagem: name.into(),
            shift: None,
        })
    }

    fn state_with(entries: Vec<HistoryEntry>) -> State {
        let mut s = State::new();
        for e in entries {
            s.add_history(e);
        }
        s
    }

    fn last_outcome(s: &State) -> (OutcomeResult, String, Option<String>) {
        match &s.history.last().unwrap().action {
            Action::Outcome {
                result,
                stratagem,
                shift,
            } => (*result, stratagem.clone(), shift.clone()),
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_outcome_attaches_to_completed_stratagem() {
        let mut s = state_with(vec![completed("pivot")]);
        let target = record_outcome(&mut s, "productive", "reframed the problem").unwrap();
        assert_eq!(target, OutcomeTarget::Stratagem("pivot".into()));
        let (result, name, shift) = last_outcome(&s);
        assert_eq!(result, OutcomeResult::Productive);
        assert_eq!(name, "pivot");
        assert_eq!(shift.as_deref(), Some("reframed the problem"));
    }

    #[test]
    fn test_second_outcome_is_rejected() {
        let mut s = state_with(vec![completed("pivot")]);
        record_outcome(&mut s, "productive", "x").unwrap();
        let err = record_outcome(&mut s, "productive", "").unwrap_err();
        assert!(matches!(err, CoreError::OutcomeAlreadyRecorded { stratagem } if stratagem == "pivot"));
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_loaded_outcome_with_extra_params_blocks_second_outcome() {
        let entries: Vec<HistoryEntry> = serde_json::from_str(
            r#"[
                {"action":"stratagem","params":{"name":"pivot","event":"completed"}},
                {"action":"outcome","params":{"result":"productive","stratagem":"pivot","confidence":"high"}}
            ]"#,
        )
        .unwrap();
        let mut s = state_with(entries);
        let err = record_outcome(&mut s, "unproductive", "").unwrap_err();
        assert!(matches!(err, CoreError::OutcomeAlreadyRecorded { stratagem } if stratagem == "pivot"));
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_most_recent_completion_wins() {
        let mut s = state_with(vec![completed("pivot"), become_(), completed("mirror")]);
        let target = record_outcome(&mut s, "productive", "").unwrap();
        assert_eq!(target.name(), "mirror");
    }

    #[test]
    fn test_freestyle_without_any_stratagem() {
        let mut s = state_with(vec![become_(), drugs()]);
        let target = record_outcome(&mut s, "productive", "").unwrap();
        assert_eq!(target, OutcomeTarget::Freestyle);
        let (_, name, shift) = last_outcome(&s);
        assert_eq!(name, "freestyle");
        assert!(shift.is_none());
    }

    #[test]
    fn test_new_freestyle_after_annotated_stratagem() {
        let mut s = state_with(vec![
            started("pivot"),
            drugs(),
            become_(),
            completed("pivot"),
            outcome("pivot"),
            become_(),
        ]);
        let target = record_outcome(&mut s, "unproductive", "").unwrap();
        assert_eq!(target, OutcomeTarget::Freestyle);
    }

    #[test]
    fn test_primitives_inside_closed_span_are_not_freestyle() {
        let history = vec![
            started("pivot"),
            drugs(),
            become_(),
            completed("pivot"),
            outcome("pivot"),
        ];
        assert!(is_inside_span(&history, 1));
        assert!(is_inside_span(&history, 2));
        assert_eq!(last_freestyle_primitive(&history), None);

        let mut s = state_with(history);
        assert!(matches!(
            record_outcome(&mut s, "productive", ""),
            Err(CoreError::OutcomeAlreadyRecorded { .. })
        ));
    }

    #[test]
    fn test_primitives_inside_open_span_are_not_freestyle() {
        let mut s = state_with(vec![started("pivot"), drugs(), become_()]);
        assert!(matches!(
            record_outcome(&mut s, "productive", ""),
            Err(CoreError::NothingToRecordAgainst)
        ));
    }

    #[test]
    fn test_primitive_after_aborted_span_is_freestyle() {
        let history = vec![
            started("pivot"),
            drugs(),
            HistoryEntry::stratagem_closed("pivot", SpanStatus::Aborted, 1),
            become_(),
        ];
        assert!(!is_inside_span(&history, 3));
        assert_eq!(last_freestyle_primitive(&history), Some(3));
    }

    #[test]
    fn test_interleaved_non_outcome_records_do_not_reopen() {
        let mut s = state_with(vec![completed("pivot"), outcome("pivot")]);
        s.add_history(HistoryEntry::new(Action::Session {
            name: "x".into(),
            event: Some(crate::model::SessionEvent::Started),
        }));
        s.add_history(started("mirror"));
        assert!(matches!(
            record_outcome(&mut s, "productive", ""),
            Err(CoreError::OutcomeAlreadyRecorded { .. })
        ));
    }

    #[test]
    fn test_nothing_to_record_against() {
        let mut s = State::new();
        assert!(matches!(
            record_outcome(&mut s, "productive", ""),
            Err(CoreError::NothingToRecordAgainst)
        ));
    }

    #[test]
    fn test_invalid_result_value() {
        let mut s = state_with(vec![completed("pivot")]);
        let err = record_outcome(&mut s, "great", "").unwrap_err();
        assert!(matches!(err, CoreError::InvalidResult(v) if v == "great"));
        assert_eq!(s.history.len(), 1);
    }

    #[test]
    fn test_amend_clears_shift() {
        let mut s = state_with(vec![completed("pivot")]);
        record_outcome(&mut s, "productive", "shift text").unwrap();

        let name = amend_outcome(&mut s, "unproductive", "").unwrap();
        assert_eq!(name, "pivot");
        let (result, _, shift) = last_outcome(&s);
        assert_eq!(result, OutcomeResult::Unproductive);
        assert!(shift.is_none());
        assert_eq!(s.history.len(), 2);
    }

    #[test]
    fn test_amend_targets_most_recent_outcome() {
        let mut s = state_with(vec![completed("pivot"), outcome("pivot"), become_()]);
        record_outcome(&mut s, "productive", "").unwrap();
        amend_outcome(&mut s, "unproductive", "new").unwrap();

        let results: Vec<_> = s
            .history
            .iter()
            .filter_map(|h| match &h.action {
                Action::Outcome { result, shift, .. } => Some((*result, shift.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            results,
            vec![
                (OutcomeResult::Productive, None),
                (OutcomeResult::Unproductive, Some("new".into())),
            ]
        );
    }

    #[test]
    fn test_amend_without_outcome() {
        let mut s = state_with(vec![become_()]);
        assert!(matches!(
            amend_outcome(&mut s, "productive", ""),
            Err(CoreError::NoOutcomeToAmend)
        ));
    }

    #[test]
    fn test_amend_validates_result() {
        let mut s = state_with(vec![completed("pivot"), outcome("pivot")]);
        assert!(matches!(
            amend_outcome(&mut s, "maybe", ""),
            Err(CoreError::InvalidResult(_))
        ));
    }
}
