use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator used when a ritual's step list is flattened into a single param.
const RITUAL_STEP_SEPARATOR: &str = "; ";

/// The three atomic practice actions. Each one can satisfy a stratagem step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Become,
    Drugs,
    Ritual,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 3] = [Self::Become, Self::Drugs, Self::Ritual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Become => "become",
            Self::Drugs => "drugs",
            Self::Ritual => "ritual",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported verdict attached by an outcome record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeResult {
    Productive,
    Unproductive,
}

impl OutcomeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::Unproductive => "unproductive",
        }
    }
}

impl FromStr for OutcomeResult {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "productive" => Ok(Self::Productive),
            "unproductive" => Ok(Self::Unproductive),
            other => Err(CoreError::InvalidResult(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutcomeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratagemEvent {
    Started,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Started,
    Ended,
}

/// Terminal status of a stratagem span that did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    Abandoned,
    Aborted,
}

impl SpanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abandoned => "abandoned",
            Self::Aborted => "aborted",
        }
    }
}

/// Typed payload of a history entry. On disk this is the flat
/// `action` + `params` pair; see [`RawEntry`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Become {
        name: String,
        lens: String,
        env: String,
    },
    Drugs {
        substance: String,
        method: String,
        qualia: String,
    },
    Ritual {
        threshold: String,
        steps: Vec<String>,
        result: String,
    },
    /// `event` is `None` for abandoned/aborted markers, which carry a
    /// [`SpanStatus`] on the entry instead.
    Stratagem {
        name: String,
        event: Option<StratagemEvent>,
    },
    Outcome {
        result: OutcomeResult,
        stratagem: String,
        shift: Option<String>,
    },
    /// `event` is `None` when the stored event isn't one this build knows.
    Session {
        name: String,
        event: Option<SessionEvent>,
    },
    /// An action this build does not understand, kept verbatim.
    Other {
        action: String,
        params: BTreeMap<String, String>,
    },
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Self::Become { .. } => "become",
            Self::Drugs { .. } => "drugs",
            Self::Ritual { .. } => "ritual",
            Self::Stratagem { .. } => "stratagem",
            Self::Outcome { .. } => "outcome",
            Self::Session { .. } => "session",
            Self::Other { action, .. } => action,
        }
    }

    /// Flatten into the on-disk param map.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        let mut put = |k: &str, v: &str| {
            params.insert(k.to_string(), v.to_string());
        };
        match self {
            Self::Become { name, lens, env } => {
                put("name", name);
                put("lens", lens);
                put("env", env);
            }
            Self::Drugs {
                substance,
                method,
                qualia,
            } => {
                put("substance", substance);
                put("method", method);
                put("qualia", qualia);
            }
            Self::Ritual {
                threshold,
                steps,
                result,
            } => {
                put("threshold", threshold);
                put("steps", &steps.join(RITUAL_STEP_SEPARATOR));
                put("result", result);
            }
            Self::Stratagem { name, event } => {
                put("name", name);
                match event {
                    Some(StratagemEvent::Started) => put("event", "started"),
                    Some(StratagemEvent::Completed) => put("event", "completed"),
                    None => {}
                }
            }
            Self::Outcome {
                result,
                stratagem,
                shift,
            } => {
                put("result", result.as_str());
                put("stratagem", stratagem);
                if let Some(shift) = shift.as_deref().filter(|s| !s.is_empty()) {
                    put("shift", shift);
                }
            }
            Self::Session { name, event } => {
                put("name", name);
                match event {
                    Some(SessionEvent::Started) => put("event", "started"),
                    Some(SessionEvent::Ended) => put("event", "ended"),
                    None => {}
                }
            }
            Self::Other { params: raw, .. } => {
                for (k, v) in raw {
                    put(k, v);
                }
            }
        }
        params
    }

    /// Classify a stored record by its action name and key params. Params
    /// the typed variant doesn't carry are returned separately so they
    /// survive a rewrite.
    fn from_parts(
        action: String,
        mut params: BTreeMap<String, String>,
    ) -> (Self, BTreeMap<String, String>) {
        let known = {
            let get = |k: &str| params.get(k).cloned().unwrap_or_default();
            match action.as_str() {
                "become" => Some(Self::Become {
                    name: get("name"),
                    lens: get("lens"),
                    env: get("env"),
                }),
                "drugs" => Some(Self::Drugs {
                    substance: get("substance"),
                    method: get("method"),
                    qualia: get("qualia"),
                }),
                "ritual" => {
                    let steps = get("steps");
                    Some(Self::Ritual {
                        threshold: get("threshold"),
                        steps: if steps.is_empty() {
                            Vec::new()
                        } else {
                            steps.split(RITUAL_STEP_SEPARATOR).map(String::from).collect()
                        },
                        result: get("result"),
                    })
                }
                "stratagem" => Some(Self::Stratagem {
                    name: get("name"),
                    event: match params.get("event").map(String::as_str) {
                        Some("started") => Some(StratagemEvent::Started),
                        Some("completed") => Some(StratagemEvent::Completed),
                        _ => None,
                    },
                }),
                // An unreadable verdict still counts as an outcome; anything
                // other than "productive" reads as unproductive.
                "outcome" => Some(Self::Outcome {
                    result: get("result")
                        .parse()
                        .unwrap_or(OutcomeResult::Unproductive),
                    stratagem: get("stratagem"),
                    shift: params.get("shift").cloned().filter(|s| !s.is_empty()),
                }),
                "session" => Some(Self::Session {
                    name: get("name"),
                    event: match params.get("event").map(String::as_str) {
                        Some("started") => Some(SessionEvent::Started),
                        Some("ended") => Some(SessionEvent::Ended),
                        _ => None,
                    },
                }),
                _ => None,
            }
        };

        match known {
            Some(known) => {
                for key in known.params().keys() {
                    params.remove(key);
                }
                (known, params)
            }
            None => (Self::Other { action, params }, BTreeMap::new()),
        }
    }
}

/// One append-only record in the state history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct HistoryEntry {
    pub action: Action,
    /// Filled in by [`crate::model::State::add_history`] when left empty.
    pub timestamp: Option<DateTime<Utc>>,
    pub session: Option<String>,
    pub status: Option<SpanStatus>,
    pub step_at: Option<usize>,
    /// Stored params the typed action doesn't model, written back unchanged.
    pub extra: BTreeMap<String, String>,
}

/// Whether an entry opens or closes a stratagem span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanBoundary {
    Open,
    Closed,
}

impl HistoryEntry {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            timestamp: None,
            session: None,
            status: None,
            step_at: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn stratagem_event(name: &str, event: StratagemEvent) -> Self {
        Self::new(Action::Stratagem {
            name: name.to_string(),
            event: Some(event),
        })
    }

    /// Marker for a span that ended without completing.
    pub fn stratagem_closed(name: &str, status: SpanStatus, step: usize) -> Self {
        Self {
            status: Some(status),
            step_at: Some(step),
            ..Self::new(Action::Stratagem {
                name: name.to_string(),
                event: None,
            })
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.action {
            Action::Become { .. } => Some(PrimitiveKind::Become),
            Action::Drugs { .. } => Some(PrimitiveKind::Drugs),
            Action::Ritual { .. } => Some(PrimitiveKind::Ritual),
            _ => None,
        }
    }

    pub fn is_outcome(&self) -> bool {
        matches!(self.action, Action::Outcome { .. })
    }

    /// Name of the stratagem if this entry marks its completion.
    pub fn completed_stratagem(&self) -> Option<&str> {
        match &self.action {
            Action::Stratagem {
                name,
                event: Some(StratagemEvent::Completed),
            } => Some(name),
            _ => None,
        }
    }

    pub fn span_boundary(&self) -> Option<SpanBoundary> {
        match &self.action {
            Action::Stratagem {
                event: Some(StratagemEvent::Started),
                ..
            } => Some(SpanBoundary::Open),
            Action::Stratagem {
                event: Some(StratagemEvent::Completed),
                ..
            } => Some(SpanBoundary::Closed),
            Action::Stratagem { event: None, .. } if self.status.is_some() => {
                Some(SpanBoundary::Closed)
            }
            _ => None,
        }
    }
}

/// The stable on-disk shape of a history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEntry {
    action: String,
    #[serde(default)]
    params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<SpanStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step_at: Option<usize>,
}

impl From<RawEntry> for HistoryEntry {
    fn from(raw: RawEntry) -> Self {
        let (action, extra) = Action::from_parts(raw.action, raw.params);
        Self {
            action,
            timestamp: raw.timestamp,
            session: raw.session.filter(|s| !s.is_empty()),
            status: raw.status,
            step_at: raw.step_at,
            extra,
        }
    }
}

impl From<HistoryEntry> for RawEntry {
    fn from(entry: HistoryEntry) -> Self {
        let mut params = entry.extra;
        params.extend(entry.action.params());
        Self {
            action: entry.action.name().to_string(),
            params,
            timestamp: entry.timestamp,
            session: entry.session,
            status: entry.status,
            step_at: entry.step_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_become_serializes_as_flat_params() {
        let entry = HistoryEntry::new(Action::Become {
            name: "Ada".into(),
            lens: "verification".into(),
            env: "lab".into(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["action"], "become");
        assert_eq!(value["params"]["name"], "Ada");
        assert_eq!(value["params"]["lens"], "verification");
        assert_eq!(value["params"]["env"], "lab");
        assert!(value.get("timestamp").is_none());
        assert!(value.get("status").is_none());
    }

    #[test]
    fn test_ritual_steps_split_on_load() {
        let json = r#"{"action":"ritual","params":{"threshold":"t","steps":"one; two; three","result":"r"},"timestamp":"2026-01-02T03:04:05Z"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        match &entry.action {
            Action::Ritual { steps, .. } => assert_eq!(steps, &["one", "two", "three"]),
            other => panic!("expected ritual, got {other:?}"),
        }
        assert!(entry.timestamp.is_some());
    }

    #[test]
    fn test_abandoned_marker_shape() {
        let entry = HistoryEntry::stratagem_closed("pivot", SpanStatus::Abandoned, 2);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["action"], "stratagem");
        assert_eq!(value["status"], "abandoned");
        assert_eq!(value["step_at"], 2);
        assert!(value["params"].get("event").is_none());
        assert_eq!(entry.span_boundary(), Some(SpanBoundary::Closed));
    }

    #[test]
    fn test_outcome_without_shift_omits_key() {
        let entry = HistoryEntry::new(Action::Outcome {
            result: OutcomeResult::Unproductive,
            stratagem: "freestyle".into(),
            shift: Some(String::new()),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["params"]["result"], "unproductive");
        assert!(value["params"].get("shift").is_none());
    }

    #[test]
    fn test_unknown_action_is_preserved() {
        let json = r#"{"action":"inspire","params":{"stance":"beginner"}}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.action.name(), "inspire");
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["action"], "inspire");
        assert_eq!(back["params"]["stance"], "beginner");
    }

    #[test]
    fn test_unexpected_params_on_known_action_are_preserved() {
        let json = r#"{"action":"become","params":{"name":"a","lens":"b","env":"c","mood":"calm"}}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.primitive_kind(), Some(PrimitiveKind::Become));
        assert_eq!(entry.extra.get("mood").map(String::as_str), Some("calm"));
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["params"]["mood"], "calm");
        assert_eq!(back["params"]["name"], "a");
    }

    #[test]
    fn test_outcome_with_extra_params_still_counts() {
        let json = r#"{"action":"outcome","params":{"result":"productive","stratagem":"pivot","confidence":"high"}}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_outcome());
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["params"]["confidence"], "high");
        assert_eq!(back["params"]["result"], "productive");
    }

    #[test]
    fn test_stratagem_markers_with_extra_params_keep_span_meaning() {
        let started: HistoryEntry = serde_json::from_str(
            r#"{"action":"stratagem","params":{"name":"pivot","event":"started","origin":"x"}}"#,
        )
        .unwrap();
        assert_eq!(started.span_boundary(), Some(SpanBoundary::Open));

        let completed: HistoryEntry = serde_json::from_str(
            r#"{"action":"stratagem","params":{"name":"pivot","event":"completed","origin":"x"}}"#,
        )
        .unwrap();
        assert_eq!(completed.completed_stratagem(), Some("pivot"));
    }

    #[test]
    fn test_unknown_event_is_kept_but_not_a_boundary() {
        let json = r#"{"action":"stratagem","params":{"name":"pivot","event":"paused"}}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.span_boundary(), None);
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["params"]["event"], "paused");
    }

    #[test]
    fn test_amended_outcome_overrides_stale_extra() {
        let json = r#"{"action":"outcome","params":{"result":"productive","stratagem":"pivot","shift":""}}"#;
        let mut entry: HistoryEntry = serde_json::from_str(json).unwrap();
        if let Action::Outcome { result, shift, .. } = &mut entry.action {
            *result = OutcomeResult::Unproductive;
            *shift = Some("new".into());
        }
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["params"]["result"], "unproductive");
        assert_eq!(back["params"]["shift"], "new");
    }

    #[test]
    fn test_outcome_result_parse() {
        assert_eq!(
            "productive".parse::<OutcomeResult>().unwrap(),
            OutcomeResult::Productive
        );
        let err = "meh".parse::<OutcomeResult>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidResult(v) if v == "meh"));
    }
}
