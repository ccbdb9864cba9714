//! The stratagem state machine.
//!
//! `Idle` is `state.stratagem == None`; `InProgress` is `Some(ActiveStratagem)`.
//! Every transition leaves a trace in history (`started`, `completed`,
//! `abandoned`, `aborted`) that the outcome resolver later reads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{
    ActiveStratagem, HistoryEntry, PrimitiveKind, SpanStatus, State, StratagemEvent,
};

use super::catalog::{self, Step, StepKind, StratagemDef};

/// What the user should do at the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepInstructions {
    pub stratagem: &'static str,
    pub title: &'static str,
    /// Zero-based step index.
    pub step: usize,
    pub total: usize,
    pub kind: StepKind,
    pub description: &'static str,
    pub next: Option<Step>,
}

impl StepInstructions {
    fn at(def: &'static StratagemDef, step: usize) -> Self {
        let current = def.steps[step];
        Self {
            stratagem: def.key,
            title: def.title,
            step,
            total: def.len(),
            kind: current.kind,
            description: current.description,
            next: def.steps.get(step + 1).copied(),
        }
    }
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advance {
    Step(StepInstructions),
    Completed {
        stratagem: &'static str,
        title: &'static str,
    },
}

/// Snapshot of the active stratagem for status reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StratagemProgress {
    pub definition: &'static StratagemDef,
    pub step: usize,
    pub started_at: DateTime<Utc>,
    pub satisfied: Vec<PrimitiveKind>,
}

fn definition_for(name: &str) -> Result<&'static StratagemDef, CoreError> {
    catalog::lookup(name).ok_or_else(|| CoreError::UnknownStratagem {
        name: name.to_string(),
        available: catalog::available(),
    })
}

/// Start `name` at step 0. With `force`, an active stratagem is recorded as
/// abandoned and replaced; without it, an active stratagem is an error.
pub fn start(state: &mut State, name: &str, force: bool) -> Result<StepInstructions, CoreError> {
    let def = definition_for(name)?;

    if let Some(active) = &state.stratagem {
        if !force {
            let (title, total) = match catalog::lookup(&active.name) {
                Some(active_def) => (active_def.title.to_string(), active_def.len()),
                None => (active.name.clone(), 0),
            };
            return Err(CoreError::StratagemAlreadyActive {
                title,
                step: active.step + 1,
                total,
                requested: name.to_string(),
            });
        }
        let replaced = HistoryEntry::stratagem_closed(&active.name, SpanStatus::Abandoned, active.step);
        tracing::debug!(replaced = %active.name, step = active.step, "Abandoning active stratagem");
        state.stratagem = None;
        state.add_history(replaced);
    }

    state.stratagem = Some(ActiveStratagem::new(def.key));
    state.add_history(HistoryEntry::stratagem_event(def.key, StratagemEvent::Started));
    tracing::debug!(stratagem = def.key, "Started stratagem");

    Ok(StepInstructions::at(def, 0))
}

/// Mark `kind` as performed if it is what the current step requires.
/// Anything else (including no active stratagem) is a no-op.
pub fn record_primitive(state: &mut State, kind: PrimitiveKind) {
    let Some(active) = state.stratagem.as_mut() else {
        return;
    };
    let Some(def) = catalog::lookup(&active.name) else {
        return;
    };
    let required = def.steps.get(active.step).and_then(|s| s.kind.primitive());
    if required == Some(kind) {
        active.steps_completed.insert(kind);
        tracing::debug!(stratagem = def.key, step = active.step, %kind, "Step satisfied");
    }
}

/// Move to the next step, completing the stratagem after the last one.
pub fn advance(state: &mut State) -> Result<Advance, CoreError> {
    let active = state.stratagem.as_mut().ok_or(CoreError::NoActiveStratagem)?;
    let def = definition_for(&active.name)?;

    if let Some(current) = def.steps.get(active.step) {
        if let Some(expected) = current.kind.primitive() {
            if !active.steps_completed.contains(&expected) {
                return Err(CoreError::StepNotSatisfied {
                    expected,
                    step: active.step + 1,
                    title: def.title.to_string(),
                });
            }
        }
    }

    active.step += 1;
    active.steps_completed.clear();

    if active.step >= def.len() {
        state.stratagem = None;
        state.add_history(HistoryEntry::stratagem_event(def.key, StratagemEvent::Completed));
        tracing::debug!(stratagem = def.key, "Completed stratagem");
        return Ok(Advance::Completed {
            stratagem: def.key,
            title: def.title,
        });
    }

    Ok(Advance::Step(StepInstructions::at(def, active.step)))
}

/// Abandon the active stratagem, recording the step it stopped at.
/// Returns the aborted stratagem's name.
pub fn abort(state: &mut State) -> Result<String, CoreError> {
    let active = state.stratagem.take().ok_or(CoreError::NoActiveStratagem)?;
    state.add_history(HistoryEntry::stratagem_closed(
        &active.name,
        SpanStatus::Aborted,
        active.step,
    ));
    Ok(active.name)
}

/// Where the active stratagem stands, if there is one.
pub fn status(state: &State) -> Result<Option<StratagemProgress>, CoreError> {
    let Some(active) = &state.stratagem else {
        return Ok(None);
    };
    let definition = definition_for(&active.name)?;
    Ok(Some(StratagemProgress {
        definition,
        step: active.step,
        started_at: active.started_at,
        satisfied: active.steps_completed.iter().copied().collect(),
    }))
}
