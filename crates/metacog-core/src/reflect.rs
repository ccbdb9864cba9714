//! Practice patterns derived from history and the journal.
//!
//! Everything here is a pure read over already-loaded records; nothing is
//! persisted.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::journal::last_n;
use crate::model::{Action, HistoryEntry, JournalEntry, OutcomeResult, PrimitiveKind};
use crate::stratagem::catalog;

const TOP_N: usize = 5;
const PROVISIONAL_BELOW: usize = 3;
const RELIANCE_WINDOW: usize = 20;
const RELIANCE_MIN_SAMPLES: usize = 4;
const UNREFLECTED_THRESHOLD: usize = 5;
const NEVER_TRIED_AFTER: usize = 5;
const FRICTION_WINDOW: usize = 10;
const RECENT_INSIGHTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageCount {
    pub name: String,
    pub count: usize,
}

/// Self-reported productivity for one attribution name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effectiveness {
    pub name: String,
    pub productive: usize,
    pub total: usize,
    /// Percentage, 0-100.
    pub rate: f64,
    pub provisional: bool,
}

impl Effectiveness {
    fn new(name: &str, productive: usize, total: usize) -> Self {
        Self {
            name: name.to_string(),
            productive,
            total,
            rate: percent(productive, total),
            provisional: total < PROVISIONAL_BELOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RitualSteps {
    pub average: f64,
    pub rituals: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub severity: Severity,
    pub message: String,
}

impl Advisory {
    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }

    fn alert(message: String) -> Self {
        Self {
            severity: Severity::Alert,
            message,
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Warning => "--",
            Severity::Alert => "!!",
        };
        write!(f, "{marker} {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reflection {
    pub primitives: BTreeMap<PrimitiveKind, usize>,
    pub top_identities: Vec<UsageCount>,
    pub top_substrates: Vec<UsageCount>,
    /// Catalog stratagems completed at least once, in catalog order.
    pub completions: Vec<UsageCount>,
    pub never_completed: Vec<String>,
    /// Best first: by rate, then by sample size.
    pub effectiveness: Vec<Effectiveness>,
    pub overall: Option<Effectiveness>,
    /// Completed stratagems that never received an outcome.
    pub unmeasured: Vec<UsageCount>,
    pub ritual_steps: Option<RitualSteps>,
    pub recent_insights: Vec<JournalEntry>,
    pub advisories: Vec<Advisory>,
    #[serde(skip)]
    empty: bool,
}

impl Reflection {
    /// True when there was no history to reflect on.
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

pub fn reflect(history: &[HistoryEntry], journal: &[JournalEntry]) -> Reflection {
    let mut primitives: BTreeMap<PrimitiveKind, usize> =
        PrimitiveKind::ALL.iter().map(|k| (*k, 0)).collect();
    for kind in history.iter().filter_map(HistoryEntry::primitive_kind) {
        *primitives.entry(kind).or_default() += 1;
    }

    let completed = completion_counts(history);
    let completions: Vec<UsageCount> = catalog()
        .iter()
        .filter_map(|def| {
            completed.get(def.key).map(|count| UsageCount {
                name: def.key.to_string(),
                count: *count,
            })
        })
        .collect();
    let never_completed = catalog()
        .iter()
        .filter(|def| !completed.contains_key(def.key))
        .map(|def| def.key.to_string())
        .collect();

    let tally = outcome_tally(history);
    let mut effectiveness: Vec<Effectiveness> = tally
        .iter()
        .map(|(name, (productive, total))| Effectiveness::new(name, *productive, *total))
        .collect();
    effectiveness.sort_by(|a, b| {
        b.rate
            .total_cmp(&a.rate)
            .then_with(|| b.total.cmp(&a.total))
    });

    let overall = {
        let (productive, total) = tally
            .values()
            .fold((0, 0), |(p, t), (vp, vt)| (p + vp, t + vt));
        (total > 0).then(|| Effectiveness::new("overall", productive, total))
    };

    let unmeasured = if tally.is_empty() {
        Vec::new()
    } else {
        completions
            .iter()
            .filter(|c| !tally.contains_key(&c.name))
            .cloned()
            .collect()
    };

    Reflection {
        primitives,
        top_identities: top_values(history, PrimitiveKind::Become),
        top_substrates: top_values(history, PrimitiveKind::Drugs),
        completions,
        never_completed,
        effectiveness,
        overall,
        unmeasured,
        ritual_steps: ritual_steps(history),
        recent_insights: last_n(journal, RECENT_INSIGHTS).to_vec(),
        advisories: advisories(history, journal),
        empty: history.is_empty(),
    }
}

/// Patterns worth flagging, most urgent kinds first.
pub fn advisories(history: &[HistoryEntry], journal: &[JournalEntry]) -> Vec<Advisory> {
    if history.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();

    // Unproductive streak, newest first.
    let streak: Vec<&str> = history
        .iter()
        .rev()
        .filter_map(outcome_of)
        .take_while(|(result, _)| *result == OutcomeResult::Unproductive)
        .map(|(_, name)| if name.is_empty() { "unknown" } else { name })
        .collect();
    if streak.len() >= 2 {
        let message = format!(
            "{} unproductive outcomes in a row (last: {})",
            streak.len(),
            streak.join(", ")
        );
        out.push(if streak.len() >= 3 {
            Advisory::alert(message)
        } else {
            Advisory::warning(message)
        });
    }

    for (name, (productive, total)) in outcome_tally(history) {
        if total < PROVISIONAL_BELOW {
            continue;
        }
        let rate = percent(productive, total);
        let message = format!("{name}: {rate:.0}% productive ({productive}/{total})");
        if rate < 33.0 {
            out.push(Advisory::alert(message));
        } else if rate < 50.0 {
            out.push(Advisory::warning(message));
        }
    }

    let completed = completion_counts(history);
    if completed.values().sum::<usize>() >= NEVER_TRIED_AFTER {
        let never: Vec<&str> = catalog()
            .iter()
            .map(|def| def.key)
            .filter(|key| !completed.contains_key(key))
            .collect();
        if !never.is_empty() {
            out.push(Advisory::warning(format!("Never tried: {}", never.join(", "))));
        }
    }

    out.extend(over_reliance(history, PrimitiveKind::Become, "becomes"));
    out.extend(over_reliance(history, PrimitiveKind::Drugs, "drugs"));

    let unreflected = history
        .iter()
        .rev()
        .take_while(|h| !h.is_outcome())
        .filter(|h| h.primitive_kind().is_some() || h.completed_stratagem().is_some())
        .count();
    if unreflected >= UNREFLECTED_THRESHOLD {
        out.push(Advisory::warning(format!(
            "{unreflected} recent primitives with no outcome recorded"
        )));
    }

    for entry in last_n(journal, FRICTION_WINDOW) {
        let lower = entry.insight.to_lowercase();
        if lower.contains("stuck") || lower.contains("unproductive") {
            out.push(Advisory::warning(format!(
                "Journal friction: {:?}",
                entry.insight
            )));
        }
    }

    out
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn outcome_of(entry: &HistoryEntry) -> Option<(OutcomeResult, &str)> {
    match &entry.action {
        Action::Outcome {
            result, stratagem, ..
        } => Some((*result, stratagem.as_str())),
        _ => None,
    }
}

/// name -> (productive, total). Outcomes without a name are skipped.
fn outcome_tally(history: &[HistoryEntry]) -> BTreeMap<String, (usize, usize)> {
    let mut tally: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (result, name) in history.iter().filter_map(outcome_of) {
        if name.is_empty() {
            continue;
        }
        let slot = tally.entry(name.to_string()).or_default();
        if result == OutcomeResult::Productive {
            slot.0 += 1;
        }
        slot.1 += 1;
    }
    tally
}

fn completion_counts(history: &[HistoryEntry]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for name in history.iter().filter_map(HistoryEntry::completed_stratagem) {
        *counts.entry(name).or_default() += 1;
    }
    counts
}

/// The identifying value of a become (name) or drugs (substance) entry.
fn primary_value(entry: &HistoryEntry, kind: PrimitiveKind) -> Option<&str> {
    let value = match (&entry.action, kind) {
        (Action::Become { name, .. }, PrimitiveKind::Become) => name,
        (Action::Drugs { substance, .. }, PrimitiveKind::Drugs) => substance,
        _ => return None,
    };
    (!value.is_empty()).then_some(value.as_str())
}

fn top_values(history: &[HistoryEntry], kind: PrimitiveKind) -> Vec<UsageCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in history.iter().filter_map(|h| primary_value(h, kind)) {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<UsageCount> = counts
        .into_iter()
        .map(|(name, count)| UsageCount {
            name: name.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps ties alphabetical.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_N);
    ranked
}

fn over_reliance(history: &[HistoryEntry], kind: PrimitiveKind, label: &str) -> Vec<Advisory> {
    let recent: Vec<&str> = history
        .iter()
        .rev()
        .filter_map(|h| primary_value(h, kind))
        .take(RELIANCE_WINDOW)
        .collect();
    if recent.len() < RELIANCE_MIN_SAMPLES {
        return Vec::new();
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in &recent {
        *counts.entry(*value).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| count * 2 > recent.len())
        .map(|(value, count)| {
            Advisory::warning(format!(
                "Over-reliance: {value:?} used in {count} of last {} {label}",
                recent.len()
            ))
        })
        .collect()
}

fn ritual_steps(history: &[HistoryEntry]) -> Option<RitualSteps> {
    let (steps, rituals) = history
        .iter()
        .filter_map(|h| match &h.action {
            Action::Ritual { steps, .. } if !steps.is_empty() => Some(steps.len()),
            _ => None,
        })
        .fold((0, 0), |(s, r), n| (s + n, r + 1));
    (rituals > 0).then(|| RitualSteps {
        average: steps as f64 / rituals as f64,
        rituals,
    })
}
