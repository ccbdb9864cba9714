use chrono::{DateTime, Utc};
use metacog_core::model::{HistoryEntry, Identity, JournalEntry, PrimitiveKind, State, Substrate};
use metacog_core::reflect::Reflection;
use metacog_core::stratagem::{Advance, StepInstructions, StratagemDef, StratagemProgress};
use serde::Serialize;

use super::OutputFormat;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_time(t: &DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

pub fn format_message(message: &str, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&serde_json::json!({ "output": message }))
                .unwrap_or_default()
        }
        OutputFormat::Text => message.to_string(),
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

pub fn format_step(step: &StepInstructions, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json(step),
        OutputFormat::Text => format_step_text(step),
    }
}

fn format_step_text(step: &StepInstructions) -> String {
    let mut out = format!(
        "{}: step {}/{}\n[{}] {}\n",
        step.title,
        step.step + 1,
        step.total,
        step.kind,
        step.description
    );
    if step.kind.is_free() {
        out.push_str("\nThis is a reflection step. When ready, run `metacog stratagem next` to advance.");
    } else {
        out.push_str(&format!(
            "\nRun `metacog {} ...` then `metacog stratagem next` to advance.",
            step.kind
        ));
    }
    if let Some(next) = &step.next {
        out.push_str(&format!("\nNext: [{}] {}", next.kind, next.description));
    }
    out
}

pub fn format_advance(advance: &Advance, fmt: OutputFormat) -> String {
    match (advance, fmt) {
        (_, OutputFormat::Json) => json(advance),
        (Advance::Step(step), OutputFormat::Text) => format_step_text(step),
        (Advance::Completed { title, .. }, OutputFormat::Text) => format!(
            "{title} complete. Ground: name what shifted, what you're keeping, how it integrates.\n\
             Record how it went with `metacog outcome --result productive|unproductive`."
        ),
    }
}

pub fn format_progress(progress: Option<&StratagemProgress>, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json(&progress),
        OutputFormat::Text => match progress {
            Some(p) => format_progress_text(p),
            None => "No active stratagem.".to_string(),
        },
    }
}

fn format_progress_text(p: &StratagemProgress) -> String {
    let def = p.definition;
    let mut out = format!(
        "{}: step {}/{}\nStarted: {}\n\n",
        def.title,
        p.step + 1,
        def.len(),
        format_time(&p.started_at)
    );
    for (i, step) in def.steps.iter().enumerate() {
        let marker = if i < p.step {
            "\u{2713} "
        } else if i == p.step {
            "\u{2192} "
        } else {
            "  "
        };
        out.push_str(&format!(
            "{marker}{}. [{}] {}\n",
            i + 1,
            step.kind,
            step.description
        ));
    }
    out
}

pub fn format_catalog(defs: &[StratagemDef], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json(defs),
        OutputFormat::Text => {
            let mut out = String::new();
            for def in defs {
                let kinds: Vec<&str> = def.steps.iter().map(|s| s.kind.as_str()).collect();
                out.push_str(&format!(
                    "{:<8} {} ({})\n",
                    def.key,
                    def.title,
                    kinds.join(" \u{2192} ")
                ));
            }
            out
        }
    }
}

#[derive(Serialize)]
struct StatusReport<'a> {
    session_id: &'a str,
    session: Option<&'a str>,
    identity: Option<&'a Identity>,
    substrate: Option<&'a Substrate>,
    stratagem: Option<StatusStratagem<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StatusStratagem<'a> {
    Known(&'a StratagemProgress),
    Uncatalogued {
        name: &'a str,
        step: usize,
        started_at: &'a DateTime<Utc>,
        in_catalog: bool,
    },
}

/// `progress` is `None` both when idle and when the active stratagem is not
/// in this build's catalog; the latter falls back to the stored name.
pub fn format_status(
    state: &State,
    progress: Option<&StratagemProgress>,
    fmt: OutputFormat,
) -> String {
    match fmt {
        OutputFormat::Json => json(&StatusReport {
            session_id: state.session_id.as_str(),
            session: state.session.as_deref(),
            identity: state.identity.as_ref(),
            substrate: state.substrate.as_ref(),
            stratagem: match (progress, &state.stratagem) {
                (Some(p), _) => Some(StatusStratagem::Known(p)),
                (None, Some(active)) => Some(StatusStratagem::Uncatalogued {
                    name: &active.name,
                    step: active.step,
                    started_at: &active.started_at,
                    in_catalog: false,
                }),
                (None, None) => None,
            },
        }),
        OutputFormat::Text => format_status_text(state, progress),
    }
}

fn format_status_text(state: &State, progress: Option<&StratagemProgress>) -> String {
    let mut out = format!("Session: {}\n", state.session_id);
    if let Some(label) = &state.session {
        out.push_str(&format!("Named session: {label}\n"));
    }
    out.push('\n');

    match &state.identity {
        Some(i) => out.push_str(&format!(
            "Identity: {}\n  Lens: {}\n  Environment: {}\n\n",
            i.name, i.lens, i.env
        )),
        None => out.push_str("Identity: (none)\n\n"),
    }
    match &state.substrate {
        Some(s) => out.push_str(&format!(
            "Substrate: {}\n  Method: {}\n  Qualia: {}\n\n",
            s.substance, s.method, s.qualia
        )),
        None => out.push_str("Substrate: (none)\n\n"),
    }
    match (progress, &state.stratagem) {
        (Some(p), _) => out.push_str(&format_progress_text(p)),
        (None, Some(active)) => out.push_str(&format!(
            "Stratagem: {} (step {}, not in this build's catalog)\n",
            active.name,
            active.step + 1
        )),
        (None, None) => out.push_str("Stratagem: (none)\n"),
    }
    out
}

pub fn format_history(entries: &[&HistoryEntry], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json(entries),
        OutputFormat::Text => format_history_text(entries),
    }
}

fn format_history_text(entries: &[&HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history.".to_string();
    }
    let mut out = String::new();
    for (i, h) in entries.iter().enumerate() {
        let time = h
            .timestamp
            .as_ref()
            .map(format_time)
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{}. [{time}] {}", i + 1, h.action.name()));
        if let Some(status) = h.status {
            out.push_str(&format!(" [{}]", status.as_str()));
        }
        let params = h.action.params();
        if !params.is_empty() {
            let parts: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            out.push_str(&format!(" ({})", parts.join(", ")));
        }
        out.push('\n');
    }
    out
}

pub fn format_journal(entries: &[&JournalEntry], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json(entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                return "No journal entries.".to_string();
            }
            let mut out = String::new();
            for (i, e) in entries.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, format_insight(e)));
            }
            out
        }
    }
}

fn format_insight(e: &JournalEntry) -> String {
    let mut line = format!("[{}] {}", format_time(&e.timestamp), e.insight);
    if let Some(session) = &e.session {
        line.push_str(&format!(" (session: {session})"));
    }
    if !e.tags.is_empty() {
        line.push_str(&format!(" [{}]", e.tags.join(", ")));
    }
    line
}

pub fn format_reflection(r: &Reflection, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json(r),
        OutputFormat::Text => format_reflection_text(r),
    }
}

fn format_reflection_text(r: &Reflection) -> String {
    if r.is_empty() {
        return "No history to reflect on.".to_string();
    }

    let mut out = String::from("Primitive usage:\n");
    for kind in PrimitiveKind::ALL {
        let count = r.primitives.get(&kind).copied().unwrap_or(0);
        out.push_str(&format!("  {kind}: {count}\n"));
    }

    if !r.top_identities.is_empty() {
        out.push_str("\nTop identities:\n");
        for u in &r.top_identities {
            out.push_str(&format!("  {} ({}x)\n", u.name, u.count));
        }
    }
    if !r.top_substrates.is_empty() {
        out.push_str("\nTop substrates:\n");
        for u in &r.top_substrates {
            out.push_str(&format!("  {} ({}x)\n", u.name, u.count));
        }
    }

    out.push_str("\nStratagem completions:\n");
    if r.completions.is_empty() {
        out.push_str("  (none)\n");
    }
    for c in &r.completions {
        out.push_str(&format!("  {}: {}\n", c.name, c.count));
    }
    if !r.never_completed.is_empty() {
        out.push_str(&format!(
            "  Never completed: {}\n",
            r.never_completed.join(", ")
        ));
    }

    if !r.effectiveness.is_empty() {
        out.push_str("\nEffectiveness (self-reported):\n");
        for e in &r.effectiveness {
            let tag = if e.provisional { " [provisional]" } else { "" };
            out.push_str(&format!(
                "  {}: {:.0}% productive ({}/{}){tag}\n",
                e.name, e.rate, e.productive, e.total
            ));
        }
        for u in &r.unmeasured {
            out.push_str(&format!(
                "  {}: unmeasured ({} completions, 0 outcomes)\n",
                u.name, u.count
            ));
        }
        if let Some(overall) = &r.overall {
            out.push_str(&format!(
                "\n  Overall: {:.0}% productive ({}/{})\n",
                overall.rate, overall.productive, overall.total
            ));
        }
    }

    if let Some(steps) = &r.ritual_steps {
        out.push_str(&format!(
            "\nRitual avg steps: {:.1} (across {} rituals)\n",
            steps.average, steps.rituals
        ));
    }

    if !r.recent_insights.is_empty() {
        out.push_str("\nRecent insights:\n");
        for e in &r.recent_insights {
            out.push_str(&format!("  {}\n", format_insight(e)));
        }
    }

    if !r.advisories.is_empty() {
        out.push_str("\nAdvisories:\n");
        for a in &r.advisories {
            out.push_str(&format!("  {a}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use metacog_core::model::ActiveStratagem;

    #[test]
    fn test_format_time() {
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap();
        assert_eq!(format_time(&t), "2024-03-09 07:05:00");
    }

    #[test]
    fn test_status_json_reports_uncatalogued_stratagem() {
        let mut state = State::new();
        state.stratagem = Some(ActiveStratagem {
            step: 2,
            ..ActiveStratagem::new("ghost")
        });

        let out = format_status(&state, None, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["stratagem"]["name"], "ghost");
        assert_eq!(value["stratagem"]["step"], 2);
        assert_eq!(value["stratagem"]["in_catalog"], false);

        let text = format_status(&state, None, OutputFormat::Text);
        assert!(text.contains("Stratagem: ghost (step 3, not in this build's catalog)"));
    }

    #[test]
    fn test_status_json_idle_stratagem_is_null() {
        let state = State::new();
        let out = format_status(&state, None, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["stratagem"].is_null());
    }
}
