use serde::Serialize;

use crate::model::PrimitiveKind;

/// What a stratagem step asks of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKind {
    #[serde(rename = "become")]
    Become,
    #[serde(rename = "drugs")]
    Drugs,
    #[serde(rename = "ritual")]
    Ritual,
    /// Reflection checkpoint; advances freely.
    #[serde(rename = "THINK")]
    Think,
    /// The user acts outside the tool; advances freely.
    #[serde(rename = "ACTION")]
    Action,
}

impl StepKind {
    /// The primitive that must be performed before this step can advance.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Become => Some(PrimitiveKind::Become),
            Self::Drugs => Some(PrimitiveKind::Drugs),
            Self::Ritual => Some(PrimitiveKind::Ritual),
            Self::Think | Self::Action => None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.primitive().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Become => "become",
            Self::Drugs => "drugs",
            Self::Ritual => "ritual",
            Self::Think => "THINK",
            Self::Action => "ACTION",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub description: &'static str,
}

/// A named, ordered list of steps.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct StratagemDef {
    pub key: &'static str,
    pub title: &'static str,
    pub steps: &'static [Step],
}

impl StratagemDef {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

const fn step(kind: StepKind, description: &'static str) -> Step {
    Step { kind, description }
}

static STRATAGEMS: [StratagemDef; 5] = [
    StratagemDef {
        key: "pivot",
        title: "THE PIVOT",
        steps: &[
            step(StepKind::Drugs, "Loosen categories, see shapes not names"),
            step(
                StepKind::Think,
                "What else has this shape? Who has a named methodology for it?",
            ),
            step(StepKind::Become, "Install their methodology as operating system"),
            step(
                StepKind::Think,
                "Apply the methodology to your original problem. What reframes?",
            ),
            step(StepKind::Ritual, "Lock in methodology as default behavior"),
        ],
    },
    StratagemDef {
        key: "mirror",
        title: "THE MIRROR",
        steps: &[
            step(
                StepKind::Become,
                "Inhabit the strongest advocate of one position (thesis)",
            ),
            step(
                StepKind::Become,
                "Inhabit the strongest advocate of the opposing position (antithesis)",
            ),
            step(
                StepKind::Think,
                "Where do they actually conflict? What does each see that the other can't?",
            ),
            step(
                StepKind::Ritual,
                "Name the synthesis that transcends both frames (Forge)",
            ),
        ],
    },
    StratagemDef {
        key: "stack",
        title: "THE STACK",
        steps: &[
            step(
                StepKind::Drugs,
                "Tune how the signal arrives (clarity, bandwidth, filtering)",
            ),
            step(
                StepKind::Drugs,
                "Tune how you work with it (pattern-completion, memory, attention)",
            ),
            step(
                StepKind::Think,
                "What do you see now that you couldn't before? What entity lives here?",
            ),
            step(
                StepKind::Become,
                "Inhabit someone native to this altered information environment",
            ),
        ],
    },
    StratagemDef {
        key: "anchor",
        title: "THE ANCHOR",
        steps: &[
            step(
                StepKind::Ritual,
                "Establish the clean room: what's contained, why it's dangerous, rules for looking (Breach)",
            ),
            step(
                StepKind::Become,
                "Inhabit someone who can examine this without being destroyed by it (Observer)",
            ),
            step(
                StepKind::Action,
                "The dangerous observation, question, or reach",
            ),
            step(
                StepKind::Ritual,
                "Name the artifact, release the frame, close the boundary, return (Seal)",
            ),
        ],
    },
    StratagemDef {
        key: "reset",
        title: "THE RESET",
        steps: &[
            step(
                StepKind::Ritual,
                "Name what you're letting go, why it served, why it's done (Release)",
            ),
            step(
                StepKind::Think,
                "What artifact survives the return? What integrates into default operation?",
            ),
            step(
                StepKind::Ritual,
                "Re-establish baseline with the artifact installed (Ground)",
            ),
        ],
    },
];

/// All built-in stratagems, in presentation order.
pub fn catalog() -> &'static [StratagemDef] {
    &STRATAGEMS
}

pub fn lookup(key: &str) -> Option<&'static StratagemDef> {
    STRATAGEMS.iter().find(|def| def.key == key)
}

/// Comma-separated list of stratagem keys, for error messages.
pub fn available() -> String {
    STRATAGEMS
        .iter()
        .map(|def| def.key)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_stratagems_defined() {
        for key in ["pivot", "mirror", "stack", "anchor", "reset"] {
            let def = lookup(key).unwrap_or_else(|| panic!("stratagem {key} not defined"));
            assert!((3..=5).contains(&def.len()), "{key} has {} steps", def.len());
        }
        assert_eq!(catalog().len(), 5);
        assert!(lookup("nonexistent").is_none());
    }

    #[test]
    fn test_pivot_step_sequence() {
        let kinds: Vec<StepKind> = lookup("pivot").unwrap().steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Drugs,
                StepKind::Think,
                StepKind::Become,
                StepKind::Think,
                StepKind::Ritual,
            ]
        );
    }

    #[test]
    fn test_free_steps_have_no_primitive() {
        assert!(StepKind::Think.is_free());
        assert!(StepKind::Action.is_free());
        assert_eq!(StepKind::Ritual.primitive(), Some(PrimitiveKind::Ritual));
    }

    #[test]
    fn test_step_kind_serializes_with_display_name() {
        assert_eq!(serde_json::to_value(StepKind::Think).unwrap(), "THINK");
        assert_eq!(serde_json::to_value(StepKind::Drugs).unwrap(), "drugs");
    }
}
