use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One insight in the append-only journal (`journal.jsonl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub insight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl JournalEntry {
    pub fn new(insight: &str, session: Option<String>, tags: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            insight: insight.to_string(),
            session: session.filter(|s| !s.is_empty()),
            tags,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
