//! Queries over journal entries. Persistence lives in [`crate::storage`].

use crate::model::JournalEntry;

/// Entries matching every given filter, oldest first.
pub fn filter_journal<'a>(
    entries: &'a [JournalEntry],
    tag: Option<&str>,
    session: Option<&str>,
) -> Vec<&'a JournalEntry> {
    entries
        .iter()
        .filter(|e| tag.map_or(true, |t| e.has_tag(t)))
        .filter(|e| session.map_or(true, |s| e.session.as_deref() == Some(s)))
        .collect()
}

/// The trailing `n` items, or all of them when `n` is zero.
pub fn last_n<T>(items: &[T], n: usize) -> &[T] {
    if n == 0 || n >= items.len() {
        items
    } else {
        &items[items.len() - n..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(insight: &str, session: Option<&str>, tags: &[&str]) -> JournalEntry {
        JournalEntry::new(
            insight,
            session.map(str::to_string),
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_filter_by_tag_and_session() {
        let entries = vec![
            entry("one", Some("deep"), &["focus"]),
            entry("two", None, &["focus", "stuck"]),
            entry("three", Some("deep"), &[]),
        ];

        let focus: Vec<_> = filter_journal(&entries, Some("focus"), None)
            .iter()
            .map(|e| e.insight.as_str())
            .collect();
        assert_eq!(focus, vec!["one", "two"]);

        let deep = filter_journal(&entries, None, Some("deep"));
        assert_eq!(deep.len(), 2);

        let both = filter_journal(&entries, Some("focus"), Some("deep"));
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].insight, "one");

        assert_eq!(filter_journal(&entries, None, None).len(), 3);
    }

    #[test]
    fn test_last_n() {
        let items = [1, 2, 3, 4];
        assert_eq!(last_n(&items, 2), &[3, 4]);
        assert_eq!(last_n(&items, 0), &items);
        assert_eq!(last_n(&items, 10), &items);
    }

    #[test]
    fn test_empty_session_is_dropped() {
        let e = JournalEntry::new("x", Some(String::new()), vec![]);
        assert!(e.session.is_none());
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("session").is_none());
        assert!(json.get("tags").is_none());
    }
}
