//! Search/restore controller shared by every table toolbar

use crate::value::Record;
use serde::{Deserialize, Serialize};

/// Current search term plus the one the user last cleared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchController {
    current: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous: Option<String>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a term and an optional previously cleared term
    pub fn with_state(current: &str, previous: Option<&str>) -> Self {
        Self {
            current: current.to_string(),
            previous: previous
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Typing a new term forgets whatever could have been restored
    pub fn set(&mut self, term: &str) {
        if !term.trim().is_empty() {
            self.previous = None;
        }
        self.current = term.to_string();
    }

    /// Clear the term and remember it for `restore`
    pub fn clear(&mut self) {
        if self.current.trim().is_empty() {
            return;
        }
        self.previous = Some(std::mem::take(&mut self.current));
    }

    pub fn can_restore(&self) -> bool {
        self.previous.is_some() && self.current.trim().is_empty()
    }

    /// Bring back the last cleared term; one step only
    pub fn restore(&mut self) -> bool {
        if !self.can_restore() {
            return false;
        }
        if let Some(previous) = self.previous.take() {
            self.current = previous;
        }
        true
    }

    /// Case-insensitive substring match over `fields`; an empty term matches
    pub fn matches<R: Record + ?Sized>(&self, record: &R, fields: &[&str]) -> bool {
        let needle = self.current.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        fields.iter().any(|key| {
            record
                .field(key)
                .as_text()
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clear_then_restore() {
        let mut search = SearchController::new();
        search.set("coffee");
        assert!(!search.can_restore());
        search.clear();
        assert_eq!(search.current(), "");
        assert_eq!(search.previous(), Some("coffee"));
        assert!(search.restore());
        assert_eq!(search.current(), "coffee");
        assert!(!search.restore());
    }

    #[test]
    fn test_typing_drops_previous() {
        let mut search = SearchController::with_state("", Some("rent"));
        assert!(search.can_restore());
        search.set("gym");
        assert_eq!(search.previous(), None);
    }

    #[test]
    fn test_clearing_empty_keeps_previous() {
        let mut search = SearchController::with_state("", Some("rent"));
        search.clear();
        assert_eq!(search.previous(), Some("rent"));
    }

    #[test]
    fn test_matches_fields() {
        let row = json!({"id": "1", "shop": "Corner Cafe", "notes": null, "amount": 12});
        let mut search = SearchController::new();
        assert!(search.matches(&row, &["shop"]));
        search.set("cafe");
        assert!(search.matches(&row, &["notes", "shop"]));
        assert!(!search.matches(&row, &["notes"]));
        search.set("12");
        assert!(search.matches(&row, &["amount"]));
    }
}
