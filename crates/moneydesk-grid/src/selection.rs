//! Selection controller - selected row ids, money summary and the
//! show-selected-only view filter

use crate::value::Record;
use moneydesk_utils::sum_money;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Aggregates over the selected rows
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub count: usize,
    pub amount: f64,
    pub total_back: f64,
    pub final_price: f64,
}

/// State of the header "select all" checkbox over the displayed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderCheck {
    None,
    Some,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    selected: BTreeSet<String>,
    show_selected_only: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn show_selected_only(&self) -> bool {
        self.show_selected_only
    }

    pub fn toggle_row(&mut self, id: &str, checked: bool) {
        if checked {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
        self.settle();
    }

    /// Check or uncheck every displayed row; hidden rows keep their state
    pub fn toggle_all<'a, I>(&mut self, displayed_ids: I, checked: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in displayed_ids {
            if checked {
                self.selected.insert(id.to_string());
            } else {
                self.selected.remove(id);
            }
        }
        self.settle();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.settle();
    }

    /// Drop ids that are no longer in the dataset; returns how many went
    pub fn prune<'a, I>(&mut self, dataset_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = dataset_ids.into_iter().collect();
        let before = self.selected.len();
        self.selected.retain(|id| present.contains(id.as_str()));
        let removed = before - self.selected.len();
        if removed > 0 {
            log::debug!("pruned {} stale selected ids", removed);
        }
        self.settle();
        removed
    }

    /// Enabling is refused while nothing is selected
    pub fn set_show_selected_only(&mut self, enabled: bool) -> bool {
        self.show_selected_only = enabled && !self.selected.is_empty();
        self.show_selected_only
    }

    fn settle(&mut self) {
        if self.selected.is_empty() && self.show_selected_only {
            log::debug!("selection empty, leaving show-selected-only");
            self.show_selected_only = false;
        }
    }

    /// Sum of amount, totalBack and finalPrice over selected rows of the
    /// unfiltered dataset. Ids missing from `rows` are ignored.
    pub fn summary<R: Record>(&self, rows: &[R]) -> SelectionSummary {
        let picked: Vec<&R> = rows.iter().filter(|r| self.is_selected(r.id())).collect();
        let total = |key: &str| {
            sum_money(
                picked
                    .iter()
                    .map(|r| r.field(key).as_number().unwrap_or(0.0)),
            )
        };
        SelectionSummary {
            count: picked.len(),
            amount: total("amount"),
            total_back: total("totalBack"),
            final_price: total("finalPrice"),
        }
    }

    /// Header checkbox state for the displayed rows
    pub fn header_state<R: Record>(&self, displayed: &[R]) -> HeaderCheck {
        let checked = displayed.iter().filter(|r| self.is_selected(r.id())).count();
        match checked {
            0 => HeaderCheck::None,
            n if n == displayed.len() => HeaderCheck::All,
            _ => HeaderCheck::Some,
        }
    }

    /// Apply the show-selected-only view filter
    pub fn displayed<R: Record>(&self, rows: Vec<R>) -> Vec<R> {
        if !self.show_selected_only {
            return rows;
        }
        rows.into_iter().filter(|r| self.is_selected(r.id())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": "a", "amount": 10.0, "totalBack": 0.5, "finalPrice": 9.5}),
            json!({"id": "b", "amount": 25.5, "totalBack": 1.0, "finalPrice": 24.5}),
            json!({"id": "c", "amount": -5.0}),
            json!({"id": "d", "amount": 99.0}),
        ]
    }

    #[test]
    fn test_summary_of_three_rows() {
        let mut selection = SelectionState::new();
        selection.toggle_all(["a", "b", "c"], true);
        let summary = selection.summary(&rows());
        assert_eq!(summary.count, 3);
        assert_eq!(summary.amount, 30.5);
        assert_eq!(summary.total_back, 1.5);
        assert_eq!(summary.final_price, 34.0);
    }

    #[test]
    fn test_summary_ignores_stale_ids() {
        let mut selection = SelectionState::new();
        selection.toggle_row("a", true);
        selection.toggle_row("gone", true);
        let summary = selection.summary(&rows());
        assert_eq!(summary.count, 1);
        assert_eq!(summary.amount, 10.0);
    }

    #[test]
    fn test_prune_drops_missing_ids_and_leaves_view_mode() {
        let mut selection = SelectionState::new();
        selection.toggle_row("gone", true);
        assert!(selection.set_show_selected_only(true));
        assert_eq!(selection.prune(["a", "b"]), 1);
        assert!(selection.is_empty());
        assert!(!selection.show_selected_only());
    }

    #[test]
    fn test_show_selected_only_needs_a_selection() {
        let mut selection = SelectionState::new();
        assert!(!selection.set_show_selected_only(true));
        selection.toggle_row("b", true);
        assert!(selection.set_show_selected_only(true));
        let shown = selection.displayed(rows());
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id(), "b");
        selection.toggle_row("b", false);
        assert!(!selection.show_selected_only());
    }

    #[test]
    fn test_toggle_all_only_touches_displayed() {
        let mut selection = SelectionState::new();
        selection.toggle_row("d", true);
        selection.toggle_all(["a", "b"], true);
        selection.toggle_all(["a", "b"], false);
        assert_eq!(selection.selected_ids().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn test_header_state() {
        let all = rows();
        let mut selection = SelectionState::new();
        assert_eq!(selection.header_state(&all), HeaderCheck::None);
        selection.toggle_row("a", true);
        assert_eq!(selection.header_state(&all), HeaderCheck::Some);
        selection.toggle_all(all.iter().map(|r| r.id()), true);
        assert_eq!(selection.header_state(&all), HeaderCheck::All);
    }
}
