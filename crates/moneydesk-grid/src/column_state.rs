//! Column state reducer - runtime column order, width, visibility and pinning
//!
//! The layout keeps one `ColumnState` per registry column. `order` is always
//! a dense permutation `0..n`; only `reorder` and `reset` change it.

use crate::column::{ColumnDefinition, ColumnRegistry};
use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

/// Runtime state of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub id: String,
    pub width: u32,
    pub visible: bool,
    pub order: usize,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ColumnState {
    fn from_definition(definition: &ColumnDefinition, order: usize) -> Self {
        Self {
            id: definition.id.clone(),
            width: definition.default_width,
            visible: definition.default_visible,
            order,
            pinned: definition.default_pinned,
            format: None,
        }
    }
}

/// A column as it should be drawn
#[derive(Debug, Clone)]
pub struct VisibleColumn<'r> {
    pub definition: &'r ColumnDefinition,
    pub width: u32,
    pub pinned: bool,
    /// Left offset among pinned columns, `None` for scrolling columns
    pub sticky_left: Option<u32>,
    pub format: Option<String>,
}

impl<'r> VisibleColumn<'r> {
    pub fn id(&self) -> &str {
        &self.definition.id
    }
}

/// Move `source` immediately before `target`, or to the end when `target`
/// is `None` or unknown.
///
/// Returns the input slice itself (`Cow::Borrowed`) whenever the move would
/// not change anything, so callers can skip re-rendering.
pub fn reorder<'a>(order: &'a [String], source: &str, target: Option<&str>) -> Cow<'a, [String]> {
    if target == Some(source) {
        return Cow::Borrowed(order);
    }
    let Some(from) = order.iter().position(|id| id == source) else {
        return Cow::Borrowed(order);
    };

    let mut next = order.to_vec();
    let moved = next.remove(from);
    let insert_at = target
        .and_then(|t| next.iter().position(|id| id == t))
        .unwrap_or(next.len());
    next.insert(insert_at, moved);

    if next.as_slice() == order {
        Cow::Borrowed(order)
    } else {
        Cow::Owned(next)
    }
}

/// Runtime layout for every column of a registry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnLayout {
    columns: Vec<ColumnState>,
}

impl ColumnLayout {
    /// Layout built from registry defaults
    pub fn from_registry(registry: &ColumnRegistry) -> Self {
        Self {
            columns: registry
                .iter()
                .enumerate()
                .map(|(order, definition)| ColumnState::from_definition(definition, order))
                .collect(),
        }
    }

    /// Rebuild a saved layout against the current registry.
    ///
    /// Unknown ids are dropped, missing columns are appended with defaults,
    /// widths are clamped and the order is re-densified.
    pub fn reconcile(registry: &ColumnRegistry, saved: Vec<ColumnState>) -> Self {
        let mut kept: Vec<ColumnState> = saved
            .into_iter()
            .filter_map(|mut state| {
                let definition = registry.get(&state.id)?;
                state.width = definition.clamp_width(state.width);
                if definition.is_locked() {
                    state.visible = true;
                }
                Some(state)
            })
            .collect();
        kept.sort_by_key(|s| s.order);
        let mut seen = HashSet::new();
        kept.retain(|s| seen.insert(s.id.clone()));

        for definition in registry.iter() {
            if !kept.iter().any(|s| s.id == definition.id) {
                kept.push(ColumnState::from_definition(definition, usize::MAX));
            }
        }
        for (order, state) in kept.iter_mut().enumerate() {
            state.order = order;
        }
        Self { columns: kept }
    }

    pub fn states(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn state(&self, id: &str) -> Option<&ColumnState> {
        self.columns.iter().find(|s| s.id == id)
    }

    fn state_mut(&mut self, id: &str) -> GridResult<&mut ColumnState> {
        self.columns
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| GridError::UnknownColumn { id: id.to_string() })
    }

    /// Column ids in display order, hidden columns included
    pub fn display_order(&self) -> Vec<String> {
        let mut states: Vec<&ColumnState> = self.columns.iter().collect();
        states.sort_by_key(|s| s.order);
        states.into_iter().map(|s| s.id.clone()).collect()
    }

    /// Visible columns in display order; pinned columns lead
    pub fn visible_columns<'r>(&self, registry: &'r ColumnRegistry) -> Vec<VisibleColumn<'r>> {
        let mut states: Vec<&ColumnState> = self.columns.iter().filter(|s| s.visible).collect();
        states.sort_by_key(|s| (!s.pinned, s.order));

        let mut sticky_offset = 0u32;
        states
            .into_iter()
            .filter_map(|state| {
                let definition = registry.get(&state.id)?;
                let sticky_left = if state.pinned {
                    let left = sticky_offset;
                    sticky_offset = sticky_offset.saturating_add(state.width);
                    Some(left)
                } else {
                    None
                };
                Some(VisibleColumn {
                    definition,
                    width: state.width,
                    pinned: state.pinned,
                    sticky_left,
                    format: state.format.clone(),
                })
            })
            .collect()
    }

    /// Flip visibility; locked columns stay visible and report no change
    pub fn toggle_visibility(&mut self, registry: &ColumnRegistry, id: &str) -> GridResult<bool> {
        let definition = registry.require(id)?;
        if definition.is_locked() {
            log::debug!("column {} is locked, visibility unchanged", id);
            return Ok(false);
        }
        let state = self.state_mut(id)?;
        state.visible = !state.visible;
        Ok(true)
    }

    /// Move `source` before `target`; returns whether the order changed
    pub fn reorder(&mut self, source: &str, target: Option<&str>) -> bool {
        let current = self.display_order();
        let next = match reorder(&current, source, target) {
            Cow::Borrowed(_) => return false,
            Cow::Owned(next) => next,
        };
        for state in self.columns.iter_mut() {
            if let Some(order) = next.iter().position(|id| *id == state.id) {
                state.order = order;
            }
        }
        true
    }

    /// Set a column width, clamped to the column's width bounds
    pub fn resize(&mut self, registry: &ColumnRegistry, id: &str, width: u32) -> GridResult<u32> {
        let width = registry.require(id)?.clamp_width(width);
        let state = self.state_mut(id)?;
        state.width = width;
        Ok(state.width)
    }

    /// Toggle pinning; returns the new pinned flag
    pub fn toggle_pin(&mut self, id: &str) -> GridResult<bool> {
        let state = self.state_mut(id)?;
        state.pinned = !state.pinned;
        Ok(state.pinned)
    }

    pub fn set_format(&mut self, id: &str, format: Option<String>) -> GridResult<()> {
        self.state_mut(id)?.format = format;
        Ok(())
    }

    /// Restore registry defaults
    pub fn reset(&mut self, registry: &ColumnRegistry) {
        *self = Self::from_registry(registry);
    }
}
