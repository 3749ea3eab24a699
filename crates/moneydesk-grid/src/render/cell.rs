//! Cell renderer chain

use crate::column::{AccessorFn, CellFn, ColumnDefinition};
use crate::value::Record;
use std::collections::HashMap;
use std::sync::Arc;

/// Literal shown when no renderer produces anything
pub const EMPTY_CELL: &str = "--";

/// Rendered cell text plus an optional tooltip override
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellContent {
    pub text: String,
    /// Explicit tooltip, emitted as `data-tooltip-text`
    pub tooltip: Option<String>,
}

impl CellContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Per-column context passed to built-in renderers
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub column: &'a ColumnDefinition,
    /// Format chosen in the column's layout state
    pub format: Option<&'a str>,
}

pub type BuiltinFn = Arc<dyn Fn(&dyn Record, &CellContext<'_>) -> Option<CellContent> + Send + Sync>;

/// Built-in renderers of one table, keyed by column id
#[derive(Clone, Default)]
pub struct BuiltinRenderers {
    renderers: HashMap<String, BuiltinFn>,
}

impl BuiltinRenderers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, column_id: &str, render: F) -> &mut Self
    where
        F: Fn(&dyn Record, &CellContext<'_>) -> Option<CellContent> + Send + Sync + 'static,
    {
        self.renderers.insert(column_id.to_string(), Arc::new(render));
        self
    }

    pub fn get(&self, column_id: &str) -> Option<&BuiltinFn> {
        self.renderers.get(column_id)
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.renderers.contains_key(column_id)
    }
}

impl std::fmt::Debug for BuiltinRenderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.renderers.keys().collect();
        keys.sort();
        f.debug_struct("BuiltinRenderers").field("columns", &keys).finish()
    }
}

/// One link of a column's renderer chain
#[derive(Clone)]
pub enum ColumnRenderer {
    /// The column's own `render_cell`
    Fixed(CellFn),
    /// The column's `value_accessor`, shown as text
    Accessor(AccessorFn),
    /// A built-in renderer registered under this column id
    Builtin(String),
    /// The record field named like the column
    RawField(String),
    /// The column's `empty_fallback`
    Fallback(String),
}

impl std::fmt::Debug for ColumnRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRenderer::Fixed(_) => f.write_str("Fixed"),
            ColumnRenderer::Accessor(_) => f.write_str("Accessor"),
            ColumnRenderer::Builtin(id) => write!(f, "Builtin({})", id),
            ColumnRenderer::RawField(id) => write!(f, "RawField({})", id),
            ColumnRenderer::Fallback(value) => write!(f, "Fallback({})", value),
        }
    }
}

impl ColumnRenderer {
    fn render(
        &self,
        record: &dyn Record,
        context: &CellContext<'_>,
        builtins: &BuiltinRenderers,
    ) -> Option<CellContent> {
        match self {
            ColumnRenderer::Fixed(render) => render(record),
            ColumnRenderer::Accessor(accessor) => accessor(record).as_text().map(CellContent::text),
            ColumnRenderer::Builtin(id) => builtins.get(id).and_then(|render| render(record, context)),
            ColumnRenderer::RawField(key) => record.field(key).as_text().map(CellContent::text),
            ColumnRenderer::Fallback(value) => Some(CellContent::text(value.clone())),
        }
    }
}

/// Renderer chain for a column, highest priority first
pub fn renderer_chain(column: &ColumnDefinition, builtins: &BuiltinRenderers) -> Vec<ColumnRenderer> {
    let mut chain = Vec::with_capacity(3);
    if let Some(render) = &column.render_cell {
        chain.push(ColumnRenderer::Fixed(render.clone()));
    }
    if let Some(accessor) = &column.value_accessor {
        chain.push(ColumnRenderer::Accessor(accessor.clone()));
    }
    if builtins.contains(&column.id) {
        chain.push(ColumnRenderer::Builtin(column.id.clone()));
    }
    chain.push(ColumnRenderer::RawField(column.id.clone()));
    if let Some(fallback) = &column.empty_fallback {
        chain.push(ColumnRenderer::Fallback(fallback.clone()));
    }
    chain
}

/// Walk the chain; the first non-empty result wins, else `--`
pub fn resolve_cell(
    chain: &[ColumnRenderer],
    record: &dyn Record,
    context: &CellContext<'_>,
    builtins: &BuiltinRenderers,
) -> CellContent {
    chain
        .iter()
        .filter_map(|renderer| renderer.render(record, context, builtins))
        .find(|content| !content.is_empty())
        .unwrap_or_else(|| CellContent::text(EMPTY_CELL))
}

/// Tooltip for a cell: the explicit override, or the cell text when the
/// content overflows its box
pub fn overflow_tooltip(
    scroll_width: u32,
    client_width: u32,
    explicit: Option<&str>,
    text: &str,
) -> Option<String> {
    if let Some(explicit) = explicit.filter(|t| !t.trim().is_empty()) {
        return Some(explicit.to_string());
    }
    if scroll_width > client_width {
        Some(text.to_string())
    } else {
        None
    }
}
