//! Column registry - static column definitions shared by every table view

use crate::error::{GridError, GridResult};
use crate::filter::FilterField;
use crate::render::CellContent;
use crate::value::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Explicit cell renderer supplied by a column definition
pub type CellFn = Arc<dyn Fn(&dyn Record) -> Option<CellContent> + Send + Sync>;

/// Value accessor supplied by a column definition; also used as the sort key
pub type AccessorFn = Arc<dyn Fn(&dyn Record) -> FieldValue + Send + Sync>;

/// Horizontal alignment of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_css(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

/// How a column's values compare when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    String,
    Number,
    Date,
}

/// Widest a column may be resized to unless its definition says otherwise
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Static definition of a table column
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnDefinition {
    /// Stable key, also the raw field looked up when nothing else renders
    pub id: String,
    pub label: String,
    pub min_width: u32,
    pub default_width: u32,
    /// Upper bound for resizing
    pub max_width: u32,
    pub align: Align,
    pub default_visible: bool,
    /// Optional columns may be hidden; the rest are locked visible
    pub optional: bool,
    pub sort_type: SortType,
    pub sortable: bool,
    pub default_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_fallback: Option<String>,
    /// Filter dimension edited by this column's quick-filter popover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_filter: Option<FilterField>,
    #[serde(skip)]
    pub render_cell: Option<CellFn>,
    #[serde(skip)]
    pub value_accessor: Option<AccessorFn>,
}

impl Default for ColumnDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            label: String::new(),
            min_width: 60,
            default_width: 120,
            max_width: DEFAULT_MAX_WIDTH,
            align: Align::Left,
            default_visible: true,
            optional: true,
            sort_type: SortType::String,
            sortable: true,
            default_pinned: false,
            empty_fallback: None,
            quick_filter: None,
            render_cell: None,
            value_accessor: None,
        }
    }
}

impl std::fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("min_width", &self.min_width)
            .field("default_width", &self.default_width)
            .field("max_width", &self.max_width)
            .field("align", &self.align)
            .field("default_visible", &self.default_visible)
            .field("optional", &self.optional)
            .field("sort_type", &self.sort_type)
            .field("render_cell", &self.render_cell.is_some())
            .field("value_accessor", &self.value_accessor.is_some())
            .finish()
    }
}

impl ColumnDefinition {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            ..Self::default()
        }
    }

    pub fn widths(mut self, min_width: u32, default_width: u32) -> Self {
        self.min_width = min_width;
        self.default_width = default_width;
        self
    }

    pub fn max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Clamp a requested width into `[min_width, max_width]`
    pub fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(self.min_width, self.max_width.max(self.min_width))
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.optional = false;
        self
    }

    pub fn sort_type(mut self, sort_type: SortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.default_pinned = true;
        self
    }

    pub fn fallback(mut self, value: &str) -> Self {
        self.empty_fallback = Some(value.to_string());
        self
    }

    pub fn quick_filter(mut self, field: FilterField) -> Self {
        self.quick_filter = Some(field);
        self
    }

    pub fn render_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&dyn Record) -> Option<CellContent> + Send + Sync + 'static,
    {
        self.render_cell = Some(Arc::new(render));
        self
    }

    pub fn accessor<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&dyn Record) -> FieldValue + Send + Sync + 'static,
    {
        self.value_accessor = Some(Arc::new(accessor));
        self
    }

    /// Value used for sorting: the accessor when present, else the raw field
    pub fn sort_value(&self, record: &dyn Record) -> FieldValue {
        match &self.value_accessor {
            Some(accessor) => accessor(record),
            None => record.field(&self.id),
        }
    }

    /// Locked columns cannot be hidden
    pub fn is_locked(&self) -> bool {
        !self.optional
    }
}

/// Ordered set of column definitions with unique ids
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDefinition>,
}

impl ColumnRegistry {
    /// Build a registry, rejecting duplicate ids and widths outside
    /// `min_width <= default_width <= max_width`
    pub fn new(columns: Vec<ColumnDefinition>) -> GridResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.clone()) {
                return Err(GridError::DuplicateColumn {
                    id: column.id.clone(),
                });
            }
            if column.min_width > column.default_width {
                return Err(GridError::InvalidWidth {
                    id: column.id.clone(),
                    min: column.min_width,
                    default: column.default_width,
                });
            }
            if column.default_width > column.max_width {
                return Err(GridError::WidthAboveMax {
                    id: column.id.clone(),
                    default: column.default_width,
                    max: column.max_width,
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Like `get`, but unknown ids are an error
    pub fn require(&self, id: &str) -> GridResult<&ColumnDefinition> {
        self.get(id).ok_or_else(|| GridError::UnknownColumn { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn definitions(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
