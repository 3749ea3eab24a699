//! Table render engine: cell renderer chain, popovers and the HTML table

mod cell;
mod html;
mod popover;

pub use cell::{
    overflow_tooltip, renderer_chain, resolve_cell, BuiltinFn, BuiltinRenderers, CellContent,
    CellContext, ColumnRenderer, EMPTY_CELL,
};
pub use html::{render_table, HtmlTable, CHECKBOX_WIDTH};
pub use popover::{
    place_panel, OpenPopover, PanelSize, Placement, PopoverEvent, PopoverKind, PopoverRegistry,
    Rect, Viewport, ANCHOR_GAP, VIEWPORT_MARGIN,
};
