//! Popover placement and the per-table popover registry
//!
//! Quick-filter and row-action panels open below their anchor, flip above
//! when the space below is too small, and always stay inside the viewport.

use crate::filter::FilterField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum distance between a panel and the viewport edge
pub const VIEWPORT_MARGIN: f64 = 8.0;

/// Space between the anchor and the panel
pub const ANCHOR_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

/// Where a panel goes, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub above: bool,
}

impl Placement {
    pub fn rect(&self, panel: PanelSize) -> Rect {
        Rect::new(self.left, self.top, panel.width, panel.height)
    }
}

/// Position a panel against its anchor
pub fn place_panel(anchor: Rect, panel: PanelSize, viewport: Viewport) -> Placement {
    let below = anchor.bottom() + ANCHOR_GAP;
    let space_below = viewport.height - VIEWPORT_MARGIN - below;
    let space_above = anchor.top - ANCHOR_GAP - VIEWPORT_MARGIN;
    let above = panel.height > space_below && space_above > space_below;

    let raw_top = if above {
        anchor.top - ANCHOR_GAP - panel.height
    } else {
        below
    };
    let max_top = (viewport.height - VIEWPORT_MARGIN - panel.height).max(VIEWPORT_MARGIN);
    let max_left = (viewport.width - VIEWPORT_MARGIN - panel.width).max(VIEWPORT_MARGIN);

    Placement {
        left: anchor.left.clamp(VIEWPORT_MARGIN, max_left),
        top: raw_top.clamp(VIEWPORT_MARGIN, max_top),
        above,
    }
}

/// Which popover a table can show
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum PopoverKind {
    /// Column quick filter, keyed by column id
    QuickFilter(String),
    /// Row action menu, keyed by row id
    RowActions(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopoverEvent {
    Resize(Viewport),
    Scroll,
    /// Pointer pressed at viewport coordinates
    PointerDown { x: f64, y: f64 },
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopover {
    pub kind: PopoverKind,
    pub panel: PanelSize,
    pub placement: Placement,
}

/// Anchors, quick-filter contents and the open panel of one table
#[derive(Debug, Clone)]
pub struct PopoverRegistry {
    viewport: Viewport,
    anchors: HashMap<PopoverKind, Rect>,
    quick_filters: HashMap<String, FilterField>,
    open: Option<OpenPopover>,
}

impl PopoverRegistry {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            anchors: HashMap::new(),
            quick_filters: HashMap::new(),
            open: None,
        }
    }

    /// Record (or move) an anchor rectangle, e.g. after layout or scroll
    pub fn set_anchor(&mut self, kind: PopoverKind, rect: Rect) {
        self.anchors.insert(kind, rect);
    }

    pub fn remove_anchor(&mut self, kind: &PopoverKind) {
        self.anchors.remove(kind);
        if self.open.as_ref().is_some_and(|o| &o.kind == kind) {
            self.open = None;
        }
    }

    pub fn register_quick_filter(&mut self, column_id: &str, field: FilterField) {
        self.quick_filters.insert(column_id.to_string(), field);
    }

    /// Filter dimension edited by a column's quick filter
    pub fn quick_filter(&self, column_id: &str) -> Option<FilterField> {
        self.quick_filters.get(column_id).copied()
    }

    pub fn current(&self) -> Option<&OpenPopover> {
        self.open.as_ref()
    }

    pub fn is_open(&self, kind: &PopoverKind) -> bool {
        self.open.as_ref().is_some_and(|o| &o.kind == kind)
    }

    /// Open a panel at its anchor, replacing any open one.
    ///
    /// Quick filters need registered content; every kind needs an anchor.
    pub fn open(&mut self, kind: PopoverKind, panel: PanelSize) -> Option<Placement> {
        if let PopoverKind::QuickFilter(column_id) = &kind {
            self.quick_filter(column_id)?;
        }
        let anchor = *self.anchors.get(&kind)?;
        let placement = place_panel(anchor, panel, self.viewport);
        self.open = Some(OpenPopover {
            kind,
            panel,
            placement,
        });
        Some(placement)
    }

    pub fn close(&mut self) -> Option<PopoverKind> {
        self.open.take().map(|o| o.kind)
    }

    /// Reposition or dismiss the open panel; returns whether it is still open
    pub fn handle(&mut self, event: PopoverEvent) -> bool {
        match event {
            PopoverEvent::Resize(viewport) => {
                self.viewport = viewport;
                self.reposition();
            }
            PopoverEvent::Scroll => self.reposition(),
            PopoverEvent::PointerDown { x, y } => {
                let inside = self.open.as_ref().is_some_and(|open| {
                    open.placement.rect(open.panel).contains(x, y)
                        || self.anchors.get(&open.kind).is_some_and(|a| a.contains(x, y))
                });
                if !inside {
                    self.open = None;
                }
            }
            PopoverEvent::Escape => self.open = None,
        }
        self.open.is_some()
    }

    fn reposition(&mut self) {
        let anchor = match &self.open {
            Some(open) => self.anchors.get(&open.kind).copied(),
            None => return,
        };
        let viewport = self.viewport;
        match anchor {
            Some(anchor) => {
                if let Some(open) = self.open.as_mut() {
                    open.placement = place_panel(anchor, open.panel, viewport);
                }
            }
            None => self.open = None,
        }
    }
}

impl Default for PopoverRegistry {
    fn default() -> Self {
        Self::new(Viewport {
            width: 1280.0,
            height: 800.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport { width: 1000.0, height: 600.0 };
    const PANEL: PanelSize = PanelSize { width: 240.0, height: 200.0 };

    #[test]
    fn test_places_below_anchor() {
        let placement = place_panel(Rect::new(100.0, 50.0, 80.0, 30.0), PANEL, VIEWPORT);
        assert_eq!(placement, Placement { left: 100.0, top: 84.0, above: false });
    }

    #[test]
    fn test_flips_above_when_no_room_below() {
        let placement = place_panel(Rect::new(100.0, 500.0, 80.0, 30.0), PANEL, VIEWPORT);
        assert!(placement.above);
        assert_eq!(placement.top, 296.0);
    }

    #[test]
    fn test_clamps_to_viewport_margin() {
        let placement = place_panel(Rect::new(900.0, 10.0, 80.0, 20.0), PANEL, VIEWPORT);
        assert_eq!(placement.left, 1000.0 - 8.0 - 240.0);
        let placement = place_panel(Rect::new(-20.0, 10.0, 80.0, 20.0), PANEL, VIEWPORT);
        assert_eq!(placement.left, VIEWPORT_MARGIN);
    }

    #[test]
    fn test_registry_lifecycle() {
        let mut registry = PopoverRegistry::new(VIEWPORT);
        let kind = PopoverKind::QuickFilter("shop".to_string());
        registry.set_anchor(kind.clone(), Rect::new(100.0, 50.0, 80.0, 30.0));
        assert!(registry.open(kind.clone(), PANEL).is_none());

        registry.register_quick_filter("shop", FilterField::Shop);
        assert!(registry.open(kind.clone(), PANEL).is_some());
        assert!(registry.handle(PopoverEvent::PointerDown { x: 150.0, y: 150.0 }));
        assert!(!registry.handle(PopoverEvent::PointerDown { x: 900.0, y: 500.0 }));

        registry.open(kind.clone(), PANEL);
        registry.set_anchor(kind.clone(), Rect::new(100.0, 500.0, 80.0, 30.0));
        assert!(registry.handle(PopoverEvent::Scroll));
        assert!(registry.current().unwrap().placement.above);
        assert!(!registry.handle(PopoverEvent::Escape));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = PopoverRegistry::default();
        let second = PopoverRegistry::default();
        first.register_quick_filter("amount", FilterField::Amount);
        assert_eq!(first.quick_filter("amount"), Some(FilterField::Amount));
        assert_eq!(second.quick_filter("amount"), None);
    }
}
