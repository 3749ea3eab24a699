//! Table engine - owns every controller of one table instance
//!
//! Rows flow through search, filters, sort, pagination and finally the
//! show-selected-only view filter. All mutation goes through `&mut self`.

use crate::column::ColumnRegistry;
use crate::column_state::{ColumnLayout, VisibleColumn};
use crate::error::{GridError, GridResult};
use crate::filter::{FilterField, FilterOptions, FilterOverride, FilterState, MatchOptions};
use crate::pagination::{paginate, Page, Pagination};
use crate::render::{render_table, BuiltinRenderers, HtmlTable, PopoverRegistry};
use crate::search::SearchController;
use crate::selection::{HeaderCheck, SelectionState, SelectionSummary};
use crate::sort::{sort_rows, toggle, SortDescriptor};
use crate::token::{RestoreTokenCodec, TableState};
use crate::value::Record;

/// What a table shows for one render pass
#[derive(Debug, Clone)]
pub struct TableView<'r, R> {
    pub page: Page<&'r R>,
    pub options: FilterOptions,
    pub summary: SelectionSummary,
    pub header: HeaderCheck,
}

#[derive(Debug, Clone)]
pub struct TableEngine {
    registry: ColumnRegistry,
    layout: ColumnLayout,
    builtins: BuiltinRenderers,
    search_fields: Vec<String>,
    codec: RestoreTokenCodec,
    filters: FilterState,
    sort: Vec<SortDescriptor>,
    selection: SelectionState,
    search: SearchController,
    pagination: Pagination,
    quick_filter_id: Option<String>,
    popovers: PopoverRegistry,
}

impl TableEngine {
    pub fn new(registry: ColumnRegistry, builtins: BuiltinRenderers, search_fields: &[&str]) -> Self {
        let mut popovers = PopoverRegistry::default();
        for column in registry.iter() {
            if let Some(field) = column.quick_filter {
                popovers.register_quick_filter(&column.id, field);
            }
        }
        let codec = RestoreTokenCodec::default();
        Self {
            layout: ColumnLayout::from_registry(&registry),
            registry,
            builtins,
            search_fields: search_fields.iter().map(|s| s.to_string()).collect(),
            pagination: Pagination::new(1, codec.default_page_size),
            codec,
            filters: FilterState::default(),
            sort: Vec::new(),
            selection: SelectionState::new(),
            search: SearchController::new(),
            quick_filter_id: None,
            popovers,
        }
    }

    /// Use page-size limits from configuration
    pub fn with_codec(mut self, codec: RestoreTokenCodec) -> Self {
        self.pagination.page_size = codec.default_page_size;
        self.codec = codec;
        self
    }

    /// Start from a saved column layout
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = ColumnLayout::reconcile(&self.registry, layout.states().to_vec());
        self
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ColumnLayout {
        &mut self.layout
    }

    pub fn visible_columns(&self) -> Vec<VisibleColumn<'_>> {
        self.layout.visible_columns(&self.registry)
    }

    pub fn builtins(&self) -> &BuiltinRenderers {
        &self.builtins
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> &[SortDescriptor] {
        &self.sort
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    /// Carry a previous search term across stateless requests
    pub fn set_search_previous(&mut self, previous: Option<&str>) {
        self.search = SearchController::with_state(self.search.current(), previous);
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn popovers(&self) -> &PopoverRegistry {
        &self.popovers
    }

    pub fn popovers_mut(&mut self) -> &mut PopoverRegistry {
        &mut self.popovers
    }

    pub fn set_filter(&mut self, update: FilterOverride) {
        self.filters.apply(update);
        self.pagination.page = 1;
    }

    pub fn clear_filter(&mut self, field: FilterField) {
        self.filters.clear(field);
        self.pagination.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.pagination.page = 1;
    }

    pub fn set_search(&mut self, term: &str) {
        self.search.set(term);
        self.pagination.page = 1;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.pagination.page = 1;
    }

    pub fn restore_search(&mut self) -> bool {
        let restored = self.search.restore();
        if restored {
            self.pagination.page = 1;
        }
        restored
    }

    /// Header click; unsortable columns are ignored
    pub fn toggle_sort(&mut self, column_id: &str, multi: bool) -> GridResult<()> {
        let column = self.registry.require(column_id)?;
        if !column.sortable {
            log::debug!("column {} is not sortable", column_id);
            return Ok(());
        }
        self.sort = toggle(&self.sort, column_id, multi);
        Ok(())
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let state = TableState {
            pagination: Pagination::new(1, page_size),
            ..TableState::default()
        };
        self.pagination = self.codec.sanitize(&state).pagination;
    }

    pub fn set_quick_filter_id(&mut self, column_id: Option<&str>) -> GridResult<()> {
        if let Some(id) = column_id {
            if self.popovers.quick_filter(id).is_none() {
                return Err(GridError::UnknownColumn { id: id.to_string() });
            }
        }
        self.quick_filter_id = column_id.map(str::to_string);
        Ok(())
    }

    /// Snapshot for the restore token
    pub fn state(&self) -> TableState {
        TableState {
            search_term: self.search.current().to_string(),
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            pagination: self.pagination,
            quick_filter_id: self.quick_filter_id.clone(),
        }
    }

    /// Apply a decoded state; sort keys for unknown columns are dropped
    pub fn restore(&mut self, state: TableState) {
        let state = self.codec.sanitize(&state);
        self.search = SearchController::with_state(&state.search_term, None);
        self.sort = state
            .sort
            .into_iter()
            .filter(|d| self.registry.get(&d.id).is_some_and(|c| c.sortable))
            .collect();
        self.filters = state.filters;
        self.pagination = state.pagination;
        self.quick_filter_id = state
            .quick_filter_id
            .filter(|id| self.popovers.quick_filter(id).is_some());
    }

    pub fn encode_state(&self) -> String {
        self.codec.encode(&self.state())
    }

    /// Rows that pass search and filters, sorted
    pub fn filtered<'r, R: Record>(&self, rows: &'r [R]) -> Vec<&'r R> {
        let mut matched = self.searched(rows);
        matched.retain(|r| self.filters.matches(*r, &MatchOptions::default()));
        sort_rows(&mut matched, &self.sort, &self.registry);
        matched
    }

    fn searched<'r, R: Record>(&self, rows: &'r [R]) -> Vec<&'r R> {
        let fields: Vec<&str> = self.search_fields.iter().map(String::as_str).collect();
        rows.iter()
            .filter(|r| self.search.matches(*r, &fields))
            .collect()
    }

    /// Reconcile with a new dataset: drop stale filter values and selected ids
    pub fn sync_rows<R: Record>(&mut self, rows: &[R]) -> Vec<FilterField> {
        let searched: Vec<&R> = self.searched(rows);
        let cleared = self.filters.prune_stale(&searched);
        self.selection.prune(rows.iter().map(|r| r.id()));
        cleared
    }

    pub fn view<'r, R: Record>(&self, rows: &'r [R]) -> TableView<'r, R> {
        let searched = self.searched(rows);
        let options = self.filters.all_options(&searched);
        let page = paginate(self.filtered(rows), self.pagination);
        let items = self.selection.displayed(page.items.clone());
        let page = Page { items, ..page };
        TableView {
            header: self.selection.header_state(&page.items),
            summary: self.selection.summary(rows),
            options,
            page,
        }
    }

    /// HTML table for the current page
    pub fn render_html<R: Record>(&self, rows: &[R], table_id: &str, endpoint: &str) -> String {
        let view = self.view(rows);
        let columns = self.visible_columns();
        let table = HtmlTable {
            table_id,
            columns: &columns,
            builtins: &self.builtins,
            sort: &self.sort,
            selection: &self.selection,
            endpoint,
        };
        render_table(&table, &view.page.items)
    }
}
