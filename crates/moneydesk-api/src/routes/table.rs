//! Request parameters and the table fragment shared by the grid screens
//!
//! Every table request is stateless: the client sends the restore token it
//! was last given plus whatever changed (search term, header click, filter
//! pick, page), and gets back a fresh token with the rendered result.

use crate::error::{ApiError, ApiResult};
use moneydesk_config::{CurrencyConfig, TableConfig};
use moneydesk_grid::{
    AmountOperator, FilterField, FilterOptions, FilterOverride, FilterState, HeaderCheck, Page,
    Record, RestoreTokenCodec, SelectionSummary, SortDescriptor, SortDirection, TableEngine, TableState,
};
use moneydesk_utils::{escape_html, format_amount};
use serde::Serialize;
use std::collections::HashMap;

pub type Params = HashMap<String, String>;

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn flag(params: &Params, key: &str) -> bool {
    params
        .get(key)
        .is_some_and(|v| matches!(v.as_str(), "true" | "1" | "on"))
}

/// Comma-separated list, blanks dropped
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(non_blank).collect()
}

/// `id:dir,id:dir`; a missing direction means ascending
pub fn parse_sort(raw: &str) -> Vec<SortDescriptor> {
    raw.split(',')
        .filter_map(|part| {
            let (id, direction) = part.split_once(':').unwrap_or((part, "asc"));
            let id = id.trim();
            if id.is_empty() {
                None
            } else {
                Some(SortDescriptor::new(id, SortDirection::normalize(direction)))
            }
        })
        .collect()
}

/// Overlay explicit filter parameters; a present but blank parameter clears
pub fn apply_filter_params(filters: &mut FilterState, params: &Params) {
    let single: [(&str, fn(Option<String>) -> FilterOverride); 5] = [
        ("person", FilterOverride::Person),
        ("account", FilterOverride::Account),
        ("category", FilterOverride::Category),
        ("shop", FilterOverride::Shop),
        ("notes", FilterOverride::Notes),
    ];
    for (key, update) in single {
        if let Some(value) = params.get(key) {
            filters.apply(update(non_blank(value)));
        }
    }
    if let Some(value) = params.get("types") {
        filters.apply(FilterOverride::Types(parse_list(value)));
    }
    if let Some(value) = params.get("debtTags") {
        filters.apply(FilterOverride::DebtTags(parse_list(value)));
    }
    if params.contains_key("amountOperator") || params.contains_key("amountValue") {
        let operator = match params.get("amountOperator") {
            Some(raw) => raw.parse::<AmountOperator>().ok(),
            None => filters.amount_operator,
        };
        let value = match params.get("amountValue") {
            Some(raw) => non_blank(raw),
            None => filters.amount_value.clone(),
        };
        filters.apply(FilterOverride::Amount(operator, value));
    }
    if let Some(value) = params.get("year") {
        filters.apply(FilterOverride::Year(value.trim().parse().ok()));
    }
    if let Some(value) = params.get("month") {
        filters.apply(FilterOverride::Month(value.trim().parse().ok()));
    }
}

/// Decode the token and overlay explicit parameters.
///
/// A filter or page-size change sends the user back to page 1 unless the
/// request also names a page.
pub fn table_state(codec: &RestoreTokenCodec, params: &Params) -> TableState {
    let mut state = codec.decode_or_default(params.get("token").map(String::as_str));

    if let Some(sort) = params.get("sort") {
        state.sort = parse_sort(sort);
    }

    let before = state.filters.clone();
    apply_filter_params(&mut state.filters, params);
    if state.filters != before {
        state.pagination.page = 1;
    }

    if let Some(size) = params.get("pageSize").and_then(|s| s.trim().parse::<usize>().ok()) {
        if size != state.pagination.page_size {
            state.pagination.page = 1;
        }
        state.pagination.page_size = size;
    }
    if let Some(page) = params.get("page").and_then(|s| s.trim().parse::<usize>().ok()) {
        state.pagination.page = page;
    }
    if let Some(column) = params.get("quickFilter") {
        state.quick_filter_id = non_blank(column);
    }
    state
}

/// Bring an engine to the state a request describes, then reconcile it with
/// the rows it will render.
///
/// Returns the filter dimensions that were cleared because their value no
/// longer occurs in the data.
pub fn prepare<R: Record>(
    engine: &mut TableEngine,
    codec: &RestoreTokenCodec,
    params: &Params,
    rows: &[R],
) -> ApiResult<Vec<FilterField>> {
    engine.restore(table_state(codec, params));
    engine.set_search_previous(params.get("prev").map(String::as_str));

    if let Some(term) = params.get("q") {
        if term != engine.search().current() {
            engine.set_search(term);
        }
    }
    match params.get("search_action").map(String::as_str) {
        Some("clear") => engine.clear_search(),
        Some("restore") => {
            engine.restore_search();
        }
        Some("") | None => {}
        Some(other) => return Err(ApiError::bad_request(format!("Unknown search action: {}", other))),
    }

    if let Some(field) = params.get("clear_filter").filter(|f| !f.is_empty()) {
        let field: FilterField = field.parse().map_err(ApiError::bad_request)?;
        engine.clear_filter(field);
    }
    if flag(params, "reset_filters") {
        engine.reset_filters();
    }
    if let Some(column) = params.get("sort_click").filter(|c| !c.is_empty()) {
        engine.toggle_sort(column, flag(params, "multi"))?;
    }

    if let Some(ids) = params.get("selected") {
        for id in parse_list(ids) {
            engine.selection_mut().toggle_row(&id, true);
        }
    }
    let cleared = engine.sync_rows(rows);
    if !cleared.is_empty() {
        log::debug!("cleared stale filters: {:?}", cleared);
    }
    if flag(params, "selectedOnly") && !engine.selection_mut().set_show_selected_only(true) {
        log::debug!("show selected only ignored: nothing selected");
    }
    Ok(cleared)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub can_restore: bool,
}

/// JSON body of the table endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse<'r, R> {
    #[serde(flatten)]
    pub page: Page<&'r R>,
    pub options: FilterOptions,
    pub summary: SelectionSummary,
    pub header: HeaderCheck,
    pub state: TableState,
    pub search: SearchInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cleared_filters: Vec<FilterField>,
    pub token: String,
}

pub fn table_response<'r, R: Record>(
    engine: &TableEngine,
    rows: &'r [R],
    cleared_filters: Vec<FilterField>,
) -> TableResponse<'r, R> {
    let view = engine.view(rows);
    TableResponse {
        page: view.page,
        options: view.options,
        summary: view.summary,
        header: view.header,
        state: engine.state(),
        search: SearchInfo {
            term: engine.search().current().to_string(),
            previous: engine.search().previous().map(str::to_string),
            can_restore: engine.search().can_restore(),
        },
        cleared_filters,
        token: engine.encode_state(),
    }
}

/// Where a table fragment lives on the page
#[derive(Debug, Clone, Copy)]
pub struct TableTarget<'a> {
    pub table_id: &'a str,
    pub endpoint: &'a str,
}

impl TableTarget<'_> {
    /// `hx-*` attributes re-rendering the table with extra values
    fn hx(&self, vals: &serde_json::Value) -> String {
        format!(
            "hx-get='{}' hx-target='#{}-container' hx-include='#{}-state' hx-vals='{}'",
            escape_html(self.endpoint),
            escape_html(self.table_id),
            escape_html(self.table_id),
            escape_html(&vals.to_string())
        )
    }
}

fn filter_label(field: FilterField) -> &'static str {
    match field {
        FilterField::Person => "Person",
        FilterField::Account => "Account",
        FilterField::Category => "Category",
        FilterField::Shop => "Shop",
        FilterField::Type => "Type",
        FilterField::DebtTag => "Debt tag",
        FilterField::Amount => "Amount",
        FilterField::Year => "Year",
        FilterField::Month => "Month",
        FilterField::Notes => "Notes",
    }
}

/// Query parameter that sets a dimension to `value`
fn option_vals(filters: &FilterState, field: FilterField, value: &str) -> serde_json::Value {
    let toggled = |current: &[String]| -> String {
        let mut next: Vec<String> = current.iter().filter(|v| v.as_str() != value).cloned().collect();
        if next.len() == current.len() {
            next.push(value.to_string());
        }
        next.join(",")
    };
    match field {
        FilterField::Type => serde_json::json!({ "types": toggled(&filters.types) }),
        FilterField::DebtTag => serde_json::json!({ "debtTags": toggled(&filters.debt_tags) }),
        other => {
            let mut vals = serde_json::Map::new();
            vals.insert(other.key().to_string(), serde_json::Value::from(value));
            serde_json::Value::Object(vals)
        }
    }
}

fn is_chosen(filters: &FilterState, field: FilterField, value: &str) -> bool {
    match field {
        FilterField::Type => filters.types.iter().any(|v| v == value),
        FilterField::DebtTag => filters.debt_tags.iter().any(|v| v == value),
        FilterField::Person => filters.person.as_deref() == Some(value),
        FilterField::Account => filters.account.as_deref() == Some(value),
        FilterField::Category => filters.category.as_deref() == Some(value),
        FilterField::Shop => filters.shop.as_deref() == Some(value),
        _ => false,
    }
}

/// Popover body for one quick-filter column
fn quick_filter_panel(
    target: &TableTarget<'_>,
    filters: &FilterState,
    options: &FilterOptions,
    column_id: &str,
    field: FilterField,
) -> String {
    let body = match field {
        FilterField::Amount => {
            let current = filters.amount_operator;
            let operators: String = AmountOperator::ALL
                .iter()
                .map(|op| {
                    format!(
                        "<option value='{}'{}>{}</option>",
                        op.as_str(),
                        if current == Some(*op) { " selected" } else { "" },
                        op.symbol()
                    )
                })
                .collect();
            format!(
                r#"<form class='flex gap-2' {hx}>
                    <select name='amountOperator' class='px-2 py-1 border rounded'><option value=''>-</option>{operators}</select>
                    <input name='amountValue' value='{value}' class='px-2 py-1 border rounded w-24' inputmode='decimal'>
                    <button class='px-2 py-1 bg-indigo-600 text-white rounded'>Apply</button>
                </form>"#,
                hx = target.hx(&serde_json::json!({})),
                operators = operators,
                value = escape_html(filters.amount_value.as_deref().unwrap_or("")),
            )
        }
        FilterField::Notes => format!(
            r#"<input name='notes' value='{}' placeholder='Notes contain...' class='px-2 py-1 border rounded w-full' hx-trigger='keyup changed delay:250ms' {}>"#,
            escape_html(filters.notes.as_deref().unwrap_or("")),
            target.hx(&serde_json::json!({}))
        ),
        _ => {
            let values = options.for_field(field);
            if values.is_empty() {
                "<p class='text-gray-400 text-xs'>No options</p>".to_string()
            } else {
                values
                    .iter()
                    .map(|value| {
                        format!(
                            "<button type='button' class='block w-full text-left px-2 py-1 rounded hover:bg-gray-100{}' {}>{}</button>",
                            if is_chosen(filters, field, value) { " font-semibold text-indigo-600" } else { "" },
                            target.hx(&option_vals(filters, field, value)),
                            escape_html(value)
                        )
                    })
                    .collect()
            }
        }
    };
    format!(
        "<div class='quick-filter-panel hidden bg-white border rounded-lg shadow-lg p-2 text-sm max-h-64 overflow-auto' style='position:fixed;z-index:60;min-width:180px' data-quick-filter-panel='{}'>{}</div>",
        escape_html(column_id),
        body
    )
}

fn money(value: f64, currency: &CurrencyConfig) -> String {
    format_amount(value, currency.decimal_places as usize, &currency.thousands_separator)
}

/// The swappable part of a table screen: state form, filter chips,
/// selection summary, the table and the pager.
pub fn render_fragment<R: Record>(
    engine: &TableEngine,
    rows: &[R],
    target: TableTarget<'_>,
    table_config: &TableConfig,
    currency: &CurrencyConfig,
) -> String {
    let view = engine.view(rows);
    let filters = engine.filters();
    let search = engine.search();
    let selection = engine.selection();
    let id = escape_html(target.table_id);
    let selected: Vec<&str> = selection.selected_ids().collect();

    let mut html = format!(
        r#"<form id='{id}-state' data-search-term='{term}'>
            <input type='hidden' name='token' value='{token}'>
            <input type='hidden' name='prev' value='{prev}'>
            <input type='hidden' name='selected' value='{selected}'>
            <input type='hidden' name='selectedOnly' value='{selected_only}'>
        </form>"#,
        id = id,
        term = escape_html(search.current()),
        token = escape_html(&engine.encode_state()),
        prev = escape_html(search.previous().unwrap_or("")),
        selected = escape_html(&selected.join(",")),
        selected_only = selection.show_selected_only(),
    );

    // Filter chips and date selects
    html.push_str("<div class='flex flex-wrap items-center gap-2 mb-3 text-sm'>");
    if search.can_restore() {
        html.push_str(&format!(
            "<button type='button' class='px-2 py-1 rounded-full bg-yellow-50 text-yellow-700 border border-yellow-200' {}>Restore search &quot;{}&quot;</button>",
            target.hx(&serde_json::json!({ "search_action": "restore" })),
            escape_html(search.previous().unwrap_or(""))
        ));
    }
    let active = filters.active_fields();
    for field in &active {
        if let Some(value) = filters.describe(*field) {
            html.push_str(&format!(
                "<span class='inline-flex items-center gap-1 px-2 py-1 rounded-full bg-indigo-50 text-indigo-700 border border-indigo-200'>{}: {}<button type='button' class='ml-1 text-indigo-400 hover:text-indigo-700' {}>&times;</button></span>",
                filter_label(*field),
                escape_html(&value),
                target.hx(&serde_json::json!({ "clear_filter": field.key() }))
            ));
        }
    }
    if active.len() > 1 {
        html.push_str(&format!(
            "<button type='button' class='px-2 py-1 text-gray-500 hover:text-gray-800' {}>Clear all</button>",
            target.hx(&serde_json::json!({ "reset_filters": "true" }))
        ));
    }
    for (field, name) in [(FilterField::Year, "year"), (FilterField::Month, "month")] {
        let current = match field {
            FilterField::Year => filters.year.map(|y| y.to_string()),
            _ => filters.month.map(|m| m.to_string()),
        };
        let choices: String = view
            .options
            .for_field(field)
            .iter()
            .map(|value| {
                format!(
                    "<option value='{v}'{s}>{v}</option>",
                    v = escape_html(value),
                    s = if current.as_deref() == Some(value.as_str()) { " selected" } else { "" }
                )
            })
            .collect();
        html.push_str(&format!(
            "<select name='{name}' class='px-2 py-1 border rounded bg-white' hx-trigger='change' {hx}><option value=''>{label}</option>{choices}</select>",
            name = name,
            hx = target.hx(&serde_json::json!({})),
            label = filter_label(field),
            choices = choices,
        ));
    }
    html.push_str("</div>");

    // Selection summary
    if !selection.is_empty() {
        html.push_str(&format!(
            r#"<div class='flex items-center gap-4 mb-3 p-3 bg-indigo-50 border border-indigo-100 rounded-lg text-sm' id='{id}-summary'>
                <span><b>{count}</b> selected</span>
                <span>Amount <b>{amount}</b></span>
                <span>Cashback <b>{back}</b></span>
                <span>Final <b>{final_price}</b></span>
                <label class='ml-auto flex items-center gap-1'><input type='checkbox' class='selected-only-toggle' data-table='{id}'{checked}> Show selected only</label>
            </div>"#,
            id = id,
            count = view.summary.count,
            amount = money(view.summary.amount, currency),
            back = money(view.summary.total_back, currency),
            final_price = money(view.summary.final_price, currency),
            checked = if selection.show_selected_only() { " checked" } else { "" },
        ));
    }

    // Table
    html.push_str("<div class='overflow-auto border rounded-lg bg-white' style='max-height:70vh'>");
    html.push_str(&engine.render_html(rows, target.table_id, target.endpoint));
    html.push_str("</div>");

    // Quick filter popovers
    for column in engine.visible_columns() {
        if let Some(field) = column.definition.quick_filter {
            html.push_str(&quick_filter_panel(&target, filters, &view.options, column.id(), field));
        }
    }

    // Pager
    let page = &view.page;
    let sizes: String = table_config
        .page_size_options
        .iter()
        .map(|size| {
            format!(
                "<option value='{s}'{sel}>{s} / page</option>",
                s = size,
                sel = if *size == page.page_size { " selected" } else { "" }
            )
        })
        .collect();
    html.push_str(&format!(
        r#"<div class='flex items-center justify-between mt-3 text-sm text-gray-600'>
            <span>{total} rows &middot; page {page} of {pages}</span>
            <div class='flex items-center gap-2'>
                <select name='pageSize' class='px-2 py-1 border rounded bg-white' hx-trigger='change' {size_hx}>{sizes}</select>
                <button type='button' class='px-3 py-1 border rounded disabled:opacity-40' {prev_hx}{prev_disabled}>Previous</button>
                <button type='button' class='px-3 py-1 border rounded disabled:opacity-40' {next_hx}{next_disabled}>Next</button>
            </div>
        </div>"#,
        total = page.total,
        page = page.page,
        pages = page.total_pages,
        size_hx = target.hx(&serde_json::json!({})),
        sizes = sizes,
        prev_hx = target.hx(&serde_json::json!({ "page": page.page.saturating_sub(1).max(1) })),
        prev_disabled = if page.has_previous() { "" } else { " disabled" },
        next_hx = target.hx(&serde_json::json!({ "page": page.page + 1 })),
        next_disabled = if page.has_next() { "" } else { " disabled" },
    ));
    html
}

/// Search box and toolbar above a table; lives outside the swapped fragment
/// so typing keeps focus.
pub fn render_toolbar(target: TableTarget<'_>, search_term: &str, placeholder: &str, debounce_ms: u64) -> String {
    let id = escape_html(target.table_id);
    format!(
        r#"<div class='flex items-center gap-2 mb-4'>
            <input type='search' name='q' id='{id}-search' value='{term}' placeholder='{placeholder}'
                hx-get='{endpoint}' hx-target='#{id}-container' hx-include='#{id}-state' hx-trigger='keyup changed delay:{delay}ms, search'
                class='px-4 py-2 border rounded-lg w-72'>
            <button type='button' class='px-3 py-2 border rounded-lg text-gray-600 hover:bg-gray-50'
                onclick='document.getElementById("{id}-search").value = ""' {clear_hx}>Clear</button>
            <span class='htmx-indicator text-sm text-gray-400'>Loading...</span>
        </div>"#,
        id = id,
        term = escape_html(search_term),
        placeholder = escape_html(placeholder),
        endpoint = escape_html(target.endpoint),
        delay = debounce_ms,
        clear_hx = target.hx(&serde_json::json!({ "search_action": "clear" })),
    )
}

/// Client glue: popover placement, checkbox bookkeeping, search box sync
pub const TABLE_SCRIPT: &str = r#"<script>
(function() {
    const MARGIN = 8, GAP = 4;
    function placePanel(panel, anchor) {
        const a = anchor.getBoundingClientRect();
        const w = panel.offsetWidth, h = panel.offsetHeight;
        const vw = window.innerWidth, vh = window.innerHeight;
        let top = a.bottom + GAP;
        if (top + h > vh - MARGIN && a.top - GAP - h >= MARGIN) { top = a.top - GAP - h; }
        top = Math.max(MARGIN, Math.min(top, vh - h - MARGIN));
        const left = Math.max(MARGIN, Math.min(a.left, vw - w - MARGIN));
        panel.style.top = top + 'px';
        panel.style.left = left + 'px';
    }
    let open = null;
    function closePanel() { if (open) { open.panel.classList.add('hidden'); open = null; } }
    document.addEventListener('click', function(e) {
        const trigger = e.target.closest('[data-quick-filter]');
        if (trigger) {
            e.stopPropagation();
            const panel = document.querySelector("[data-quick-filter-panel='" + trigger.dataset.quickFilter + "']");
            if (!panel) { return; }
            const same = open && open.panel === panel;
            closePanel();
            if (!same) { panel.classList.remove('hidden'); placePanel(panel, trigger); open = {panel: panel, anchor: trigger}; }
        }
    }, true);
    document.addEventListener('pointerdown', function(e) {
        if (open && !open.panel.contains(e.target) && !open.anchor.contains(e.target)) { closePanel(); }
    });
    document.addEventListener('keydown', function(e) { if (e.key === 'Escape') { closePanel(); } });
    window.addEventListener('resize', function() { if (open) { placePanel(open.panel, open.anchor); } });
    window.addEventListener('scroll', function() { if (open) { placePanel(open.panel, open.anchor); } }, true);

    function refresh(table, extra) {
        const form = document.getElementById(table + '-state');
        const container = document.getElementById(table + '-container');
        if (!form || !container) { return; }
        htmx.ajax('GET', container.dataset.endpoint, {target: container, values: Object.assign(htmx.values(form), extra || {})});
    }
    document.addEventListener('change', function(e) {
        const box = e.target;
        const table = box.closest('[data-table-root]');
        if (!table) { return; }
        const id = table.dataset.tableRoot;
        const form = document.getElementById(id + '-state');
        if (!form) { return; }
        const selected = new Set(form.selected.value.split(',').filter(Boolean));
        if (box.classList.contains('row-select')) {
            box.checked ? selected.add(box.value) : selected.delete(box.value);
        } else if (box.classList.contains('select-all')) {
            table.querySelectorAll('.row-select').forEach(function(row) { box.checked ? selected.add(row.value) : selected.delete(row.value); });
        } else if (box.classList.contains('selected-only-toggle')) {
            form.selectedOnly.value = box.checked ? 'true' : 'false';
            refresh(id);
            return;
        } else { return; }
        form.selected.value = Array.from(selected).join(',');
        if (selected.size === 0) { form.selectedOnly.value = 'false'; }
        refresh(id);
    });
    document.body.addEventListener('htmx:afterSwap', function(e) {
        closePanel();
        const root = e.target.closest('[data-table-root]');
        if (!root) { return; }
        const id = root.dataset.tableRoot;
        const form = document.getElementById(id + '-state');
        const search = document.getElementById(id + '-search');
        if (form && search && document.activeElement !== search) { search.value = form.dataset.searchTerm; }
        root.querySelectorAll("input.select-all[data-indeterminate='true']").forEach(function(b) { b.indeterminate = true; });
    });
})();
</script>"#;

/// Container the fragment is swapped into
pub fn render_container(target: TableTarget<'_>, fragment: &str) -> String {
    format!(
        "<div id='{id}-container' data-table-root='{id}' data-endpoint='{endpoint}'>{fragment}</div>",
        id = escape_html(target.table_id),
        endpoint = escape_html(target.endpoint),
        fragment = fragment
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_sort_and_list() {
        let sort = parse_sort("amount:desc, shop ,,occurredOn:ASC");
        assert_eq!(
            sort,
            vec![
                SortDescriptor::desc("amount"),
                SortDescriptor::asc("shop"),
                SortDescriptor::asc("occurredOn"),
            ]
        );
        assert_eq!(parse_list("a, ,b,"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_filter_params_overlay() {
        let mut filters = FilterState {
            shop: Some("Cafe".to_string()),
            amount_operator: Some(AmountOperator::Gt),
            ..Default::default()
        };
        apply_filter_params(
            &mut filters,
            &params(&[("shop", " "), ("types", "Expense,Income"), ("amountValue", "20"), ("month", "13x")]),
        );
        assert_eq!(filters.shop, None);
        assert_eq!(filters.types, vec!["Expense".to_string(), "Income".to_string()]);
        assert_eq!(filters.amount_operator, Some(AmountOperator::Gt));
        assert_eq!(filters.amount_value.as_deref(), Some("20"));
        assert_eq!(filters.month, None);
    }

    #[test]
    fn test_table_state_resets_page_on_filter_change() {
        let codec = RestoreTokenCodec::new(100, 25);
        let mut start = codec.default_state();
        start.pagination.page = 4;
        let token = codec.encode(&start);

        let kept = table_state(&codec, &params(&[("token", &token)]));
        assert_eq!(kept.pagination.page, 4);

        let filtered = table_state(&codec, &params(&[("token", &token), ("shop", "Cafe")]));
        assert_eq!(filtered.pagination.page, 1);

        let explicit = table_state(&codec, &params(&[("token", &token), ("pageSize", "50"), ("page", "2")]));
        assert_eq!(explicit.pagination.page, 2);
        assert_eq!(explicit.pagination.page_size, 50);

        let garbage = table_state(&codec, &params(&[("token", "garbage")]));
        assert_eq!(garbage, codec.default_state());
    }

    #[test]
    fn test_option_vals_toggle_multi_values() {
        let filters = FilterState {
            types: vec!["Expense".to_string()],
            ..Default::default()
        };
        assert_eq!(
            option_vals(&filters, FilterField::Type, "Income"),
            serde_json::json!({ "types": "Expense,Income" })
        );
        assert_eq!(
            option_vals(&filters, FilterField::Type, "Expense"),
            serde_json::json!({ "types": "" })
        );
        assert_eq!(
            option_vals(&filters, FilterField::Shop, "Cafe"),
            serde_json::json!({ "shop": "Cafe" })
        );
    }
}
