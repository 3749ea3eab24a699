//! HTML table fragment used by the HTMX table endpoints

use super::cell::{renderer_chain, resolve_cell, BuiltinRenderers, CellContext};
use crate::column_state::VisibleColumn;
use crate::selection::{HeaderCheck, SelectionState};
use crate::sort::{priority, SortDescriptor, SortDirection};
use crate::value::Record;
use moneydesk_utils::escape_html;

/// Width of the leading selection checkbox column
pub const CHECKBOX_WIDTH: u32 = 40;

/// Everything the table fragment needs besides the rows
pub struct HtmlTable<'a> {
    /// DOM id prefix, unique per table on the page
    pub table_id: &'a str,
    pub columns: &'a [VisibleColumn<'a>],
    pub builtins: &'a BuiltinRenderers,
    pub sort: &'a [SortDescriptor],
    pub selection: &'a SelectionState,
    /// Fragment endpoint that re-renders the table on header clicks
    pub endpoint: &'a str,
}

fn sticky_style(column: &VisibleColumn<'_>, header: bool) -> String {
    match column.sticky_left {
        Some(left) => format!(
            "position:sticky;left:{}px;z-index:{};",
            left.saturating_add(CHECKBOX_WIDTH),
            if header { 30 } else { 10 }
        ),
        None => String::new(),
    }
}

fn sort_indicator(sort: &[SortDescriptor], id: &str) -> String {
    let descriptor = match sort.iter().find(|d| d.id == id) {
        Some(d) => d,
        None => return String::new(),
    };
    let arrow = match descriptor.direction {
        SortDirection::Asc => "&#9650;",
        SortDirection::Desc => "&#9660;",
    };
    let rank = match priority(sort, id) {
        Some(rank) if sort.len() > 1 => format!("<sup class='text-xs'>{}</sup>", rank),
        _ => String::new(),
    };
    format!("<span class='ml-1 text-indigo-600'>{}{}</span>", arrow, rank)
}

fn render_header(table: &HtmlTable<'_>, header_check: HeaderCheck) -> String {
    let mut html = String::from("<thead class='bg-gray-50' style='position:sticky;top:0;z-index:20'><tr>");
    let checked = if header_check == HeaderCheck::All { " checked" } else { "" };
    let indeterminate = if header_check == HeaderCheck::Some { " data-indeterminate='true'" } else { "" };
    html.push_str(&format!(
        r#"<th class='px-2 py-2 bg-gray-50' style='position:sticky;left:0;z-index:30;width:{w}px'>
            <input type='checkbox' class='select-all' data-table='{id}'{checked}{indeterminate}>
        </th>"#,
        w = CHECKBOX_WIDTH,
        id = escape_html(table.table_id),
        checked = checked,
        indeterminate = indeterminate,
    ));

    for column in table.columns {
        let definition = column.definition;
        let id = escape_html(&definition.id);
        let label = escape_html(&definition.label);
        let sort_attrs = if definition.sortable {
            format!(
                r#" hx-get='{}' hx-target='#{}-container' hx-include='#{}-state' hx-vals='js:{{"sort_click":"{}","multi":event.shiftKey||event.ctrlKey}}' role='button'"#,
                escape_html(table.endpoint),
                escape_html(table.table_id),
                escape_html(table.table_id),
                id
            )
        } else {
            String::new()
        };
        let quick_filter = match definition.quick_filter {
            Some(field) => format!(
                "<button type='button' class='ml-1 text-gray-400 hover:text-indigo-600 quick-filter-trigger' data-quick-filter='{}' data-filter-field='{}'>&#9662;</button>",
                id, field
            ),
            None => String::new(),
        };
        html.push_str(&format!(
            r#"<th class='px-3 py-2 text-xs font-semibold text-gray-600 uppercase bg-gray-50 whitespace-nowrap{cursor}' data-column='{id}' style='{sticky}width:{width}px;min-width:{min}px;text-align:{align}'{sort_attrs}>{label}{indicator}{quick_filter}</th>"#,
            cursor = if definition.sortable { " cursor-pointer select-none" } else { "" },
            id = id,
            sticky = sticky_style(column, true),
            width = column.width,
            min = definition.min_width,
            align = definition.align.as_css(),
            sort_attrs = sort_attrs,
            label = label,
            indicator = sort_indicator(table.sort, &definition.id),
            quick_filter = quick_filter,
        ));
    }
    html.push_str("<th class='px-2 py-2 bg-gray-50' style='width:48px'></th></tr></thead>");
    html
}

/// Render the full `<table>` for one page of rows
pub fn render_table<R: Record>(table: &HtmlTable<'_>, rows: &[R]) -> String {
    let chains: Vec<_> = table
        .columns
        .iter()
        .map(|c| renderer_chain(c.definition, table.builtins))
        .collect();

    let mut html = format!(
        "<table id='{}' class='min-w-full text-sm border-separate border-spacing-0' style='table-layout:fixed'>",
        escape_html(table.table_id)
    );
    html.push_str(&render_header(table, table.selection.header_state(rows)));
    html.push_str("<tbody>");

    if rows.is_empty() {
        html.push_str(&format!(
            "<tr><td colspan='{}' class='text-center py-12 text-gray-500'>No rows match the current filters</td></tr>",
            table.columns.len() + 2
        ));
    }

    for row in rows {
        let row_id = escape_html(row.id());
        let selected = table.selection.is_selected(row.id());
        html.push_str(&format!(
            "<tr class='border-b hover:bg-gray-50{}' data-row-id='{}'>",
            if selected { " bg-indigo-50" } else { "" },
            row_id
        ));
        html.push_str(&format!(
            r#"<td class='px-2 py-2 bg-white' style='position:sticky;left:0;z-index:10;width:{}px'><input type='checkbox' class='row-select' value='{}'{}></td>"#,
            CHECKBOX_WIDTH,
            row_id,
            if selected { " checked" } else { "" }
        ));

        for (column, chain) in table.columns.iter().zip(&chains) {
            let context = CellContext {
                column: column.definition,
                format: column.format.as_deref(),
            };
            let content = resolve_cell(chain, row, &context, table.builtins);
            let tooltip = match &content.tooltip {
                Some(text) => format!(" data-tooltip-text='{}'", escape_html(text)),
                None => String::new(),
            };
            html.push_str(&format!(
                "<td class='px-3 py-2 truncate{}' style='{}max-width:{}px;text-align:{}'{}>{}</td>",
                if column.pinned { " bg-white" } else { "" },
                sticky_style(column, false),
                column.width,
                column.definition.align.as_css(),
                tooltip,
                escape_html(&content.text)
            ));
        }

        html.push_str(&format!(
            "<td class='px-2 py-2 text-right'><button type='button' class='row-actions-trigger text-gray-400 hover:text-gray-700' data-row-id='{}'>&#8942;</button></td></tr>",
            row_id
        ));
    }

    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnDefinition, ColumnRegistry};
    use crate::column_state::ColumnLayout;
    use crate::filter::FilterField;
    use crate::render::CellContent;
    use serde_json::json;

    fn registry() -> ColumnRegistry {
        ColumnRegistry::new(vec![
            ColumnDefinition::new("occurredOn", "Date").pinned(),
            ColumnDefinition::new("shop", "Shop").quick_filter(FilterField::Shop),
            ColumnDefinition::new("notes", "Notes").unsortable(),
            ColumnDefinition::new("amount", "Amount")
                .render_with(|r| {
                    r.field("amount")
                        .as_number()
                        .map(|n| CellContent::text(format!("{:.2}", n)).with_tooltip("100.00 x 2%"))
                }),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_table_fragment() {
        let registry = registry();
        let layout = ColumnLayout::from_registry(&registry);
        let columns = layout.visible_columns(&registry);
        let builtins = BuiltinRenderers::new();
        let mut selection = SelectionState::new();
        selection.toggle_row("t1", true);
        let sort = vec![SortDescriptor::desc("amount"), SortDescriptor::asc("shop")];
        let table = HtmlTable {
            table_id: "transactions",
            columns: &columns,
            builtins: &builtins,
            sort: &sort,
            selection: &selection,
            endpoint: "/transactions/table",
        };
        let rows = vec![
            json!({"id": "t1", "occurredOn": "2024-01-15", "shop": "<Cafe>", "amount": 12}),
            json!({"id": "t2", "occurredOn": "2024-01-16", "shop": "Market", "amount": null}),
        ];
        let html = render_table(&table, &rows);

        assert!(html.contains("&lt;Cafe&gt;"));
        assert!(!html.contains("<Cafe>"));
        assert!(html.contains("position:sticky;left:40px"));
        assert!(html.contains("&#9660;<sup class='text-xs'>1</sup>"));
        assert!(html.contains("data-quick-filter='shop'"));
        assert!(html.contains("data-tooltip-text='100.00 x 2%'"));
        assert!(html.contains("<td class='px-3 py-2 truncate' style='max-width:120px;text-align:left'>--</td>"));
        assert!(html.contains("value='t1' checked"));
        assert!(html.contains("data-indeterminate='true'"));
        assert_eq!(html.matches("\"sort_click\"").count(), 3);
    }

    #[test]
    fn test_sticky_style_saturates() {
        let registry = registry();
        let layout = ColumnLayout::from_registry(&registry);
        let mut columns = layout.visible_columns(&registry);
        columns[0].sticky_left = Some(u32::MAX);
        assert_eq!(
            sticky_style(&columns[0], true),
            format!("position:sticky;left:{}px;z-index:30;", u32::MAX)
        );
    }

    #[test]
    fn test_empty_table_message() {
        let registry = registry();
        let layout = ColumnLayout::from_registry(&registry);
        let columns = layout.visible_columns(&registry);
        let builtins = BuiltinRenderers::new();
        let selection = SelectionState::new();
        let table = HtmlTable {
            table_id: "accounts",
            columns: &columns,
            builtins: &builtins,
            sort: &[],
            selection: &selection,
            endpoint: "/accounts/table",
        };
        let html = render_table::<serde_json::Value>(&table, &[]);
        assert!(html.contains("colspan='6'"));
        assert!(html.contains("No rows match"));
    }
}
