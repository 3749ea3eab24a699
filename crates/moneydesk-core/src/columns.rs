//! Column registries and built-in cell renderers for each table

use crate::error::{CoreError, CoreResult};
use crate::models::cashback_formula;
use moneydesk_config::CurrencyConfig;
use moneydesk_grid::render::{BuiltinRenderers, CellContent, CellContext};
use moneydesk_grid::value::parse_date;
use moneydesk_grid::{Align, ColumnDefinition, ColumnRegistry, FilterField, GridResult, Record, SortType};
use moneydesk_utils::format_amount;
use serde::{Deserialize, Serialize};

/// Column formats accepted for money columns
pub const MONEY_FORMATS: [&str; 3] = ["number", "plain", "currency"];

/// Column formats accepted for date columns
pub const DATE_FORMATS: [&str; 2] = ["iso", "long"];

/// The tables the application serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Transactions,
    Accounts,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Transactions, TableKind::Accounts];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Transactions => "transactions",
            TableKind::Accounts => "accounts",
        }
    }

    pub fn registry(&self) -> GridResult<ColumnRegistry> {
        match self {
            TableKind::Transactions => transaction_columns(),
            TableKind::Accounts => account_columns(),
        }
    }

    /// Fields matched by the toolbar search box
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            TableKind::Transactions => &["shop", "category", "person", "account", "notes", "type", "debtTag"],
            TableKind::Accounts => &["name", "type", "owner", "institution", "notes"],
        }
    }

    pub fn builtins(&self, currency: &CurrencyConfig) -> BuiltinRenderers {
        let mut builtins = BuiltinRenderers::new();
        match self {
            TableKind::Transactions => {
                for key in ["amount", "fixedBack", "finalPrice"] {
                    builtins.register(key, money_renderer(currency, key));
                }
                builtins.register("totalBack", cashback_renderer(currency));
                builtins.register("percentBack", |record, _| {
                    record
                        .field("percentBack")
                        .as_number()
                        .map(|p| CellContent::text(format!("{}%", p)))
                });
                builtins.register("occurredOn", date_renderer);
            }
            TableKind::Accounts => {
                for key in ["amount", "creditLimit", "availableCredit"] {
                    builtins.register(key, money_renderer(currency, key));
                }
                builtins.register("openedOn", date_renderer);
            }
        }
        builtins
    }

    /// Formats a column accepts, empty when it has no format choice
    pub fn formats_for(&self, column_id: &str) -> &'static [&'static str] {
        match (self, column_id) {
            (TableKind::Transactions, "amount" | "fixedBack" | "totalBack" | "finalPrice")
            | (TableKind::Accounts, "amount" | "creditLimit" | "availableCredit") => &MONEY_FORMATS,
            (TableKind::Transactions, "occurredOn") | (TableKind::Accounts, "openedOn") => &DATE_FORMATS,
            _ => &[],
        }
    }
}

impl std::str::FromStr for TableKind {
    type Err = CoreError;
    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "transactions" | "transaction" => Ok(TableKind::Transactions),
            "accounts" | "account" => Ok(TableKind::Accounts),
            _ => Err(CoreError::UnknownTable { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn money(id: &str, label: &str) -> ColumnDefinition {
    ColumnDefinition::new(id, label)
        .widths(80, 120)
        .align(Align::Right)
        .sort_type(SortType::Number)
}

fn transaction_columns() -> GridResult<ColumnRegistry> {
    ColumnRegistry::new(vec![
        ColumnDefinition::new("occurredOn", "Date")
            .widths(90, 110)
            .sort_type(SortType::Date)
            .locked()
            .pinned(),
        ColumnDefinition::new("type", "Type")
            .widths(70, 100)
            .quick_filter(FilterField::Type),
        ColumnDefinition::new("shop", "Shop")
            .widths(100, 160)
            .quick_filter(FilterField::Shop),
        ColumnDefinition::new("category", "Category")
            .widths(100, 140)
            .quick_filter(FilterField::Category),
        ColumnDefinition::new("person", "Person")
            .widths(90, 120)
            .quick_filter(FilterField::Person),
        ColumnDefinition::new("account", "Account")
            .widths(100, 140)
            .quick_filter(FilterField::Account),
        money("amount", "Amount").locked().quick_filter(FilterField::Amount),
        money("percentBack", "% Back").widths(60, 80).hidden(),
        money("fixedBack", "Fixed Back").hidden(),
        money("totalBack", "Total Back").widths(90, 110),
        money("finalPrice", "Final Price"),
        ColumnDefinition::new("debtTag", "Debt Tag")
            .widths(90, 120)
            .hidden()
            .quick_filter(FilterField::DebtTag),
        ColumnDefinition::new("notes", "Notes")
            .widths(120, 220)
            .unsortable()
            .quick_filter(FilterField::Notes),
    ])
}

fn account_columns() -> GridResult<ColumnRegistry> {
    ColumnRegistry::new(vec![
        ColumnDefinition::new("name", "Account")
            .widths(120, 180)
            .locked()
            .pinned(),
        ColumnDefinition::new("type", "Type")
            .widths(90, 120)
            .quick_filter(FilterField::Type),
        ColumnDefinition::new("owner", "Owner")
            .widths(90, 120)
            .quick_filter(FilterField::Person),
        ColumnDefinition::new("institution", "Institution")
            .widths(100, 140)
            .hidden()
            .fallback("Self-managed"),
        money("amount", "Balance").locked().quick_filter(FilterField::Amount),
        money("creditLimit", "Credit Limit").hidden(),
        money("availableCredit", "Available").widths(90, 120),
        ColumnDefinition::new("status", "Status").widths(70, 90),
        ColumnDefinition::new("openedOn", "Opened")
            .widths(90, 110)
            .sort_type(SortType::Date)
            .hidden(),
        ColumnDefinition::new("notes", "Notes")
            .widths(120, 200)
            .unsortable(),
    ])
}

fn money_renderer(
    currency: &CurrencyConfig,
    key: &'static str,
) -> impl Fn(&dyn Record, &CellContext<'_>) -> Option<CellContent> + Send + Sync + 'static {
    let decimals = currency.decimal_places as usize;
    let separator = currency.thousands_separator.clone();
    let code = currency.default_currency.clone();
    move |record, context| {
        let value = record.field(key).as_number()?;
        let text = match context.format {
            Some("plain") => format!("{:.*}", decimals, value),
            Some("currency") => {
                let code = record.field("currency").as_text().unwrap_or_else(|| code.clone());
                format!("{} {}", code, format_amount(value, decimals, &separator))
            }
            _ => format_amount(value, decimals, &separator),
        };
        Some(CellContent::text(text))
    }
}

/// Total cashback with its formula as the tooltip
fn cashback_renderer(
    currency: &CurrencyConfig,
) -> impl Fn(&dyn Record, &CellContext<'_>) -> Option<CellContent> + Send + Sync + 'static {
    let render_money = money_renderer(currency, "totalBack");
    move |record, context| {
        let content = render_money(record, context)?;
        let formula = cashback_formula(
            record.field("amount").as_number().unwrap_or(0.0),
            record.field("percentBack").as_number(),
            record.field("fixedBack").as_number(),
            record.field("totalBack").as_number().unwrap_or(0.0),
        );
        Some(match formula {
            Some(formula) => content.with_tooltip(formula),
            None => content,
        })
    }
}

fn date_renderer(record: &dyn Record, context: &CellContext<'_>) -> Option<CellContent> {
    let raw = record.field(&context.column.id).as_text()?;
    match context.format {
        Some("long") => {
            let date = parse_date(&raw)?;
            Some(CellContent::text(date.format("%b %d, %Y").to_string()))
        }
        _ => Some(CellContent::text(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use moneydesk_grid::render::{renderer_chain, resolve_cell};

    fn render(kind: TableKind, column_id: &str, format: Option<&str>, record: &dyn Record) -> CellContent {
        let registry = kind.registry().unwrap();
        let builtins = kind.builtins(&CurrencyConfig::default());
        let column = registry.get(column_id).unwrap();
        let chain = renderer_chain(column, &builtins);
        resolve_cell(&chain, record, &CellContext { column, format }, &builtins)
    }

    fn purchase() -> Transaction {
        Transaction {
            id: "t1".to_string(),
            occurred_on: "2024-01-15".to_string(),
            amount: Some(1234.5),
            percent_back: Some(2.0),
            ..Default::default()
        }
        .with_totals()
    }

    #[test]
    fn test_registries_are_valid() {
        for kind in TableKind::ALL {
            let registry = kind.registry().unwrap();
            assert!(!registry.is_empty());
            for field in kind.search_fields() {
                assert!(registry.contains(field) || *field == "debtTag");
            }
        }
    }

    #[test]
    fn test_money_formats() {
        let tx = purchase();
        assert_eq!(render(TableKind::Transactions, "amount", None, &tx).text, "1,234.50");
        assert_eq!(render(TableKind::Transactions, "amount", Some("plain"), &tx).text, "1234.50");
        assert_eq!(render(TableKind::Transactions, "amount", Some("currency"), &tx).text, "USD 1,234.50");
    }

    #[test]
    fn test_total_back_tooltip() {
        let cell = render(TableKind::Transactions, "totalBack", None, &purchase());
        assert_eq!(cell.text, "24.69");
        assert_eq!(cell.tooltip.as_deref(), Some("1234.50 x 2% = 24.69"));
    }

    #[test]
    fn test_date_formats_and_empty_cells() {
        let tx = purchase();
        assert_eq!(render(TableKind::Transactions, "occurredOn", Some("long"), &tx).text, "Jan 15, 2024");
        assert_eq!(render(TableKind::Transactions, "shop", None, &tx).text, "--");
    }

    #[test]
    fn test_table_kind_parse() {
        assert_eq!("Accounts".parse::<TableKind>().unwrap(), TableKind::Accounts);
        assert!(matches!("budgets".parse::<TableKind>(), Err(CoreError::UnknownTable { .. })));
        assert_eq!(TableKind::Accounts.formats_for("availableCredit"), &MONEY_FORMATS);
        assert!(TableKind::Transactions.formats_for("shop").is_empty());
    }
}
