//! Filter controller - active filter values, the row predicate and
//! narrowing-aware option lists
//!
//! Every dimension reads its record value through an alias chain so the same
//! filters work on transactions, accounts and schema-less rows.

use crate::value::{first_text, first_value, locale_cmp, parse_date, parse_finite, FieldValue, Record};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance for `eq`/`neq` amount comparisons
pub const AMOUNT_EPSILON: f64 = 1e-6;

/// Date fields tried in order when resolving a record's calendar date
pub const DATE_FIELDS: [&str; 3] = ["occurredOn", "date", "displayDate"];

/// One filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    Person,
    Account,
    Category,
    Shop,
    Type,
    DebtTag,
    Amount,
    Year,
    Month,
    Notes,
}

impl FilterField {
    pub const ALL: [FilterField; 10] = [
        FilterField::Person,
        FilterField::Account,
        FilterField::Category,
        FilterField::Shop,
        FilterField::Type,
        FilterField::DebtTag,
        FilterField::Amount,
        FilterField::Year,
        FilterField::Month,
        FilterField::Notes,
    ];

    /// Record keys tried in order; the first non-empty one wins
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            FilterField::Person => &["owner", "person", "personName", "person_name"],
            FilterField::Account => &["account", "accountName", "account_name"],
            FilterField::Category => &["category", "categoryName", "category_name"],
            FilterField::Shop => &["shop", "shopName", "shop_name", "merchant"],
            FilterField::Type => &["type", "kind", "transactionType"],
            FilterField::DebtTag => &["debtTag", "debt_tag", "tag"],
            FilterField::Amount => &["amount"],
            FilterField::Year | FilterField::Month => &DATE_FIELDS,
            FilterField::Notes => &["notes", "note", "description"],
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FilterField::Person => "person",
            FilterField::Account => "account",
            FilterField::Category => "category",
            FilterField::Shop => "shop",
            FilterField::Type => "type",
            FilterField::DebtTag => "debtTag",
            FilterField::Amount => "amount",
            FilterField::Year => "year",
            FilterField::Month => "month",
            FilterField::Notes => "notes",
        }
    }

    /// Dimensions offering a value list (free-form ones do not)
    pub fn has_options(self) -> bool {
        !matches!(self, FilterField::Amount | FilterField::Notes)
    }
}

impl std::str::FromStr for FilterField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person" | "owner" => Ok(FilterField::Person),
            "account" => Ok(FilterField::Account),
            "category" => Ok(FilterField::Category),
            "shop" => Ok(FilterField::Shop),
            "type" | "types" => Ok(FilterField::Type),
            "debtTag" | "debtTags" => Ok(FilterField::DebtTag),
            "amount" => Ok(FilterField::Amount),
            "year" => Ok(FilterField::Year),
            "month" => Ok(FilterField::Month),
            "notes" => Ok(FilterField::Notes),
            _ => Err(format!("Invalid filter field: {}", s)),
        }
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Comparison applied by the amount filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountOperator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    IsNull,
}

impl AmountOperator {
    pub const ALL: [AmountOperator; 7] = [
        AmountOperator::Eq,
        AmountOperator::Neq,
        AmountOperator::Gt,
        AmountOperator::Lt,
        AmountOperator::Gte,
        AmountOperator::Lte,
        AmountOperator::IsNull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountOperator::Eq => "eq",
            AmountOperator::Neq => "neq",
            AmountOperator::Gt => "gt",
            AmountOperator::Lt => "lt",
            AmountOperator::Gte => "gte",
            AmountOperator::Lte => "lte",
            AmountOperator::IsNull => "is-null",
        }
    }

    /// Short symbol for filter chips
    pub fn symbol(&self) -> &'static str {
        match self {
            AmountOperator::Eq => "=",
            AmountOperator::Neq => "\u{2260}",
            AmountOperator::Gt => ">",
            AmountOperator::Lt => "<",
            AmountOperator::Gte => "\u{2265}",
            AmountOperator::Lte => "\u{2264}",
            AmountOperator::IsNull => "empty",
        }
    }

    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            AmountOperator::Eq => (left - right).abs() < AMOUNT_EPSILON,
            AmountOperator::Neq => (left - right).abs() >= AMOUNT_EPSILON,
            AmountOperator::Gt => left > right,
            AmountOperator::Lt => left < right,
            AmountOperator::Gte => left >= right,
            AmountOperator::Lte => left <= right,
            AmountOperator::IsNull => false,
        }
    }
}

impl std::str::FromStr for AmountOperator {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" => Ok(AmountOperator::Eq),
            "neq" => Ok(AmountOperator::Neq),
            "gt" => Ok(AmountOperator::Gt),
            "lt" => Ok(AmountOperator::Lt),
            "gte" => Ok(AmountOperator::Gte),
            "lte" => Ok(AmountOperator::Lte),
            "is-null" | "isnull" => Ok(AmountOperator::IsNull),
            _ => Err(format!("Invalid amount operator: {}", s)),
        }
    }
}

/// Evaluate the amount filter against a record value.
///
/// `is-null` passes iff the value is null or an empty string. Every other
/// operator needs both sides to parse as finite numbers; anything else is
/// simply a non-match.
pub fn amount_matches(operator: AmountOperator, record_value: &FieldValue, filter_value: &str) -> bool {
    if operator == AmountOperator::IsNull {
        return record_value.is_empty();
    }
    match (record_value.as_number(), parse_finite(filter_value)) {
        (Some(left), Some(right)) => operator.apply(left, right),
        _ => false,
    }
}

/// Calendar date of a record from `occurredOn`, `date`, `displayDate`
pub fn resolve_date<R: Record + ?Sized>(record: &R) -> Option<NaiveDate> {
    DATE_FIELDS
        .iter()
        .filter_map(|key| record.field(key).as_text())
        .find_map(|text| parse_date(&text))
}

/// Temporary replacement for one dimension while matching
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOverride {
    Person(Option<String>),
    Account(Option<String>),
    Category(Option<String>),
    Shop(Option<String>),
    Types(Vec<String>),
    DebtTags(Vec<String>),
    Amount(Option<AmountOperator>, Option<String>),
    Year(Option<i32>),
    Month(Option<u32>),
    Notes(Option<String>),
}

/// Dimensions to skip and values to substitute for one `matches` call
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions<'a> {
    pub exclude: &'a [FilterField],
    pub overrides: &'a [FilterOverride],
}

impl<'a> MatchOptions<'a> {
    pub fn excluding(exclude: &'a [FilterField]) -> Self {
        Self {
            exclude,
            overrides: &[],
        }
    }
}

/// Option lists for every dimension, each scoped by the other active filters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub persons: Vec<String>,
    pub accounts: Vec<String>,
    pub categories: Vec<String>,
    pub shops: Vec<String>,
    pub types: Vec<String>,
    pub debt_tags: Vec<String>,
    pub years: Vec<String>,
    pub months: Vec<String>,
}

impl FilterOptions {
    /// Option list of one dimension; empty for free-form dimensions
    pub fn for_field(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::Person => &self.persons,
            FilterField::Account => &self.accounts,
            FilterField::Category => &self.categories,
            FilterField::Shop => &self.shops,
            FilterField::Type => &self.types,
            FilterField::DebtTag => &self.debt_tags,
            FilterField::Year => &self.years,
            FilterField::Month => &self.months,
            FilterField::Amount | FilterField::Notes => &[],
        }
    }
}

/// Active filter values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub debt_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_operator: Option<AmountOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl FilterState {
    /// Set or clear one dimension
    pub fn apply(&mut self, update: FilterOverride) {
        match update {
            FilterOverride::Person(v) => self.person = v,
            FilterOverride::Account(v) => self.account = v,
            FilterOverride::Category(v) => self.category = v,
            FilterOverride::Shop(v) => self.shop = v,
            FilterOverride::Types(v) => self.types = v,
            FilterOverride::DebtTags(v) => self.debt_tags = v,
            FilterOverride::Amount(op, value) => {
                self.amount_operator = op;
                self.amount_value = value;
            }
            FilterOverride::Year(v) => self.year = v,
            FilterOverride::Month(v) => self.month = v,
            FilterOverride::Notes(v) => self.notes = v,
        }
    }

    /// Copy with the overrides applied
    pub fn with_overrides(&self, overrides: &[FilterOverride]) -> Self {
        let mut next = self.clone();
        for update in overrides {
            next.apply(update.clone());
        }
        next
    }

    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Person => self.person = None,
            FilterField::Account => self.account = None,
            FilterField::Category => self.category = None,
            FilterField::Shop => self.shop = None,
            FilterField::Type => self.types.clear(),
            FilterField::DebtTag => self.debt_tags.clear(),
            FilterField::Amount => {
                self.amount_operator = None;
                self.amount_value = None;
            }
            FilterField::Year => self.year = None,
            FilterField::Month => self.month = None,
            FilterField::Notes => self.notes = None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a dimension currently restricts rows
    pub fn is_active(&self, field: FilterField) -> bool {
        match field {
            FilterField::Person => non_blank(&self.person).is_some(),
            FilterField::Account => non_blank(&self.account).is_some(),
            FilterField::Category => non_blank(&self.category).is_some(),
            FilterField::Shop => non_blank(&self.shop).is_some(),
            FilterField::Type => !self.types.is_empty(),
            FilterField::DebtTag => !self.debt_tags.is_empty(),
            FilterField::Amount => match self.amount_operator {
                Some(AmountOperator::IsNull) => true,
                Some(_) => non_blank(&self.amount_value).is_some(),
                None => false,
            },
            FilterField::Year => self.year.is_some(),
            FilterField::Month => self.month.is_some(),
            FilterField::Notes => non_blank(&self.notes).is_some(),
        }
    }

    /// Human-readable value of an active dimension
    pub fn describe(&self, field: FilterField) -> Option<String> {
        if !self.is_active(field) {
            return None;
        }
        let text = match field {
            FilterField::Person => self.person.clone()?,
            FilterField::Account => self.account.clone()?,
            FilterField::Category => self.category.clone()?,
            FilterField::Shop => self.shop.clone()?,
            FilterField::Type => self.types.join(", "),
            FilterField::DebtTag => self.debt_tags.join(", "),
            FilterField::Amount => {
                let operator = self.amount_operator?;
                match operator {
                    AmountOperator::IsNull => operator.symbol().to_string(),
                    _ => format!("{} {}", operator.symbol(), self.amount_value.as_deref()?.trim()),
                }
            }
            FilterField::Year => self.year?.to_string(),
            FilterField::Month => self.month?.to_string(),
            FilterField::Notes => self.notes.clone()?,
        };
        Some(text)
    }

    pub fn active_fields(&self) -> Vec<FilterField> {
        FilterField::ALL
            .into_iter()
            .filter(|f| self.is_active(*f))
            .collect()
    }

    /// Test a record against every active dimension not listed in `exclude`
    pub fn matches<R: Record + ?Sized>(&self, record: &R, options: &MatchOptions<'_>) -> bool {
        if options.overrides.is_empty() {
            self.evaluate(record, options.exclude)
        } else {
            self.with_overrides(options.overrides)
                .evaluate(record, options.exclude)
        }
    }

    fn evaluate<R: Record + ?Sized>(&self, record: &R, exclude: &[FilterField]) -> bool {
        let mut date: Option<Option<NaiveDate>> = None;
        FilterField::ALL.into_iter().all(|field| {
            if exclude.contains(&field) || !self.is_active(field) {
                return true;
            }
            match field {
                FilterField::Person => self.entity_matches(record, field, &self.person),
                FilterField::Account => self.entity_matches(record, field, &self.account),
                FilterField::Category => self.entity_matches(record, field, &self.category),
                FilterField::Shop => self.entity_matches(record, field, &self.shop),
                FilterField::Type => self.any_matches(record, field, &self.types),
                FilterField::DebtTag => self.any_matches(record, field, &self.debt_tags),
                FilterField::Amount => {
                    let operator = match self.amount_operator {
                        Some(op) => op,
                        None => return true,
                    };
                    let value = first_value(record, field.aliases());
                    amount_matches(operator, &value, self.amount_value.as_deref().unwrap_or(""))
                }
                FilterField::Year | FilterField::Month => {
                    let resolved = *date.get_or_insert_with(|| resolve_date(record));
                    match (field, resolved) {
                        (_, None) => false,
                        (FilterField::Year, Some(d)) => Some(d.year()) == self.year,
                        (_, Some(d)) => Some(d.month()) == self.month,
                    }
                }
                FilterField::Notes => {
                    let needle = self.notes.as_deref().unwrap_or("").trim().to_lowercase();
                    first_text(record, field.aliases())
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                }
            }
        })
    }

    fn entity_matches<R: Record + ?Sized>(&self, record: &R, field: FilterField, wanted: &Option<String>) -> bool {
        match (non_blank(wanted), first_text(record, field.aliases())) {
            (Some(wanted), Some(actual)) => eq_ignore_case(wanted, &actual),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn any_matches<R: Record + ?Sized>(&self, record: &R, field: FilterField, wanted: &[String]) -> bool {
        if wanted.is_empty() {
            return true;
        }
        match first_text(record, field.aliases()) {
            Some(actual) => wanted.iter().any(|w| eq_ignore_case(w, &actual)),
            None => false,
        }
    }

    /// Values for one dimension among rows that pass every *other* filter.
    ///
    /// Text values are de-duplicated case-insensitively and sorted
    /// locale-style; years come newest first, months in calendar order.
    pub fn options_for<R: Record>(&self, rows: &[R], field: FilterField) -> Vec<String> {
        if !field.has_options() {
            return Vec::new();
        }
        let exclude = [field];
        let options = MatchOptions::excluding(&exclude);
        let scoped = rows.iter().filter(|r| self.matches(*r, &options));

        match field {
            FilterField::Year | FilterField::Month => {
                let mut numbers: Vec<u32> = scoped
                    .filter_map(|r| resolve_date(r))
                    .filter_map(|d| {
                        if field == FilterField::Year {
                            u32::try_from(d.year()).ok()
                        } else {
                            Some(d.month())
                        }
                    })
                    .collect();
                numbers.sort_unstable();
                numbers.dedup();
                if field == FilterField::Year {
                    numbers.reverse();
                }
                numbers.into_iter().map(|n| n.to_string()).collect()
            }
            _ => {
                let mut seen = HashSet::new();
                let mut values: Vec<String> = scoped
                    .filter_map(|r| first_text(r, field.aliases()))
                    .map(|v| v.trim().to_string())
                    .filter(|v| seen.insert(v.to_lowercase()))
                    .collect();
                values.sort_by(|a, b| locale_cmp(a, b));
                values
            }
        }
    }

    /// Option lists for every dimension
    pub fn all_options<R: Record>(&self, rows: &[R]) -> FilterOptions {
        FilterOptions {
            persons: self.options_for(rows, FilterField::Person),
            accounts: self.options_for(rows, FilterField::Account),
            categories: self.options_for(rows, FilterField::Category),
            shops: self.options_for(rows, FilterField::Shop),
            types: self.options_for(rows, FilterField::Type),
            debt_tags: self.options_for(rows, FilterField::DebtTag),
            years: self.options_for(rows, FilterField::Year),
            months: self.options_for(rows, FilterField::Month),
        }
    }

    /// Clear selected values that no longer appear in their option list.
    ///
    /// Clearing one dimension can widen the others, so this repeats until
    /// nothing changes. Returns the dimensions that were touched.
    pub fn prune_stale<R: Record>(&mut self, rows: &[R]) -> Vec<FilterField> {
        let mut touched = Vec::new();
        loop {
            let mut changed = false;
            for field in FilterField::ALL {
                if !field.has_options() || !self.is_active(field) {
                    continue;
                }
                let options = self.options_for(rows, field);
                let present = |value: &str| options.iter().any(|o| eq_ignore_case(o, value));
                let stale = match field {
                    FilterField::Person => non_blank(&self.person).is_some_and(|v| !present(v)),
                    FilterField::Account => non_blank(&self.account).is_some_and(|v| !present(v)),
                    FilterField::Category => non_blank(&self.category).is_some_and(|v| !present(v)),
                    FilterField::Shop => non_blank(&self.shop).is_some_and(|v| !present(v)),
                    FilterField::Type => self.types.iter().any(|v| !present(v)),
                    FilterField::DebtTag => self.debt_tags.iter().any(|v| !present(v)),
                    FilterField::Year => self.year.is_some_and(|y| !present(&y.to_string())),
                    FilterField::Month => self.month.is_some_and(|m| !present(&m.to_string())),
                    FilterField::Amount | FilterField::Notes => false,
                };
                if !stale {
                    continue;
                }
                match field {
                    FilterField::Type => self.types.retain(|v| present(v)),
                    FilterField::DebtTag => self.debt_tags.retain(|v| present(v)),
                    _ => self.clear(field),
                }
                log::debug!("filter {} cleared: value no longer available", field);
                if !touched.contains(&field) {
                    touched.push(field);
                }
                changed = true;
            }
            if !changed {
                return touched;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": "1", "type": "Income", "person": "Ana", "category": "Salary", "shop": "", "amount": 100, "occurredOn": "2024-01-15", "notes": "January pay"}),
            json!({"id": "2", "type": "Expense", "person": "Ana", "category": "Food", "shop": "Market", "amount": 25.5, "occurredOn": "2024-02-20", "notes": "groceries"}),
            json!({"id": "3", "type": "Transfer", "owner": "Ben", "category": "Savings", "amount": null, "date": "2023-12-01"}),
            json!({"id": "4", "type": "expense", "personName": "Ben", "category": "food", "shop": "Cafe", "amount": "-5.00", "displayDate": "03/02/2024", "debtTag": "LOAN-1"}),
        ]
    }

    fn matching_ids(filters: &FilterState, rows: &[Value]) -> Vec<String> {
        rows.iter()
            .filter(|r| filters.matches(*r, &MatchOptions::default()))
            .map(|r| r.id().to_string())
            .collect()
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert_eq!(matching_ids(&FilterState::default(), &rows()), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_entity_alias_chain_case_insensitive() {
        let filters = FilterState { person: Some("ben".into()), ..Default::default() };
        assert_eq!(matching_ids(&filters, &rows()), vec!["3", "4"]);
    }

    #[test]
    fn test_owner_alias_wins_over_person() {
        let row = json!({"id": "x", "owner": "Carla", "person": "Ana"});
        let filters = FilterState { person: Some("Ana".into()), ..Default::default() };
        assert!(!filters.matches(&row, &MatchOptions::default()));
    }

    #[test]
    fn test_types_multi_select() {
        let filters = FilterState { types: vec!["EXPENSE".into(), "transfer".into()], ..Default::default() };
        assert_eq!(matching_ids(&filters, &rows()), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_amount_eq_with_string_value() {
        let filters = FilterState {
            amount_operator: Some(AmountOperator::Eq),
            amount_value: Some("100.00".into()),
            ..Default::default()
        };
        assert!(filters.matches(&json!({"id": "a", "amount": 100}), &MatchOptions::default()));
        assert!(filters.matches(&json!({"id": "a", "amount": 100.0000001}), &MatchOptions::default()));
        assert!(!filters.matches(&json!({"id": "a", "amount": 100.01}), &MatchOptions::default()));
    }

    #[test]
    fn test_amount_is_null() {
        let filters = FilterState { amount_operator: Some(AmountOperator::IsNull), ..Default::default() };
        for (amount, expected) in [(json!(null), true), (json!(""), true), (json!(0), false), (json!("12"), false)] {
            let row = json!({"id": "a", "amount": amount});
            assert_eq!(filters.matches(&row, &MatchOptions::default()), expected);
        }
        assert!(filters.matches(&json!({"id": "no-amount"}), &MatchOptions::default()));
    }

    #[test]
    fn test_amount_operators() {
        let check = |op, value: &str, amount: f64| amount_matches(op, &FieldValue::Number(amount), value);
        assert!(check(AmountOperator::Gt, "10", 10.5));
        assert!(!check(AmountOperator::Lt, "10", 10.0));
        assert!(check(AmountOperator::Lte, "10", 10.0));
        assert!(check(AmountOperator::Gte, "-5", -5.0));
        assert!(check(AmountOperator::Neq, "3", 3.5));
        assert!(!check(AmountOperator::Neq, "3", 3.0000000001));
    }

    #[test]
    fn test_non_numeric_amount_input_excludes_rows() {
        let filters = FilterState {
            amount_operator: Some(AmountOperator::Gt),
            amount_value: Some("abc".into()),
            ..Default::default()
        };
        assert!(matching_ids(&filters, &rows()).is_empty());
    }

    #[test]
    fn test_operator_without_value_is_inactive() {
        let filters = FilterState { amount_operator: Some(AmountOperator::Gt), ..Default::default() };
        assert!(!filters.is_active(FilterField::Amount));
        assert_eq!(matching_ids(&filters, &rows()).len(), 4);
    }

    #[test]
    fn test_year_month_filter() {
        let rows = vec![
            json!({"id": "jan", "occurredOn": "2024-01-15"}),
            json!({"id": "feb", "occurredOn": "2024-02-20"}),
        ];
        let filters = FilterState { year: Some(2024), month: Some(1), ..Default::default() };
        assert_eq!(matching_ids(&filters, &rows), vec!["jan"]);
        let year_only = FilterState { year: Some(2024), ..Default::default() };
        assert_eq!(matching_ids(&year_only, &rows).len(), 2);
    }

    #[test]
    fn test_year_options_skip_years_before_common_era() {
        let rows = vec![
            json!({"id": "old", "occurredOn": "-0005-03-01"}),
            json!({"id": "jan", "occurredOn": "2024-01-15"}),
        ];
        assert_eq!(resolve_date(&rows[0]).map(|d| d.year()), Some(-5));
        let filters = FilterState::default();
        assert_eq!(filters.options_for(&rows, FilterField::Year), vec!["2024"]);
        assert_eq!(filters.options_for(&rows, FilterField::Month), vec!["1", "3"]);
    }

    #[test]
    fn test_date_resolution_order() {
        let row = json!({"id": "a", "occurredOn": "", "date": "bad", "displayDate": "05/03/2022"});
        assert_eq!(resolve_date(&row), NaiveDate::from_ymd_opt(2022, 3, 5));
        let row = json!({"id": "b", "occurredOn": "2021-07-01", "date": "2020-01-01"});
        assert_eq!(resolve_date(&row), NaiveDate::from_ymd_opt(2021, 7, 1));
    }

    #[test]
    fn test_notes_substring() {
        let filters = FilterState { notes: Some("GROC".into()), ..Default::default() };
        assert_eq!(matching_ids(&filters, &rows()), vec!["2"]);
    }

    #[test]
    fn test_exclude_and_overrides() {
        let filters = FilterState { person: Some("Ana".into()), ..Default::default() };
        let exclude = [FilterField::Person];
        let all = rows();
        let excluded: Vec<&Value> = all.iter().filter(|r| filters.matches(*r, &MatchOptions::excluding(&exclude))).collect();
        assert_eq!(excluded.len(), 4);

        let overrides = [FilterOverride::Person(Some("Ben".into()))];
        let options = MatchOptions { exclude: &[], overrides: &overrides };
        let overridden: Vec<&str> = all.iter().filter(|r| filters.matches(*r, &options)).map(|r| r.id()).collect();
        assert_eq!(overridden, vec!["3", "4"]);
        assert_eq!(filters.person.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_type_options_ignore_own_filter() {
        let filters = FilterState { types: vec!["Expense".into()], ..Default::default() };
        assert_eq!(filters.options_for(&rows(), FilterField::Type), vec!["Expense", "Income", "Transfer"]);
    }

    #[test]
    fn test_options_narrow_by_other_filters() {
        let filters = FilterState { person: Some("Ana".into()), ..Default::default() };
        let all = rows();
        assert_eq!(filters.options_for(&all, FilterField::Category), vec!["Food", "Salary"]);
        assert_eq!(filters.options_for(&all, FilterField::Person), vec!["Ana", "Ben"]);
        assert_eq!(filters.options_for(&all, FilterField::Year), vec!["2024"]);
        assert_eq!(filters.options_for(&all, FilterField::Month), vec!["1", "2"]);
        assert!(filters.options_for(&all, FilterField::Notes).is_empty());
    }

    #[test]
    fn test_options_never_yield_empty_result() {
        let all = rows();
        let filters = FilterState {
            person: Some("Ben".into()),
            types: vec!["Expense".into()],
            ..Default::default()
        };
        for field in FilterField::ALL.into_iter().filter(|f| f.has_options()) {
            for value in filters.options_for(&all, field) {
                let update = match field {
                    FilterField::Person => FilterOverride::Person(Some(value.clone())),
                    FilterField::Account => FilterOverride::Account(Some(value.clone())),
                    FilterField::Category => FilterOverride::Category(Some(value.clone())),
                    FilterField::Shop => FilterOverride::Shop(Some(value.clone())),
                    FilterField::Type => FilterOverride::Types(vec![value.clone()]),
                    FilterField::DebtTag => FilterOverride::DebtTags(vec![value.clone()]),
                    FilterField::Year => FilterOverride::Year(value.parse().ok()),
                    FilterField::Month => FilterOverride::Month(value.parse().ok()),
                    FilterField::Amount | FilterField::Notes => unreachable!(),
                };
                let candidate = filters.with_overrides(&[update]);
                assert!(
                    !matching_ids(&candidate, &all).is_empty(),
                    "{} = {} yields no rows",
                    field,
                    value
                );
            }
        }
    }

    #[test]
    fn test_prune_stale_clears_vanished_values() {
        let all = rows();
        let mut filters = FilterState {
            person: Some("Ana".into()),
            shop: Some("Cafe".into()),
            ..Default::default()
        };
        let touched = filters.prune_stale(&all);
        assert!(touched.contains(&FilterField::Shop) || touched.contains(&FilterField::Person));
        assert!(!matching_ids(&filters, &all).is_empty());

        let mut filters = FilterState { types: vec!["Income".into(), "Refund".into()], ..Default::default() };
        assert_eq!(filters.prune_stale(&all), vec![FilterField::Type]);
        assert_eq!(filters.types, vec!["Income"]);
    }

    #[test]
    fn test_filter_state_serde_is_compact() {
        let filters = FilterState {
            types: vec!["Expense".into()],
            amount_operator: Some(AmountOperator::IsNull),
            ..Default::default()
        };
        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(value, json!({"types": ["Expense"], "amountOperator": "is-null"}));
        let back: FilterState = serde_json::from_value(value).unwrap();
        assert_eq!(back, filters);
    }

    #[test]
    fn test_describe_active_filters() {
        let mut filters = FilterState::default();
        filters.apply(FilterOverride::Amount(Some(AmountOperator::Gte), Some(" 50 ".to_string())));
        filters.apply(FilterOverride::Types(vec!["Expense".to_string(), "Income".to_string()]));
        filters.apply(FilterOverride::Shop(Some("  ".to_string())));
        assert_eq!(filters.describe(FilterField::Amount).as_deref(), Some("\u{2265} 50"));
        assert_eq!(filters.describe(FilterField::Type).as_deref(), Some("Expense, Income"));
        assert_eq!(filters.describe(FilterField::Shop), None);

        let options = FilterOptions {
            shops: vec!["Cafe".to_string()],
            ..Default::default()
        };
        assert_eq!(options.for_field(FilterField::Shop), ["Cafe".to_string()]);
        assert!(options.for_field(FilterField::Notes).is_empty());
    }
}
