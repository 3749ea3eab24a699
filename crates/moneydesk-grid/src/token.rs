//! Restore token codec
//!
//! A token is `base64url({"v":1,"state":{...}})` without padding. Decoding
//! never fails loudly: anything that is not a well-formed version 1 envelope
//! reads as "no token" and the caller falls back to defaults.

use crate::filter::FilterState;
use crate::pagination::{Pagination, DEFAULT_PAGE_SIZE};
use crate::sort::{SortDescriptor, SortDirection};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

pub const TOKEN_VERSION: u32 = 1;

/// Smallest page size a token may carry
pub const MIN_PAGE_SIZE: usize = 5;

/// Everything needed to rebuild a table view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableState {
    pub search_term: String,
    pub sort: Vec<SortDescriptor>,
    pub filters: FilterState,
    pub pagination: Pagination,
    pub quick_filter_id: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    v: u32,
    state: &'a TableState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreTokenCodec {
    pub max_page_size: usize,
    pub default_page_size: usize,
}

impl Default for RestoreTokenCodec {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RestoreTokenCodec {
    pub fn new(max_page_size: usize, default_page_size: usize) -> Self {
        let max_page_size = max_page_size.max(MIN_PAGE_SIZE);
        Self {
            max_page_size,
            default_page_size: default_page_size.clamp(MIN_PAGE_SIZE, max_page_size),
        }
    }

    /// Normalize a state so it can be encoded and restored safely
    pub fn sanitize(&self, state: &TableState) -> TableState {
        let mut clean = state.clone();

        clean.pagination.page = clean.pagination.page.max(1);
        clean.pagination.page_size = clean
            .pagination
            .page_size
            .clamp(MIN_PAGE_SIZE, self.max_page_size);

        let mut seen = HashSet::new();
        clean.sort.retain(|d| !d.id.is_empty() && seen.insert(d.id.clone()));

        let filters = &mut clean.filters;
        if filters.month.is_some_and(|m| !(1..=12).contains(&m)) {
            filters.month = None;
        }
        let amount_meaningful = matches!(
            filters.amount_operator,
            Some(op) if op != crate::filter::AmountOperator::IsNull
        );
        if !amount_meaningful
            || filters
                .amount_value
                .as_deref()
                .is_some_and(|v| v.trim().is_empty())
        {
            filters.amount_value = None;
        }
        filters.types.retain(|t| !t.trim().is_empty());
        filters.debt_tags.retain(|t| !t.trim().is_empty());

        if clean.quick_filter_id.as_deref().is_some_and(str::is_empty) {
            clean.quick_filter_id = None;
        }
        clean
    }

    pub fn encode(&self, state: &TableState) -> String {
        let state = self.sanitize(state);
        let json = serde_json::to_string(&Envelope {
            v: TOKEN_VERSION,
            state: &state,
        })
        .unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token; `None` for bad base64, bad JSON or a foreign version
    pub fn decode(&self, token: &str) -> Option<TableState> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim().trim_end_matches('='))
            .ok()?;
        let envelope: Value = serde_json::from_slice(&bytes).ok()?;
        if envelope.get("v").and_then(Value::as_u64) != Some(TOKEN_VERSION as u64) {
            return None;
        }
        let state = envelope.get("state")?.as_object()?;

        let search_term = match state.get("searchTerm") {
            None | Some(Value::Null) => String::new(),
            Some(value) => value.as_str()?.to_string(),
        };
        let sort = match state.get("sort") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => value
                .as_array()?
                .iter()
                .map(|entry| {
                    let id = entry.get("id")?.as_str()?;
                    let direction = entry
                        .get("direction")
                        .and_then(Value::as_str)
                        .map(SortDirection::normalize)
                        .unwrap_or_default();
                    Some(SortDescriptor::new(id, direction))
                })
                .collect::<Option<Vec<_>>>()?,
        };
        let filters = match state.get("filters") {
            None | Some(Value::Null) => FilterState::default(),
            Some(value) => serde_json::from_value(value.clone()).ok()?,
        };
        let pagination = state
            .get("pagination")
            .map(|p| Pagination {
                page: lenient_usize(p.get("page")).filter(|n| *n > 0).unwrap_or(1),
                page_size: lenient_usize(p.get("pageSize")).unwrap_or(self.default_page_size),
            })
            .unwrap_or(Pagination::new(1, self.default_page_size));
        let quick_filter_id = state
            .get("quickFilterId")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(self.sanitize(&TableState {
            search_term,
            sort,
            filters,
            pagination,
            quick_filter_id,
        }))
    }

    /// Decode, or fall back to a default state
    pub fn decode_or_default(&self, token: Option<&str>) -> TableState {
        match token.filter(|t| !t.trim().is_empty()) {
            None => self.default_state(),
            Some(token) => self.decode(token).unwrap_or_else(|| {
                log::debug!("restore token rejected, using defaults");
                self.default_state()
            }),
        }
    }

    pub fn default_state(&self) -> TableState {
        TableState {
            pagination: Pagination::new(1, self.default_page_size),
            ..TableState::default()
        }
    }
}

/// Page numbers may arrive as numbers or numeric strings
fn lenient_usize(value: Option<&Value>) -> Option<usize> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as usize)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::AmountOperator;
    use serde_json::json;

    fn codec() -> RestoreTokenCodec {
        RestoreTokenCodec::new(100, 25)
    }

    fn sample() -> TableState {
        TableState {
            search_term: "coffee".to_string(),
            sort: vec![SortDescriptor::desc("occurredOn"), SortDescriptor::asc("amount"), SortDescriptor::asc("occurredOn")],
            filters: FilterState {
                types: vec!["Expense".to_string(), " ".to_string()],
                amount_operator: Some(AmountOperator::IsNull),
                amount_value: Some("12".to_string()),
                month: Some(13),
                year: Some(2024),
                ..Default::default()
            },
            pagination: Pagination::new(0, 1000),
            quick_filter_id: Some("shop".to_string()),
        }
    }

    fn raw_token(value: serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(value.to_string())
    }

    #[test]
    fn test_round_trip_equals_sanitized() {
        let codec = codec();
        let state = sample();
        let decoded = codec.decode(&codec.encode(&state)).unwrap();
        assert_eq!(decoded, codec.sanitize(&state));
    }

    #[test]
    fn test_sanitize_rules() {
        let clean = codec().sanitize(&sample());
        assert_eq!(clean.pagination, Pagination::new(1, 100));
        assert_eq!(clean.sort, vec![SortDescriptor::desc("occurredOn"), SortDescriptor::asc("amount")]);
        assert_eq!(clean.filters.types, vec!["Expense"]);
        assert_eq!(clean.filters.month, None);
        assert_eq!(clean.filters.amount_value, None);
        assert_eq!(clean.filters.year, Some(2024));

        let small = TableState { pagination: Pagination::new(3, 2), ..Default::default() };
        assert_eq!(codec().sanitize(&small).pagination, Pagination::new(3, 5));
    }

    #[test]
    fn test_garbage_decodes_to_none() {
        let codec = codec();
        assert_eq!(codec.decode("garbage"), None);
        assert_eq!(codec.decode("!!!"), None);
        assert_eq!(codec.decode(&raw_token(json!({"v": 2, "state": {}}))), None);
        assert_eq!(codec.decode(&raw_token(json!([1, 2]))), None);
        assert_eq!(codec.decode(&raw_token(json!({"v": 1, "state": {"sort": "amount"}}))), None);
    }

    #[test]
    fn test_padding_tolerated() {
        let codec = codec();
        let token = codec.encode(&TableState::default());
        let padded = format!("{}==", token);
        assert!(codec.decode(&padded).is_some());
        assert!(!token.contains('='));
    }

    #[test]
    fn test_lenient_fields() {
        let token = raw_token(json!({
            "v": 1,
            "state": {
                "searchTerm": "rent",
                "sort": [{"id": "amount", "direction": "DESC"}, {"id": "shop", "direction": "up"}],
                "pagination": {"page": "3", "pageSize": "10"}
            }
        }));
        let state = codec().decode(&token).unwrap();
        assert_eq!(state.search_term, "rent");
        assert_eq!(state.sort, vec![SortDescriptor::desc("amount"), SortDescriptor::asc("shop")]);
        assert_eq!(state.pagination, Pagination::new(3, 10));
        assert_eq!(state.filters, FilterState::default());
    }

    #[test]
    fn test_decode_or_default() {
        let codec = codec();
        assert_eq!(codec.decode_or_default(None), codec.default_state());
        assert_eq!(codec.decode_or_default(Some("nope")).pagination, Pagination::new(1, 25));
    }
}
