//! Sort controller - ordered sort descriptors and a stable multi-key comparator

use crate::column::{ColumnRegistry, SortType};
use crate::value::{locale_cmp, parse_timestamp, FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `desc` (any case) reads as ascending
    pub fn normalize(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub id: String,
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn new(id: &str, direction: SortDirection) -> Self {
        Self {
            id: id.to_string(),
            direction,
        }
    }

    pub fn asc(id: &str) -> Self {
        Self::new(id, SortDirection::Asc)
    }

    pub fn desc(id: &str) -> Self {
        Self::new(id, SortDirection::Desc)
    }
}

fn cycle(direction: Option<SortDirection>) -> Option<SortDirection> {
    match direction {
        None => Some(SortDirection::Asc),
        Some(SortDirection::Asc) => Some(SortDirection::Desc),
        Some(SortDirection::Desc) => None,
    }
}

/// Header click handler.
///
/// A plain click cycles asc -> desc -> none when the column is the sole sort
/// key and otherwise replaces the list with `[id asc]`. A `multi` click
/// cycles the column in place, or appends it ascending.
pub fn toggle(sort: &[SortDescriptor], id: &str, multi: bool) -> Vec<SortDescriptor> {
    if !multi {
        let sole = match sort {
            [only] if only.id == id => Some(only.direction),
            _ => None,
        };
        return cycle(sole)
            .map(|d| vec![SortDescriptor::new(id, d)])
            .unwrap_or_default();
    }

    let current = sort.iter().position(|d| d.id == id);
    let next = cycle(current.map(|i| sort[i].direction));

    let mut result = sort.to_vec();
    match (current, next) {
        (Some(i), Some(direction)) => result[i].direction = direction,
        (Some(i), None) => {
            result.remove(i);
        }
        (None, Some(direction)) => result.push(SortDescriptor::new(id, direction)),
        (None, None) => {}
    }
    result
}

/// 1-based priority of a column in the sort list
pub fn priority(sort: &[SortDescriptor], id: &str) -> Option<usize> {
    sort.iter().position(|d| d.id == id).map(|i| i + 1)
}

/// Compare two non-empty values under a column's sort type.
///
/// Numbers and dates fall back to text comparison when either side does not
/// parse.
pub fn compare_values(a: &FieldValue, b: &FieldValue, sort_type: SortType) -> Ordering {
    let typed = match sort_type {
        SortType::Number => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
        SortType::Date => {
            let parse = |v: &FieldValue| v.as_text().and_then(|t| parse_timestamp(&t));
            match (parse(a), parse(b)) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => None,
            }
        }
        SortType::String => None,
    };
    typed.unwrap_or_else(|| {
        locale_cmp(
            &a.as_text().unwrap_or_default(),
            &b.as_text().unwrap_or_default(),
        )
    })
}

/// Multi-key comparison; empty values sort last regardless of direction
pub fn compare_records(
    a: &dyn Record,
    b: &dyn Record,
    sort: &[SortDescriptor],
    registry: &ColumnRegistry,
) -> Ordering {
    for descriptor in sort {
        let column = match registry.get(&descriptor.id) {
            Some(column) => column,
            None => continue,
        };
        let left = column.sort_value(a);
        let right = column.sort_value(b);
        let ordering = match (left.is_empty(), right.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => descriptor
                .direction
                .apply(compare_values(&left, &right, column.sort_type)),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of `rows` by the descriptor list
pub fn sort_rows<R: Record>(rows: &mut [R], sort: &[SortDescriptor], registry: &ColumnRegistry) {
    if sort.is_empty() {
        return;
    }
    rows.sort_by(|a, b| compare_records(a, b, sort, registry));
}
