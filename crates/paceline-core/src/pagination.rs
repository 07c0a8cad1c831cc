//! Pagination metadata extraction.
//!
//! Upstream list responses are not consistent about where and how they
//! report paging: some put `page`/`total` at the top level, others nest them
//! under `pagination` or `meta`, and spellings vary between camelCase and
//! snake_case. [`extract`] reads whatever is present and fills the rest from
//! the result array.

use serde::Serialize;
use serde_json::{Map, Value};

const RESULT_KEYS: [&str; 3] = ["results", "data", "items"];
const NESTED_KEYS: [&str; 3] = ["pagination", "meta", "paging"];
const PAGE_KEYS: [&str; 5] = ["page", "currentPage", "current_page", "pageNumber", "page_number"];
const PER_PAGE_KEYS: [&str; 7] = [
    "itemsPerPage",
    "items_per_page",
    "perPage",
    "per_page",
    "pageSize",
    "page_size",
    "limit",
];
const TOTAL_KEYS: [&str; 7] = [
    "total",
    "totalItems",
    "total_items",
    "totalCount",
    "total_count",
    "found",
    "count",
];

/// Page position of a partial result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u32,
    pub items_per_page: u32,
    pub total: u64,
}

impl PaginationInfo {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.items_per_page)).max(1)
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

/// Derives pagination metadata from a raw response body.
///
/// Never fails: missing or malformed fields fall back to `page = 1` and to
/// the observed result count for `items_per_page` and `total`.
pub fn extract(raw: &Value) -> PaginationInfo {
    let observed = result_count(raw);
    let page = lookup(raw, &PAGE_KEYS)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(1);
    let items_per_page = lookup(raw, &PER_PAGE_KEYS)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or_else(|| u32::try_from(observed).unwrap_or(u32::MAX));
    let total = lookup(raw, &TOTAL_KEYS).unwrap_or(observed);

    PaginationInfo {
        page: page.max(1),
        items_per_page: items_per_page.max(1),
        total,
    }
}

fn result_count(raw: &Value) -> u64 {
    let results = match raw {
        Value::Array(items) => Some(items),
        Value::Object(fields) => RESULT_KEYS
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_array))
            .or_else(|| sole_array(fields)),
        _ => None,
    };
    results.map_or(0, |items| items.len() as u64)
}

/// Resource-named lists such as `{"venue": [...]}`: the only top-level array.
fn sole_array(fields: &Map<String, Value>) -> Option<&Vec<Value>> {
    let mut arrays = fields.values().filter_map(Value::as_array);
    match (arrays.next(), arrays.next()) {
        (Some(items), None) => Some(items),
        _ => None,
    }
}

fn lookup(raw: &Value, keys: &[&str]) -> Option<u64> {
    let fields = raw.as_object()?;
    find_in(fields, keys).or_else(|| {
        NESTED_KEYS
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_object))
            .find_map(|nested| find_in(nested, keys))
    })
}

fn find_in(fields: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| fields.get(*key).and_then(as_count))
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
