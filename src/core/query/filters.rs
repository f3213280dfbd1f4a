//! Filter, sort and pagination encoding.
//!
//! ```text
//! {"nested": {"param": "bar"}}                 -> nested.param=bar
//! {"exists": {"foo": true}}                    -> exists[foo]=true
//! {"nested_date": {"date": {"before": "2000"}}} -> nested_date.date[before]=2000
//! {"array": ["/iri/1", "/iri/2"]}              -> array[0]=/iri/1&array[1]=/iri/2
//! ```
//!
//! Pairs come out in a fixed order: sort, then pagination, then filters in
//! the filter's own key order.

use crate::core::protocol::{is_filter_operator, params};
use crate::core::types::{FilterSpec, Pagination, Sort};
use serde_json::Value;
use url::Url;

/// Ordered `(key, value)` query pairs.
pub type QueryPairs = Vec<(String, String)>;

/// Encode sort, pagination and filters into query pairs.
///
/// `pagination` of `None` requests the full collection and emits no page
/// parameters.
pub fn encode(filter: &FilterSpec, sort: Option<&Sort>, pagination: Option<&Pagination>) -> QueryPairs {
    let mut pairs = QueryPairs::new();

    if let Some(sort) = sort {
        for field in sort.fields() {
            pairs.push((
                format!("{}[{}]", params::ORDER, field),
                sort.order.as_str().to_string(),
            ));
        }
    }

    if let Some(pagination) = pagination {
        pairs.push((params::PAGE.to_string(), pagination.page.to_string()));
        pairs.push((
            params::ITEMS_PER_PAGE.to_string(),
            pagination.per_page.to_string(),
        ));
    }

    for (key, value) in filter.iter() {
        encode_value(key, value, &mut pairs);
    }

    pairs
}

fn encode_value(key: &str, value: &Value, pairs: &mut QueryPairs) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if let Some(rendered) = render(item) {
                    pairs.push((format!("{}[{}]", key, index), rendered));
                }
            }
        }
        Value::Object(map) => {
            for (sub_key, sub_value) in map {
                let next = if key == params::EXISTS || is_filter_operator(sub_key) {
                    format!("{}[{}]", key, sub_key)
                } else {
                    format!("{}.{}", key, sub_key)
                };
                encode_value(&next, sub_value, pairs);
            }
        }
        scalar => {
            if let Some(rendered) = render(scalar) {
                pairs.push((key.to_string(), rendered));
            }
        }
    }
}

/// String form of a leaf. `null` is absent; nested structures inside an
/// array are sent as JSON.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Append pairs to a URL's query string, keeping any existing query.
pub fn apply_query(url: &Url, pairs: &[(String, String)]) -> Url {
    let mut url = url.clone();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs.iter());
    }
    url
}
