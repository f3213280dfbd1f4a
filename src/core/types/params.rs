//! Parameters and results of the abstract CRUD operations.

use crate::core::types::{Payload, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page request. `page` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Pagination { page, per_page }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sort request. `field` may list several comma-separated fields which all
/// share the same direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Sort {
            field: field.into(),
            order,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.field
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

/// Nested filter criteria.
///
/// Keys keep insertion order, which is also the order parameters are emitted
/// on the wire. A `null` leaf means "filter absent" and is never emitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(Map<String, Value>);

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert `key` as the last entry, moving it if it already exists.
    pub fn push_last(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        self.0.shift_remove(&key);
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for FilterSpec {
    fn from(map: Map<String, Value>) -> Self {
        FilterSpec(map)
    }
}

/// Pagination metadata resolved from a collection response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaginationInfo {
    /// The server reported the total item count.
    Total(u64),
    /// The server only exposed next/previous links.
    PageInfo {
        has_next_page: bool,
        has_previous_page: bool,
    },
    /// Nothing known; the page may or may not be the last one.
    #[default]
    Unknown,
}

impl PaginationInfo {
    pub fn total(&self) -> Option<u64> {
        match self {
            PaginationInfo::Total(total) => Some(*total),
            _ => None,
        }
    }

    pub fn has_next_page(&self) -> Option<bool> {
        match self {
            PaginationInfo::PageInfo { has_next_page, .. } => Some(*has_next_page),
            _ => None,
        }
    }
}

/// Result of a list operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListResult {
    pub data: Vec<Record>,
    pub pagination: PaginationInfo,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetListParams {
    /// `None` requests the full collection (no page parameters are sent).
    pub pagination: Option<Pagination>,
    pub sort: Option<Sort>,
    pub filter: FilterSpec,
}

impl GetListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pagination(mut self, page: u32, per_page: u32) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort::new(field, order));
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetOneParams {
    pub id: String,
}

impl GetOneParams {
    pub fn new(id: impl Into<String>) -> Self {
        GetOneParams { id: id.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetManyParams {
    pub ids: Vec<String>,
}

impl GetManyParams {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GetManyParams {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// List records whose `target` field references `id`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetManyReferenceParams {
    pub target: String,
    pub id: String,
    pub pagination: Option<Pagination>,
    pub sort: Option<Sort>,
    pub filter: FilterSpec,
}

impl GetManyReferenceParams {
    pub fn new(target: impl Into<String>, id: impl Into<String>) -> Self {
        GetManyReferenceParams {
            target: target.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_pagination(mut self, page: u32, per_page: u32) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort::new(field, order));
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateParams {
    pub data: Payload,
    /// Force a multipart body even when no file is present.
    pub has_file_field: bool,
}

impl CreateParams {
    pub fn new(data: Payload) -> Self {
        CreateParams {
            data,
            has_file_field: false,
        }
    }

    pub fn with_file_field(mut self) -> Self {
        self.has_file_field = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateParams {
    pub id: String,
    pub data: Payload,
    pub previous_data: Option<Record>,
    /// Force a multipart body (and therefore POST) even when no file is present.
    pub has_file_field: bool,
}

impl UpdateParams {
    pub fn new(id: impl Into<String>, data: Payload) -> Self {
        UpdateParams {
            id: id.into(),
            data,
            previous_data: None,
            has_file_field: false,
        }
    }

    pub fn with_previous(mut self, previous: Record) -> Self {
        self.previous_data = Some(previous);
        self
    }

    pub fn with_file_field(mut self) -> Self {
        self.has_file_field = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateManyParams {
    pub ids: Vec<String>,
    pub data: Payload,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteParams {
    pub id: String,
    pub previous_data: Option<Record>,
}

impl DeleteParams {
    pub fn new(id: impl Into<String>) -> Self {
        DeleteParams {
            id: id.into(),
            previous_data: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteManyParams {
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compound_sort_fields() {
        let sort = Sort::new("author.name, title", SortOrder::Desc);
        assert_eq!(sort.fields().collect::<Vec<_>>(), vec!["author.name", "title"]);
        assert_eq!(sort.order.as_str(), "DESC");
    }

    #[test]
    fn test_push_last_moves_existing_key() {
        let mut filter = FilterSpec::new().with("author", "/authors/1").with("title", "Dune");
        filter.push_last("author", "/authors/2");
        let keys: Vec<_> = filter.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["title", "author"]);
        assert_eq!(filter.get("author"), Some(&json!("/authors/2")));
    }

    #[test]
    fn test_pagination_info_accessors() {
        assert_eq!(PaginationInfo::Total(3).total(), Some(3));
        assert_eq!(PaginationInfo::Unknown.total(), None);
        let info = PaginationInfo::PageInfo {
            has_next_page: true,
            has_previous_page: false,
        };
        assert_eq!(info.has_next_page(), Some(true));
    }

    #[test]
    fn test_filter_spec_deserializes_in_order() {
        let filter: FilterSpec = serde_json::from_str(r#"{"b": 1, "a": {"gt": 2}}"#).unwrap();
        let keys: Vec<_> = filter.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
