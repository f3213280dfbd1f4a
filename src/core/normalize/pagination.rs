//! Pagination metadata resolution.

use crate::core::protocol::hydra::{hydra_get, NEXT, PREVIOUS, TOTAL_ITEMS, VIEW};
use crate::core::types::PaginationInfo;
use serde_json::{Map, Value};

/// Resolve pagination from a collection document.
///
/// A total item count wins over view links; with neither, nothing is known.
pub fn resolve_pagination(collection: &Map<String, Value>) -> PaginationInfo {
    if let Some(total) = hydra_get(collection, TOTAL_ITEMS).and_then(Value::as_u64) {
        return PaginationInfo::Total(total);
    }

    if let Some(view) = hydra_get(collection, VIEW).and_then(Value::as_object) {
        return PaginationInfo::PageInfo {
            has_next_page: is_link(hydra_get(view, NEXT)),
            has_previous_page: is_link(hydra_get(view, PREVIOUS)),
        };
    }

    PaginationInfo::Unknown
}

fn is_link(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(value: Value) -> PaginationInfo {
        resolve_pagination(value.as_object().unwrap())
    }

    #[test]
    fn test_total_items() {
        assert_eq!(resolve(json!({"totalItems": 2})), PaginationInfo::Total(2));
        assert_eq!(resolve(json!({"hydra:totalItems": 0})), PaginationInfo::Total(0));
    }

    #[test]
    fn test_total_wins_over_view() {
        let info = resolve(json!({"totalItems": 5, "view": {"next": "/books?page=2"}}));
        assert_eq!(info, PaginationInfo::Total(5));
    }

    #[test]
    fn test_view_next_only() {
        let info = resolve(json!({"hydra:view": {"hydra:next": "/books?page=2"}}));
        assert_eq!(
            info,
            PaginationInfo::PageInfo {
                has_next_page: true,
                has_previous_page: false
            }
        );
    }

    #[test]
    fn test_view_previous_only() {
        let info = resolve(json!({"view": {"@id": "/books?page=3", "previous": "/books?page=2"}}));
        assert_eq!(
            info,
            PaginationInfo::PageInfo {
                has_next_page: false,
                has_previous_page: true
            }
        );
    }

    #[test]
    fn test_nothing_known() {
        assert_eq!(resolve(json!({"member": []})), PaginationInfo::Unknown);
    }
}
