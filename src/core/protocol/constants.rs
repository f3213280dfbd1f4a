//! Wire constants.

/// Media types.
pub mod media_types {
    pub const JSON_LD: &str = "application/ld+json";
    pub const MERGE_PATCH: &str = "application/merge-patch+json";
    pub const EVENT_STREAM: &str = "text/event-stream";
}

/// Header names, lower-cased.
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const AUTHORIZATION: &str = "authorization";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LINK: &str = "link";
}

/// Query parameter names understood by Hydra collections.
pub mod params {
    pub const PAGE: &str = "page";
    pub const ITEMS_PER_PAGE: &str = "itemsPerPage";
    pub const ORDER: &str = "order";
    pub const EXISTS: &str = "exists";
    pub const TOPIC: &str = "topic";
}

/// Range and existence operators that render as `key[operator]=value`.
pub const FILTER_OPERATORS: &[&str] = &[
    "before",
    "after",
    "strictly_before",
    "strictly_after",
    "lt",
    "gt",
    "lte",
    "gte",
    "between",
];

#[inline]
pub fn is_filter_operator(key: &str) -> bool {
    FILTER_OPERATORS.contains(&key)
}
