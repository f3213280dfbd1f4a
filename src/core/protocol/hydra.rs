//! Hydra vocabulary access.
//!
//! Depending on the JSON-LD context the server uses, Hydra terms appear
//! either bare (`member`) or prefixed (`hydra:member`). Both are accepted
//! everywhere; the bare form is canonical.

use serde_json::{Map, Value};

pub const HYDRA_PREFIX: &str = "hydra:";

pub const ID: &str = "@id";

pub const MEMBER: &str = "member";
pub const TOTAL_ITEMS: &str = "totalItems";
pub const VIEW: &str = "view";
pub const NEXT: &str = "next";
pub const PREVIOUS: &str = "previous";
pub const DESCRIPTION: &str = "description";
pub const TITLE: &str = "title";

/// Look up a Hydra term, bare form first.
pub fn hydra_get<'a>(object: &'a Map<String, Value>, term: &str) -> Option<&'a Value> {
    object
        .get(term)
        .or_else(|| object.get(&format!("{}{}", HYDRA_PREFIX, term)))
}

/// Copy of `object` with every `hydra:`-prefixed key renamed to its bare form.
/// When both forms are present the bare one wins.
pub fn unprefixed(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(object.len());
    for (key, value) in object {
        match key.strip_prefix(HYDRA_PREFIX) {
            Some(bare) if object.contains_key(bare) => {}
            Some(bare) => {
                out.insert(bare.to_string(), value.clone());
            }
            None => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

/// The document identifier, if it is a non-empty string.
pub fn document_id(object: &Map<String, Value>) -> Option<&str> {
    object
        .get(ID)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// True for a JSON object that carries its own identifier.
#[inline]
pub fn is_document(value: &Value) -> bool {
    value.as_object().and_then(document_id).is_some()
}
