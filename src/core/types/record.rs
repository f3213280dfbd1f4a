//! Flat, caller-facing form of a Hydra document.

use crate::core::error::{ProviderError, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A normalized document.
///
/// `id` is always the document IRI and is never empty. A pre-existing local
/// `id` property of the document is preserved as `origin_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    id: String,
    origin_id: Option<Value>,
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from its IRI and remaining properties.
    ///
    /// `fields` must not contain `id` or `originId`; those keys are dropped if present.
    pub fn new(id: impl Into<String>, origin_id: Option<Value>, mut fields: Map<String, Value>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ProviderError::MissingIdentifier(
                Value::Object(fields).to_string(),
            ));
        }
        fields.shift_remove("id");
        fields.shift_remove("originId");
        Ok(Record {
            id,
            origin_id,
            fields,
        })
    }

    /// Record carrying only an identifier, used for delete results.
    pub fn from_id(id: impl Into<String>) -> Result<Self> {
        Self::new(id, None, Map::new())
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn origin_id(&self) -> Option<&Value> {
        self.origin_id.as_ref()
    }

    /// Property lookup; `id` and `originId` resolve to the dedicated slots.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match key {
            "originId" => self.origin_id.as_ref(),
            _ => self.fields.get(key),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Flat JSON object: `id`, the remaining properties, then `originId` when present.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 2);
        map.insert("id".into(), Value::String(self.id.clone()));
        for (k, v) in &self.fields {
            map.insert(k.clone(), v.clone());
        }
        if let Some(origin) = &self.origin_id {
            map.insert("originId".into(), origin.clone());
        }
        Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
