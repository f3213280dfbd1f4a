//! Outgoing record payloads.
//!
//! Payloads differ from plain JSON in two ways: they may carry binary files
//! (which force a multipart body), and they may carry typed dates that are
//! rendered according to the field kind.

use crate::core::types::Record;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

/// Binary file selected for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        RawFile {
            name: name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// A value inside a [`Payload`].
#[derive(Clone, Debug, PartialEq)]
pub enum DataValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    File(RawFile),
    Array(Vec<DataValue>),
    Object(Payload),
}

impl DataValue {
    /// Depth-first search for a file anywhere below this value.
    pub fn contains_file(&self) -> bool {
        let mut stack = vec![self];
        while let Some(value) = stack.pop() {
            match value {
                DataValue::File(_) => return true,
                DataValue::Array(items) => stack.extend(items.iter()),
                DataValue::Object(payload) => stack.extend(payload.values()),
                DataValue::Null
                | DataValue::Bool(_)
                | DataValue::Number(_)
                | DataValue::String(_)
                | DataValue::Date(_)
                | DataValue::DateTime(_) => {}
            }
        }
        false
    }

    /// The file this value stands for: either the file itself or an
    /// upload wrapper object with a `rawFile` entry.
    pub fn as_file(&self) -> Option<&RawFile> {
        match self {
            DataValue::File(file) => Some(file),
            DataValue::Object(payload) => match payload.get("rawFile") {
                Some(DataValue::File(file)) => Some(file),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// JSON rendering. Files render as their file name; dates as ISO 8601.
    pub fn to_json(&self) -> Value {
        match self {
            DataValue::Null => Value::Null,
            DataValue::Bool(b) => Value::Bool(*b),
            DataValue::Number(n) => Value::Number(n.clone()),
            DataValue::String(s) => Value::String(s.clone()),
            DataValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            DataValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            DataValue::File(file) => Value::String(file.name.clone()),
            DataValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            DataValue::Object(payload) => payload.to_json(),
        }
    }
}

impl From<Value> for DataValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DataValue::Null,
            Value::Bool(b) => DataValue::Bool(b),
            Value::Number(n) => DataValue::Number(n),
            Value::String(s) => DataValue::String(s),
            Value::Array(items) => DataValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => DataValue::Object(map.into()),
        }
    }
}

impl From<RawFile> for DataValue {
    fn from(file: RawFile) -> Self {
        DataValue::File(file)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        DataValue::Number(n.into())
    }
}

impl From<i32> for DataValue {
    fn from(n: i32) -> Self {
        DataValue::Number(n.into())
    }
}

impl From<u64> for DataValue {
    fn from(n: u64) -> Self {
        DataValue::Number(n.into())
    }
}

impl From<f64> for DataValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(DataValue::Null, DataValue::Number)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(dt: DateTime<Utc>) -> Self {
        DataValue::DateTime(dt)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(d: NaiveDate) -> Self {
        DataValue::Date(d)
    }
}

impl From<Payload> for DataValue {
    fn from(payload: Payload) -> Self {
        DataValue::Object(payload)
    }
}

/// Ordered key/value payload sent on create and update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, DataValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Replaces in place when the key exists, appends otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DataValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<DataValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &DataValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_file(&self) -> bool {
        self.values().any(DataValue::contains_file)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.entries.len());
        for (k, v) in &self.entries {
            map.insert(k.clone(), v.to_json());
        }
        Value::Object(map)
    }
}

impl IntoIterator for Payload {
    type Item = (String, DataValue);
    type IntoIter = std::vec::IntoIter<(String, DataValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, DataValue)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, DataValue)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, DataValue::from(v))).collect()
    }
}

impl From<&Record> for Payload {
    fn from(record: &Record) -> Self {
        match record.to_value() {
            Value::Object(map) => map.into(),
            _ => Payload::new(),
        }
    }
}
