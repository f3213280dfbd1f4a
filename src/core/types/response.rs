//! HTTP response as seen by the provider.

use crate::core::error::Result;
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw HTTP response: status, headers, body bytes.
#[derive(Clone, Debug)]
pub struct HydraResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl HydraResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        HydraResponse {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// A response carrying `value` as its JSON-LD body.
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
            .with_header("content-type", "application/ld+json; charset=utf-8")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Parse the body as JSON. An empty body (e.g. 204) yields `Value::Null`.
    pub fn json_body(&self) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Default for HydraResponse {
    fn default() -> Self {
        HydraResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }
}
