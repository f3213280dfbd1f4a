//! Error body extraction.
//!
//! API Platform answers validation failures with a `ConstraintViolationList`:
//!
//! ```text
//! {
//!   "@type": "ConstraintViolationList",
//!   "hydra:description": "isbn: This value is neither a valid ISBN-10 nor a valid ISBN-13.",
//!   "violations": [{"propertyPath": "isbn", "message": "This value is neither ..."}]
//! }
//! ```

use crate::core::error::{ProviderError, Violations};
use crate::core::protocol::hydra::{hydra_get, DESCRIPTION, TITLE};
use crate::core::types::HydraResponse;
use serde_json::{Map, Value};

/// Flatten a `violations` array into `{propertyPath: message}`.
///
/// Several messages for the same path are joined with a newline.
pub fn extract_violations(body: &Map<String, Value>) -> Violations {
    let mut violations = Violations::new();
    let Some(items) = body.get("violations").and_then(Value::as_array) else {
        return violations;
    };

    for item in items {
        let (Some(path), Some(message)) = (
            item.get("propertyPath").and_then(Value::as_str),
            item.get("message").and_then(Value::as_str),
        ) else {
            continue;
        };
        violations
            .entry(path.to_string())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(message);
            })
            .or_insert_with(|| message.to_string());
    }
    violations
}

/// Build the error for a non-2xx response.
pub fn error_from_response(response: &HydraResponse) -> ProviderError {
    let body = response
        .json_body()
        .ok()
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();

    let message = hydra_get(&body, DESCRIPTION)
        .or_else(|| body.get("detail"))
        .or_else(|| hydra_get(&body, TITLE))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            http::StatusCode::from_u16(response.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("HTTP error")
                .to_string()
        });

    ProviderError::Http {
        status: response.status,
        message,
        violations: extract_violations(&body),
    }
}
