//! Create/update body construction.
//!
//! A payload first goes through [`prepare_payload`], which runs every field
//! transform concurrently and coerces values to their field kind. The result
//! is then encoded by [`encode_body`] as JSON, or as multipart form data when
//! any value carries a file.

use crate::core::error::{ProviderError, Result};
use crate::core::schema::{FieldKind, ResourceSchema};
use crate::core::types::{DataValue, FormPart, Payload, RequestBody};
use chrono::{NaiveDate, NaiveDateTime, SecondsFormat};
use futures::future::try_join_all;
use serde_json::{Number, Value};

/// Run field transforms and kind coercion over `payload`.
///
/// Keys unknown to the schema pass through unchanged. The output keeps the
/// input key order regardless of which transform finishes first.
pub async fn prepare_payload(schema: &ResourceSchema, payload: Payload) -> Result<Payload> {
    let jobs = payload.into_iter().map(|(key, value)| async move {
        let Some(field) = schema.field(&key) else {
            return Ok((key, value));
        };

        let value = match &field.transform {
            Some(transform) => transform.normalize(value).await.map_err(|e| {
                ProviderError::Transform {
                    field: key.clone(),
                    message: e.to_string(),
                }
            })?,
            None => value,
        };

        let value = coerce(field.kind(), value);
        Ok::<_, ProviderError>((key, value))
    });

    Ok(try_join_all(jobs).await?.into_iter().collect())
}

/// Coerce a value to what a field of `kind` expects on the wire.
///
/// Values that cannot be coerced are left as they are for the server to
/// validate.
pub fn coerce(kind: FieldKind, value: DataValue) -> DataValue {
    match (kind, value) {
        (FieldKind::Integer, DataValue::String(s)) => match s.trim().parse::<i64>() {
            Ok(n) => DataValue::Number(n.into()),
            Err(_) => DataValue::String(s),
        },
        (FieldKind::Float, DataValue::String(s)) => match s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
        {
            Some(n) => DataValue::Number(n),
            None => DataValue::String(s),
        },
        (FieldKind::Boolean, DataValue::String(s)) => match s.as_str() {
            "true" | "1" => DataValue::Bool(true),
            "false" | "0" => DataValue::Bool(false),
            _ => DataValue::String(s),
        },
        (FieldKind::Date, DataValue::DateTime(dt)) => DataValue::Date(dt.date_naive()),
        (FieldKind::Date, DataValue::String(s)) => match parse_date(&s) {
            Some(date) => DataValue::Date(date),
            None => DataValue::String(s),
        },
        (FieldKind::DateTime, DataValue::Date(date)) => match date.and_hms_opt(0, 0, 0) {
            Some(naive) => DataValue::DateTime(naive.and_utc()),
            None => DataValue::Date(date),
        },
        (_, value) => value,
    }
}

/// Accepts `YYYY-MM-DD` or a date-time string, keeping only the date.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// True when the payload must be sent as multipart form data.
#[inline]
pub fn needs_multipart(payload: &Payload, has_file_field: bool) -> bool {
    has_file_field || payload.contains_file()
}

/// Encode a prepared payload.
pub fn encode_body(payload: &Payload, has_file_field: bool) -> Result<RequestBody> {
    if !needs_multipart(payload, has_file_field) {
        let json = serde_json::to_string(&payload.to_json())?;
        return Ok(RequestBody::Json(json));
    }

    let mut parts = Vec::with_capacity(payload.len());
    for (key, value) in payload.iter() {
        append_part(key, value, &mut parts);
    }
    Ok(RequestBody::Multipart(parts))
}

fn append_part(key: &str, value: &DataValue, parts: &mut Vec<FormPart>) {
    if let Some(file) = value.as_file() {
        parts.push(FormPart::file(key, file.clone()));
        return;
    }

    match value {
        DataValue::Null => {}
        DataValue::Array(items) if items.iter().any(DataValue::contains_file) => {
            let key = format!("{}[]", key);
            for item in items {
                match item.as_file() {
                    Some(file) => parts.push(FormPart::file(key.as_str(), file.clone())),
                    None => {
                        if let Some(text) = stringify(item) {
                            parts.push(FormPart::text(key.as_str(), text));
                        }
                    }
                }
            }
        }
        other => {
            if let Some(text) = stringify(other) {
                parts.push(FormPart::text(key, text));
            }
        }
    }
}

/// Text form of a multipart value. Scalars use their canonical string,
/// structures their JSON (files inside render as their name).
fn stringify(value: &DataValue) -> Option<String> {
    match value {
        DataValue::Null => None,
        DataValue::Bool(b) => Some(b.to_string()),
        DataValue::Number(n) => Some(n.to_string()),
        DataValue::String(s) => Some(s.clone()),
        DataValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        DataValue::DateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        DataValue::File(file) => Some(file.name.clone()),
        DataValue::Array(_) | DataValue::Object(_) => Some(match value.to_json() {
            Value::String(s) => s,
            json => json.to_string(),
        }),
    }
}
