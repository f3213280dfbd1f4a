//! Field kind classification.
//!
//! Hydra documentation describes a property's type with a range IRI (and,
//! for a few well-known properties, with the property IRI itself). The kind
//! is resolved once per field; everything downstream matches on [`FieldKind`].

use crate::core::schema::Field;

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Closed set of value kinds the provider distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Id,
    Email,
    Url,
    Array,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Text,
}

impl FieldKind {
    /// Classify a field from its name, property IRI and range.
    pub fn classify(field: &Field) -> Self {
        if field.name == "id" || field.id.as_deref() == Some("@id") {
            return FieldKind::Id;
        }

        if let Some(kind) = field.id.as_deref().and_then(schema_org_kind) {
            return kind;
        }

        let Some(range) = field.range.as_deref() else {
            return FieldKind::Text;
        };

        if let Some(kind) = schema_org_kind(range) {
            return kind;
        }

        let local = range
            .strip_prefix(XSD)
            .or_else(|| range.strip_prefix("xmls:"))
            .or_else(|| range.strip_prefix("xsd:"))
            .unwrap_or(range);

        match local {
            "array" => FieldKind::Array,
            "integer" | "int" | "long" | "short" | "positiveInteger" | "nonNegativeInteger"
            | "negativeInteger" | "nonPositiveInteger" | "unsignedInt" | "unsignedLong" => {
                FieldKind::Integer
            }
            "decimal" | "float" | "double" => FieldKind::Float,
            "boolean" => FieldKind::Boolean,
            "date" => FieldKind::Date,
            "dateTime" => FieldKind::DateTime,
            _ => FieldKind::Text,
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }
}

fn schema_org_kind(iri: &str) -> Option<FieldKind> {
    let local = iri
        .strip_prefix("https://schema.org/")
        .or_else(|| iri.strip_prefix("http://schema.org/"))?;
    match local {
        "email" => Some(FieldKind::Email),
        "url" => Some(FieldKind::Url),
        _ => None,
    }
}
