//! Introspected API documentation.
//!
//! These types are produced by an external Hydra documentation parser (see
//! [`Introspector`](crate::core::traits::Introspector)) and are read-only here.
//! They drive request building and response transformation only.

mod kind;

pub use kind::FieldKind;

use crate::core::error::{ProviderError, Result};
use crate::core::traits::FieldTransform;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A property of a resource.
///
/// The [`FieldKind`] is classified when the field is built or deserialized.
/// After editing `id` or `range` in place, call [`Field::reclassify`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FieldDef")]
pub struct Field {
    pub name: String,
    /// Property IRI.
    pub id: Option<String>,
    /// Range (type) IRI.
    pub range: Option<String>,
    /// Name of the referenced resource, for relations.
    pub reference: Option<String>,
    /// Name of the embedded resource, when the relation is returned inline.
    pub embedded: Option<String>,
    pub max_cardinality: Option<u32>,
    /// Enumeration label -> value.
    #[serde(rename = "enum")]
    pub enum_values: Option<Map<String, Value>>,
    pub required: bool,
    #[serde(skip)]
    pub transform: Option<Arc<dyn FieldTransform>>,
    #[serde(skip)]
    kind: FieldKind,
}

/// Wire form of a [`Field`], before classification.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldDef {
    name: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    embedded: Option<String>,
    #[serde(default)]
    max_cardinality: Option<u32>,
    #[serde(default, rename = "enum")]
    enum_values: Option<Map<String, Value>>,
    #[serde(default)]
    required: bool,
}

impl From<FieldDef> for Field {
    fn from(def: FieldDef) -> Self {
        Field {
            name: def.name,
            id: def.id,
            range: def.range,
            reference: def.reference,
            embedded: def.embedded,
            max_cardinality: def.max_cardinality,
            enum_values: def.enum_values,
            required: def.required,
            transform: None,
            kind: FieldKind::Text,
        }
        .reclassify()
    }
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            id: None,
            range: None,
            reference: None,
            embedded: None,
            max_cardinality: None,
            enum_values: None,
            required: false,
            transform: None,
            kind: FieldKind::Text,
        }
        .reclassify()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.reclassify()
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self.reclassify()
    }

    pub fn with_reference(mut self, resource: impl Into<String>, max_cardinality: Option<u32>) -> Self {
        self.reference = Some(resource.into());
        self.max_cardinality = max_cardinality;
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn FieldTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Classify again from the current name, `id` and `range`.
    pub fn reclassify(mut self) -> Self {
        self.kind = FieldKind::classify(&self);
        self
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// A relation is to-many unless its maximum cardinality is exactly one.
    pub fn is_to_many(&self) -> bool {
        (self.reference.is_some() || self.embedded.is_some()) && self.max_cardinality != Some(1)
    }

    #[inline]
    pub fn is_embedded(&self) -> bool {
        self.embedded.is_some()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("range", &self.range)
            .field("reference", &self.reference)
            .field("embedded", &self.embedded)
            .field("max_cardinality", &self.max_cardinality)
            .field("enum_values", &self.enum_values)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

/// What an operation does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    List,
    Show,
    Edit,
    Delete,
}

/// A supported operation and its HTTP verb.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub method: String,
}

impl Operation {
    pub fn new(kind: OperationKind, method: impl Into<String>) -> Self {
        Operation {
            kind,
            method: method.into(),
        }
    }

    pub fn http_method(&self) -> Option<Method> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes()).ok()
    }
}

/// A query parameter (filter) accepted by the collection endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub variable: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    pub fn new(variable: impl Into<String>) -> Self {
        Parameter {
            variable: variable.into(),
            range: None,
            required: false,
        }
    }
}

/// One resource of the API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub name: String,
    /// Collection URL.
    pub url: Url,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl ResourceSchema {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        ResourceSchema {
            name: name.into(),
            url,
            fields: Vec::new(),
            parameters: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&Field> {
        self.field(name).ok_or_else(|| ProviderError::UnknownField {
            resource: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub fn operation(&self, kind: OperationKind) -> Option<&Operation> {
        self.operations.iter().find(|op| op.kind == kind)
    }

    /// True when the collection accepts a filter named `variable`
    /// (array form `variable[]` included).
    pub fn has_parameter(&self, variable: &str) -> bool {
        self.parameters.iter().any(|p| {
            p.variable == variable
                || p.variable
                    .strip_suffix("[]")
                    .is_some_and(|base| base == variable)
        })
    }

    /// True when the collection can be filtered by identifier.
    #[inline]
    pub fn has_id_filter(&self) -> bool {
        self.has_parameter("id")
    }

    /// Verb declared by the edit operation, if any.
    pub fn edit_method(&self) -> Option<Method> {
        self.operation(OperationKind::Edit)
            .and_then(Operation::http_method)
    }
}

/// Everything introspection yields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiDocumentation {
    pub entrypoint: Url,
    pub resources: Vec<ResourceSchema>,
}

impl ApiDocumentation {
    pub fn new(entrypoint: Url, resources: Vec<ResourceSchema>) -> Self {
        ApiDocumentation {
            entrypoint,
            resources,
        }
    }

    pub fn resource(&self, name: &str) -> Result<&ResourceSchema> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> ResourceSchema {
        ResourceSchema::new("books", Url::parse("https://api.example.com/books").unwrap())
            .with_field(Field::new("title"))
            .with_field(Field::new("author").with_reference("authors", Some(1)))
            .with_field(Field::new("reviews").with_reference("reviews", None))
            .with_parameter(Parameter::new("id[]"))
            .with_operation(Operation::new(OperationKind::Edit, "put"))
    }

    #[test]
    fn test_field_lookup() {
        let schema = books();
        assert!(schema.field("title").is_some());
        let err = schema.require_field("color").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownField { .. }));
    }

    #[test]
    fn test_cardinality() {
        let schema = books();
        assert!(!schema.field("author").unwrap().is_to_many());
        assert!(schema.field("reviews").unwrap().is_to_many());
        assert!(!schema.field("title").unwrap().is_to_many());
    }

    #[test]
    fn test_id_filter_accepts_array_form() {
        assert!(books().has_id_filter());
        let bare = ResourceSchema::new("authors", Url::parse("https://api.example.com/authors").unwrap());
        assert!(!bare.has_id_filter());
    }

    #[test]
    fn test_edit_method() {
        assert_eq!(books().edit_method(), Some(Method::PUT));
    }

    #[test]
    fn test_unknown_resource() {
        let doc = ApiDocumentation::new(Url::parse("https://api.example.com/").unwrap(), vec![books()]);
        assert!(doc.resource("books").is_ok());
        assert!(matches!(doc.resource("cars"), Err(ProviderError::UnknownResource(_))));
    }

    #[test]
    fn test_deserialize_documentation() {
        let json = r#"{
            "entrypoint": "https://api.example.com/",
            "resources": [{
                "name": "books",
                "url": "https://api.example.com/books",
                "fields": [{"name": "isbn", "range": "http://www.w3.org/2001/XMLSchema#string", "maxCardinality": 1}],
                "parameters": [{"variable": "title"}],
                "operations": [{"type": "edit", "method": "PATCH"}]
            }]
        }"#;
        let doc: ApiDocumentation = serde_json::from_str(json).unwrap();
        let books = doc.resource("books").unwrap();
        assert_eq!(books.fields[0].max_cardinality, Some(1));
        assert_eq!(books.edit_method(), Some(Method::PATCH));
        assert_eq!(books.fields[0].kind(), FieldKind::Text);
    }

    #[test]
    fn test_deserialized_field_is_classified() {
        let json = r#"{"name": "rating", "range": "http://www.w3.org/2001/XMLSchema#integer"}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind(), FieldKind::Integer);
        assert!(!field.required);

        let json = r#"{"name": "contact", "id": "http://schema.org/email"}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind(), FieldKind::Email);
    }

    #[test]
    fn test_field_kind_follows_builders() {
        let field = Field::new("published");
        assert_eq!(field.kind(), FieldKind::Text);
        let field = field.with_range("http://www.w3.org/2001/XMLSchema#dateTime");
        assert_eq!(field.kind(), FieldKind::DateTime);

        let field = Field::new("homepage").with_id("http://schema.org/url");
        assert_eq!(field.kind(), FieldKind::Url);
        assert_eq!(Field::new("id").kind(), FieldKind::Id);

        // In-place edits need an explicit reclassification.
        let mut field = Field::new("score");
        field.range = Some("http://www.w3.org/2001/XMLSchema#decimal".into());
        assert_eq!(field.kind(), FieldKind::Text);
        assert_eq!(field.reclassify().kind(), FieldKind::Float);
    }
}
