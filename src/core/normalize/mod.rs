//! Response side of the translation layer.
//!
//! Turns JSON-LD documents into flat [`Record`]s:
//!
//! - `id` becomes the document IRI, a prior `id` property is kept as `originId`
//! - embedded documents are replaced by their IRI (unless embedded mode is
//!   on) and stored in the [`DocumentCache`]
//! - collections yield their members plus [`PaginationInfo`](crate::core::types::PaginationInfo)
//!
//! Input documents are only borrowed, never modified.

mod pagination;

pub use pagination::resolve_pagination;

use crate::core::cache::DocumentCache;
use crate::core::error::{ProviderError, Result};
use crate::core::protocol::hydra::{document_id, unprefixed, MEMBER};
use crate::core::schema::ResourceSchema;
use crate::core::types::{ListResult, Record};
use futures::future::try_join_all;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Converts documents to records, filling the shared cache.
#[derive(Debug, Clone)]
pub struct DocumentNormalizer {
    cache: Arc<DocumentCache>,
    use_embedded: bool,
}

impl DocumentNormalizer {
    pub fn new(cache: Arc<DocumentCache>) -> Self {
        Self {
            cache,
            use_embedded: false,
        }
    }

    /// Keep embedded documents inline instead of replacing them by their IRI.
    pub fn with_embedded(mut self, use_embedded: bool) -> Self {
        self.use_embedded = use_embedded;
        self
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    /// Normalize a single document and cache the result.
    pub fn normalize_item(&self, document: &Value) -> Result<Record> {
        let object = document
            .as_object()
            .ok_or_else(|| ProviderError::MissingIdentifier(document.to_string()))?;
        let record = self.to_record(object)?;
        self.cache.put(record.clone());
        Ok(record)
    }

    /// Normalize a collection document.
    pub fn normalize_collection(&self, document: &Value) -> Result<ListResult> {
        let object = document
            .as_object()
            .map(unprefixed)
            .ok_or(ProviderError::MissingMember)?;
        let members = object
            .get(MEMBER)
            .and_then(Value::as_array)
            .ok_or(ProviderError::MissingMember)?;

        let data = members
            .iter()
            .map(|member| self.normalize_item(member))
            .collect::<Result<Vec<_>>>()?;

        Ok(ListResult {
            data,
            pagination: resolve_pagination(&object),
        })
    }

    fn to_record(&self, object: &Map<String, Value>) -> Result<Record> {
        let iri = document_id(object)
            .ok_or_else(|| ProviderError::MissingIdentifier(Value::Object(object.clone()).to_string()))?;

        // A record normalized earlier already has `id == @id`; keep its originId.
        let origin_id = match object.get("id") {
            Some(Value::String(id)) if id == iri => object.get("originId").cloned(),
            Some(id) => Some(id.clone()),
            None => object.get("originId").cloned(),
        };

        let mut fields = Map::with_capacity(object.len());
        for (key, value) in object {
            if key == "id" || key == "originId" {
                continue;
            }
            fields.insert(key.clone(), self.flatten(value)?);
        }

        Record::new(iri, origin_id, fields)
    }

    fn flatten(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Object(object) => match document_id(object) {
                Some(iri) => {
                    let record = self.to_record(object)?;
                    self.cache.put(record);
                    if self.use_embedded {
                        Ok(value.clone())
                    } else {
                        Ok(Value::String(iri.to_string()))
                    }
                }
                None => {
                    let mut out = Map::with_capacity(object.len());
                    for (key, inner) in object {
                        out.insert(key.clone(), self.flatten(inner)?);
                    }
                    Ok(Value::Object(out))
                }
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.flatten(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }
}

/// Apply every field's `denormalize` transform to a record read from the API.
pub async fn denormalize_record(schema: &ResourceSchema, mut record: Record) -> Result<Record> {
    let inputs: Vec<_> = schema
        .fields
        .iter()
        .filter(|field| field.transform.is_some())
        .filter_map(|field| Some((field, record.fields().get(&field.name)?.clone())))
        .collect();

    let jobs = inputs.into_iter().map(|(field, value)| async move {
        let value = match &field.transform {
            Some(transform) => transform.denormalize(value).await.map_err(|e| {
                ProviderError::Transform {
                    field: field.name.clone(),
                    message: e.to_string(),
                }
            })?,
            None => value,
        };
        Ok::<_, ProviderError>((field.name.as_str(), value))
    });

    for (name, value) in try_join_all(jobs).await? {
        if let Some(slot) = record.fields_mut().get_mut(name) {
            *slot = value;
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Field;
    use crate::core::traits::FieldTransform;
    use crate::core::types::PaginationInfo;
    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    fn normalizer() -> DocumentNormalizer {
        DocumentNormalizer::new(Arc::new(DocumentCache::new()))
    }

    fn book() -> Value {
        json!({
            "@id": "/books/1",
            "@type": "Book",
            "id": 1,
            "title": "Dune",
            "author": {"@id": "/authors/7", "@type": "Person", "id": 7, "name": "Frank Herbert"},
            "reviews": [
                {"@id": "/reviews/1", "rating": 5},
                {"@id": "/reviews/2", "rating": 4}
            ],
            "dimensions": {"width": 10, "publisher": {"@id": "/publishers/1", "name": "Chilton"}}
        })
    }

    #[test]
    fn test_item_identifiers() {
        let record = normalizer().normalize_item(&book()).unwrap();
        assert_eq!(record.id(), "/books/1");
        assert_eq!(record.origin_id(), Some(&json!(1)));
        assert_eq!(record.get("@type"), Some(&json!("Book")));
    }

    #[test]
    fn test_embedded_documents_become_iris_and_are_cached() {
        let normalizer = normalizer();
        let record = normalizer.normalize_item(&book()).unwrap();
        assert_eq!(record.get("author"), Some(&json!("/authors/7")));
        assert_eq!(record.get("reviews"), Some(&json!(["/reviews/1", "/reviews/2"])));
        assert_eq!(
            record.get("dimensions"),
            Some(&json!({"width": 10, "publisher": "/publishers/1"}))
        );

        let cache = normalizer.cache();
        let author = cache.get("/authors/7").unwrap();
        assert_eq!(author.get("name"), Some(&json!("Frank Herbert")));
        assert_eq!(author.origin_id(), Some(&json!(7)));
        assert!(cache.contains("/reviews/2"));
        assert!(cache.contains("/publishers/1"));
    }

    #[test]
    fn test_embedded_mode_keeps_documents() {
        let normalizer = normalizer().with_embedded(true);
        let record = normalizer.normalize_item(&book()).unwrap();
        assert_eq!(record.get("author").unwrap()["name"], json!("Frank Herbert"));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let document = book();
        let before = document.clone();
        normalizer().normalize_item(&document).unwrap();
        assert_eq!(document, before);
    }

    #[test]
    fn test_idempotent_on_flat_records() {
        let normalizer = normalizer();
        let once = normalizer.normalize_item(&book()).unwrap();
        let twice = normalizer.normalize_item(&once.to_value()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_identifier() {
        let err = normalizer().normalize_item(&json!({"title": "Dune"})).unwrap_err();
        assert!(matches!(err, ProviderError::MissingIdentifier(_)));
        let err = normalizer().normalize_item(&json!(["/books/1"])).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_collection_with_prefixed_keys() {
        let collection = json!({
            "@id": "/books",
            "hydra:member": [book(), {"@id": "/books/2", "title": "Emma"}],
            "hydra:totalItems": 2
        });
        let list = normalizer().normalize_collection(&collection).unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[1].id(), "/books/2");
        assert_eq!(list.pagination, PaginationInfo::Total(2));
    }

    #[test]
    fn test_collection_without_member() {
        let err = normalizer()
            .normalize_collection(&json!({"@id": "/books", "items": []}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingMember));
    }

    struct Cents;

    #[async_trait]
    impl FieldTransform for Cents {
        async fn denormalize(&self, value: Value) -> Result<Value> {
            Ok(match value.as_i64() {
                Some(cents) => json!(cents as f64 / 100.0),
                None => value,
            })
        }
    }

    #[tokio::test]
    async fn test_denormalize_record() {
        let schema = ResourceSchema::new("books", Url::parse("https://api.example.com/books").unwrap())
            .with_field(Field::new("price").with_transform(Arc::new(Cents)))
            .with_field(Field::new("discount").with_transform(Arc::new(Cents)));
        let record = normalizer()
            .normalize_item(&json!({"@id": "/books/1", "price": 1250}))
            .unwrap();
        let record = denormalize_record(&schema, record).await.unwrap();
        assert_eq!(record.get("price"), Some(&json!(12.5)));
        assert_eq!(record.get("discount"), None);
    }
}
