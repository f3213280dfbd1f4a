//! HTTP request construction for each CRUD operation.

use crate::core::error::Result;
use crate::core::protocol::{headers, media_types};
use crate::core::query::filters::{apply_query, encode};
use crate::core::schema::ApiDocumentation;
use crate::core::types::{GetListParams, GetManyReferenceParams, HydraRequest, RequestBody};
use http::Method;
use std::collections::BTreeMap;
use url::Url;

/// Builds requests against one introspected API.
///
/// Item requests target the item IRI itself, resolved against the
/// entrypoint; collection requests target the collection URL.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    documentation: &'a ApiDocumentation,
    default_headers: &'a BTreeMap<String, String>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(documentation: &'a ApiDocumentation, default_headers: &'a BTreeMap<String, String>) -> Self {
        Self {
            documentation,
            default_headers,
        }
    }

    /// Absolute URL of an item identifier.
    pub fn item_url(&self, id: &str) -> Result<Url> {
        Ok(self.documentation.entrypoint.join(id)?)
    }

    fn request(&self, method: Method, url: Url) -> HydraRequest {
        HydraRequest::new(method, url)
            .with_headers(self.default_headers)
            .with_header(headers::ACCEPT, media_types::JSON_LD)
    }

    pub fn get_list(&self, resource: &str, params: &GetListParams) -> Result<HydraRequest> {
        let schema = self.documentation.resource(resource)?;
        let pairs = encode(
            &params.filter,
            params.sort.as_ref(),
            params.pagination.as_ref(),
        );
        Ok(self.request(Method::GET, apply_query(&schema.url, &pairs)))
    }

    /// List filtered by the reference field; the reference filter goes last.
    pub fn get_many_reference(&self, resource: &str, params: &GetManyReferenceParams) -> Result<HydraRequest> {
        let schema = self.documentation.resource(resource)?;
        let mut filter = params.filter.clone();
        filter.push_last(params.target.clone(), params.id.clone());
        let pairs = encode(&filter, params.sort.as_ref(), params.pagination.as_ref());
        Ok(self.request(Method::GET, apply_query(&schema.url, &pairs)))
    }

    pub fn get_one(&self, id: &str) -> Result<HydraRequest> {
        Ok(self.request(Method::GET, self.item_url(id)?))
    }

    pub fn create(&self, resource: &str, body: RequestBody) -> Result<HydraRequest> {
        let schema = self.documentation.resource(resource)?;
        let request = self.request(Method::POST, schema.url.clone());
        Ok(with_body(request, body, None))
    }

    /// Multipart updates go out as POST. Otherwise the edit operation's
    /// declared verb is used, PATCH when none is declared.
    pub fn update(&self, resource: &str, id: &str, body: RequestBody) -> Result<HydraRequest> {
        let schema = self.documentation.resource(resource)?;
        let method = if body.is_multipart() {
            Method::POST
        } else {
            schema.edit_method().unwrap_or(Method::PATCH)
        };
        let request = self.request(method, self.item_url(id)?);
        let json_type = (request.method == Method::PATCH).then_some(media_types::MERGE_PATCH);
        Ok(with_body(request, body, json_type))
    }

    pub fn delete(&self, id: &str) -> Result<HydraRequest> {
        Ok(self.request(Method::DELETE, self.item_url(id)?))
    }
}

/// Attach `body`. JSON bodies get `json_type`, or JSON-LD by default;
/// multipart bodies leave the content type to the transport.
fn with_body(request: HydraRequest, body: RequestBody, json_type: Option<&str>) -> HydraRequest {
    match body {
        RequestBody::Json(_) => request
            .with_header(headers::CONTENT_TYPE, json_type.unwrap_or(media_types::JSON_LD))
            .with_body(body),
        _ => request.with_body(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Operation, OperationKind, ResourceSchema};
    use crate::core::types::{FilterSpec, FormPart, SortOrder};
    use crate::ProviderError;

    fn docs() -> ApiDocumentation {
        let entrypoint = Url::parse("https://api.example.com/").unwrap();
        let books = ResourceSchema::new("books", entrypoint.join("/books").unwrap());
        let reviews = ResourceSchema::new("reviews", entrypoint.join("/reviews").unwrap())
            .with_operation(Operation::new(OperationKind::Edit, "PUT"));
        ApiDocumentation::new(entrypoint, vec![books, reviews])
    }

    fn no_headers() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_get_list_url() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let params = GetListParams::new()
            .with_pagination(1, 10)
            .with_sort("title", SortOrder::Asc)
            .with_filter(FilterSpec::new().with("author", "/authors/1"));
        let request = builder.get_list("books", &params).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.path(), "/books");
        assert_eq!(
            request.query_pairs(),
            vec![
                ("order[title]".to_string(), "ASC".to_string()),
                ("page".to_string(), "1".to_string()),
                ("itemsPerPage".to_string(), "10".to_string()),
                ("author".to_string(), "/authors/1".to_string()),
            ]
        );
        assert_eq!(request.header("Accept"), Some("application/ld+json"));
    }

    #[test]
    fn test_many_reference_filter_is_last() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let params = GetManyReferenceParams::new("book", "/books/1")
            .with_filter(FilterSpec::new().with("book", "stale").with("rating", 5));
        let request = builder.get_many_reference("reviews", &params).unwrap();
        let pairs = request.query_pairs();
        assert_eq!(pairs.last().unwrap(), &("book".to_string(), "/books/1".to_string()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_item_url_uses_identifier_verbatim() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let request = builder.get_one("/books/abc-1?locale=fr").unwrap();
        assert_eq!(request.url.as_str(), "https://api.example.com/books/abc-1?locale=fr");

        let absolute = builder.delete("https://other.example.com/things/9").unwrap();
        assert_eq!(absolute.url.as_str(), "https://other.example.com/things/9");
        assert_eq!(absolute.method, Method::DELETE);
    }

    #[test]
    fn test_update_defaults_to_merge_patch() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let request = builder
            .update("books", "/books/1", RequestBody::Json("{}".into()))
            .unwrap();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.header("content-type"), Some("application/merge-patch+json"));
    }

    #[test]
    fn test_update_uses_declared_verb() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let request = builder
            .update("reviews", "/reviews/1", RequestBody::Json("{}".into()))
            .unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.header("content-type"), Some("application/ld+json"));
    }

    #[test]
    fn test_multipart_update_is_post_without_content_type() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let body = RequestBody::Multipart(vec![FormPart::text("title", "Dune")]);
        let request = builder.update("reviews", "/reviews/1", body).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/reviews/1");
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn test_default_headers_are_sent() {
        let docs = docs();
        let mut headers = no_headers();
        headers.insert("X-Tenant".to_string(), "acme".to_string());
        let builder = RequestBuilder::new(&docs, &headers);
        let request = builder.get_one("/books/1").unwrap();
        assert_eq!(request.header("x-tenant"), Some("acme"));
    }

    #[test]
    fn test_unknown_resource_is_an_error() {
        let docs = docs();
        let headers = no_headers();
        let builder = RequestBuilder::new(&docs, &headers);
        let err = builder.get_list("cars", &GetListParams::new()).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }
}
