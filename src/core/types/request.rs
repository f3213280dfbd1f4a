//! Outgoing HTTP request produced by the request builder.

use crate::core::types::RawFile;
use http::Method;
use std::collections::BTreeMap;
use url::Url;

/// One entry of a multipart form body.
#[derive(Clone, Debug, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// Value of a multipart entry.
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Text(String),
    File(RawFile),
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, file: RawFile) -> Self {
        FormPart {
            name: name.into(),
            value: FormValue::File(file),
        }
    }
}

/// Request body.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized JSON document.
    Json(String),
    /// Multipart form entries, in append order.
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    #[inline]
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }

    pub fn as_json(&self) -> Option<&str> {
        match self {
            RequestBody::Json(s) => Some(s),
            _ => None,
        }
    }

    pub fn parts(&self) -> &[FormPart] {
        match self {
            RequestBody::Multipart(parts) => parts,
            _ => &[],
        }
    }
}

/// A fully built request: target, verb, headers, body.
#[derive(Clone, Debug, PartialEq)]
pub struct HydraRequest {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
}

impl HydraRequest {
    #[inline]
    pub fn new(method: Method, url: Url) -> Self {
        HydraRequest {
            method,
            url,
            headers: BTreeMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Header names are stored lower-cased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers<'a, I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (k, v) in headers {
            self.headers.insert(k.to_ascii_lowercase(), v.clone());
        }
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Query pairs in wire order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let req = HydraRequest::get(Url::parse("https://api.example.com/books").unwrap())
            .with_header("Content-Type", "application/ld+json");
        assert_eq!(req.header("content-type"), Some("application/ld+json"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("application/ld+json"));
    }

    #[test]
    fn test_query_pairs_keep_order() {
        let url = Url::parse("https://api.example.com/books?order%5Btitle%5D=ASC&page=2").unwrap();
        let req = HydraRequest::get(url);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("order[title]".to_string(), "ASC".to_string()),
                ("page".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_body_accessors() {
        let body = RequestBody::Multipart(vec![FormPart::text("title", "Dune")]);
        assert!(body.is_multipart());
        assert_eq!(body.parts().len(), 1);
        assert!(body.as_json().is_none());
        assert!(RequestBody::default().is_empty());
    }
}
