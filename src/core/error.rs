//! Error types for Hydra data provider operations.
//!
//! Every fallible operation in this crate returns [`Result`], which uses
//! [`ProviderError`] as its error type.
//!
//! # Error Categories
//!
//! | Category | Variants | Surfaced as |
//! |----------|----------|-------------|
//! | Transport | `Http`, `Transport` | Rejected operation with status and field violations |
//! | Schema | `UnknownResource`, `UnknownField` | Raised before any request is made |
//! | Shape | `MissingIdentifier`, `MissingMember` | Raised instead of an empty result |
//! | Realtime | `Realtime`, `SseParse` | Logged by the subscription manager |
//! | Configuration | `Config`, `Url` | Raised while building the provider |
//!
//! Nothing here is retried by the provider itself; a caller that wants retries
//! wraps the operation.
//!
//! # Examples
//!
//! ```
//! use hydra_provider::ProviderError;
//! use std::collections::BTreeMap;
//!
//! let mut violations = BTreeMap::new();
//! violations.insert("title".to_string(), "This value should not be blank.".to_string());
//!
//! let err = ProviderError::Http {
//!     status: 422,
//!     message: "title: This value should not be blank.".into(),
//!     violations,
//! };
//! assert!(err.is_violation());
//! assert_eq!(err.status(), Some(422));
//! ```

use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Flat `{propertyPath: message}` map extracted from a constraint violation list.
pub type Violations = BTreeMap<String, String>;

/// Errors that can occur while talking to a Hydra API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProviderError {
    /// The server answered with a non-2xx status.
    ///
    /// `violations` is empty unless the body was a constraint violation list.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        violations: Violations,
    },

    /// The request could not be sent or its body could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The resource is not part of the introspected documentation.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// The field is not declared on the resource.
    #[error("Unknown field '{field}' on resource '{resource}'")]
    UnknownField { resource: String, field: String },

    /// A document that must carry an identifier does not.
    #[error("Document has no identifier: {0}")]
    MissingIdentifier(String),

    /// A collection response has no member array.
    #[error("Collection response has no member array")]
    MissingMember,

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An IRI or hub address could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A field transform rejected its value.
    #[error("Transform of field '{field}' failed: {message}")]
    Transform { field: String, message: String },

    /// Realtime subscription failure.
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Malformed server-sent event stream.
    #[error("SSE parse error: {0}")]
    SseParse(String),

    /// Invalid provider configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        ProviderError::Config(format!("{:#}", err))
    }
}

impl ProviderError {
    /// HTTP status carried by the error, if any.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 4xx responses.
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// True when the server reported per-field constraint violations.
    #[inline]
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, ProviderError::Http { violations, .. } if !violations.is_empty())
    }

    /// The per-field violation map, empty for every other error.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            ProviderError::Http { violations, .. } => Some(violations),
            _ => None,
        }
    }

    /// True for errors caused by a protocol mismatch in the response shape.
    #[must_use]
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            ProviderError::MissingIdentifier(_) | ProviderError::MissingMember
        )
    }
}
