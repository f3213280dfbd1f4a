//! Request side of the translation layer: query encoding, body encoding and
//! request building.

pub mod body;
pub mod builder;
pub mod filters;

pub use body::{coerce, encode_body, needs_multipart, prepare_payload};
pub use builder::RequestBuilder;
pub use filters::{apply_query, encode, QueryPairs};
