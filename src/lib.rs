//! hydra_provider: abstract CRUD data provider for JSON-LD/Hydra APIs.
//!
//! The crate is the translation layer between a generic list/read/create/
//! update/delete contract and a hypermedia API:
//!
//! - **query**: filter, sort and pagination encoding, request and body building
//! - **normalize**: JSON-LD documents to flat records, pagination metadata
//! - **cache**: documents seen while normalizing, keyed by IRI
//! - **mercure**: reference-counted realtime subscriptions over server-sent events
//! - **provider**: the [`DataProvider`] facade composing all of the above

pub mod core;

// Top-level re-exports for common usage
pub use crate::core::error::{ProviderError, Result, Violations};
pub use crate::core::types;
pub use crate::core::types::{
    CreateParams, DataValue, DeleteManyParams, DeleteParams, FilterSpec, GetListParams,
    GetManyParams, GetManyReferenceParams, GetOneParams, ListResult, PaginationInfo, Payload,
    RawFile, Record, SortOrder, UpdateManyParams, UpdateParams,
};

pub use crate::core::client;
pub use crate::core::client::{HydraClient, MercureConfig, ProviderConfig};
#[cfg(feature = "client")]
pub use crate::core::client::NativeNetwork;

pub use crate::core::cache::DocumentCache;
pub use crate::core::mercure::{MercureOptions, RecordCallback, SubscriptionManager};
pub use crate::core::protocol;
pub use crate::core::provider::{DataProvider, DataProviderBuilder};
pub use crate::core::schema;
pub use crate::core::traits::{FieldTransform, HydraNetwork, Introspector, StaticIntrospector};
