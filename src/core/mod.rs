//! Hydra data provider core.
//!
//! # Modules
//!
//! - [`client`] - Request execution, configuration, reqwest network
//! - [`protocol`] - Hydra vocabulary, `Link` parsing, SSE parsing, error bodies
//! - [`types`] - Records, payloads, operation parameters, requests and responses
//! - [`schema`] - Introspected resources, fields and field kinds
//! - [`query`] - Filter encoding and request building
//! - [`normalize`] - Document normalization and pagination
//! - [`cache`] - Document cache
//! - [`mercure`] - Realtime subscription manager
//! - [`provider`] - The data provider facade
//!
//! # Request Flow
//!
//! ```text
//! DataProvider ──► RequestBuilder (+ filters::encode, body::encode_body)
//!      │                 │
//!      │                 ▼
//!      │           HydraClient ──► HydraNetwork
//!      │                 │
//!      ▼                 ▼
//! SubscriptionManager ◄── Link: rel="mercure"      DocumentNormalizer ──► DocumentCache
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod mercure;
pub mod normalize;
pub mod protocol;
pub mod provider;
pub mod query;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::{ProviderError, Result};
pub use types::{HydraRequest, HydraResponse, Record};
