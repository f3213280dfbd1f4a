//! HTTP client side of the provider.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── config         - ProviderConfig and MercureConfig
//! ├── fetch          - HydraClient: request execution and error mapping
//! ├── native_network - reqwest implementation of HydraNetwork
//! └── subscription   - EventStream over a hub connection
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HydraClient`] | Executes requests, maps error bodies |
//! | [`ProviderConfig`] | Entrypoint, headers, logging, realtime settings |
//! | [`EventStream`] | Server-sent events from the Mercure hub |

mod config;
mod fetch;
#[cfg(feature = "client")]
pub mod native_network;
mod subscription;

pub use config::{MercureConfig, ProviderConfig};
pub use fetch::{Fetched, HydraClient};
#[cfg(feature = "client")]
pub use native_network::NativeNetwork;
pub use subscription::EventStream;
