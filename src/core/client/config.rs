//! Configuration for the data provider.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `entrypoint` | (required) | API entrypoint; item IRIs resolve against it |
//! | `headers` | empty | Static headers sent with every request |
//! | `use_embedded` | false | Keep embedded documents inline in records |
//! | `request_timeout_ms` | 30000 | Per-request transport timeout |
//! | `enable_logging` | false | Log request/response traffic |
//! | `mercure` | `None` | Realtime settings; `None` disables realtime |
//!
//! # Examples
//!
//! ```
//! use hydra_provider::client::{MercureConfig, ProviderConfig};
//!
//! let config = ProviderConfig::new("https://api.example.com/")
//!     .unwrap()
//!     .with_header("X-Tenant", "acme")
//!     .with_mercure(MercureConfig::default().with_jwt("token"));
//! assert!(config.realtime_enabled());
//! assert_eq!(config.request_timeout_ms, 30000);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API entrypoint URL.
    pub entrypoint: Url,

    /// Headers added to every request, HTTP and realtime.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Keep embedded documents inline instead of replacing them by their IRI.
    #[serde(default)]
    pub use_embedded: bool,

    /// Request timeout in milliseconds, enforced by the transport.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Enable request logging.
    ///
    /// When enabled, logs request/response details using the `tracing` crate.
    #[serde(default)]
    pub enable_logging: bool,

    /// Mercure settings. Realtime is disabled when absent.
    #[serde(default)]
    pub mercure: Option<MercureConfig>,
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl ProviderConfig {
    pub fn new(entrypoint: &str) -> crate::core::error::Result<Self> {
        Ok(Self::from_url(Url::parse(entrypoint)?))
    }

    pub fn from_url(entrypoint: Url) -> Self {
        ProviderConfig {
            entrypoint,
            headers: BTreeMap::new(),
            use_embedded: false,
            request_timeout_ms: default_request_timeout_ms(),
            enable_logging: false,
            mercure: None,
        }
    }

    /// Read a JSON configuration file.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: ProviderConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config JSON")?;
        Ok(config)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_embedded(mut self, use_embedded: bool) -> Self {
        self.use_embedded = use_embedded;
        self
    }

    pub fn with_logging(mut self, enable_logging: bool) -> Self {
        self.enable_logging = enable_logging;
        self
    }

    pub fn with_mercure(mut self, mercure: MercureConfig) -> Self {
        self.mercure = Some(mercure);
        self
    }

    pub fn realtime_enabled(&self) -> bool {
        self.mercure.as_ref().is_some_and(|m| m.enabled)
    }
}

/// Mercure realtime settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MercureConfig {
    /// Hub URL. When absent it is discovered from the `Link` header of the
    /// first successful response.
    #[serde(default)]
    pub hub: Option<Url>,

    /// Subscriber JWT, sent as a bearer token.
    #[serde(default)]
    pub jwt: Option<String>,

    /// Cookie header value, for hubs that authorize through a cookie.
    #[serde(default)]
    pub cookie: Option<String>,

    /// Base the topic IRIs are resolved against. Defaults to the entrypoint.
    #[serde(default)]
    pub topic_url: Option<Url>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for MercureConfig {
    fn default() -> Self {
        MercureConfig {
            hub: None,
            jwt: None,
            cookie: None,
            topic_url: None,
            enabled: default_enabled(),
        }
    }
}

impl MercureConfig {
    pub fn with_hub(mut self, hub: Url) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn with_jwt(mut self, jwt: impl Into<String>) -> Self {
        self.jwt = Some(jwt.into());
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_topic_url(mut self, topic_url: Url) -> Self {
        self.topic_url = Some(topic_url);
        self
    }
}
