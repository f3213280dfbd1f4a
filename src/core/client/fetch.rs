//! HTTP execution for the provider.
//!
//! [`HydraClient`] sends built requests through a [`HydraNetwork`], turns
//! non-2xx answers into [`ProviderError::Http`](crate::ProviderError::Http)
//! and reports the Mercure hub advertised by the server.

#[cfg(feature = "client")]
use crate::core::client::native_network::NativeNetwork;
use crate::core::client::{config::ProviderConfig, EventStream};
use crate::core::error::Result;
use crate::core::protocol::{self, headers};
use crate::core::traits::HydraNetwork;
use crate::core::types::{HydraRequest, HydraResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// A successful response with its parsed body.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub response: HydraResponse,
    /// `Value::Null` for empty bodies.
    pub document: Value,
}

impl Fetched {
    /// Mercure hub advertised in the `Link` header, resolved against the
    /// request URL.
    pub fn mercure_hub(&self, base: &Url) -> Option<Url> {
        let link = self.response.header(headers::LINK)?;
        let hub = protocol::parse_mercure_hub(link)?;
        base.join(&hub).ok()
    }
}

/// Executes requests against a Hydra API.
#[derive(Clone)]
pub struct HydraClient {
    network: Arc<dyn HydraNetwork>,
    config: Arc<ProviderConfig>,
}

impl HydraClient {
    /// Client on the reqwest network, with the configured request timeout.
    #[cfg(feature = "client")]
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| crate::core::error::ProviderError::Config(e.to_string()))?;
        Ok(Self::with_network(Arc::new(NativeNetwork::new(client)), config))
    }

    pub fn with_network(network: Arc<dyn HydraNetwork>, config: ProviderConfig) -> Self {
        HydraClient {
            network,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn network(&self) -> &Arc<dyn HydraNetwork> {
        &self.network
    }

    /// Send a request; non-2xx statuses become errors.
    pub async fn fetch(&self, request: HydraRequest) -> Result<Fetched> {
        if self.config.enable_logging {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                multipart = request.body.is_multipart(),
                "sending request"
            );
        }

        let response = self.network.fetch(request).await?;

        if self.config.enable_logging {
            tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        }

        if !response.is_success() {
            let err = protocol::error_from_response(&response);
            if self.config.enable_logging {
                tracing::debug!("request failed: {}", err);
            }
            return Err(err);
        }

        let document = response.json_body()?;
        Ok(Fetched { response, document })
    }

    /// Open a server-sent events stream.
    pub async fn subscribe(&self, url: &Url, headers: &BTreeMap<String, String>) -> Result<EventStream> {
        if self.config.enable_logging {
            tracing::debug!(url = %url, "opening event stream");
        }
        let receiver = self.network.subscribe(url, headers).await?;
        Ok(EventStream::new(receiver))
    }
}

impl std::fmt::Debug for HydraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydraClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
