use crate::core::error::Result;
use crate::core::protocol::SseEvent;
use crate::core::schema::ApiDocumentation;
use crate::core::types::{DataValue, HydraRequest, HydraResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Abstraction for network operations.
#[async_trait]
pub trait HydraNetwork: Send + Sync + 'static {
    /// Perform one HTTP request. Non-2xx statuses are returned, not raised.
    async fn fetch(&self, request: HydraRequest) -> Result<HydraResponse>;

    /// Open a server-sent events stream. The stream closes when the
    /// receiver is dropped.
    async fn subscribe(
        &self,
        url: &Url,
        headers: &BTreeMap<String, String>,
    ) -> Result<async_channel::Receiver<Result<SseEvent>>>;
}

/// Source of the API documentation (an external Hydra documentation parser).
#[async_trait]
pub trait Introspector: Send + Sync + 'static {
    async fn introspect(&self) -> Result<ApiDocumentation>;
}

/// Per-field value transform.
///
/// `normalize` runs on outgoing create/update payloads, `denormalize` on
/// values of records returned by read operations.
#[async_trait]
pub trait FieldTransform: Send + Sync + 'static {
    async fn normalize(&self, value: DataValue) -> Result<DataValue> {
        Ok(value)
    }

    async fn denormalize(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

/// Introspector serving documentation that is already known.
#[derive(Clone, Debug)]
pub struct StaticIntrospector {
    documentation: ApiDocumentation,
}

impl StaticIntrospector {
    pub fn new(documentation: ApiDocumentation) -> Self {
        Self { documentation }
    }
}

#[async_trait]
impl Introspector for StaticIntrospector {
    async fn introspect(&self) -> Result<ApiDocumentation> {
        Ok(self.documentation.clone())
    }
}
