//! The data provider facade.
//!
//! [`DataProvider`] is the only entry point callers need: it resolves the
//! resource schema, builds the request, sends it, normalizes the answer and
//! keeps realtime subscriptions in sync with the discovered hub.
//!
//! # Examples
//!
//! ```no_run
//! use hydra_provider::{DataProvider, GetListParams, ProviderConfig, StaticIntrospector};
//! use hydra_provider::schema::ApiDocumentation;
//! use std::sync::Arc;
//!
//! # async fn run(documentation: ApiDocumentation) -> hydra_provider::Result<()> {
//! let config = ProviderConfig::new("https://api.example.com/")?;
//! let provider = DataProvider::builder(config)
//!     .introspector(Arc::new(StaticIntrospector::new(documentation)))
//!     .build()?;
//!
//! let books = provider
//!     .get_list("books", GetListParams::new().with_pagination(1, 30))
//!     .await?;
//! println!("{} books, {:?}", books.data.len(), books.pagination);
//! # Ok(())
//! # }
//! ```

mod get_many;

use crate::core::cache::DocumentCache;
use crate::core::client::{Fetched, HydraClient, MercureConfig, ProviderConfig};
use crate::core::error::{ProviderError, Result};
use crate::core::mercure::{Connector, MercureOptions, RecordCallback, SubscriptionManager};
use crate::core::normalize::{denormalize_record, DocumentNormalizer};
use crate::core::query::{encode_body, prepare_payload, RequestBuilder};
use crate::core::schema::{ApiDocumentation, ResourceSchema};
use crate::core::traits::{HydraNetwork, Introspector};
use crate::core::types::{
    CreateParams, DeleteManyParams, DeleteParams, GetListParams, GetManyParams,
    GetManyReferenceParams, GetOneParams, HydraRequest, ListResult, Record, UpdateManyParams,
    UpdateParams,
};
use futures::future::try_join_all;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Abstract CRUD operations over a Hydra API.
pub struct DataProvider {
    client: HydraClient,
    introspector: Arc<dyn Introspector>,
    documentation: tokio::sync::Mutex<Option<Arc<ApiDocumentation>>>,
    normalizer: DocumentNormalizer,
    subscriptions: Arc<SubscriptionManager>,
    hub_discovered: AtomicBool,
    realtime_warned: AtomicBool,
}

impl DataProvider {
    pub fn builder(config: ProviderConfig) -> DataProviderBuilder {
        DataProviderBuilder::new(config)
    }

    pub fn config(&self) -> &ProviderConfig {
        self.client.config()
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        self.normalizer.cache()
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionManager> {
        &self.subscriptions
    }

    /// API documentation, fetched once and memoized.
    pub async fn introspect(&self) -> Result<Arc<ApiDocumentation>> {
        let mut documentation = self.documentation.lock().await;
        if let Some(documentation) = documentation.as_ref() {
            return Ok(documentation.clone());
        }
        let fresh = Arc::new(self.introspector.introspect().await?);
        tracing::debug!(resources = fresh.resources.len(), "api documentation loaded");
        *documentation = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drop the memoized documentation and fetch it again.
    pub async fn reintrospect(&self) -> Result<Arc<ApiDocumentation>> {
        self.documentation.lock().await.take();
        self.introspect().await
    }

    pub async fn get_list(&self, resource: &str, params: GetListParams) -> Result<ListResult> {
        let documentation = self.introspect().await?;
        let schema = documentation.resource(resource)?;
        let request = self.request_builder(&documentation).get_list(resource, &params)?;
        let fetched = self.send(request).await?;
        let list = self.normalizer.normalize_collection(&fetched.document)?;
        self.denormalize_list(schema, list).await
    }

    pub async fn get_one(&self, resource: &str, params: GetOneParams) -> Result<Record> {
        let documentation = self.introspect().await?;
        let schema = documentation.resource(resource)?;
        let request = self.request_builder(&documentation).get_one(&params.id)?;
        let fetched = self.send(request).await?;
        let record = self.normalizer.normalize_item(&fetched.document)?;
        denormalize_record(schema, record).await
    }

    /// Records for `ids`, in the order of `ids`.
    pub async fn get_many(&self, resource: &str, params: GetManyParams) -> Result<Vec<Record>> {
        let documentation = self.introspect().await?;
        let schema = documentation.resource(resource)?;
        get_many::get_many(self, schema, &params.ids).await
    }

    pub async fn get_many_reference(&self, resource: &str, params: GetManyReferenceParams) -> Result<ListResult> {
        let documentation = self.introspect().await?;
        let schema = documentation.resource(resource)?;
        if schema.field(&params.target).is_none() && !schema.has_parameter(&params.target) {
            return Err(ProviderError::UnknownField {
                resource: resource.to_string(),
                field: params.target,
            });
        }
        let request = self
            .request_builder(&documentation)
            .get_many_reference(resource, &params)?;
        let fetched = self.send(request).await?;
        let list = self.normalizer.normalize_collection(&fetched.document)?;
        self.denormalize_list(schema, list).await
    }

    pub async fn create(&self, resource: &str, params: CreateParams) -> Result<Record> {
        let documentation = self.introspect().await?;
        let schema = documentation.resource(resource)?;
        let payload = prepare_payload(schema, params.data).await?;
        let body = encode_body(&payload, params.has_file_field)?;
        let request = self.request_builder(&documentation).create(resource, body)?;
        let fetched = self.send(request).await?;
        let record = self.normalizer.normalize_item(&fetched.document)?;
        denormalize_record(schema, record).await
    }

    pub async fn update(&self, resource: &str, params: UpdateParams) -> Result<Record> {
        let documentation = self.introspect().await?;
        let schema = documentation.resource(resource)?;
        let payload = prepare_payload(schema, params.data).await?;
        let body = encode_body(&payload, params.has_file_field)?;
        let request = self
            .request_builder(&documentation)
            .update(resource, &params.id, body)?;
        let fetched = self.send(request).await?;
        let record = self.normalizer.normalize_item(&fetched.document)?;
        denormalize_record(schema, record).await
    }

    /// Apply the same change to every id concurrently. Returns the updated ids
    /// in request order.
    pub async fn update_many(&self, resource: &str, params: UpdateManyParams) -> Result<Vec<String>> {
        let updates = params.ids.iter().map(|id| {
            self.update(resource, UpdateParams::new(id.clone(), params.data.clone()))
        });
        let records = try_join_all(updates).await?;
        Ok(records.into_iter().map(|r| r.id().to_string()).collect())
    }

    /// Returns the previous record when the caller supplied it, otherwise a
    /// record carrying only the id.
    pub async fn delete(&self, resource: &str, params: DeleteParams) -> Result<Record> {
        let documentation = self.introspect().await?;
        documentation.resource(resource)?;
        let request = self.request_builder(&documentation).delete(&params.id)?;
        self.send(request).await?;
        match params.previous_data {
            Some(previous) => Ok(previous),
            None => Record::from_id(params.id),
        }
    }

    pub async fn delete_many(&self, resource: &str, params: DeleteManyParams) -> Result<Vec<String>> {
        let deletes = params
            .ids
            .iter()
            .map(|id| self.delete(resource, DeleteParams::new(id.clone())));
        try_join_all(deletes).await?;
        Ok(params.ids)
    }

    /// Watch resources for pushed updates. Without realtime configuration
    /// this only logs a warning, once.
    pub fn subscribe(&self, resource_ids: &[String], callback: RecordCallback) -> Result<()> {
        if self.realtime().is_none() {
            return Ok(());
        }
        for id in resource_ids {
            self.subscriptions.subscribe(id, callback.clone())?;
        }
        Ok(())
    }

    pub fn unsubscribe(&self, resource_ids: &[String]) -> Result<()> {
        if self.realtime().is_none() {
            return Ok(());
        }
        for id in resource_ids {
            self.subscriptions.unsubscribe(id);
        }
        Ok(())
    }

    /// Point the subscription table at a new hub and topic base. Existing subscriptions are kept.
    pub fn reconfigure_hub(&self, options: MercureOptions) -> Result<()> {
        self.hub_discovered.store(true, Ordering::SeqCst);
        self.subscriptions.set_hub(options)
    }

    fn realtime(&self) -> Option<&MercureConfig> {
        match self.config().mercure.as_ref().filter(|m| m.enabled) {
            Some(mercure) => Some(mercure),
            None => {
                if !self.realtime_warned.swap(true, Ordering::SeqCst) {
                    tracing::warn!("realtime is not configured; subscribe and unsubscribe are disabled");
                }
                None
            }
        }
    }

    fn topic_url(&self, mercure: &MercureConfig) -> Url {
        mercure
            .topic_url
            .clone()
            .unwrap_or_else(|| self.config().entrypoint.clone())
    }

    fn request_builder<'a>(&'a self, documentation: &'a ApiDocumentation) -> RequestBuilder<'a> {
        RequestBuilder::new(documentation, &self.config().headers)
    }

    async fn send(&self, request: HydraRequest) -> Result<Fetched> {
        let url = request.url.clone();
        let fetched = self.client.fetch(request).await?;
        self.discover_hub(&fetched, &url);
        Ok(fetched)
    }

    /// Bind pending subscriptions to the hub advertised by the first
    /// successful response.
    fn discover_hub(&self, fetched: &Fetched, url: &Url) {
        let Some(mercure) = self.config().mercure.as_ref().filter(|m| m.enabled) else {
            return;
        };
        if self.hub_discovered.load(Ordering::SeqCst) {
            return;
        }
        let Some(hub) = fetched.mercure_hub(url) else {
            return;
        };
        if self.hub_discovered.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!(hub = %hub, "mercure hub discovered");
        let options = mercure_options(hub, self.topic_url(mercure), mercure);
        if let Err(e) = self.subscriptions.set_hub(options) {
            tracing::warn!("could not bind subscriptions to discovered hub: {}", e);
        }
    }

    async fn denormalize_list(&self, schema: &ResourceSchema, list: ListResult) -> Result<ListResult> {
        let data = try_join_all(
            list.data
                .into_iter()
                .map(|record| denormalize_record(schema, record)),
        )
        .await?;
        Ok(ListResult {
            data,
            pagination: list.pagination,
        })
    }
}

impl std::fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProvider")
            .field("client", &self.client)
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}

fn mercure_options(hub: Url, topic_url: Url, mercure: &MercureConfig) -> MercureOptions {
    MercureOptions {
        hub,
        topic_url,
        jwt: mercure.jwt.clone(),
        cookie: mercure.cookie.clone(),
    }
}

/// Builder for [`DataProvider`].
///
/// Passing the cache and subscription manager of a previous provider keeps
/// them alive across a configuration reload.
pub struct DataProviderBuilder {
    config: ProviderConfig,
    introspector: Option<Arc<dyn Introspector>>,
    network: Option<Arc<dyn HydraNetwork>>,
    cache: Option<Arc<DocumentCache>>,
    subscriptions: Option<Arc<SubscriptionManager>>,
}

impl DataProviderBuilder {
    pub fn new(config: ProviderConfig) -> Self {
        DataProviderBuilder {
            config,
            introspector: None,
            network: None,
            cache: None,
            subscriptions: None,
        }
    }

    /// Start from a JSON configuration file.
    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = ProviderConfig::load(path).await?;
        Ok(Self::new(config))
    }

    pub fn introspector(mut self, introspector: Arc<dyn Introspector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    pub fn network(mut self, network: Arc<dyn HydraNetwork>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn cache(mut self, cache: Arc<DocumentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn subscriptions(mut self, subscriptions: Arc<SubscriptionManager>) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }

    pub fn build(self) -> Result<DataProvider> {
        let introspector = self
            .introspector
            .ok_or_else(|| ProviderError::Config("an introspector is required".into()))?;

        let client = match self.network {
            Some(network) => HydraClient::with_network(network, self.config),
            None => default_client(self.config)?,
        };

        let cache = self.cache.unwrap_or_default();
        let normalizer = DocumentNormalizer::new(cache).with_embedded(client.config().use_embedded);
        let subscriptions = self.subscriptions.unwrap_or_default();

        let mut hub_discovered = false;
        if let Some(mercure) = client.config().mercure.as_ref().filter(|m| m.enabled) {
            subscriptions.attach(Connector {
                client: client.clone(),
                normalizer: normalizer.clone(),
            })?;
            if let Some(hub) = &mercure.hub {
                let topic_url = mercure
                    .topic_url
                    .clone()
                    .unwrap_or_else(|| client.config().entrypoint.clone());
                subscriptions.set_hub(mercure_options(hub.clone(), topic_url, mercure))?;
                hub_discovered = true;
            }
        }

        Ok(DataProvider {
            client,
            introspector,
            documentation: tokio::sync::Mutex::new(None),
            normalizer,
            subscriptions,
            hub_discovered: AtomicBool::new(hub_discovered),
            realtime_warned: AtomicBool::new(false),
        })
    }
}

#[cfg(feature = "client")]
fn default_client(config: ProviderConfig) -> Result<HydraClient> {
    HydraClient::new(config)
}

#[cfg(not(feature = "client"))]
fn default_client(_config: ProviderConfig) -> Result<HydraClient> {
    Err(ProviderError::Config(
        "no network given and the `client` feature is disabled".into(),
    ))
}
