//! Mercure subscription management.
//!
//! One [`SubscriptionManager`] holds the hub settings and a table of live
//! subscriptions keyed by resource IRI. Each entry is reference counted:
//! every `subscribe` for the same IRI shares one hub connection, and the
//! connection closes when the last subscriber leaves.
//!
//! ```text
//!   subscribe (hub unknown)         set_hub / attach
//!  ─────────────────────────► Unbound ───────────────► Bound
//!                                │                       │
//!                                └──── unsubscribe ──────┴──► removed (count = 0)
//! ```
//!
//! Pushed documents go through the same [`DocumentNormalizer`] as HTTP
//! responses before reaching the subscriber's callback.

use crate::core::client::HydraClient;
use crate::core::error::{ProviderError, Result};
use crate::core::normalize::DocumentNormalizer;
use crate::core::protocol::{headers, media_types, params, SseEvent};
use crate::core::types::Record;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Receives every record pushed for a subscribed resource.
pub type RecordCallback = Arc<dyn Fn(Record) + Send + Sync>;

/// Where and how to reach the hub.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MercureOptions {
    pub hub: Url,
    /// Base topic IRIs are resolved against.
    pub topic_url: Url,
    pub jwt: Option<String>,
    pub cookie: Option<String>,
}

impl MercureOptions {
    pub fn new(hub: Url, topic_url: Url) -> Self {
        MercureOptions {
            hub,
            topic_url,
            jwt: None,
            cookie: None,
        }
    }

    /// Topic for a resource: the IRI resolved against `topic_url`.
    pub fn topic_for(&self, resource_id: &str) -> Result<String> {
        Ok(self.topic_url.join(resource_id)?.to_string())
    }

    /// Hub URL with the `topic` query parameter.
    pub fn subscribe_url(&self, topic: &str) -> Url {
        let mut url = self.hub.clone();
        url.query_pairs_mut().append_pair(params::TOPIC, topic);
        url
    }

    fn request_headers(&self, defaults: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut out: BTreeMap<String, String> = defaults
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        out.insert(headers::ACCEPT.to_string(), media_types::EVENT_STREAM.to_string());
        if let Some(jwt) = &self.jwt {
            out.insert(headers::AUTHORIZATION.to_string(), format!("Bearer {}", jwt));
        }
        if let Some(cookie) = &self.cookie {
            out.insert(headers::COOKIE.to_string(), cookie.clone());
        }
        out
    }
}

/// Network access used to open hub connections.
#[derive(Clone, Debug)]
pub struct Connector {
    pub client: HydraClient,
    pub normalizer: DocumentNormalizer,
}

enum Connection {
    Unbound,
    Bound(JoinHandle<()>),
}

struct Subscription {
    callback: RecordCallback,
    count: usize,
    connection: Connection,
}

#[derive(Default)]
struct State {
    hub: Option<MercureOptions>,
    connector: Option<Connector>,
    subscriptions: HashMap<String, Subscription>,
}

/// Reference-counted registry of hub subscriptions.
#[derive(Default)]
pub struct SubscriptionManager {
    state: Mutex<State>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the client used for new connections. Existing entries are kept.
    pub fn attach(&self, connector: Connector) -> Result<()> {
        let mut state = self.state.lock();
        state.connector = Some(connector);
        bind_unbound(&mut state)
    }

    /// Set the hub. Unbound entries connect now; bound entries reconnect
    /// only if the hub or the topic base changed.
    pub fn set_hub(&self, options: MercureOptions) -> Result<()> {
        let mut state = self.state.lock();
        let target_changed = state
            .hub
            .as_ref()
            .map_or(true, |h| h.hub != options.hub || h.topic_url != options.topic_url);
        tracing::debug!(hub = %options.hub, topic_url = %options.topic_url, "mercure hub set");
        state.hub = Some(options);

        if target_changed {
            for subscription in state.subscriptions.values_mut() {
                if let Connection::Bound(handle) =
                    std::mem::replace(&mut subscription.connection, Connection::Unbound)
                {
                    handle.abort();
                }
            }
        }
        bind_unbound(&mut state)
    }

    pub fn hub(&self) -> Option<MercureOptions> {
        self.state.lock().hub.clone()
    }

    /// Register interest in `resource_id`. A second subscriber to the same
    /// resource shares the existing connection and callback.
    ///
    /// The topic is resolved against the hub's `topic_url` when the entry
    /// connects. If a new entry cannot connect, it is not kept.
    pub fn subscribe(&self, resource_id: &str, callback: RecordCallback) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(existing) = state.subscriptions.get_mut(resource_id) {
            existing.count += 1;
            tracing::debug!(resource = resource_id, count = existing.count, "subscription shared");
            return Ok(());
        }
        if let Some(hub) = &state.hub {
            hub.topic_for(resource_id)?;
        }

        state.subscriptions.insert(
            resource_id.to_string(),
            Subscription {
                callback,
                count: 1,
                connection: Connection::Unbound,
            },
        );
        if let Err(e) = bind_unbound(&mut state) {
            state.subscriptions.remove(resource_id);
            return Err(e);
        }
        Ok(())
    }

    /// Drop one subscriber. The connection closes with the last one.
    pub fn unsubscribe(&self, resource_id: &str) {
        let mut state = self.state.lock();
        let Some(subscription) = state.subscriptions.get_mut(resource_id) else {
            tracing::debug!(resource = resource_id, "unsubscribe without subscription");
            return;
        };

        subscription.count -= 1;
        if subscription.count > 0 {
            return;
        }

        if let Some(subscription) = state.subscriptions.remove(resource_id) {
            if let Connection::Bound(handle) = subscription.connection {
                handle.abort();
            }
            tracing::debug!(resource = resource_id, "subscription closed");
        }
    }

    /// Number of subscribers sharing the resource's entry.
    pub fn subscriber_count(&self, resource_id: &str) -> usize {
        self.state
            .lock()
            .subscriptions
            .get(resource_id)
            .map_or(0, |s| s.count)
    }

    pub fn is_bound(&self, resource_id: &str) -> bool {
        matches!(
            self.state.lock().subscriptions.get(resource_id),
            Some(Subscription {
                connection: Connection::Bound(_),
                ..
            })
        )
    }

    pub fn len(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().subscriptions.is_empty()
    }
}

impl fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SubscriptionManager")
            .field("hub", &state.hub)
            .field("subscriptions", &state.subscriptions.len())
            .finish()
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        for subscription in self.state.get_mut().subscriptions.values() {
            if let Connection::Bound(handle) = &subscription.connection {
                handle.abort();
            }
        }
    }
}

/// Open a connection for every unbound entry, once both hub and client are known.
fn bind_unbound(state: &mut State) -> Result<()> {
    let (Some(hub), Some(connector)) = (state.hub.clone(), state.connector.clone()) else {
        return Ok(());
    };

    let pending: Vec<(&String, &mut Subscription)> = state
        .subscriptions
        .iter_mut()
        .filter(|(_, s)| matches!(s.connection, Connection::Unbound))
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| ProviderError::Realtime(format!("no async runtime to connect to the hub: {}", e)))?;

    for (resource_id, subscription) in pending {
        let topic = match hub.topic_for(resource_id) {
            Ok(topic) => topic,
            Err(e) => {
                tracing::warn!(resource = %resource_id, "no mercure topic for resource: {}", e);
                continue;
            }
        };
        let url = hub.subscribe_url(&topic);
        let request_headers = hub.request_headers(&connector.client.config().headers);
        let task = listen(connector.clone(), url, request_headers, subscription.callback.clone());
        subscription.connection = Connection::Bound(runtime.spawn(task));
    }
    Ok(())
}

async fn listen(connector: Connector, url: Url, headers: BTreeMap<String, String>, callback: RecordCallback) {
    let mut stream = match connector.client.subscribe(&url, &headers).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(url = %url, "could not connect to mercure hub: {}", e);
            return;
        }
    };

    while let Some(event) = stream.next().await {
        match event {
            Ok(event) => dispatch(&connector.normalizer, &event, &callback),
            Err(e) => {
                tracing::warn!(url = %url, "mercure stream failed: {}", e);
                break;
            }
        }
    }
    tracing::debug!(url = %url, "mercure stream ended");
}

fn dispatch(normalizer: &DocumentNormalizer, event: &SseEvent, callback: &RecordCallback) {
    if event.data.trim().is_empty() {
        return;
    }
    let document: serde_json::Value = match serde_json::from_str(&event.data) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("undecodable mercure update: {}", e);
            return;
        }
    };
    match normalizer.normalize_item(&document) {
        Ok(record) => callback(record),
        Err(e) => tracing::warn!("mercure update is not a document: {}", e),
    }
}
