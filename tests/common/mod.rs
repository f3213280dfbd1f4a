//! Shared helpers for the integration tests: a scripted network, API
//! fixtures and polling utilities.

#![allow(dead_code)]

use async_trait::async_trait;
use hydra_provider::protocol::SseEvent;
use hydra_provider::schema::{ApiDocumentation, Field, Operation, OperationKind, Parameter, ResourceSchema};
use hydra_provider::types::{HydraRequest, HydraResponse};
use hydra_provider::{DataProvider, HydraNetwork, Introspector, ProviderConfig, ProviderError, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

pub const ENTRYPOINT: &str = "https://api.example.com/";

/// Default timeout for test operations in milliseconds.
pub const TEST_TIMEOUT_MS: u64 = 2000;

/// Setup tracing for tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wait for a condition to become true with timeout.
pub async fn wait_for_condition<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    false
}

type RouteKey = (String, String);

/// An open hub connection as seen by the server side of a test.
pub struct HubConnection {
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub sender: async_channel::Sender<Result<SseEvent>>,
}

/// Network answering from a route table keyed by method and path.
///
/// Each route holds a queue of responses; the last one is repeated once the
/// queue is drained. Unrouted requests get a 404.
#[derive(Default)]
pub struct MockNetwork {
    routes: Mutex<HashMap<RouteKey, VecDeque<HydraResponse>>>,
    delays: Mutex<HashMap<RouteKey, Duration>>,
    requests: Mutex<Vec<HydraRequest>>,
    connections: Mutex<Vec<HubConnection>>,
}

fn route_key(method: &str, path: &str) -> RouteKey {
    (method.to_ascii_uppercase(), path.to_string())
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: &str, path: &str, response: HydraResponse) {
        self.routes
            .lock()
            .entry(route_key(method, path))
            .or_default()
            .push_back(response);
    }

    pub fn route_json(&self, method: &str, path: &str, status: u16, body: Value) {
        self.route(method, path, HydraResponse::json(status, &body));
    }

    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        self.delays.lock().insert(route_key(method, path), delay);
    }

    pub fn requests(&self) -> Vec<HydraRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HydraRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url.path() == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn connection_url(&self, index: usize) -> Option<Url> {
        self.connections.lock().get(index).map(|c| c.url.clone())
    }

    pub fn connection_header(&self, index: usize, name: &str) -> Option<String> {
        self.connections
            .lock()
            .get(index)
            .and_then(|c| c.headers.get(name).cloned())
    }

    pub fn is_connection_closed(&self, index: usize) -> bool {
        self.connections
            .lock()
            .get(index)
            .map_or(true, |c| c.sender.is_closed())
    }

    /// Push an SSE message down an open hub connection.
    pub async fn push(&self, index: usize, data: &str) -> bool {
        let sender = match self.connections.lock().get(index) {
            Some(c) => c.sender.clone(),
            None => return false,
        };
        sender.send(Ok(SseEvent::message(data))).await.is_ok()
    }

    fn next_response(&self, key: &RouteKey) -> HydraResponse {
        let mut routes = self.routes.lock();
        match routes.get_mut(key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => HydraResponse::json(404, &json!({"hydra:description": "Not Found"})),
        }
    }
}

#[async_trait]
impl HydraNetwork for MockNetwork {
    async fn fetch(&self, request: HydraRequest) -> Result<HydraResponse> {
        let key = route_key(request.method.as_str(), request.url.path());
        self.requests.lock().push(request);

        let delay = self.delays.lock().get(&key).copied();
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        Ok(self.next_response(&key))
    }

    async fn subscribe(
        &self,
        url: &Url,
        headers: &BTreeMap<String, String>,
    ) -> Result<async_channel::Receiver<Result<SseEvent>>> {
        let (sender, receiver) = async_channel::bounded(16);
        self.connections.lock().push(HubConnection {
            url: url.clone(),
            headers: headers.clone(),
            sender,
        });
        Ok(receiver)
    }
}

/// Introspector counting how often documentation is requested.
pub struct CountingIntrospector {
    documentation: ApiDocumentation,
    pub calls: AtomicUsize,
}

impl CountingIntrospector {
    pub fn new(documentation: ApiDocumentation) -> Arc<Self> {
        Arc::new(Self {
            documentation,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Introspector for CountingIntrospector {
    async fn introspect(&self) -> Result<ApiDocumentation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documentation.clone())
    }
}

/// Introspector that always fails, for error propagation tests.
pub struct BrokenIntrospector;

#[async_trait]
impl Introspector for BrokenIntrospector {
    async fn introspect(&self) -> Result<ApiDocumentation> {
        Err(ProviderError::Transport("documentation unreachable".into()))
    }
}

pub fn url(path: &str) -> Url {
    Url::parse(ENTRYPOINT).and_then(|base| base.join(path)).unwrap()
}

/// `books` can be filtered by id and declares PUT for edits; `reviews`
/// cannot be filtered by id; `authors` has no edit operation.
pub fn documentation() -> ApiDocumentation {
    let books = ResourceSchema::new("books", url("/books"))
        .with_field(Field::new("title").with_range("http://www.w3.org/2001/XMLSchema#string"))
        .with_field(Field::new("isbn").with_range("http://www.w3.org/2001/XMLSchema#string"))
        .with_field(Field::new("author").with_reference("authors", Some(1)))
        .with_field(Field::new("cover"))
        .with_parameter(Parameter::new("id[]"))
        .with_parameter(Parameter::new("title"))
        .with_operation(Operation::new(OperationKind::Edit, "PUT"));

    let reviews = ResourceSchema::new("reviews", url("/reviews"))
        .with_field(Field::new("body"))
        .with_field(Field::new("rating").with_range("http://www.w3.org/2001/XMLSchema#integer"))
        .with_field(Field::new("book").with_reference("books", Some(1)))
        .with_parameter(Parameter::new("book"));

    let authors = ResourceSchema::new("authors", url("/authors"))
        .with_field(Field::new("name"))
        .with_field(Field::new("birthDate").with_range("http://www.w3.org/2001/XMLSchema#date"));

    ApiDocumentation::new(url("/"), vec![books, reviews, authors])
}

pub fn config() -> ProviderConfig {
    ProviderConfig::new(ENTRYPOINT).unwrap().with_logging(true)
}

pub fn provider_with(network: Arc<MockNetwork>, config: ProviderConfig) -> DataProvider {
    DataProvider::builder(config)
        .introspector(CountingIntrospector::new(documentation()))
        .network(network)
        .build()
        .unwrap()
}

pub fn provider(network: Arc<MockNetwork>) -> DataProvider {
    provider_with(network, config())
}

pub fn book(id: u32, title: &str) -> Value {
    json!({
        "@id": format!("/books/{}", id),
        "@type": "Book",
        "id": id,
        "title": title,
    })
}

pub fn review(id: u32, rating: u32) -> Value {
    json!({
        "@id": format!("/reviews/{}", id),
        "@type": "Review",
        "body": format!("review {}", id),
        "rating": rating,
    })
}

/// Collection document with the given members and extra top-level keys.
pub fn collection(path: &str, members: Vec<Value>, extra: Value) -> Value {
    let mut doc = json!({
        "@context": "/contexts/Collection",
        "@id": path,
        "@type": "hydra:Collection",
        "hydra:member": members,
    });
    if let (Some(doc), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            doc.insert(k.clone(), v.clone());
        }
    }
    doc
}
