#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use event_explorer::catalog::{
    CachePolicy, CatalogClient, CatalogConfig, CatalogError, Event, Transport, TransportResponse,
};
use event_explorer::storage::{KeyValueStore, MemoryStore, StorageError};
use event_explorer::App;

pub const BASE_URL: &str = "https://catalog.test/v2";
pub const API_KEY: &str = "test-key";

struct Route {
    needle: String,
    delay: Duration,
    response: Result<TransportResponse, CatalogError>,
    panics: bool,
}

/// Transport answering from a script and recording every URL it was asked for.
///
/// The most recently added route whose needle occurs in the URL wins;
/// unmatched URLs get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn route(&self, needle: &str, delay: Duration, response: Result<TransportResponse, CatalogError>) {
        self.routes.lock().unwrap().push(Route {
            needle: needle.to_string(),
            delay,
            response,
            panics: false,
        });
    }

    /// Matching requests panic inside the transport
    pub fn panic_on(&self, needle: &str) {
        self.routes.lock().unwrap().push(Route {
            needle: needle.to_string(),
            delay: Duration::ZERO,
            response: Err(CatalogError::Request("unreachable".into())),
            panics: true,
        });
    }

    pub fn respond(&self, needle: &str, body: impl Into<String>) {
        self.route(needle, Duration::ZERO, Ok(TransportResponse::ok(body)));
    }

    pub fn respond_after(&self, needle: &str, delay: Duration, body: impl Into<String>) {
        self.route(needle, delay, Ok(TransportResponse::ok(body)));
    }

    pub fn respond_status(&self, needle: &str, status: u16) {
        self.route(
            needle,
            Duration::ZERO,
            Ok(TransportResponse {
                status,
                body: r#"{"fault":"nope"}"#.into(),
            }),
        );
    }

    pub fn fail(&self, needle: &str, message: &str) {
        self.route(
            needle,
            Duration::ZERO,
            Err(CatalogError::Request(message.to_string())),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, CatalogError> {
        self.calls.lock().unwrap().push(url.to_string());

        let matched = {
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .rev()
                .find(|route| url.contains(&route.needle))
                .map(|route| (route.delay, route.response.clone(), route.panics))
        };

        match matched {
            Some((_, _, true)) => panic!("transport crashed on {url}"),
            Some((delay, response, false)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Ok(TransportResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

/// Store whose every operation fails
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("read-only medium".into()))
    }
    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only medium".into()))
    }
    fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only medium".into()))
    }
    fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only medium".into()))
    }
}

pub fn event_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Event {id}"),
        "url": format!("https://tickets.test/{id}"),
        "images": [{ "url": format!("https://img.test/{id}.jpg") }],
        "dates": { "start": { "localDate": "2025-03-15", "localTime": "19:30:00" } },
        "classifications": [{ "segment": { "name": "Music" } }],
        "_embedded": { "venues": [{ "name": "Hall", "city": { "name": "Chicago" } }] }
    })
}

pub fn event(id: &str) -> Event {
    serde_json::from_value(event_json(id)).unwrap()
}

/// A search page body with the given event ids
pub fn page_body(ids: &[&str], number: u32, total_pages: u32) -> String {
    let events: Vec<Value> = ids.iter().map(|id| event_json(id)).collect();
    json!({
        "_embedded": { "events": events },
        "page": {
            "size": 20,
            "totalElements": u64::from(total_pages) * 20,
            "totalPages": total_pages,
            "number": number
        }
    })
    .to_string()
}

pub fn client(transport: Arc<ScriptedTransport>) -> CatalogClient {
    client_with_policy(transport, CachePolicy::default())
}

pub fn client_with_policy(transport: Arc<ScriptedTransport>, policy: CachePolicy) -> CatalogClient {
    let config = CatalogConfig::new(API_KEY).base_url(BASE_URL);
    CatalogClient::with_policy(config, transport, policy)
}

pub fn app_with_store(transport: Arc<ScriptedTransport>, store: Arc<dyn KeyValueStore>) -> App {
    App::init(store, Arc::new(client(transport)))
}

pub fn app(transport: Arc<ScriptedTransport>) -> (App, MemoryStore) {
    let store = MemoryStore::new();
    let app = app_with_store(transport, Arc::new(store.clone()));
    (app, store)
}
