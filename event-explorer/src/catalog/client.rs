use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::cache::{CachePolicy, QueryCache};
use super::model::{Event, EventsResponse, SearchParams};

/// Production catalog endpoint
pub const DEFAULT_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Request(String),
    /// The catalog answered with a non-2xx status
    #[error("catalog returned HTTP {status}")]
    Status { status: u16, body: String },
    /// The body was not the expected JSON
    #[error("invalid catalog response: {0}")]
    Decode(String),
}

/// A raw HTTP answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs GET requests for the catalog client.
///
/// Swapped for a scripted fake in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, CatalogError>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.without_url().to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Request(e.without_url().to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

/// The two catalog endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    Search(SearchParams),
    Event(String),
}

impl CatalogRequest {
    /// Full request URL. Query parameters are `apikey`, `size`, `page`,
    /// then `keyword` and `city` when present.
    pub fn url(&self, base_url: &str, api_key: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let key = urlencoding::encode(api_key);
        match self {
            CatalogRequest::Search(params) => {
                let params = params.normalized();
                let mut url = format!(
                    "{base}/events.json?apikey={key}&size={}&page={}",
                    params.size, params.page
                );
                if let Some(keyword) = &params.keyword {
                    url.push_str("&keyword=");
                    url.push_str(&urlencoding::encode(keyword));
                }
                if let Some(city) = &params.city {
                    url.push_str("&city=");
                    url.push_str(&urlencoding::encode(city));
                }
                url
            }
            CatalogRequest::Event(id) => {
                format!("{base}/events/{}.json?apikey={key}", urlencoding::encode(id))
            }
        }
    }
}

// Never includes the api key, safe for logs.
impl fmt::Display for CatalogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogRequest::Search(params) => write!(f, "search[{}]", params.cache_key()),
            CatalogRequest::Event(id) => write!(f, "event[{id}]"),
        }
    }
}

/// Where and as whom the client talks to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Cache contents stay valid even if a holder panicked
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cached client for the remote event catalog.
///
/// Search pages are cached by their normalized [`SearchParams`], single
/// events by id. Locks are never held across a request.
pub struct CatalogClient {
    config: CatalogConfig,
    transport: Arc<dyn Transport>,
    searches: Mutex<QueryCache<SearchParams, EventsResponse>>,
    events: Mutex<QueryCache<String, Event>>,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_policy(config, transport, CachePolicy::default())
    }

    pub fn with_policy(
        config: CatalogConfig,
        transport: Arc<dyn Transport>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            config,
            transport,
            searches: Mutex::new(QueryCache::new(policy)),
            events: Mutex::new(QueryCache::new(policy)),
        }
    }

    /// Client over HTTP with the default cache policy
    pub fn http(config: CatalogConfig) -> Self {
        Self::new(config, Arc::new(HttpTransport::new()))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    async fn fetch<T: DeserializeOwned>(&self, request: &CatalogRequest) -> Result<T, CatalogError> {
        let url = request.url(&self.config.base_url, &self.config.api_key);
        tracing::debug!(%request, "catalog request");

        let response = self.transport.get(&url).await.inspect_err(|e| {
            tracing::warn!(%request, error = %e, "catalog request failed");
        })?;

        if !response.is_success() {
            tracing::warn!(%request, status = response.status, "catalog returned error status");
            return Err(CatalogError::Status {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!(%request, error = %e, "catalog response did not decode");
            CatalogError::Decode(e.to_string())
        })
    }

    /// One page of events, served from cache while fresh
    pub async fn search(&self, params: &SearchParams) -> Result<EventsResponse, CatalogError> {
        let params = params.normalized();
        let cached = lock(&self.searches).fresh(&params);
        if let Some(hit) = cached {
            tracing::trace!(key = %params.cache_key(), "search cache hit");
            return Ok(hit);
        }
        self.refetch(&params).await
    }

    /// Fetch a page from the network and replace its cache entry
    pub async fn refetch(&self, params: &SearchParams) -> Result<EventsResponse, CatalogError> {
        let params = params.normalized();
        let response: EventsResponse = self
            .fetch(&CatalogRequest::Search(params.clone()))
            .await?;
        tracing::debug!(
            key = %params.cache_key(),
            events = response.events.len(),
            total = response.page.total_elements,
            "search loaded"
        );
        lock(&self.searches).insert(params, response.clone());
        Ok(response)
    }

    /// A single event, served from cache while fresh
    pub async fn get_by_id(&self, id: &str) -> Result<Event, CatalogError> {
        let cached = lock(&self.events).fresh(&id.to_string());
        if let Some(hit) = cached {
            return Ok(hit);
        }
        let event: Event = self.fetch(&CatalogRequest::Event(id.to_string())).await?;
        lock(&self.events).insert(id.to_string(), event.clone());
        Ok(event)
    }

    /// Last response for `params`, fresh or not
    pub fn cached_search(&self, params: &SearchParams) -> Option<EventsResponse> {
        lock(&self.searches).peek(&params.normalized()).cloned()
    }

    pub fn cached_event(&self, id: &str) -> Option<Event> {
        lock(&self.events).peek(&id.to_string()).cloned()
    }

    /// Mark one search stale. Returns whether it was cached.
    pub fn invalidate(&self, params: &SearchParams) -> bool {
        lock(&self.searches).invalidate(&params.normalized())
    }

    pub fn invalidate_event(&self, id: &str) -> bool {
        lock(&self.events).invalidate(&id.to_string())
    }

    pub fn invalidate_all(&self) {
        lock(&self.searches).invalidate_all();
        lock(&self.events).invalidate_all();
    }

    fn invalidate_expired(&self) -> Vec<SearchParams> {
        lock(&self.events).invalidate_expired();
        lock(&self.searches).invalidate_expired()
    }

    /// The app regained focus: expire old entries and return the searches
    /// that need revalidating.
    pub fn on_focus(&self) -> Vec<SearchParams> {
        let expired = self.invalidate_expired();
        tracing::debug!(expired = expired.len(), "focus revalidation");
        expired
    }

    /// Connectivity came back: same revalidation as [`Self::on_focus`]
    pub fn on_reconnect(&self) -> Vec<SearchParams> {
        let expired = self.invalidate_expired();
        tracing::debug!(expired = expired.len(), "reconnect revalidation");
        expired
    }
}

impl fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.config.base_url)
            .field("cached_searches", &lock(&self.searches).len())
            .field("cached_events", &lock(&self.events).len())
            .finish_non_exhaustive()
    }
}
