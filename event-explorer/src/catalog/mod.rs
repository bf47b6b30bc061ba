//! Remote event catalog: data model, HTTP client, response cache

mod cache;
mod client;
mod model;

pub use cache::{CachePolicy, QueryCache};
pub use client::{
    CatalogClient, CatalogConfig, CatalogError, CatalogRequest, HttpTransport, Transport,
    TransportResponse, DEFAULT_BASE_URL,
};
pub use model::{
    Address, Classification, Event, EventDates, EventEmbedded, EventImage, EventStart,
    EventsResponse, GeoLocation, Named, PageInfo, PriceRange, SearchParams, Venue,
    DEFAULT_PAGE_SIZE,
};
