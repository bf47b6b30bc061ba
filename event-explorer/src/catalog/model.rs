//! Catalog value types
//!
//! Field names follow the remote JSON so that events stored in favorites
//! serialize back to the same shape they arrived in.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Page length used when a search does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Purchase link
    #[serde(default)]
    pub url: String,
    /// First entry is the primary image
    #[serde(default)]
    pub images: Vec<EventImage>,
    #[serde(default)]
    pub dates: EventDates,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Classification>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<EventEmbedded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub please_note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_ranges: Vec<PriceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDates {
    #[serde(default)]
    pub start: EventStart,
}

/// Event timing, local to the venue
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    #[serde(default)]
    pub local_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Named>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<Named>,
}

/// The `{ "name": ... }` wrapper the catalog uses for cities, genres, etc.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventEmbedded {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub venues: Vec<Venue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<Named>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Named>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Named>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
}

/// Coordinates as the catalog sends them: decimal strings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub currency: String,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

impl Event {
    pub fn primary_image_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    pub fn venue(&self) -> Option<&Venue> {
        self.embedded.as_ref()?.venues.first()
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classifications.first()
    }

    pub fn price_range(&self) -> Option<&PriceRange> {
        self.price_ranges.first()
    }

    pub fn venue_name(&self) -> &str {
        self.venue()
            .map(|venue| venue.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Venue TBA")
    }

    /// Segment name ("Music"), falling back to the genre name
    pub fn category_label(&self) -> Option<&str> {
        let classification = self.classification()?;
        classification
            .segment
            .as_ref()
            .or(classification.genre.as_ref())
            .map(|named| named.name.as_str())
    }

    /// "line1, city, state, country" with missing parts skipped
    pub fn venue_address(&self) -> Option<String> {
        let venue = self.venue()?;
        let parts: Vec<&str> = [
            venue.address.as_ref().map(|a| a.line1.as_str()),
            venue.city.as_ref().map(|n| n.name.as_str()),
            venue.state.as_ref().map(|n| n.name.as_str()),
            venue.country.as_ref().map(|n| n.name.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Venue (latitude, longitude); `None` when absent or unparseable
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let location = self.venue()?.location.as_ref()?;
        let lat = location.latitude.trim().parse().ok()?;
        let lon = location.longitude.trim().parse().ok()?;
        Some((lat, lon))
    }

    pub fn price_label(&self) -> Option<String> {
        self.price_range()
            .map(|range| format!("{} {} - {}", range.currency, range.min, range.max))
    }

    /// "Sat, Mar 15, 2025", or the raw date if it does not parse
    pub fn formatted_date(&self) -> String {
        let raw = &self.dates.start.local_date;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| date.format("%a, %b %-d, %Y").to_string())
            .unwrap_or_else(|_| raw.clone())
    }

    /// "7:30 PM"
    pub fn formatted_time(&self) -> Option<String> {
        let raw = self.dates.start.local_time.as_deref()?;
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
            .map(|time| time.format("%-I:%M %p").to_string())
    }
}

/// Query for one page of search results.
///
/// Construct through the builder methods: keyword and city are trimmed and
/// empty values dropped, so equal queries compare (and hash) equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub city: Option<String>,
    /// Zero-based
    pub page: u32,
    pub size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keyword: None,
            city: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = non_empty(Some(keyword.into()));
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = non_empty(Some(city.into()));
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Same query with blank fields dropped and whitespace trimmed
    pub fn normalized(&self) -> Self {
        Self {
            keyword: non_empty(self.keyword.clone()),
            city: non_empty(self.city.clone()),
            page: self.page,
            size: self.size,
        }
    }

    /// Same query, one page further
    pub fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.normalized()
        }
    }

    /// Stable textual identity, used for task keys and logs
    pub fn cache_key(&self) -> String {
        let normalized = self.normalized();
        format!(
            "keyword={}&city={}&page={}&size={}",
            urlencoding::encode(normalized.keyword.as_deref().unwrap_or("")),
            urlencoding::encode(normalized.city.as_deref().unwrap_or("")),
            normalized.page,
            normalized.size
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    /// Zero-based index of this page
    #[serde(default)]
    pub number: u32,
}

impl PageInfo {
    pub fn has_more(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }
}

/// One page of search results, normalized at the boundary:
/// a missing `_embedded` is an empty list and a missing `page` is all zeros.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireEventsResponse", into = "WireEventsResponse")]
pub struct EventsResponse {
    pub events: Vec<Event>,
    pub page: PageInfo,
}

impl EventsResponse {
    pub fn has_more(&self) -> bool {
        self.page.has_more()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct WireEventsResponse {
    #[serde(rename = "_embedded", default)]
    embedded: Option<WireEmbeddedEvents>,
    #[serde(default)]
    page: Option<PageInfo>,
}

#[derive(Serialize, Deserialize)]
struct WireEmbeddedEvents {
    #[serde(default)]
    events: Option<Vec<Event>>,
}

impl From<WireEventsResponse> for EventsResponse {
    fn from(wire: WireEventsResponse) -> Self {
        Self {
            events: wire.embedded.and_then(|e| e.events).unwrap_or_default(),
            page: wire.page.unwrap_or_default(),
        }
    }
}

impl From<EventsResponse> for WireEventsResponse {
    fn from(response: EventsResponse) -> Self {
        Self {
            embedded: Some(WireEmbeddedEvents {
                events: Some(response.events),
            }),
            page: Some(response.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> Event {
        serde_json::from_value(json!({
            "id": "E1",
            "name": "Jazz Night",
            "url": "https://tickets.example/E1",
            "images": [{ "url": "https://img.example/1.jpg", "ratio": "16_9", "width": 640, "height": 360 }],
            "dates": { "start": { "localDate": "2025-03-15", "localTime": "19:30:00" } },
            "classifications": [{ "segment": { "name": "Music" }, "genre": { "name": "Jazz" } }],
            "_embedded": {
                "venues": [{
                    "name": "Blue Note",
                    "address": { "line1": "131 W 3rd St" },
                    "city": { "name": "New York" },
                    "state": { "name": "New York" },
                    "country": { "name": "United States Of America" },
                    "location": { "latitude": "40.7309", "longitude": "-74.0004" }
                }]
            },
            "pleaseNote": "No re-entry.",
            "priceRanges": [{ "type": "standard", "currency": "USD", "min": 25.0, "max": 49.5 }],
            "unknownField": true
        }))
        .unwrap()
    }

    #[test]
    fn test_event_derived_views() {
        let event = sample_event();
        assert_eq!(event.primary_image_url(), Some("https://img.example/1.jpg"));
        assert_eq!(event.venue_name(), "Blue Note");
        assert_eq!(event.category_label(), Some("Music"));
        assert_eq!(
            event.venue_address().as_deref(),
            Some("131 W 3rd St, New York, New York, United States Of America")
        );
        assert_eq!(event.coordinates(), Some((40.7309, -74.0004)));
        assert_eq!(event.price_label().as_deref(), Some("USD 25 - 49.5"));
        assert_eq!(event.formatted_date(), "Sat, Mar 15, 2025");
        assert_eq!(event.formatted_time().as_deref(), Some("7:30 PM"));
    }

    #[test]
    fn test_event_minimal_shape() {
        let event: Event = serde_json::from_value(json!({
            "id": "E2",
            "name": "TBA Show",
            "dates": { "start": { "localDate": "soon" } }
        }))
        .unwrap();

        assert_eq!(event.venue_name(), "Venue TBA");
        assert_eq!(event.venue_address(), None);
        assert_eq!(event.coordinates(), None);
        assert_eq!(event.price_label(), None);
        assert_eq!(event.category_label(), None);
        assert_eq!(event.formatted_date(), "soon");
        assert_eq!(event.formatted_time(), None);
    }

    #[test]
    fn test_bad_coordinates_are_none() {
        let mut event = sample_event();
        if let Some(embedded) = event.embedded.as_mut() {
            embedded.venues[0].location = Some(GeoLocation {
                latitude: "north".into(),
                longitude: "-74.0".into(),
            });
        }
        assert_eq!(event.coordinates(), None);
    }

    #[test]
    fn test_event_keeps_wire_field_names() {
        let value = serde_json::to_value(sample_event()).unwrap();
        assert!(value.get("_embedded").is_some());
        assert!(value.get("pleaseNote").is_some());
        assert!(value.get("priceRanges").is_some());
        assert_eq!(value["dates"]["start"]["localDate"], "2025-03-15");
        assert_eq!(value["priceRanges"][0]["type"], "standard");
        assert!(value.get("info").is_none());
    }

    #[test]
    fn test_response_missing_embedded_and_page() {
        let response: EventsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.events.is_empty());
        assert_eq!(response.page, PageInfo::default());
        assert!(!response.has_more());
    }

    #[test]
    fn test_response_serializes_in_catalog_shape() {
        let response = EventsResponse {
            events: vec![sample_event()],
            page: PageInfo {
                size: 20,
                total_elements: 41,
                total_pages: 3,
                number: 1,
            },
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["_embedded"]["events"][0]["id"], "E1");
        assert_eq!(value["page"]["totalPages"], 3);

        let back: EventsResponse = serde_json::from_value(value).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_response_missing_embedded_keeps_page() {
        let response: EventsResponse = serde_json::from_value(json!({
            "page": { "size": 20, "totalElements": 0, "totalPages": 0, "number": 0 }
        }))
        .unwrap();
        assert!(response.is_empty());
        assert_eq!(response.page.size, 20);
    }

    #[test]
    fn test_has_more() {
        let page = |number, total_pages| PageInfo {
            size: 20,
            total_elements: 60,
            total_pages,
            number,
        };
        assert!(page(0, 3).has_more());
        assert!(page(1, 3).has_more());
        assert!(!page(2, 3).has_more());
        assert!(!page(0, 0).has_more());
    }

    #[test]
    fn test_search_params_normalization() {
        let a = SearchParams::new().keyword("  jazz ").city("");
        let b = SearchParams {
            keyword: Some("jazz".into()),
            city: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        };
        assert_eq!(a, b);

        let raw = SearchParams {
            keyword: Some("   ".into()),
            city: Some(" nyc ".into()),
            ..SearchParams::default()
        };
        assert_eq!(raw.normalized(), SearchParams::new().city("nyc"));
        assert_eq!(raw.cache_key(), "keyword=&city=nyc&page=0&size=20");
    }

    #[test]
    fn test_next_page() {
        let params = SearchParams::new().city("nyc").page(1);
        assert_eq!(params.next_page(), SearchParams::new().city("nyc").page(2));

        let last = SearchParams::new().page(u32::MAX);
        assert_eq!(last.next_page().page, u32::MAX);
    }

    #[test]
    fn test_cache_key_escapes_separators() {
        let a = SearchParams::new().keyword("a&city=b");
        let b = SearchParams::new().keyword("a").city("b");
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "keyword=a%26city%3Db&city=&page=0&size=20");
        assert_eq!(
            SearchParams::new().keyword("rock & roll").cache_key(),
            "keyword=rock%20%26%20roll&city=&page=0&size=20"
        );
    }
}
