mod common;

use std::time::Duration;

use common::*;
use event_explorer::catalog::{CachePolicy, CatalogError, PageInfo, SearchParams};

#[tokio::test]
async fn test_identical_normalized_params_hit_cache() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", page_body(&["A", "B"], 0, 1));
    let client = client(transport.clone());

    let first = client
        .search(&SearchParams::new().keyword(" jazz "))
        .await
        .unwrap();
    let raw = SearchParams {
        keyword: Some("jazz".into()),
        city: Some("   ".into()),
        ..SearchParams::default()
    };
    let second = client.search(&raw).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.events.len(), 2);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_request_url_shape() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", page_body(&[], 0, 0));
    let client = client(transport.clone());

    client
        .search(&SearchParams::new().city("San Francisco").keyword("jazz").page(3))
        .await
        .unwrap();

    assert_eq!(
        transport.calls(),
        vec![format!(
            "{BASE_URL}/events.json?apikey={API_KEY}&size=20&page=3&keyword=jazz&city=San%20Francisco"
        )]
    );
}

#[tokio::test]
async fn test_distinct_params_are_cached_separately() {
    let transport = ScriptedTransport::new();
    transport.respond("page=0", page_body(&["A"], 0, 2));
    transport.respond("page=1", page_body(&["B"], 1, 2));
    let client = client(transport.clone());

    let params = SearchParams::new().city("Chicago");
    let first = client.search(&params).await.unwrap();
    let second = client.search(&params.next_page()).await.unwrap();
    client.search(&params).await.unwrap();
    client.search(&params.next_page()).await.unwrap();

    assert_eq!(first.events[0].id, "A");
    assert_eq!(second.events[0].id, "B");
    assert!(first.has_more());
    assert!(!second.has_more());
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_refetch_and_invalidate_hit_network() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", page_body(&["A"], 0, 1));
    let client = client(transport.clone());
    let params = SearchParams::new();

    client.search(&params).await.unwrap();
    transport.respond("/events.json", page_body(&["A", "B"], 0, 1));

    let refreshed = client.refetch(&params).await.unwrap();
    assert_eq!(refreshed.events.len(), 2);
    assert_eq!(transport.call_count(), 2);

    // The refetched value is what the cache now serves
    assert_eq!(client.search(&params).await.unwrap().events.len(), 2);
    assert_eq!(transport.call_count(), 2);

    assert!(client.invalidate(&params));
    client.search(&params).await.unwrap();
    assert_eq!(transport.call_count(), 3);

    client.invalidate_all();
    client.search(&params).await.unwrap();
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire_after_policy_window() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", page_body(&["A"], 0, 1));
    let client = client(transport.clone());
    let params = SearchParams::new().keyword("rock");

    client.search(&params).await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    client.search(&params).await.unwrap();
    assert_eq!(transport.call_count(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    client.search(&params).await.unwrap();
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_on_focus_reports_only_expired_searches() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", page_body(&["A"], 0, 1));
    let client = client(transport.clone());
    let old = SearchParams::new().keyword("old");
    let new = SearchParams::new().keyword("new");

    client.search(&old).await.unwrap();
    tokio::time::advance(Duration::from_secs(90)).await;
    client.search(&new).await.unwrap();

    assert_eq!(client.on_focus(), vec![old.clone()]);
    // Still past the window, so reported again
    assert_eq!(client.on_reconnect(), vec![old.clone()]);

    client.search(&new).await.unwrap();
    assert_eq!(transport.call_count(), 2);
    client.search(&old).await.unwrap();
    assert_eq!(transport.call_count(), 3);
    assert!(client.on_focus().is_empty());
}

#[tokio::test]
async fn test_least_recently_used_entry_is_evicted() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", page_body(&["A"], 0, 1));
    let policy = CachePolicy {
        stale_after: Duration::from_secs(60),
        max_entries: 2,
    };
    let client = client_with_policy(transport.clone(), policy);
    let a = SearchParams::new().keyword("a");
    let b = SearchParams::new().keyword("b");
    let c = SearchParams::new().keyword("c");

    client.search(&a).await.unwrap();
    client.search(&b).await.unwrap();
    client.search(&a).await.unwrap();
    client.search(&c).await.unwrap();
    assert_eq!(transport.call_count(), 3);

    assert!(client.cached_search(&a).is_some());
    assert!(client.cached_search(&b).is_none());
    assert!(client.cached_search(&c).is_some());
}

#[tokio::test]
async fn test_get_by_id_is_cached() {
    let transport = ScriptedTransport::new();
    transport.respond("/events/E1.json", common::event_json("E1").to_string());
    let client = client(transport.clone());

    let event = client.get_by_id("E1").await.unwrap();
    assert_eq!(event.name, "Event E1");
    client.get_by_id("E1").await.unwrap();

    assert_eq!(
        transport.calls(),
        vec![format!("{BASE_URL}/events/E1.json?apikey={API_KEY}")]
    );
    assert!(client.invalidate_event("E1"));
    client.get_by_id("E1").await.unwrap();
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_missing_embedded_is_empty_not_error() {
    let transport = ScriptedTransport::new();
    transport.respond("/events.json", "{}");
    let client = client(transport);

    let response = client.search(&SearchParams::new()).await.unwrap();
    assert!(response.events.is_empty());
    assert_eq!(response.page, PageInfo::default());
    assert!(!response.has_more());
}

#[tokio::test]
async fn test_error_kinds_are_distinct_and_not_cached() {
    let transport = ScriptedTransport::new();
    let client = client(transport.clone());

    transport.respond_status("keyword=status", 500);
    let err = client
        .search(&SearchParams::new().keyword("status"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 500, .. }));

    transport.respond("keyword=garbage", "<html>");
    let err = client
        .search(&SearchParams::new().keyword("garbage"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));

    transport.fail("keyword=offline", "connection refused");
    let err = client
        .search(&SearchParams::new().keyword("offline"))
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::Request("connection refused".into()));

    // Failures leave nothing behind in the cache
    client
        .search(&SearchParams::new().keyword("status"))
        .await
        .unwrap_err();
    assert_eq!(transport.calls_matching("keyword=status"), 2);
}

#[tokio::test]
async fn test_unknown_event_is_status_error() {
    let transport = ScriptedTransport::new();
    let client = client(transport);

    let err = client.get_by_id("nope").await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { status: 404, .. }));
}
