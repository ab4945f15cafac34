use std::sync::Arc;

use harvest_core::DiscoveryProgress;
use harvest_engine::{
    payload_channel, DiscoveryTrigger, HarvestError, HttpPager, Pagination, PayloadReceiver,
    Platform, RequestHeaders, ReqwestTransport, SourceSettings, TransportSettings,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pager_for(server: &MockServer, pagination: Pagination) -> (HttpPager, PayloadReceiver) {
    let (tx, rx) = payload_channel();
    let transport = Arc::new(ReqwestTransport::new(TransportSettings::default()).unwrap());
    let source = SourceSettings {
        platform: Platform::TikTok,
        url: format!("{}/api/{{username}}/items", server.uri()),
        pagination,
    };
    let pager = HttpPager::new(
        transport,
        &source,
        "someone",
        RequestHeaders::new(),
        tx,
        1 << 20,
    );
    (pager, rx)
}

fn body_of(rx: &mut PayloadReceiver) -> Value {
    let payload = rx.try_recv().expect("a payload was pushed");
    payload.json().unwrap()
}

#[tokio::test]
async fn cursor_pages_until_end_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/someone/items"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page": 2, "cursor": "-end-"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/someone/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page": 1, "cursor": "c2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut pager, mut rx) = pager_for(
        &server,
        Pagination::Cursor {
            param: "cursor".into(),
            pointer: "/cursor".into(),
            end_marker: Some("-end-".into()),
        },
    );

    pager.load().await.unwrap();
    assert_eq!(body_of(&mut rx)["page"], 1);

    assert_eq!(pager.advance().await.unwrap(), DiscoveryProgress::Exhausted);
    assert_eq!(body_of(&mut rx)["page"], 2);

    // No further request once exhausted.
    assert_eq!(pager.advance().await.unwrap(), DiscoveryProgress::Exhausted);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn page_numbers_advance_and_repeated_bodies_are_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [3]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [3]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (mut pager, mut rx) = pager_for(
        &server,
        Pagination::Page {
            param: "page".into(),
            start: 1,
        },
    );

    pager.load().await.unwrap();
    assert_eq!(body_of(&mut rx)["items"], json!([1, 2]));
    assert_eq!(pager.advance().await.unwrap(), DiscoveryProgress::Advanced);
    assert_eq!(pager.advance().await.unwrap(), DiscoveryProgress::Unchanged);
    assert_eq!(pager.advance().await.unwrap(), DiscoveryProgress::Exhausted);
}

#[tokio::test]
async fn server_errors_are_unchanged_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (mut pager, _rx) = pager_for(
        &server,
        Pagination::Offset {
            param: "offset".into(),
            start: 0,
            step: 20,
        },
    );

    pager.load().await.unwrap();
    assert_eq!(pager.advance().await.unwrap(), DiscoveryProgress::Unchanged);
}

#[tokio::test]
async fn failing_initial_load_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (mut pager, _rx) = pager_for(&server, Pagination::Single);
    let err = pager.load().await.unwrap_err();
    assert!(matches!(err, HarvestError::InitialLoad(_)));
}
