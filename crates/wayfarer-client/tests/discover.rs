//! Discovery against a mock server.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use wayfarer_client::{
    AssemblyUpdate, DiscoverRequest, Domain, Error, RateLimitConfig, SessionData, StreamEvent,
    WayfarerClient,
};
use wayfarer_session::{MemoryStore, SessionStore};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STREAM_PATH: &str = "/api/v1/llm/chat/stream";

fn sse(events: &[serde_json::Value]) -> String {
    events.iter().map(|e| format!("data: {e}\n\n")).collect()
}

fn hotel_stream() -> String {
    sse(&[
        json!({"type": "start", "data": {"session_id": "sess-7", "domain": "accommodation"}}),
        json!({"type": "chunk", "data": {"part": "hotels", "chunk": "{\"hotels\":[{\"name\":"}}),
        json!({"type": "chunk", "data": {"part": "hotels", "chunk": "\"Pestana\",\"rating\":4.6}]}"}}),
        json!({"type": "complete"}),
    ])
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn client_for(server: &MockServer) -> WayfarerClient {
    WayfarerClient::builder()
        .base_url(server.uri())
        .auth_token("test-token")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_discover_streams_assembled_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({"message": "hotels in Lisbon", "profile_id": "p-1"})))
        .respond_with(sse_response(hotel_stream()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let updates: Vec<AssemblyUpdate> = client
        .discover(DiscoverRequest::new("hotels in Lisbon").with_profile("p-1"))
        .await
        .unwrap()
        .collect()
        .await;

    assert!(updates.len() >= 2);
    let AssemblyUpdate::Complete(session) = updates.last().unwrap() else {
        panic!("expected completion");
    };
    assert_eq!(session.session_id, "sess-7");
    assert_eq!(session.domain, Domain::Accommodation);
    let SessionData::Accommodation(data) = &session.data else {
        panic!("expected accommodation data");
    };
    assert_eq!(data.hotels[0].name, "Pestana");
    assert_eq!(data.hotels[0].rating, Some(4.6));
}

#[tokio::test]
async fn test_completed_session_is_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(sse_response(hotel_stream()))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = WayfarerClient::builder()
        .base_url(server.uri())
        .session_store(store.clone())
        .build()
        .unwrap();

    let session = client
        .discovery()
        .run(DiscoverRequest::new("hotels"))
        .await
        .unwrap();

    let latest = store.latest().unwrap().unwrap();
    assert_eq!(latest.session_id, "sess-7");
    assert_eq!(latest.data, session.data);
    assert_eq!(store.load("sess-7").unwrap(), session.data);
}

#[tokio::test]
async fn test_upstream_error_is_not_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(sse_response(sse(&[
            json!({"type": "start", "data": {"session_id": "bad"}}),
            json!({"type": "error", "error": "model unavailable"}),
        ])))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = WayfarerClient::builder()
        .base_url(server.uri())
        .session_store(store.clone())
        .build()
        .unwrap();

    let err = client
        .discovery()
        .run(DiscoverRequest::new("anything"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("model unavailable"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_discover_raw_yields_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(sse_response(hotel_stream()))
        .mount(&server)
        .await;

    let events: Vec<StreamEvent> = client_for(&server)
        .discover_raw(DiscoverRequest::new("hotels"))
        .await
        .unwrap()
        .map(|event| event.unwrap())
        .collect()
        .await;

    let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
    assert_eq!(kinds, vec!["start", "chunk", "chunk", "complete"]);
}

#[tokio::test]
async fn test_error_statuses_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(body_partial_json(json!({"message": "unauthorized"})))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"code": "unauthorized", "message": "token expired"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(body_partial_json(json!({"message": "broken"})))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client
        .discover(DiscoverRequest::new("unauthorized"))
        .await
        .err()
        .unwrap();
    assert!(err.is_auth_error());
    assert!(matches!(err, Error::Auth(ref message) if message == "token expired"));

    let err = client
        .discover(DiscoverRequest::new("broken"))
        .await
        .err()
        .unwrap();
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_rate_limit_is_checked_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(sse_response(hotel_stream()))
        .expect(1)
        .mount(&server)
        .await;

    let client = WayfarerClient::builder()
        .base_url(server.uri())
        .rate_limit(RateLimitConfig::new(1, Duration::from_secs(60)))
        .build()
        .unwrap();

    let first = client.discovery().run(DiscoverRequest::new("one")).await;
    assert!(first.is_ok());

    let err = client
        .discover(DiscoverRequest::new("two"))
        .await
        .err()
        .unwrap();
    match err {
        Error::RateLimited { endpoint, .. } => assert_eq!(endpoint, STREAM_PATH),
        other => panic!("expected rate limit, got {other}"),
    }
}
