use futures::StreamExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use livemap::Error;
use livemap::config::ClientConfig;
use livemap::stream::{EventTransport, HttpTransport, SnapshotSource, TransportEvent};

const SNAPSHOT: &str = r#"{
    "generated_at": "2026-03-01T12:00:00Z",
    "layers": {"city": {"items": [{"id": "north", "status": "online"}]}},
    "meta": {"sources": ["registry"]}
}"#;

async fn transport(server: &MockServer) -> HttpTransport {
    let config = ClientConfig::from_service_url(&format!("{}/api/living-map", server.uri())).unwrap();
    HttpTransport::new(config).unwrap()
}

#[tokio::test]
async fn fetches_the_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/living-map/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SNAPSHOT, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = transport(&server).await.fetch_snapshot().await.unwrap();
    assert_eq!(snapshot.layers.city.items[0].id, "north");
    assert_eq!(snapshot.meta.sources, vec!["registry"]);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/living-map/snapshot"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = transport(&server).await.fetch_snapshot().await;
    assert!(matches!(result, Err(Error::Status(s)) if s.as_u16() == 503));
}

#[tokio::test]
async fn invalid_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/living-map/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    let result = transport(&server).await.fetch_snapshot().await;
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn streams_server_sent_events() {
    let server = MockServer::start().await;
    let body = concat!(
        ": keep-alive\n\n",
        "data: {\"kind\": \"event\", \"event_type\": \"ping\"}\n\n",
        "event: message\r\n",
        "data: first line\r\n",
        "data: second line\r\n",
        "\r\n",
    );
    Mock::given(method("GET"))
        .and(path("/api/living-map/stream"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let events: Vec<TransportEvent> = transport(&server).await.connect().await.collect().await;
    assert_eq!(
        events,
        vec![
            TransportEvent::Open,
            TransportEvent::Message(r#"{"kind": "event", "event_type": "ping"}"#.to_string()),
            TransportEvent::Message("first line\nsecond line".to_string()),
            TransportEvent::Closed,
        ]
    );
}

#[tokio::test]
async fn failed_stream_request_reports_error_then_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/living-map/stream"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let events: Vec<TransportEvent> = transport(&server).await.connect().await.collect().await;
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], TransportEvent::Error(reason) if reason.contains("404")));
    assert_eq!(events[1], TransportEvent::Closed);
}
