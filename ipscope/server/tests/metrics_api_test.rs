use std::{sync::Arc, time::Duration};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use ipscope_core::{
    config::{ProviderEndpoints, ProviderUrls},
    ServerInfo,
};
use ipscope_server::{
    provider_client::HttpGeoClient,
    router,
    service::{GeoCache, GeoCounters, GeoResolver, MetricsBuilder},
    ServiceState,
};
use prometheus::Registry;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn endpoints(mock_server: &MockServer) -> ProviderEndpoints {
    let uri = mock_server.uri();
    ProviderEndpoints {
        primary: ProviderUrls {
            address_url: format!("{uri}/primary/{{ip}}"),
            caller_url: format!("{uri}/primary/"),
        },
        secondary: ProviderUrls {
            address_url: format!("{uri}/secondary/{{ip}}"),
            caller_url: format!("{uri}/secondary/"),
        },
        ip_echo_url: format!("{uri}/echo"),
    }
}

fn create_test_server(mock_server: &MockServer) -> TestServer {
    let client = HttpGeoClient::new(Duration::from_secs(3)).expect("Failed to build geo client");
    let counters = GeoCounters::register(&Registry::new()).expect("Failed to register counters");
    let resolver = GeoResolver::new(
        Arc::new(client),
        endpoints(mock_server),
        GeoCache::new(Duration::from_secs(60)),
        counters,
    );
    let server_info = ServerInfo {
        version: "0.0.0".to_string(),
        branch: "test".to_string(),
        commit_hash: "0000000".to_string(),
        start_time: chrono::Utc::now(),
    };

    let app = router(ServiceState::new(MetricsBuilder::new(resolver)), server_info, None);
    TestServer::new(app).expect("Failed to create test server")
}

fn forwarded_for(value: &'static str) -> (HeaderName, HeaderValue) {
    (HeaderName::from_static("x-forwarded-for"), HeaderValue::from_static(value))
}

#[tokio::test]
async fn test_metrics_for_public_address() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/primary/103.172.179.24"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ip": "103.172.179.24", "country": "IN" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let server = create_test_server(&mock_server);

    let (name, value) = forwarded_for("103.172.179.24");
    let response = server
        .get("/api/metrics")
        .add_header(name, value)
        .add_header(
            HeaderName::from_static("user-agent"),
            HeaderValue::from_static("integration-test"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["ip"], "103.172.179.24");
    assert_eq!(body["effective_ip"], "103.172.179.24");
    assert_eq!(body["ip_version"], "IPv4");
    assert_eq!(body["geo"]["country"], "IN");
    assert_eq!(body["headers"]["user-agent"], "integration-test");
    assert_eq!(body["headers"]["accept-language"], "");

    // Served from the cache, so the mock still sees a single request.
    let (name, value) = forwarded_for("103.172.179.24");
    let response = server.get("/api/metrics").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_for_loopback_caller() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/primary/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ip": "8.8.8.8", "country": "US" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/primary/8.8.8.8"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ip": "8.8.8.8", "city": "Mountain View" })),
        )
        .mount(&mock_server)
        .await;
    let server = create_test_server(&mock_server);

    let (name, value) = forwarded_for("::1");
    let response = server.get("/api/metrics").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["ip"], "::1");
    assert_eq!(body["effective_ip"], "8.8.8.8");
    assert_eq!(body["ip_version"], "IPv6");
    assert_eq!(body["geo"]["city"], "Mountain View");
}

#[tokio::test]
async fn test_metrics_when_every_provider_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;
    let server = create_test_server(&mock_server);

    let (name, value) = forwarded_for("192.168.1.5");
    let response = server.get("/api/metrics").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["ip"], "192.168.1.5");
    assert_eq!(body["effective_ip"], "192.168.1.5");
    assert_eq!(body["geo"]["error"], "Geo lookup returned non-JSON response");
    assert_eq!(body["geo"]["status"], 503);
}

#[tokio::test]
async fn test_server_info_and_not_found() {
    let mock_server = MockServer::start().await;
    let server = create_test_server(&mock_server);

    let response = server.get("/api/v1/info").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["_status"], 200);
    assert_eq!(body["data"]["branch"], "test");

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/does/not/exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["type"], "NOT_FOUND");
}
