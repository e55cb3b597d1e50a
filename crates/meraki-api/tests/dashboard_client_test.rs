#![allow(clippy::unwrap_used)]
// Integration tests for `DashboardClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meraki_api::{DashboardClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let client = DashboardClient::from_reqwest(
        &format!("{}/api/v1", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap()
    .with_retries(2, Duration::ZERO);
    (server, client)
}

fn org_path(suffix: &str) -> String {
    format!("/api/v1/organizations/123/{suffix}")
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_sent_as_bearer_token() {
    let server = MockServer::start().await;
    let secret: secrecy::SecretString = "0123456789abcdef".to_string().into();
    let client = DashboardClient::from_api_key(
        &format!("{}/api/v1", server.uri()),
        &secret,
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123"))
        .and(header("authorization", "Bearer 0123456789abcdef"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "123", "name": "Acme" })),
        )
        .mount(&server)
        .await;

    let org = client.get_organization("123").await.unwrap();
    assert_eq!(org.name.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })))
        .mount(&server)
        .await;

    let result = client.list_organizations().await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_body_messages_are_joined() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "errors": ["first problem", "second problem"] })),
        )
        .mount(&server)
        .await;

    match client.list_networks("123").await {
        Err(Error::Api { message, status }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "first problem; second problem");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Response shapes ─────────────────────────────────────────────────

#[tokio::test]
async fn test_bare_array_and_envelope_decode_the_same() {
    let (server, client) = setup().await;

    let ports = json!([{
        "serial": "Q2SW-0001",
        "ports": [{ "portId": "1", "tags": ["uplink"] }, { "portId": 2, "tags": null }]
    }]);

    Mock::given(method("GET"))
        .and(path(org_path("switch/ports/bySwitch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ports))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(org_path("switch/ports/statuses/bySwitch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "serial": "Q2SW-0001", "ports": [{ "portId": "1", "status": "Connected" }] }],
            "meta": { "counts": { "items": { "total": 1, "remaining": 0 } } }
        })))
        .mount(&server)
        .await;

    let bare = client.list_switch_ports_by_switch("123").await.unwrap();
    assert_eq!(bare.len(), 1);
    assert_eq!(bare[0].ports[0].tags, vec!["uplink".to_string()]);
    assert_eq!(bare[0].ports[1].port_id, "2");

    let enveloped = client.list_switch_port_statuses("123").await.unwrap();
    assert_eq!(enveloped.len(), 1);
    assert_eq!(enveloped[0].serial.as_deref(), Some("Q2SW-0001"));
    assert_eq!(enveloped[0].ports[0].status.as_deref(), Some("Connected"));
}

#[tokio::test]
async fn test_unrecognized_shape_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(org_path("wireless/clients/overview/byDevice")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": {} })))
        .mount(&server)
        .await;

    let rows = client.list_wireless_client_overview("123").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_invalid_json_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.list_networks("123").await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_link_header_pagination_collects_every_page() {
    let (server, client) = setup().await;
    let next = format!(
        "<{}/api/v1/organizations?startingAfter=2>; rel=next",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .and(query_param_is_missing("startingAfter"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(json!([{ "id": "1", "name": "One" }, { "id": "2", "name": "Two" }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .and(query_param("startingAfter", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 3, "name": "Three" }])))
        .mount(&server)
        .await;

    let orgs = client.list_organizations().await.unwrap();
    let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_query_parameters_are_forwarded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(org_path("devices/uplinksLossAndLatency")))
        .and(query_param("ip", "8.8.8.8"))
        .and(query_param("timespan", "120"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "serial": "Q2XX-1111",
            "timeSeries": [{ "latencyMs": 12.0, "lossPercent": 0.0 }]
        }])))
        .mount(&server)
        .await;

    let rows = client
        .list_uplinks_loss_and_latency("123", "8.8.8.8", 120)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time_series[0].latency_ms, Some(12.0));
}

// ── Retries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "N_1", "name": "Branch-42" }])),
        )
        .mount(&server)
        .await;

    let networks = client.list_networks("123").await.unwrap();
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].name.as_deref(), Some("Branch-42"));
}

#[tokio::test]
async fn test_rate_limit_exhausts_retry_budget() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let result = client.list_networks("123").await;
    assert!(
        matches!(result, Err(Error::RateLimited { .. })),
        "expected RateLimited, got: {result:?}"
    );
}

// ── Timeouts ────────────────────────────────────────────────────────

async fn setup_with_timeout(
    timeout: Duration,
    max_retries: u32,
) -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let secret: secrecy::SecretString = "0123456789abcdef".to_string().into();
    let transport = TransportConfig {
        timeout,
        ..TransportConfig::default()
    };
    let client = DashboardClient::from_api_key(
        &format!("{}/api/v1", server.uri()),
        &secret,
        &transport,
    )
    .unwrap()
    .with_retries(max_retries, Duration::from_millis(10));
    (server, client)
}

#[tokio::test]
async fn test_timeout_reports_configured_seconds() {
    let (server, client) = setup_with_timeout(Duration::from_secs(1), 0).await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client.list_networks("123").await;
    assert!(
        matches!(result, Err(Error::Timeout { timeout_secs: 1 })),
        "expected Timeout after 1s, got: {result:?}"
    );
}

#[tokio::test]
async fn test_timed_out_request_is_retried() {
    let (server, client) = setup_with_timeout(Duration::from_secs(1), 1).await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(org_path("networks")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "N_1", "name": "Branch-42" }])),
        )
        .mount(&server)
        .await;

    let networks = client.list_networks("123").await.unwrap();
    assert_eq!(networks.len(), 1);
}
