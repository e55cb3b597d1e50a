#![allow(clippy::unwrap_used)]
// Route tests: axum-test against a wiremock Dashboard.

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meraki_api::DashboardClient;
use meraki_core::{CollectOptions, Collector, CollectorConfig};
use meraki_exporter::{CONTENT_TYPE, app};
use pretty_assertions::assert_eq;

const ORG: &str = "123";

const EDGE: [(&str, &str); 5] = [
    ("serial", "Q2XX-1111"),
    ("name", "Edge"),
    ("networkName", "Branch-42"),
    ("orgName", "Acme"),
    ("orgId", "123"),
];

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(collect: CollectOptions) -> (MockServer, TestServer) {
    let dashboard = MockServer::start().await;
    let client = DashboardClient::from_reqwest(
        &format!("{}/api/v1", dashboard.uri()),
        reqwest::Client::new(),
    )
    .unwrap()
    .with_retries(0, Duration::ZERO);

    let mut config = CollectorConfig::new("test-key".to_string().into());
    config.collect = collect;
    config.fetch_timeout = Duration::from_secs(2);

    let server = TestServer::new(app(Collector::from_client(client, &config)));
    (dashboard, server)
}

async fn mount_json(dashboard: &MockServer, full_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{full_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(dashboard)
        .await;
}

async fn mount_status(dashboard: &MockServer, full_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{full_path}")))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "errors": ["upstream failure"] })),
        )
        .mount(dashboard)
        .await;
}

/// One appliance in one named network, plus the required switch sources.
async fn mount_organization(dashboard: &MockServer) {
    mount_json(dashboard, &format!("organizations/{ORG}"), json!({ "id": ORG, "name": "Acme" }))
        .await;
    mount_json(
        dashboard,
        &format!("organizations/{ORG}/devices/availabilities"),
        json!([{ "serial": "Q2XX-1111", "name": "Edge", "model": "MX67", "status": "online",
                 "network": { "id": "N_1" } }]),
    )
    .await;
    mount_json(
        dashboard,
        &format!("organizations/{ORG}/networks"),
        json!([{ "id": "N_1", "name": "Branch-42" }]),
    )
    .await;
    mount_json(
        dashboard,
        &format!("organizations/{ORG}/devices/uplinksLossAndLatency"),
        json!([{ "serial": "Q2XX-1111", "timeSeries": [{ "latencyMs": 12.0, "lossPercent": 0.5 }] }]),
    )
    .await;
    mount_json(
        dashboard,
        &format!("organizations/{ORG}/switch/ports/usage/history/byDevice/byInterval"),
        json!([]),
    )
    .await;
    mount_json(dashboard, &format!("organizations/{ORG}/switch/ports/bySwitch"), json!([])).await;
}

/// Value of the one sample of `family` carrying every `labels` pair.
fn sample(body: &str, family: &str, labels: &[(&str, &str)]) -> Option<f64> {
    let prefix = format!("{family}{{");
    let matches: Vec<&str> = body
        .lines()
        .filter(|l| l.starts_with(&prefix))
        .filter(|l| {
            labels.iter().all(|(k, v)| {
                l.contains(&format!("{{{k}=\"{v}\"")) || l.contains(&format!(",{k}=\"{v}\""))
            })
        })
        .collect();
    match matches.as_slice() {
        [line] => line.rsplit(' ').next()?.parse().ok(),
        _ => None,
    }
}

// ── Scrape ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scrape_renders_exposition() {
    let (dashboard, server) = setup(CollectOptions::default()).await;
    mount_organization(&dashboard).await;

    let response = server.get("/").add_query_param("target", ORG).await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        CONTENT_TYPE
    );

    let body = response.text();
    assert_eq!(sample(&body, "meraki_device_latency", &EDGE), Some(0.012));
    assert_eq!(sample(&body, "meraki_device_loss_percent", &EDGE), Some(0.5));
    assert_eq!(sample(&body, "meraki_device_status", &EDGE), Some(1.0));
    assert!(body.contains("# TYPE request_processing_seconds gauge\n"));
    assert!(!body.contains("meraki_vpn_mode"));
}

#[tokio::test]
async fn test_metrics_path_is_an_alias() {
    let (dashboard, server) = setup(CollectOptions::default()).await;
    mount_organization(&dashboard).await;

    let response = server.get("/metrics").add_query_param("target", ORG).await;
    response.assert_status_ok();
    assert_eq!(
        sample(&response.text(), "meraki_device_latency", &EDGE),
        Some(0.012)
    );
}

#[tokio::test]
async fn test_metrics_without_target_is_bad_request() {
    let (_dashboard, server) = setup(CollectOptions::default()).await;

    let response = server.get("/metrics").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vpn_headers_follow_collection_options() {
    let options = CollectOptions {
        vpn: true,
        ..CollectOptions::default()
    };
    let (dashboard, server) = setup(options).await;
    mount_organization(&dashboard).await;
    mount_json(
        &dashboard,
        &format!("organizations/{ORG}/appliance/vpn/statuses"),
        json!([{ "deviceSerial": "Q2XX-1111", "vpnMode": "hub",
                 "exportedSubnets": [{ "subnet": "10.0.0.0/24" }] }]),
    )
    .await;

    let response = server.get("/").add_query_param("target", ORG).await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("# TYPE meraki_vpn_mode gauge\n"));
    assert_eq!(sample(&body, "meraki_vpn_mode", &EDGE), Some(1.0));
    let subnet: Vec<_> = EDGE.into_iter().chain([("subnet", "10.0.0.0/24")]).collect();
    assert_eq!(sample(&body, "meraki_vpn_exported_subnets", &subnet), Some(1.0));
}

#[tokio::test]
async fn test_required_source_failure_is_bad_gateway() {
    let (dashboard, server) = setup(CollectOptions::default()).await;
    mount_json(
        &dashboard,
        &format!("organizations/{ORG}/switch/ports/usage/history/byDevice/byInterval"),
        json!([]),
    )
    .await;
    mount_status(&dashboard, &format!("organizations/{ORG}/switch/ports/bySwitch"), 500).await;

    let response = server.get("/").add_query_param("target", ORG).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.text().contains("switch_port_tags"));
}

// ── Organizations ───────────────────────────────────────────────────

#[tokio::test]
async fn test_organizations_lists_accessible_targets() {
    let (dashboard, server) = setup(CollectOptions::default()).await;
    mount_json(
        &dashboard,
        "organizations",
        json!([{ "id": "123", "name": "Acme" }, { "id": "456", "name": "Locked" },
               { "id": 789, "name": "Globex" }]),
    )
    .await;
    mount_json(&dashboard, "organizations/123/summary/top/devices/byUsage", json!([])).await;
    mount_status(&dashboard, "organizations/456/summary/top/devices/byUsage", 403).await;
    mount_json(&dashboard, "organizations/789/summary/top/devices/byUsage", json!([])).await;

    let response = server.get("/organizations").await;
    response.assert_status_ok();
    response.assert_text("- targets:\n   - 123\n   - 789\n");
}

#[tokio::test]
async fn test_root_without_target_lists_organizations() {
    let (dashboard, server) = setup(CollectOptions::default()).await;
    mount_json(&dashboard, "organizations", json!([{ "id": "123", "name": "Acme" }])).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("123\tAcme\t/?target=123\n"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (_dashboard, server) = setup(CollectOptions::default()).await;

    let response = server.get("/favicon.ico").await;
    response.assert_status_not_found();
}
