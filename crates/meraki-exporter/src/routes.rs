// HTTP routes: scrape, organization index, file-SD target list

use std::time::Instant;

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use meraki_core::{Collector, CoreError, Organization};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::exposition::{CONTENT_TYPE, Exposition};

#[derive(Clone)]
struct AppState {
    collector: Collector,
}

#[derive(Debug, Deserialize)]
struct TargetQuery {
    target: Option<String>,
}

impl TargetQuery {
    fn org_id(&self) -> Option<&str> {
        self.target.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Build the exporter's router around a collector.
pub fn app(collector: Collector) -> Router {
    Router::new()
        .route("/", get(index)) // GET /?target=<org> or the org index
        .route("/metrics", get(metrics)) // GET /metrics?target=<org>
        .route("/organizations", get(organizations)) // GET /organizations
        .fallback(not_found)
        .with_state(AppState { collector })
}

// ── Handlers ────────────────────────────────────────────────────────

async fn index(State(state): State<AppState>, Query(query): Query<TargetQuery>) -> Response {
    match query.org_id() {
        Some(org_id) => scrape(&state.collector, org_id).await,
        None => organization_index(&state.collector).await,
    }
}

async fn metrics(State(state): State<AppState>, Query(query): Query<TargetQuery>) -> Response {
    match query.org_id() {
        Some(org_id) => scrape(&state.collector, org_id).await,
        None => (
            StatusCode::BAD_REQUEST,
            "missing required query parameter 'target'\n",
        )
            .into_response(),
    }
}

/// File-SD style target list of every organization the key can read.
async fn organizations(State(state): State<AppState>) -> Response {
    match state.collector.accessible_organizations().await {
        Ok(orgs) => {
            let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
            format!("- targets:\n   - {}\n", ids.join("\n   - ")).into_response()
        }
        Err(e) => upstream_error(&e),
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found\n")
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn scrape(collector: &Collector, org_id: &str) -> Response {
    let started = Instant::now();
    match collector.collect(org_id).await {
        Ok(devices) => {
            info!(org_id, devices = devices.len(), "serving scrape");
            let rendered = Exposition::new(org_id, *collector.options()).and_then(|exposition| {
                exposition.push_devices(devices.values());
                exposition.finish(started.elapsed())
            });
            match rendered {
                Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
                Err(e) => {
                    error!(org_id, error = %e, "could not encode metrics");
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\n")).into_response()
                }
            }
        }
        Err(e) => upstream_error(&e),
    }
}

/// Plain-text listing of visible organizations with their scrape links.
async fn organization_index(collector: &Collector) -> Response {
    let orgs = collector.organizations().await.unwrap_or_else(|e| {
        warn!(error = %e, "could not list organizations for the index");
        Vec::new()
    });
    render_index(&orgs).into_response()
}

fn render_index(orgs: &[Organization]) -> String {
    let mut out = String::from("Meraki organizations\n\n");
    for org in orgs {
        let name = org.name.as_deref().unwrap_or(&org.id);
        out.push_str(&format!("{}\t{name}\t/?target={}\n", org.id, org.id));
    }
    if orgs.is_empty() {
        out.push_str("(none visible to this API key)\n");
    }
    out.push_str("\nScrape metrics from /?target=<org_id> or /metrics?target=<org_id>.\n");
    out
}

fn upstream_error(err: &CoreError) -> Response {
    error!(error = %err, "collection failed");
    (StatusCode::BAD_GATEWAY, format!("{err}\n")).into_response()
}
