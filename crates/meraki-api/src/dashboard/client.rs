// Dashboard API HTTP client
//
// Wraps `reqwest::Client` with Dashboard-specific URL construction, bearer
// auth, rate-limit retries, `Link` header pagination, and list envelope
// normalization. Endpoint groups (organizations, switch, wireless, ...) are
// implemented as inherent methods in sibling files to keep this module
// focused on transport mechanics.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LINK, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::dashboard::listing::Listing;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Public Dashboard API root.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1";

/// Error body shape: `{"errors": ["..."]}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Async client for the Meraki Dashboard API.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool, so concurrent fetchers can each hold a copy.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    /// Per-request timeout baked into `http`, when this crate built it.
    request_timeout: Option<Duration>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl DashboardClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `Authorization: Bearer <key>` as a default header on every
    /// request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            request_timeout: Some(transport.timeout),
            max_retries: transport.max_retries,
            retry_backoff: transport.retry_backoff,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let defaults = TransportConfig::default();
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            request_timeout: None,
            max_retries: defaults.max_retries,
            retry_backoff: defaults.retry_backoff,
        })
    }

    /// Override the retry budget for rate-limited and transient failures.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// The API root every relative path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base URL ends with `/` so relative joins keep the
    /// `/api/v1` prefix.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"organizations/123/networks"`) onto the
    /// base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a single JSON document.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let resp = self.send_get(url, params).await?;
        self.handle_response(resp).await
    }

    /// GET every page of a list endpoint and flatten the result.
    ///
    /// Follows `Link: <...>; rel=next` headers until the last page. Each
    /// page may be a bare array or an `items` envelope.
    pub(crate) async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut url = self.url(path)?;
        let mut query: Vec<(&str, String)> = params.to_vec();
        let mut all = Vec::new();
        let mut pages = 0_u32;

        loop {
            let resp = self.send_get(url.clone(), &query).await?;
            let next = next_page_link(resp.headers());
            let value: Value = self.handle_response(resp).await?;
            let listing = Listing::<T>::from_value(value).map_err(|e| Error::Deserialization {
                message: format!("{e} (while decoding {path})"),
                body: String::new(),
            })?;
            pages += 1;
            trace!(path, page = pages, items = listing.len(), "received page");
            all.extend(listing.into_vec());

            match next {
                // The next link already carries every query parameter.
                Some(next) if next != url => {
                    url = next;
                    query.clear();
                }
                _ => break,
            }
        }

        debug!(path, pages, total = all.len(), "collected all pages");
        Ok(all)
    }

    /// Send a GET, retrying 429 and 502-504 responses, connection failures
    /// and timeouts within the budget.
    async fn send_get(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let mut attempt = 0_u32;
        loop {
            debug!("GET {url} params={params:?}");
            let resp = match self.http.get(url.clone()).query(params).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let err = self.send_error(e);
                    if attempt >= self.max_retries || !err.is_transient() {
                        return Err(err);
                    }
                    attempt += 1;
                    warn!(error = %err, attempt, max = self.max_retries, "retrying {url}");
                    tokio::time::sleep(self.retry_backoff).await;
                    continue;
                }
            };
            let status = resp.status();

            if !is_retryable(status) {
                return Ok(resp);
            }

            let wait = retry_after(resp.headers()).unwrap_or(self.retry_backoff);
            if attempt >= self.max_retries {
                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(Error::RateLimited {
                        retry_after_secs: wait.as_secs(),
                    });
                }
                return Ok(resp);
            }

            attempt += 1;
            warn!(
                %status,
                attempt,
                max = self.max_retries,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "retrying {url}"
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn send_error(&self, err: reqwest::Error) -> Error {
        match self.request_timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) if !err.errors.is_empty() => err.errors.join("; "),
            _ if raw.is_empty() => status.to_string(),
            _ => raw.chars().take(200).collect(),
        };

        if status == StatusCode::FORBIDDEN {
            Error::Forbidden { message }
        } else {
            Error::Api {
                message,
                status: status.as_u16(),
            }
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || matches!(
            status,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
        )
}

/// `Retry-After` in whole seconds (the Dashboard never sends HTTP dates).
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Extract the `rel=next` target from RFC 8288 `Link` headers.
fn next_page_link(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .find_map(|part| {
            let (target, params) = part.split_once(';')?;
            let is_next = params.split(';').any(|p| {
                let p = p.trim();
                p == "rel=next" || p == "rel=\"next\""
            });
            if !is_next {
                return None;
            }
            let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
            Url::parse(target).ok()
        })
}
