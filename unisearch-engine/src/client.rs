//! Rate-limited request client shared by every source adapter.
//!
//! [`RateLimitedClient`] owns the two pieces of cross-adapter state the
//! engine has: the credential table and the per-service rate-limit
//! snapshots. Both are keyed by service name. Adapters hold an `Arc` to
//! one client, so the whole engine's credential and quota state can be
//! inspected from a single place.
//!
//! The client never retries. Failures are classified and returned:
//!
//! | Condition | Error |
//! |-----------|-------|
//! | connect failure, timeout, unreadable or undecodable body | [`SearchError::Transport`] |
//! | non-2xx status | [`SearchError::RequestFailed`] (raw body kept) |

use std::collections::HashMap;
use std::sync::RwLock;

use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::RateLimitSnapshot;

/// Rate-limit triad headers, checked case-insensitively.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Service label used in errors from credential-free page fetches.
pub const PAGE_FETCH_SERVICE: &str = "page-fetch";

/// Outbound GET client with per-service credentials and rate-limit tracking.
#[derive(Debug)]
pub struct RateLimitedClient {
    http: reqwest::Client,
    credentials: RwLock<HashMap<String, String>>,
    rate_limits: RwLock<HashMap<String, RateLimitSnapshot>>,
}

impl RateLimitedClient {
    /// Create a client around an existing [`reqwest::Client`].
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            credentials: RwLock::new(HashMap::new()),
            rate_limits: RwLock::new(HashMap::new()),
        }
    }

    /// Create a client with timeouts and User-Agent taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Ok(Self::new(http::build_client(config)?))
    }

    /// Store or replace the bearer token for `service`. The token is not
    /// validated.
    pub fn set_credential(&self, service: &str, token: impl Into<String>) {
        self.credentials
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(service.to_owned(), token.into());
    }

    /// The bearer token registered for `service`, if any.
    pub fn credential(&self, service: &str) -> Option<String> {
        self.credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(service)
            .cloned()
    }

    /// The rate-limit budget `service` advertised on its latest successful
    /// response, or `None` if it never advertised a complete triad.
    pub fn rate_limit_info(&self, service: &str) -> Option<RateLimitSnapshot> {
        self.rate_limits
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(service)
            .copied()
    }

    /// Issue a GET to `url` under the `service` bucket and decode the JSON body.
    ///
    /// When a credential is registered for `service`, an
    /// `Authorization: Bearer <token>` header is sent and any caller-supplied
    /// `Authorization` header is dropped. On a 2xx response carrying all
    /// three rate-limit headers, the stored snapshot for `service` is
    /// replaced.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Transport`] if the request cannot be sent, the body
    ///   cannot be read, or the body is not valid JSON
    /// - [`SearchError::RequestFailed`] for any non-2xx status
    pub async fn request(
        &self,
        service: &str,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        let token = self.credential(service);

        let mut builder = self.http.get(url).query(params);
        for (name, value) in headers {
            if token.is_some() && name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                continue;
            }
            builder = builder.header(*name, *value);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(service, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::RequestFailed {
                service: service.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        if let Some(snapshot) = parse_rate_limit(response.headers()) {
            self.rate_limits
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(service.to_owned(), snapshot);
        }

        let body = response.text().await.map_err(|e| {
            SearchError::transport(service, format!("failed to read response body: {e}"))
        })?;
        serde_json::from_str(&body)
            .map_err(|e| SearchError::transport(service, format!("malformed JSON response: {e}")))
    }

    /// Fetch the raw body of an arbitrary page.
    ///
    /// No credential is attached and no rate-limit state is recorded; the
    /// page belongs to a third party, not to a configured service.
    ///
    /// # Errors
    ///
    /// Same classification as [`request`](Self::request), reported under
    /// the [`PAGE_FETCH_SERVICE`] label.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(PAGE_FETCH_SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::RequestFailed {
                service: PAGE_FETCH_SERVICE.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| {
            SearchError::transport(
                PAGE_FETCH_SERVICE,
                format!("failed to read response body: {e}"),
            )
        })
    }
}

fn transport_error(service: &str, err: &reqwest::Error) -> SearchError {
    let message = if err.is_timeout() {
        format!("request timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    };
    SearchError::transport(service, message)
}

/// Parse the rate-limit triad. Returns `None` unless all three headers are
/// present and hold non-negative integers.
///
/// A negative value (`X-RateLimit-Reset: -1`) counts as absent, so the
/// caller keeps whatever snapshot it already had.
pub fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    let read = |name: &str| -> Option<u64> {
        headers
            .get(name)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
    };

    Some(RateLimitSnapshot {
        limit: read(RATE_LIMIT_LIMIT_HEADER)?,
        remaining: read(RATE_LIMIT_REMAINING_HEADER)?,
        reset: read(RATE_LIMIT_RESET_HEADER)?,
    })
}
