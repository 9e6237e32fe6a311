//! Async REST client for the API-Football v3 fixture feed.
//!
//! Features:
//! - `x-apisports-key` authentication
//! - Client-side rate limiting (configurable, default 5 req/sec)
//! - Bounded retries: 429 honors `Retry-After`, 5xx and network faults back off
//!   exponentially
//! - Typed responses, unwrapped from the `{"response": [...]}` envelope

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::data::models::{Envelope, RawEvent, RawFixture, RawTeamStatistics};
use crate::data::provider::FixtureProvider;

use super::errors::{is_retryable_status, ApiError, DEFAULT_RETRY_AFTER_SECS};

const API_KEY_HEADER: &str = "x-apisports-key";

/// Base delay for exponential backoff.
const BACKOFF_BASE_MS: u64 = 500;

/// Upper bound on any single wait, including server-provided `Retry-After`.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Async REST client for the fixture feed.
pub struct FootballClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: DefaultDirectRateLimiter,
    max_retries: u32,
}

impl FootballClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        rate_limit: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            rate_limiter: RateLimiter::direct(quota),
            max_retries: max_retries.max(1),
        })
    }

    /// Create from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            &settings.api_key,
            &settings.api_base_url,
            settings.api_rate_limit,
            settings.max_retries,
            settings.request_timeout(),
        )
    }

    // =========================================================================
    // Core request method
    // =========================================================================

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::MissingCredential("API_FOOTBALL_KEY"));
        }

        let url = format!("{}{}", self.base_url, path);
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..self.max_retries {
            self.rate_limiter.until_ready().await;

            debug!(path = %path, attempt = attempt + 1, "API request");

            let result = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(params)
                .send()
                .await;

            let is_last = attempt + 1 == self.max_retries;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let text = response
                            .text()
                            .await
                            .map_err(|e| ApiError::Network(e.to_string()))?;
                        return parse_envelope(&text);
                    }

                    if !is_retryable_status(status.as_u16()) {
                        // Other client errors are final.
                        let body_text = response.text().await.unwrap_or_default();
                        return Err(ApiError::from_response(status.as_u16(), &body_text));
                    }

                    let delay = if status.as_u16() == 429 {
                        let header = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok());
                        let delay = retry_after_delay(header);
                        last_error = Some(ApiError::RateLimited {
                            retry_after: delay.as_secs(),
                        });
                        delay
                    } else {
                        last_error = Some(ApiError::Http {
                            status_code: status.as_u16(),
                            message: status.to_string(),
                        });
                        backoff_delay(attempt)
                    };

                    warn!(
                        status_code = status.as_u16(),
                        delay_ms = delay.as_millis() as u64,
                        attempt = attempt + 1,
                        path = %path,
                        "Retryable upstream status"
                    );
                    if !is_last {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        attempt = attempt + 1,
                        path = %path,
                        "Network error, retrying"
                    );
                    last_error = Some(if e.is_timeout() {
                        ApiError::Timeout(e.to_string())
                    } else {
                        ApiError::Network(e.to_string())
                    });
                    if !is_last {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ApiError::MaxRetriesExceeded {
            attempts: self.max_retries,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

#[async_trait]
impl FixtureProvider for FootballClient {
    async fn live_fixtures(&self, league_id: i64) -> Result<Vec<RawFixture>, ApiError> {
        self.get(
            "/fixtures",
            &[("live", "all".to_string()), ("league", league_id.to_string())],
        )
        .await
    }

    async fn events(&self, fixture_id: i64) -> Result<Vec<RawEvent>, ApiError> {
        self.get("/fixtures/events", &[("fixture", fixture_id.to_string())])
            .await
    }

    async fn statistics(&self, fixture_id: i64) -> Result<Vec<RawTeamStatistics>, ApiError> {
        self.get("/fixtures/statistics", &[("fixture", fixture_id.to_string())])
            .await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Unwrap the envelope. Elements are decoded one at a time so a single
/// malformed record is dropped without losing the rest of the list.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ApiError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(text).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    let errors = envelope.error_messages();
    if !errors.is_empty() {
        return Err(ApiError::Upstream(errors.join("; ")));
    }

    let records = envelope
        .response
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed response element");
                None
            }
        })
        .collect();
    Ok(records)
}

/// Exponential backoff: 500ms, 1s, 2s, ... capped.
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(factor)).min(MAX_RETRY_DELAY)
}

/// Delay requested by a `Retry-After` header (seconds form), capped.
fn retry_after_delay(header: Option<&str>) -> Duration {
    let secs = header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs).min(MAX_RETRY_DELAY)
}
