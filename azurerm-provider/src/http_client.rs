//! Generic HTTP client tools
//!
//! Reusable request execution for every ARM client: sending, logging, transport
//! error classification and reading the headers that drive long-running
//! operation polling. Each client still builds its own `RequestBuilder`
//! (URL, `api-version`, body, conditional headers).
//!
//! # design principles
//! - **No automatic retries** - only the long-running-operation poll loop repeats requests
//! - **Unified HTTP processing flow** - sending requests, logging, reading responses
//! - **Status interpretation stays with the caller** - non-2xx bodies are returned, not mapped

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::RequestBuilder;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Header carrying the URL of an `Azure-AsyncOperation` status document.
pub(crate) const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
/// Header carrying the `Location` polling/result URL.
pub(crate) const LOCATION: &str = "location";
/// Header carrying the server-dictated polling interval.
pub(crate) const RETRY_AFTER: &str = "retry-after";

/// Headers of a response that are relevant to long-running operation polling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollingHeaders {
    /// `Azure-AsyncOperation` status URL.
    pub azure_async_operation: Option<String>,
    /// `Location` URL.
    pub location: Option<String>,
    /// Server-dictated delay before the next poll.
    pub retry_after: Option<Duration>,
}

impl PollingHeaders {
    fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        Self {
            azure_async_operation: text(AZURE_ASYNC_OPERATION),
            location: text(LOCATION),
            retry_after: text(RETRY_AFTER).and_then(|v| parse_retry_after(&v, Utc::now())),
        }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Polling-related headers.
    pub headers: PollingHeaders,
    /// Response body text (may be empty).
    pub body: String,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the fully read response
    ///
    /// Unified processing: sending requests, logging, error handling
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (including URL, headers, body, etc.)
    /// * `service` - Service name (for logging and errors)
    /// * `method_name` - request method name (such as "GET", "PUT", used for logs)
    /// * `url` - request URL (for logging)
    ///
    /// # Returns
    /// * `Ok(HttpResponse)` - status, polling headers and body, for any status except 429/502-504
    /// * `Err(ProviderError::Timeout | NetworkError | RateLimited)` - transport level failures
    pub async fn execute_request(
        request_builder: RequestBuilder,
        service: &str,
        method_name: &str,
        url: &str,
    ) -> Result<HttpResponse, ProviderError> {
        log::debug!("[{service}] {method_name} {url}");

        // Send request
        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    service: service.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    service: service.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[{service}] Response Status: {status}");

        // Read polling headers before consuming the response body
        let headers = PollingHeaders::from_headers(response.headers());

        // Returns RateLimited error for HTTP 429
        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            let retry_after = headers.retry_after.map(|d| d.as_secs());
            log::warn!("[{service}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                service: service.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        // Gateway failures never reach the resource provider
        if matches!(status, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{service}] Gateway error (HTTP {status})");
            return Err(ProviderError::NetworkError {
                service: service.to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
            });
        }

        // Read response body
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                service: service.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("[{service}] Response Body: {}", truncate_for_log(&body));

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Parse JSON response
    ///
    /// An empty body is treated as JSON `null`, so unit results (`()`) and
    /// `Option<T>` decode from `204 No Content` responses.
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ProviderError::ParseError)` - parsing failed
    pub fn parse_json<T>(response_text: &str, service: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let text = if response_text.trim().is_empty() {
            "null"
        } else {
            response_text
        };

        serde_json::from_str(text).map_err(|e| {
            log::error!("[{service}] JSON parse failed: {e}");
            log::error!("[{service}] Raw response: {}", truncate_for_log(response_text));
            ProviderError::ParseError {
                service: service.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Serialize a request body
    pub fn to_json<B>(body: &B, service: &str) -> Result<String, ProviderError>
    where
        B: serde::Serialize + ?Sized,
    {
        serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
            service: service.to_string(),
            detail: e.to_string(),
        })
    }
}

/// Parse a `Retry-After` header value
///
/// Accepts delta-seconds (`"30"`) or an HTTP-date
/// (`"Wed, 21 Oct 2015 07:28:00 GMT"`). Dates in the past yield a zero delay.
pub(crate) fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    let delta = (at - now).to_std().unwrap_or(Duration::ZERO);
    Some(delta)
}
