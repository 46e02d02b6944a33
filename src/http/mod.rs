use crate::config::Config;
use crate::limit::{RateLimitHub, RateLimitInfo};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for intercepted calls. `RateLimited` is a distinct
/// variant so callers can branch on it without string comparison.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", .0.message)]
    RateLimited(RateLimitInfo),
    #[error("request failed with status {status}")]
    RequestFailed { status: StatusCode },
    #[error("network error: {0}")]
    Network(String),
}

pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_str(&cfg.user_agent).unwrap());
    Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()
}

/// Wraps every outgoing call, classifies the response, and broadcasts
/// rate-limit notifications through the hub.
pub struct Interceptor {
    hub: RateLimitHub,
}

impl Interceptor {
    pub fn new(hub: RateLimitHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &RateLimitHub {
        &self.hub
    }

    /// Resolve one pending response.
    ///
    /// - 429: parse the `retry-after` header (absent or unparseable means an
    ///   unknown wait), notify every hub observer exactly once, then fail
    ///   with [`ApiError::RateLimited`].
    /// - Other non-2xx: fail with [`ApiError::RequestFailed`]; observers are
    ///   not notified.
    /// - 2xx: decode the body as JSON; a decode failure surfaces as
    ///   [`ApiError::Network`].
    ///
    /// The interceptor never retries; every failure is returned to the
    /// issuing caller to render.
    pub async fn intercept<T, F>(&self, pending: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Future<Output = reqwest::Result<reqwest::Response>>,
    {
        let response = pending.await.map_err(|e| {
            warn!("request failed to send: {}", e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            debug!("rate limited; retry-after={:?}", retry_after);
            let info = self.hub.notify(retry_after);
            return Err(ApiError::RateLimited(info));
        }

        if !status.is_success() {
            return Err(ApiError::RequestFailed { status });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}
