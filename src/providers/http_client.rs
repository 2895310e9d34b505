//! Rate-limited HTTP client for provider APIs
//!
//! Wraps reqwest with a governor quota and retries with exponential backoff
//! for responses that are worth retrying (429 and 5xx).

use governor::{Quota, RateLimiter, state::NotKeyed, clock::DefaultClock, middleware::NoOpMiddleware};
use nonzero_ext::nonzero;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::providers::traits::ProviderError;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Rate-limited HTTP client for API requests
pub struct RateLimitedClient {
    client: Client,
    limiter: RateLimiter<NotKeyed, governor::state::InMemoryState, DefaultClock, NoOpMiddleware>,
    rate_limit_per_minute: u32,
    /// Remaining requests reported by the API
    remaining_requests: AtomicU32,
    initial_backoff: Duration,
}

impl RateLimitedClient {
    /// Create a new rate-limited client
    pub fn new(rate_limit_per_minute: u32, timeout: Duration) -> Result<Self, ProviderError> {
        let rate = NonZeroU32::new(rate_limit_per_minute).unwrap_or(nonzero!(1u32));
        let limiter = RateLimiter::direct(Quota::per_minute(rate));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("mockup-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RateLimitedClient {
            client,
            limiter,
            rate_limit_per_minute: rate.get(),
            remaining_requests: AtomicU32::new(rate.get()),
            initial_backoff: Duration::from_millis(500),
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Remaining requests in the current window, if any are left
    pub fn remaining_requests(&self) -> Option<u32> {
        match self.remaining_requests.load(Ordering::Relaxed) {
            0 => None,
            remaining => Some(remaining),
        }
    }

    /// Build a GET request
    pub fn get(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        RateLimitedRequestBuilder {
            client: self,
            builder: self.client.get(url),
        }
    }

    /// Build a POST request
    pub fn post(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        RateLimitedRequestBuilder {
            client: self,
            builder: self.client.post(url),
        }
    }

    /// Wait for a permit and execute the request
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        self.limiter.until_ready().await;

        let response = builder.send().await?;

        if let Some(remaining) = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
        {
            self.remaining_requests.store(remaining, Ordering::Relaxed);
        }

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            warn!(retry_after_secs = retry_after, "Rate limited by provider");

            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        Ok(response)
    }

    /// Execute with retries for 429, 5xx and transport failures
    async fn execute_with_retry(
        &self,
        builder: RequestBuilder,
        max_retries: u32,
    ) -> Result<Response, ProviderError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            // Streaming bodies cannot be replayed, send those once
            let Some(this_try) = builder.try_clone() else {
                return self.execute(builder).await;
            };

            let outcome = self.execute(this_try).await;
            let retry_delay = match &outcome {
                Ok(response) if response.status().is_server_error() => Some(backoff),
                Ok(_) => None,
                Err(ProviderError::RateLimited { retry_after_secs }) => {
                    Some(Duration::from_secs(*retry_after_secs).min(MAX_BACKOFF))
                }
                Err(ProviderError::Http(_)) => Some(backoff),
                Err(_) => None,
            };

            let delay = match retry_delay {
                Some(delay) if attempt < max_retries => delay,
                _ => return outcome,
            };

            attempt += 1;
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                remaining = ?self.remaining_requests(),
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }
}

/// Request builder wrapper that enforces rate limiting
pub struct RateLimitedRequestBuilder<'a> {
    client: &'a RateLimitedClient,
    builder: RequestBuilder,
}

impl<'a> RateLimitedRequestBuilder<'a> {
    /// Add JSON body to the request
    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.builder = self.builder.json(json);
        self
    }

    /// Add a bearer token header
    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Send with retries
    pub async fn send_with_retry(self, max_retries: u32) -> Result<Response, ProviderError> {
        self.client.execute_with_retry(self.builder, max_retries).await
    }
}
