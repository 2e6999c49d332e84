//! HTTP transport used by the webhook sink
//!
//! The webhook consumer only needs "POST this JSON body to this URL and
//! tell me whether it worked". Connection pooling, TLS, timeouts and
//! retries belong to the transport, not to the writer.

use crate::core::error::Result;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use url::Url;

/// Delivers one JSON document per call
pub trait WebhookTransport: Send + Sync {
    /// POST `body` with `Content-Type: application/json`
    ///
    /// Any non-2xx status is an error.
    fn post_json(&self, url: &Url, body: String) -> Result<()>;
}

impl<T: WebhookTransport + ?Sized> WebhookTransport for Arc<T> {
    fn post_json(&self, url: &Url, body: String) -> Result<()> {
        (**self).post_json(url, body)
    }
}

/// Retries another transport with exponential backoff
///
/// Connection failures, timeouts, 429 and 5xx responses are retried up to
/// `max_retries` times; the delay doubles after each attempt and is capped
/// at `max_delay`. Any other error is returned at once.
///
/// # Examples
///
/// ```
/// use litty_logs::sinks::{RetryingTransport, WebhookTransport};
/// use std::time::Duration;
/// # struct Noop;
/// # impl WebhookTransport for Noop {
/// #     fn post_json(&self, _: &url::Url, _: String) -> litty_logs::Result<()> { Ok(()) }
/// # }
///
/// let transport = RetryingTransport::new(Noop)
///     .with_max_retries(5)
///     .with_delays(Duration::from_millis(100), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl<T: WebhookTransport> RetryingTransport<T> {
    /// Three retries starting at 500ms, capped at 5s
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max.max(initial);
        self
    }
}

impl<T: WebhookTransport> WebhookTransport for RetryingTransport<T> {
    fn post_json(&self, url: &Url, body: String) -> Result<()> {
        let mut attempt = 0;
        let mut delay = self.initial_delay;

        loop {
            match self.inner.post_json(url, body.clone()) {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= self.max_retries || !err.is_retryable() => {
                    return Err(err);
                }
                Err(err) => {
                    attempt += 1;
                    eprintln!(
                        "[LOGGER WARNING] Webhook request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, self.max_retries, err, delay
                    );
                    thread::sleep(delay);
                    delay = delay.saturating_mul(2).min(self.max_delay);
                }
            }
        }
    }
}

#[cfg(feature = "webhook")]
pub use http::HttpTransport;

#[cfg(feature = "webhook")]
mod http {
    use super::WebhookTransport;
    use crate::core::error::{LoggerError, Result};
    use reqwest::blocking::Client;
    use reqwest::header::CONTENT_TYPE;
    use std::time::Duration;
    use url::Url;

    /// Pooled blocking HTTP client shared by every request of one sink
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        /// Build a client with a per-request timeout
        pub fn new(request_timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .timeout(request_timeout)
                .user_agent(concat!("litty_logs/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| LoggerError::config("HttpTransport", e.to_string()))?;
            Ok(Self { client })
        }

        pub fn from_client(client: Client) -> Self {
            Self { client }
        }
    }

    impl WebhookTransport for HttpTransport {
        fn post_json(&self, url: &Url, body: String) -> Result<()> {
            let response = self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .map_err(|e| LoggerError::http_transport(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(LoggerError::http_status(status.as_u16()))
            }
        }
    }
}
