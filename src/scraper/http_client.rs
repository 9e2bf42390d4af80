use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::scraper::PageSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tokio_retry::Retry;
use tracing::{debug, warn};

// ── Retry policy ──────────────────────────────────────────────────────────────

/// Wait between two attempts, as a function of the attempt that just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `step * n` after the n-th failure.
    Linear(Duration),
    Fixed(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Waits between consecutive attempts; `max_attempts - 1` items.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let backoff = self.backoff;
        (1..self.max_attempts).map(move |n| match backoff {
            Backoff::Linear(step) => step * n,
            Backoff::Fixed(d) => d,
        })
    }

    /// One attempt, no waiting.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }
}

/// Random pause after every successful GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtesyDelay {
    pub min: Duration,
    pub max: Duration,
}

impl CourtesyDelay {
    pub const NONE: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn sample(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        if hi <= lo {
            return self.min;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct HttpClient {
    inner: reqwest::Client,
    retry: RetryPolicy,
    courtesy: CourtesyDelay,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            retry: config.retry_policy(),
            courtesy: config.courtesy_delay(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_courtesy_delay(mut self, courtesy: CourtesyDelay) -> Self {
        self.courtesy = courtesy;
        self
    }

    /// Fetch a URL as text, retrying per the policy.
    /// Exhausted retries are logged and reported as `None`.
    pub async fn get_text(&self, url: &str) -> Option<String> {
        let mut attempt = 0u32;
        let result = Retry::start(self.retry.delays(), || {
            attempt += 1;
            self.attempt(url, attempt)
        })
        .await;

        match result {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Giving up on {} after {} attempt(s): {}", url, attempt, e);
                None
            }
        }
    }

    async fn attempt(&self, url: &str, attempt: u32) -> Result<String, FetchError> {
        debug!("GET {} (attempt {})", url, attempt);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|source| request_failed(url, attempt, source))?;

        let status = resp.status();
        if !status.is_success() {
            warn!("HTTP {} on attempt {} for {}", status, attempt, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| request_failed(url, attempt, source))?;

        sleep(self.courtesy.sample()).await;
        Ok(body)
    }
}

fn request_failed(url: &str, attempt: u32, source: reqwest::Error) -> FetchError {
    warn!("Request failed on attempt {}: {}", attempt, source);
    FetchError::Request {
        url: url.to_string(),
        source,
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.get_text(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(max_attempts: u32) -> HttpClient {
        HttpClient::new(&ScraperConfig::default())
            .unwrap()
            .with_retry(RetryPolicy {
                max_attempts,
                backoff: Backoff::Fixed(Duration::ZERO),
            })
            .with_courtesy_delay(CourtesyDelay::NONE)
    }

    #[test]
    fn test_linear_backoff_delays() {
        let policy = RetryPolicy {
            max_attempts: 4,
            backoff: Backoff::Linear(Duration::from_millis(1500)),
        };
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1500),
                Duration::from_millis(3000),
                Duration::from_millis(4500),
            ]
        );
        assert_eq!(RetryPolicy::once().delays().count(), 0);
    }

    #[test]
    fn test_courtesy_delay_within_bounds() {
        let delay = CourtesyDelay {
            min: Duration::from_millis(1200),
            max: Duration::from_millis(2500),
        };
        for _ in 0..100 {
            let d = delay.sample();
            assert!(d >= delay.min && d <= delay.max, "{d:?} out of range");
        }
        assert_eq!(CourtesyDelay::NONE.sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asndb/cat/ACE/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = test_client(3)
            .get_text(&format!("{}/asndb/cat/ACE/1", server.uri()))
            .await;
        assert_eq!(body.as_deref(), Some("<table></table>"));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("third time"))
            .expect(1)
            .mount(&server)
            .await;

        let body = test_client(3).get_text(&server.uri()).await;
        assert_eq!(body.as_deref(), Some("third time"));
    }

    #[tokio::test]
    async fn test_backoff_and_courtesy_delay_are_slept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(3)
            .with_retry(RetryPolicy {
                max_attempts: 3,
                backoff: Backoff::Linear(Duration::from_millis(50)),
            })
            .with_courtesy_delay(CourtesyDelay {
                min: Duration::from_millis(80),
                max: Duration::from_millis(80),
            });

        let start = std::time::Instant::now();
        let body = client.get_text(&server.uri()).await;

        // 50ms + 100ms between attempts, then 80ms after the success
        assert_eq!(body.as_deref(), Some("ok"));
        assert!(start.elapsed() >= Duration::from_millis(230), "{:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_exhausted_retries_yield_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;

        assert_eq!(test_client(3).get_text(&server.uri()).await, None);
    }

    #[tokio::test]
    async fn test_connection_refused_yields_none() {
        // nothing listens on port 9 of the loopback in test environments
        let body = test_client(2).get_text("http://127.0.0.1:9/").await;
        assert_eq!(body, None);
    }
}
