// src/utils/http.rs

//! HTTP fetching with a fixed retry policy.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FetchConfig;
use crate::utils::resolve_url;

/// Status and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET request for a page, relative to the current page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<PageResponse>;
}

/// Suspension between retry attempts.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real timer backed by tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately. Used when rendering without animation timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}

/// Attempt count and fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            attempts: config.retries.max(1),
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// [`PageFetcher`] over reqwest, resolving paths against the current page.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig, base: Url) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        let target = resolve_url(&self.base, url);
        let response = self.client.get(&target).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }
}

/// Fetch `url` and return its body, retrying on failure.
///
/// A non-success status counts as a failure. Attempts before the last are
/// logged and followed by `policy.delay`; the last failure is returned.
pub async fn fetch_html(
    fetcher: &dyn PageFetcher,
    delay: &dyn Delay,
    url: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = match fetcher.get(url).await {
            Ok(response) if response.is_success() => return Ok(response.body),
            Ok(response) => Err(AppError::status(url, response.status)),
            Err(error) => Err(error),
        };

        if attempt >= attempts {
            return result;
        }
        if let Err(error) = &result {
            log::warn!("Fetch attempt {attempt} for {url} failed ({error}), retrying...");
        }
        delay.sleep(policy.delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fetcher and recording delay for tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// Answers each URL from a queue of scripted responses.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        scripts: Mutex<HashMap<String, VecDeque<Result<PageResponse>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
            self.push(
                url,
                Ok(PageResponse {
                    status,
                    body: body.to_string(),
                }),
            )
        }

        pub fn fail(self, url: &str, message: &str) -> Self {
            self.push(url, Err(AppError::config(message)))
        }

        fn push(self, url: &str, result: Result<PageResponse>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push_back(result);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn get(&self, url: &str) -> Result<PageResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            self.scripts
                .lock()
                .unwrap()
                .get_mut(url)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| {
                    Ok(PageResponse {
                        status: 404,
                        body: String::new(),
                    })
                })
        }
    }

    /// Records requested pauses instead of sleeping.
    #[derive(Default)]
    pub struct RecordingDelay {
        slept: Mutex<Vec<Duration>>,
    }

    impl RecordingDelay {
        pub fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingDelay, ScriptedFetcher};
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    #[tokio::test]
    async fn first_success_returns_without_delay() {
        let fetcher = ScriptedFetcher::new().respond("a.html", 200, "<p>a</p>");
        let delay = RecordingDelay::default();

        let body = fetch_html(&fetcher, &delay, "a.html", RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(body, "<p>a</p>");
        assert!(delay.slept().is_empty());
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn failure_then_success_waits_once() {
        let fetcher = ScriptedFetcher::new()
            .respond("a.html", 503, "busy")
            .respond("a.html", 200, "second");
        let delay = RecordingDelay::default();

        let body = fetch_html(&fetcher, &delay, "a.html", RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(body, "second");
        assert_eq!(delay.slept(), vec![SECOND]);
    }

    #[tokio::test]
    async fn network_error_then_success_waits_once() {
        let fetcher = ScriptedFetcher::new()
            .fail("a.html", "connection reset")
            .respond("a.html", 200, "ok");
        let delay = RecordingDelay::default();

        let body = fetch_html(&fetcher, &delay, "a.html", RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(body, "ok");
        assert_eq!(delay.slept(), vec![SECOND]);
    }

    #[tokio::test]
    async fn exhausted_attempts_raise_last_failure() {
        let fetcher = ScriptedFetcher::new()
            .fail("a.html", "connection reset")
            .respond("a.html", 500, "boom");
        let delay = RecordingDelay::default();

        let err = fetch_html(&fetcher, &delay, "a.html", RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Status { status: 500, .. }));
        assert_eq!(delay.slept(), vec![SECOND]);
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn single_attempt_never_sleeps() {
        let fetcher = ScriptedFetcher::new().respond("a.html", 404, "");
        let delay = RecordingDelay::default();
        let policy = RetryPolicy {
            attempts: 1,
            delay: SECOND,
        };

        assert!(fetch_html(&fetcher, &delay, "a.html", policy).await.is_err());
        assert!(delay.slept().is_empty());
    }

    #[test]
    fn policy_never_drops_below_one_attempt() {
        let config = FetchConfig {
            retries: 0,
            ..FetchConfig::default()
        };
        assert_eq!(RetryPolicy::from_config(&config).attempts, 1);
    }
}
