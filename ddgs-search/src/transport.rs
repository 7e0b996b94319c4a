//! Request transport: paced, retried GETs with blocking-page detection.
//!
//! [`HttpTransport`] is the production implementation. Each attempt sleeps a
//! jittered delay, rotates identity (User-Agent, proxy), sends the request
//! and classifies the response. Rate limiting, server errors, network errors
//! and challenge pages disguised as `200 OK` are retried with exponential
//! backoff. Any other status is terminal: the body is dumped for diagnosis
//! and the fetch gives up.

use crate::config::SearchConfig;
use crate::http;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Case-insensitive substrings that mark a served anti-bot page.
pub const BLOCKING_INDICATORS: &[&str] = &["captcha", "blocked", "too many requests"];

/// Something that can fetch a page body.
///
/// The orchestrator only needs "body or nothing"; every failure mode is
/// handled (and logged) behind this seam.
pub trait Transport: Send + Sync {
    /// Fetch `url`, returning its body on success and `None` otherwise.
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Why an attempt should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// `200 OK` whose body is a CAPTCHA or block notice.
    Blocked,
    /// `429` or `5xx`.
    Status(u16),
    /// Connection, timeout or body-read failure.
    Network,
}

/// Classification of a single HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Real content; hand the body back.
    Success,
    /// Transient; back off and try again.
    Retry(RetryReason),
    /// Unexpected status; dump the body and stop.
    Fatal(u16),
}

/// Failed attempt, as seen by the retry loop.
#[derive(Debug)]
enum AttemptError {
    Retry(RetryReason),
    /// The body has already been dumped.
    Fatal,
}

/// Whether `body` looks like an anti-bot page.
pub fn is_blocked(body: &str) -> bool {
    let lower = body.to_lowercase();
    BLOCKING_INDICATORS.iter().any(|term| lower.contains(term))
}

/// Classify a response by status code and body.
pub fn classify(status: u16, body: &str) -> Classification {
    match status {
        200 if is_blocked(body) => Classification::Retry(RetryReason::Blocked),
        200 => Classification::Success,
        429 | 500..=599 => Classification::Retry(RetryReason::Status(status)),
        other => Classification::Fatal(other),
    }
}

/// Backoff before the retry that follows failed attempt number `attempt`
/// (1-based): `2^attempt` units plus jitter.
pub fn backoff_delay(attempt: u32, base_ms: u64, jitter_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(factor.saturating_mul(base_ms).saturating_add(jitter_ms))
}

/// Path of the diagnostic dump for an unexpected status.
pub fn debug_dump_path(dir: &Path, status: u16) -> PathBuf {
    dir.join(format!("debug_response_{status}.html"))
}

/// Persist a page body for later inspection. Best effort: failures are logged.
pub(crate) async fn write_dump(path: &Path, body: &str) {
    let path = path.to_path_buf();
    let body = body.to_string();
    let written = tokio::task::spawn_blocking(move || std::fs::write(&path, body).map(|()| path)).await;
    match written {
        Ok(Ok(path)) => tracing::debug!(path = %path.display(), "saved response body"),
        Ok(Err(e)) => tracing::warn!(error = %e, "failed to save response body"),
        Err(e) => tracing::warn!(error = %e, "dump task failed"),
    }
}

/// reqwest-backed [`Transport`] with pacing, rotation and retries.
pub struct HttpTransport {
    config: SearchConfig,
    rng: Mutex<StdRng>,
}

impl HttpTransport {
    /// Create a transport seeded from OS entropy.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a transport with an explicit RNG, e.g. a seeded one for tests.
    pub fn with_rng(config: SearchConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn with_rng_locked<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard)
    }

    fn random_millis(&self, (min, max): (u64, u64)) -> u64 {
        if min >= max {
            return min;
        }
        self.with_rng_locked(|rng| rng.gen_range(min..=max))
    }

    /// Send one request and classify it, returning the body on success.
    async fn attempt(&self, url: &str, attempt: u32) -> Result<String, AttemptError> {
        let (user_agent, proxy) = self.with_rng_locked(|rng| {
            (
                http::pick_user_agent(&self.config, rng),
                http::pick_proxy(&self.config, rng),
            )
        });
        tracing::trace!(url, attempt, user_agent = %user_agent, proxy = ?proxy, "sending request");

        let client = match http::build_client(&self.config, &user_agent, proxy.as_deref()) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "request setup failed");
                return Err(AttemptError::Retry(RetryReason::Network));
            }
        };

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "request error");
                return Err(AttemptError::Retry(RetryReason::Network));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(status, error = %e, "response read failed");
                return Err(AttemptError::Retry(RetryReason::Network));
            }
        };
        tracing::trace!(status, bytes = body.len(), "response received");

        match classify(status, &body) {
            Classification::Success => Ok(body),
            Classification::Retry(reason) => Err(AttemptError::Retry(reason)),
            Classification::Fatal(status) => {
                tracing::error!(status, "unexpected status code");
                write_dump(&debug_dump_path(&self.config.debug_dir, status), &body).await;
                Err(AttemptError::Fatal)
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Option<String> {
        let mut attempt = 0u32;
        while attempt < self.config.max_retries {
            let pause = self.random_millis(self.config.request_delay_ms);
            tokio::time::sleep(Duration::from_millis(pause)).await;

            match self.attempt(url, attempt + 1).await {
                Ok(body) => return Some(body),
                Err(AttemptError::Fatal) => return None,
                Err(AttemptError::Retry(reason)) => {
                    attempt += 1;
                    match reason {
                        RetryReason::Blocked => {
                            tracing::warn!(attempt, "CAPTCHA or blocking detected, retrying")
                        }
                        RetryReason::Status(status) => {
                            tracing::warn!(attempt, status, "retryable status code")
                        }
                        RetryReason::Network => tracing::warn!(attempt, "network failure, retrying"),
                    }
                    if attempt < self.config.max_retries {
                        let jitter = self.random_millis(self.config.backoff_jitter_ms);
                        let delay = backoff_delay(attempt, self.config.backoff_base_ms, jitter);
                        tracing::debug!(?delay, "backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::error!(
            url,
            retries = self.config.max_retries,
            "request failed after all retries"
        );
        None
    }
}
