//! Token bucket rate limiter for upstream RPC calls.
//!
//! Callers `acquire` a permit before each request. When the bucket is empty the
//! caller waits for the next refill instead of failing, unless the wait would
//! exceed the configured `max_wait`.
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use log::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateLimitError {
    #[error("Rate limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Rate limiter configuration error: {0}")]
    ConfigurationError(String),
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Permits refilled per `time_window`.
    pub max_requests: u32,
    pub time_window: Duration,
    /// Bucket capacity. A burst of 1 spaces calls evenly.
    pub burst: u32,
    /// Longest a caller may wait for a permit; `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // One call every 200ms
        Self {
            max_requests: 5,
            time_window: Duration::from_secs(1),
            burst: 1,
            max_wait: None,
        }
    }
}

impl RateLimitConfig {
    pub fn per_second(requests: u32) -> Self {
        Self {
            max_requests: requests,
            ..Self::default()
        }
    }

    fn refill_interval(&self) -> Duration {
        self.time_window / self.max_requests
    }
}

#[derive(Debug)]
struct BucketState {
    available_tokens: u32,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        if config.max_requests == 0 {
            return Err(RateLimitError::ConfigurationError(
                "max_requests must be greater than 0".to_string(),
            ));
        }
        if config.time_window.is_zero() {
            return Err(RateLimitError::ConfigurationError(
                "time_window must be greater than 0".to_string(),
            ));
        }
        if config.burst == 0 {
            return Err(RateLimitError::ConfigurationError(
                "burst must be greater than 0".to_string(),
            ));
        }

        let state = BucketState {
            available_tokens: config.burst,
            last_refill: Instant::now(),
        };

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    /// Wait until a permit is available and take it.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state, Instant::now());

                if state.available_tokens > 0 {
                    state.available_tokens -= 1;
                    return Ok(());
                }

                let next_refill = state.last_refill + self.config.refill_interval();
                next_refill.saturating_duration_since(Instant::now())
            };

            if let Some(max_wait) = self.config.max_wait {
                if wait > max_wait {
                    return Err(RateLimitError::LimitExceeded(format!(
                        "next permit in {:?}, max wait is {:?}",
                        wait, max_wait
                    )));
                }
            }

            debug!("Rate limiter waiting {:?} for next permit", wait);
            tokio::time::sleep(wait).await;
        }
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let interval = self.config.refill_interval();
        let elapsed = now.saturating_duration_since(state.last_refill);
        let new_tokens = (elapsed.as_nanos() / interval.as_nanos().max(1)) as u64;
        if new_tokens == 0 {
            return;
        }

        let refilled = (state.available_tokens as u64 + new_tokens).min(self.config.burst as u64);
        state.available_tokens = refilled as u32;
        if state.available_tokens == self.config.burst {
            state.last_refill = now;
        } else {
            state.last_refill += interval * new_tokens as u32;
        }
    }
}
