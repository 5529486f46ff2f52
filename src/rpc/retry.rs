// src/rpc/retry.rs
use tokio::time::Duration;
use std::future::Future;

use super::error::{RpcError, TRANSIENT_RPC_CODES};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// JSON-RPC error codes worth another attempt. Any other code the node
    /// answers with fails the call straight away.
    pub transient_codes: Vec<i64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            transient_codes: TRANSIENT_RPC_CODES.to_vec(),
        }
    }
}

/// Re-issues RPC calls that failed for reasons the node may recover from.
#[derive(Debug, Clone)]
pub struct RetryHandler {
    config: RetryConfig,
}

impl RetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub async fn retry<F, Fut, T>(&self, operation: F) -> Result<T, RpcError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let mut attempt = 1;
        let mut delay = self.config.initial_delay;

        loop {
            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            if !error.is_transient(&self.config.transient_codes) {
                if let Some(code) = error.response_code() {
                    log::debug!("RPC node rejected the request with code {}, not retrying", code);
                }
                return Err(error);
            }
            if attempt >= self.config.max_attempts {
                log::warn!("RPC call failed after {} attempts: {}", attempt, error);
                return Err(error);
            }

            log::warn!(
                "RPC call failed (attempt {}/{}): {}. Retrying in {:?}...",
                attempt,
                self.config.max_attempts,
                error,
                delay
            );

            tokio::time::sleep(delay).await;
            delay = self.next_delay(delay);
            attempt += 1;
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay
            .mul_f64(self.config.backoff_factor)
            .min(self.config.max_delay)
    }
}
