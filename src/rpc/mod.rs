mod client;
mod error;
pub mod rate_limiter;
pub mod retry;

pub use client::{ChainClient, RpcChainClient, SignatureRecord};
#[cfg(test)]
pub use client::MockChainClient;
pub use error::{RpcError, TRANSIENT_RPC_CODES};
pub use rate_limiter::{RateLimitConfig, RateLimitError, RateLimiter};
pub use retry::{RetryConfig, RetryHandler};
