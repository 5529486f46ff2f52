use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use crate::rpc::{RateLimitError, RpcError};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write report to {path}: {source}")]
    ReportIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}
