use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use super::types::MintTarget;
use crate::rpc::{RateLimitConfig, RetryConfig};

/// Upper bound the RPC node accepts for `getSignaturesForAddress`.
pub const MAX_PAGE_SIZE: usize = 1_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("Invalid mint address for token {token}: {value}")]
    InvalidAddress { token: String, value: String },

    #[error("Invalid cursor signature for token {token}: {value}")]
    InvalidCursor { token: String, value: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed mint configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub min_percentage: f64,         // Share of tracked mints a wallet must touch
    pub page_size: usize,            // Signatures requested per page
    pub total_cap: usize,            // Signatures collected per mint before stopping
    pub rate_limit: RateLimitConfig, // Pacing of transaction lookups
    pub retry: RetryConfig,
    pub mint_config_path: PathBuf,
    pub result_path: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_percentage: 70.0,
            page_size: 10,
            total_cap: 100,
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            mint_config_path: PathBuf::from("config.json"),
            result_path: PathBuf::from("result.json"),
        }
    }
}

impl ScanConfig {
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let requests_per_second: u32 =
            env_or("RESOLVER_REQUESTS_PER_SECOND", defaults.rate_limit.max_requests)?;
        let max_wait_ms: Option<u64> = env_opt("RESOLVER_MAX_WAIT_MS")?;
        let max_attempts: u32 = env_or("RPC_MAX_RETRIES", defaults.retry.max_attempts)?;

        let config = Self {
            min_percentage: env_or("MIN_PERCENTAGE", defaults.min_percentage)?,
            page_size: env_or("SIGNATURE_PAGE_SIZE", defaults.page_size)?,
            total_cap: env_or("SIGNATURE_TOTAL_CAP", defaults.total_cap)?,
            rate_limit: RateLimitConfig {
                max_wait: max_wait_ms.map(Duration::from_millis),
                ..RateLimitConfig::per_second(requests_per_second)
            },
            retry: RetryConfig {
                max_attempts,
                ..defaults.retry
            },
            mint_config_path: env_or("MINT_CONFIG_PATH", defaults.mint_config_path)?,
            result_path: env_or("RESULT_PATH", defaults.result_path)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.min_percentage) {
            return Err(invalid("MIN_PERCENTAGE", self.min_percentage));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(invalid("SIGNATURE_PAGE_SIZE", self.page_size));
        }
        if self.total_cap == 0 {
            return Err(invalid("SIGNATURE_TOTAL_CAP", self.total_cap));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.time_window == Duration::ZERO {
            return Err(invalid("RESOLVER_REQUESTS_PER_SECOND", self.rate_limit.max_requests));
        }
        if self.rate_limit.max_wait == Some(Duration::ZERO) {
            return Err(invalid("RESOLVER_MAX_WAIT_MS", 0));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("RPC_MAX_RETRIES", self.retry.max_attempts));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn env_opt<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(None),
    }
}

fn invalid(name: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// On-disk shape of one mint entry, keyed by token name in the file.
#[derive(Debug, Serialize, Deserialize)]
struct MintEntry {
    mint: String,
    #[serde(default)]
    before_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after_hash: Option<String>,
}

impl MintEntry {
    fn into_target(self, token_name: String) -> Result<MintTarget, ConfigError> {
        let mint_address = Pubkey::from_str(&self.mint).map_err(|_| ConfigError::InvalidAddress {
            token: token_name.clone(),
            value: self.mint.clone(),
        })?;
        let before_cursor = parse_cursor(&token_name, self.before_hash)?;
        let after_cursor = parse_cursor(&token_name, self.after_hash)?;

        Ok(MintTarget {
            token_name,
            mint_address,
            before_cursor,
            after_cursor,
        })
    }

    fn from_target(target: &MintTarget) -> Self {
        Self {
            mint: target.mint_address.to_string(),
            before_hash: target.before_cursor.map(|s| s.to_string()),
            after_hash: target.after_cursor.map(|s| s.to_string()),
        }
    }
}

fn parse_cursor(token_name: &str, value: Option<String>) -> Result<Option<Signature>, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Signature::from_str(value.trim())
            .map(Some)
            .map_err(|_| ConfigError::InvalidCursor {
                token: token_name.to_string(),
                value,
            }),
        _ => Ok(None),
    }
}

/// Parse the mint configuration, keeping the file's token order.
pub fn parse_mint_targets(contents: &str) -> Result<Vec<MintTarget>, ConfigError> {
    let entries: Map<String, Value> = serde_json::from_str(contents)?;

    entries
        .into_iter()
        .map(|(token_name, value)| {
            let entry: MintEntry = serde_json::from_value(value)?;
            entry.into_target(token_name)
        })
        .collect()
}

pub fn render_mint_targets(targets: &[MintTarget]) -> Result<String, ConfigError> {
    let mut entries = Map::new();
    for target in targets {
        entries.insert(
            target.token_name.clone(),
            serde_json::to_value(MintEntry::from_target(target))?,
        );
    }
    Ok(serde_json::to_string_pretty(&Value::Object(entries))?)
}

pub fn load_mint_targets(path: &Path) -> Result<Vec<MintTarget>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mint_targets(&contents)
}

/// Write targets back so the next run resumes from the updated cursors.
pub fn save_mint_targets(path: &Path, targets: &[MintTarget]) -> Result<(), ConfigError> {
    let contents = render_mint_targets(targets)?;
    fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
