use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;

use crate::insider::config::ConfigError;

#[derive(Debug, Clone)]
pub struct SolanaConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
}

impl SolanaConfig {
    // Default mainnet configuration
    pub fn mainnet_default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
        }
    }

    pub fn custom(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            rpc_url,
            commitment,
        }
    }

    /// Reads `SOLANA_RPC_URL` (required) and `SOLANA_COMMITMENT`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let rpc_url = env::var("SOLANA_RPC_URL")
            .map_err(|_| ConfigError::MissingVariable("SOLANA_RPC_URL".to_string()))?;

        let commitment = match env::var("SOLANA_COMMITMENT") {
            Ok(value) => parse_commitment(&value)?,
            Err(_) => CommitmentConfig::confirmed(),
        };

        Ok(Self::custom(rpc_url, commitment))
    }

    // Create RPC client
    pub fn create_rpc_client(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), self.commitment)
    }
}

fn parse_commitment(value: &str) -> Result<CommitmentConfig, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(ConfigError::InvalidValue {
            name: "SOLANA_COMMITMENT".to_string(),
            value: other.to_string(),
        }),
    }
}
