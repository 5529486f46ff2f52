use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Signature,
};
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;
use log::debug;

#[cfg(test)]
use mockall::automock;

use super::error::RpcError;
use super::retry::RetryHandler;

/// One entry of a `getSignaturesForAddress` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub signature: Signature,
    pub slot: u64,
}

/// The two upstream operations the scanner consumes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Newest-first page of signatures for `address`, older than `before` when set.
    async fn signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
        before: Option<Signature>,
    ) -> Result<Vec<SignatureRecord>, RpcError>;

    /// Static account keys of the transaction message, fee payer first.
    async fn transaction_account_keys(&self, signature: &Signature) -> Result<Vec<Pubkey>, RpcError>;
}

pub struct RpcChainClient {
    client: RpcClient,
    commitment: CommitmentConfig,
    retry_handler: RetryHandler,
}

impl RpcChainClient {
    pub fn new(client: RpcClient, retry_handler: RetryHandler) -> Self {
        let commitment = client.commitment();
        Self {
            client,
            commitment,
            retry_handler,
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
        before: Option<Signature>,
    ) -> Result<Vec<SignatureRecord>, RpcError> {
        let statuses = self
            .retry_handler
            .retry(move || async move {
                let config = GetConfirmedSignaturesForAddress2Config {
                    before,
                    until: None,
                    limit: Some(limit),
                    commitment: Some(self.commitment),
                };
                self.client
                    .get_signatures_for_address_with_config(address, config)
                    .await
                    .map_err(RpcError::from)
            })
            .await?;

        debug!("Fetched {} signatures for {}", statuses.len(), address);

        statuses
            .into_iter()
            .map(|status| {
                let signature = Signature::from_str(&status.signature)
                    .map_err(|e| RpcError::InvalidSignature(format!("{}: {}", status.signature, e)))?;
                Ok(SignatureRecord {
                    signature,
                    slot: status.slot,
                })
            })
            .collect()
    }

    async fn transaction_account_keys(&self, signature: &Signature) -> Result<Vec<Pubkey>, RpcError> {
        let transaction = self
            .retry_handler
            .retry(move || async move {
                let config = RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Base64),
                    commitment: Some(self.commitment),
                    max_supported_transaction_version: Some(0),
                };
                self.client
                    .get_transaction_with_config(signature, config)
                    .await
                    .map_err(RpcError::from)
            })
            .await?;

        let decoded = transaction
            .transaction
            .transaction
            .decode()
            .ok_or_else(|| RpcError::DecodeError(format!("cannot decode transaction {}", signature)))?;

        Ok(decoded.message.static_account_keys().to_vec())
    }
}
