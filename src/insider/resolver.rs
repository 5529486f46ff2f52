use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error};
use solana_sdk::signature::Signature;

use super::types::WalletAddress;
use crate::rpc::{ChainClient, RpcError};

/// A signature as handed to the resolver, parsed or still base58-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureInput {
    Parsed(Signature),
    Encoded(String),
}

impl SignatureInput {
    pub fn normalize(self) -> Result<Signature, RpcError> {
        match self {
            SignatureInput::Parsed(signature) => Ok(signature),
            SignatureInput::Encoded(encoded) => Signature::from_str(encoded.trim())
                .map_err(|e| RpcError::InvalidSignature(format!("{}: {}", encoded, e))),
        }
    }
}

impl From<Signature> for SignatureInput {
    fn from(signature: Signature) -> Self {
        SignatureInput::Parsed(signature)
    }
}

impl From<&Signature> for SignatureInput {
    fn from(signature: &Signature) -> Self {
        SignatureInput::Parsed(*signature)
    }
}

impl From<String> for SignatureInput {
    fn from(encoded: String) -> Self {
        SignatureInput::Encoded(encoded)
    }
}

impl From<&str> for SignatureInput {
    fn from(encoded: &str) -> Self {
        SignatureInput::Encoded(encoded.to_string())
    }
}

pub struct TransactionResolver {
    client: Arc<dyn ChainClient>,
}

impl TransactionResolver {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    /// Fee payer of the transaction, i.e. account key 0 of its message.
    ///
    /// Fetch and decode failures are logged and come back as `None`.
    pub async fn resolve_signer(&self, signature: impl Into<SignatureInput>) -> Option<WalletAddress> {
        let signature = match signature.into().normalize() {
            Ok(signature) => signature,
            Err(e) => {
                error!("Error checking transaction: {}", e);
                return None;
            }
        };

        match self.client.transaction_account_keys(&signature).await {
            Ok(account_keys) => match account_keys.first() {
                Some(signer) => {
                    debug!("Transaction {} signed by {}", signature, signer);
                    Some(signer.to_string())
                }
                None => {
                    error!("Error checking transaction {}: message has no account keys", signature);
                    None
                }
            },
            Err(e) => {
                error!("Error checking transaction {}: {}", signature, e);
                None
            }
        }
    }
}
