use log::{debug, error, warn};

use super::error::ScanError;
use super::resolver::TransactionResolver;
use super::types::WalletAddress;
use crate::rpc::{RateLimiter, SignatureRecord};

pub struct WalletExtractor {
    resolver: TransactionResolver,
    rate_limiter: RateLimiter,
}

impl WalletExtractor {
    pub fn new(resolver: TransactionResolver, rate_limiter: RateLimiter) -> Self {
        Self {
            resolver,
            rate_limiter,
        }
    }

    /// Signer wallets of `signatures`, in the order given.
    ///
    /// Unresolvable transactions are skipped. A refused rate limit permit
    /// aborts the whole mint.
    pub async fn extract_wallets(
        &self,
        token_name: &str,
        signatures: &[SignatureRecord],
    ) -> Result<Vec<WalletAddress>, ScanError> {
        let mut wallets = Vec::with_capacity(signatures.len());

        for (i, record) in signatures.iter().enumerate() {
            if let Err(e) = self.rate_limiter.acquire().await {
                error!("Error parsing transactions for token {}: {}", token_name, e);
                return Err(e.into());
            }

            debug!(
                "Resolving {} transaction {}/{} ({})",
                token_name,
                i + 1,
                signatures.len(),
                record.signature
            );

            match self.resolver.resolve_signer(record.signature).await {
                Some(wallet) => wallets.push(wallet),
                None => warn!("Skipping unresolved transaction {} for token {}", record.signature, token_name),
            }
        }

        Ok(wallets)
    }
}
