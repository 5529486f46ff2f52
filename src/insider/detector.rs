use std::sync::Arc;

use log::{debug, error, info, warn};

use super::{
    aggregator::{aggregate, required_mint_count},
    config::ScanConfig,
    error::ScanError,
    extractor::WalletExtractor,
    paginator::SignaturePaginator,
    resolver::TransactionResolver,
    types::{MintTarget, ScanOutcome, WalletAddress, WalletsByToken},
};
use crate::rpc::{ChainClient, RateLimiter};

/// Finds wallets that signed transactions across many of the tracked mints.
pub struct CommonWalletDetector {
    paginator: SignaturePaginator,
    extractor: WalletExtractor,
    min_percentage: f64,
}

impl CommonWalletDetector {
    pub fn new(client: Arc<dyn ChainClient>, config: &ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;

        let paginator = SignaturePaginator::new(Arc::clone(&client), config.page_size, config.total_cap)?;
        let rate_limiter = RateLimiter::new(config.rate_limit.clone())?;
        let extractor = WalletExtractor::new(TransactionResolver::new(client), rate_limiter);

        Ok(Self {
            paginator,
            extractor,
            min_percentage: config.min_percentage,
        })
    }

    /// Scan every target in order and aggregate the signers.
    ///
    /// Failures are contained per mint; the returned targets carry the new
    /// `before_cursor` for the next run.
    pub async fn run(&self, targets: &[MintTarget]) -> ScanOutcome {
        let mut wallets_by_token = WalletsByToken::new();
        let mut updated_targets = Vec::with_capacity(targets.len());

        info!("Scanning {} mints", targets.len());

        for target in targets {
            let (wallets, updated) = self.scan_mint(target).await;
            wallets_by_token.insert(target.token_name.clone(), wallets);
            updated_targets.push(updated);
        }

        let required = required_mint_count(wallets_by_token.len(), self.min_percentage);
        let report = aggregate(&wallets_by_token, self.min_percentage);

        info!(
            "Found {} wallets in at least {} of {} mints ({}%)",
            report.len(),
            required,
            wallets_by_token.len(),
            self.min_percentage
        );

        ScanOutcome {
            wallets_by_token,
            report,
            updated_targets,
            required_mint_count: required,
        }
    }

    async fn scan_mint(&self, target: &MintTarget) -> (Vec<WalletAddress>, MintTarget) {
        let page = self
            .paginator
            .paginate(&target.mint_address, target.before_cursor, target.after_cursor)
            .await;

        if let Some(e) = &page.error {
            warn!(
                "Continuing with {} signatures for {} after fetch error: {}",
                page.signatures.len(),
                target.token_name,
                e
            );
        }

        if let Some((newest, oldest)) = page.slot_range() {
            debug!("{}: history scanned from slot {} back to slot {}", target.token_name, newest, oldest);
        }

        let updated = target.with_before_cursor(page.before_cursor);

        let wallets = match self
            .extractor
            .extract_wallets(&target.token_name, &page.signatures)
            .await
        {
            Ok(wallets) => wallets,
            Err(e) => {
                error!("No wallets recorded for {}: {}", target.token_name, e);
                Vec::new()
            }
        };

        info!(
            "{}: {} signatures scanned, {} signer wallets resolved",
            target.token_name,
            page.signatures.len(),
            wallets.len()
        );

        (wallets, updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{MockChainClient, RateLimitConfig, RpcError, SignatureRecord};
    use solana_sdk::{pubkey::Pubkey, signature::Signature};
    use std::collections::HashMap;
    use std::time::Duration;

    /// One mint's history: its page of signatures and who signed each.
    struct MintHistory {
        target: MintTarget,
        records: Vec<SignatureRecord>,
    }

    fn history(token_name: &str, signers: &[Pubkey], signer_of: &mut HashMap<Signature, Pubkey>) -> MintHistory {
        let records: Vec<SignatureRecord> = signers
            .iter()
            .enumerate()
            .map(|(i, signer)| {
                let signature = Signature::new_unique();
                signer_of.insert(signature, *signer);
                SignatureRecord {
                    signature,
                    slot: 500 - i as u64,
                }
            })
            .collect();

        MintHistory {
            target: MintTarget::new(token_name, Pubkey::new_unique()),
            records,
        }
    }

    fn mock_chain(histories: &[MintHistory], signer_of: HashMap<Signature, Pubkey>) -> Arc<dyn ChainClient> {
        let pages: HashMap<Pubkey, Vec<SignatureRecord>> = histories
            .iter()
            .map(|h| (h.target.mint_address, h.records.clone()))
            .collect();

        let mut client = MockChainClient::new();
        client
            .expect_signatures_for_address()
            .returning(move |mint, _, before| match before {
                // Single page per mint, then the history is exhausted
                None => Ok(pages.get(mint).cloned().unwrap_or_default()),
                Some(_) => Ok(Vec::new()),
            });
        client
            .expect_transaction_account_keys()
            .returning(move |signature| {
                signer_of
                    .get(signature)
                    .map(|signer| vec![*signer])
                    .ok_or_else(|| RpcError::RpcError("transaction not found".to_string()))
            });

        Arc::new(client)
    }

    fn config(min_percentage: f64) -> ScanConfig {
        ScanConfig {
            min_percentage,
            ..ScanConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reports_wallet_active_in_four_of_five_mints() {
        let w1 = Pubkey::new_unique();
        let w2 = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let mut signer_of = HashMap::new();

        let histories = vec![
            history("BONK", &[w1, w2, w1], &mut signer_of),
            history("WIF", &[w1, other], &mut signer_of),
            history("POPCAT", &[other, w2], &mut signer_of),
            history("MEW", &[w1], &mut signer_of),
            history("BOME", &[other, w1], &mut signer_of),
        ];
        let targets: Vec<MintTarget> = histories.iter().map(|h| h.target.clone()).collect();

        let detector = CommonWalletDetector::new(mock_chain(&histories, signer_of), &config(80.0)).unwrap();
        let outcome = detector.run(&targets).await;

        assert_eq!(outcome.required_mint_count, 4);
        assert_eq!(outcome.report.len(), 1);
        assert_eq!(
            outcome.report.get(&w1.to_string()),
            Some(&["BONK".to_string(), "WIF".to_string(), "MEW".to_string(), "BOME".to_string()][..])
        );
        assert!(!outcome.report.contains(&w2.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_targets_with_advanced_cursors() {
        let signer = Pubkey::new_unique();
        let mut signer_of = HashMap::new();
        let histories = vec![
            history("BONK", &[signer, signer], &mut signer_of),
            history("EMPTY", &[], &mut signer_of),
        ];
        let after = Signature::new_unique();
        let targets = vec![
            histories[0].target.with_after_cursor(Some(after)),
            histories[1].target.clone(),
        ];

        let detector = CommonWalletDetector::new(mock_chain(&histories, signer_of), &config(70.0)).unwrap();
        let outcome = detector.run(&targets).await;

        assert_eq!(outcome.updated_targets.len(), 2);
        assert_eq!(outcome.updated_targets[0].before_cursor, Some(histories[0].records[1].signature));
        assert_eq!(outcome.updated_targets[0].after_cursor, Some(after));
        assert_eq!(outcome.updated_targets[1].before_cursor, None);
        // Originals are untouched
        assert_eq!(targets[0].before_cursor, None);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_mint_contributes_zero_wallets() {
        let w1 = Pubkey::new_unique();
        let broken = MintTarget::new("BROKEN", Pubkey::new_unique());
        let healthy = MintTarget::new("HEALTHY", Pubkey::new_unique());
        let healthy_signature = Signature::new_unique();
        let broken_mint = broken.mint_address;

        let mut client = MockChainClient::new();
        client
            .expect_signatures_for_address()
            .returning(move |mint, _, before| {
                if *mint == broken_mint {
                    Err(RpcError::NetworkError("connection refused".to_string()))
                } else if before.is_none() {
                    Ok(vec![SignatureRecord { signature: healthy_signature, slot: 1 }])
                } else {
                    Ok(Vec::new())
                }
            });
        client
            .expect_transaction_account_keys()
            .returning(move |_| Ok(vec![w1]));

        let detector = CommonWalletDetector::new(Arc::new(client), &config(50.0)).unwrap();
        let outcome = detector.run(&[broken, healthy]).await;

        assert_eq!(outcome.wallets_by_token.len(), 2);
        assert!(outcome.wallets_by_token.get("BROKEN").unwrap().is_empty());
        assert_eq!(outcome.report.get(&w1.to_string()), Some(&["HEALTHY".to_string()][..]));
        assert_eq!(outcome.updated_targets[0].before_cursor, None);
        assert_eq!(outcome.updated_targets[1].before_cursor, Some(healthy_signature));
    }

    #[tokio::test(start_paused = true)]
    async fn refused_rate_limit_skips_only_that_mint() {
        let w1 = Pubkey::new_unique();
        let mut signer_of = HashMap::new();
        let histories = vec![
            history("FIRST", &[w1], &mut signer_of),
            history("SECOND", &[w1], &mut signer_of),
        ];
        let targets: Vec<MintTarget> = histories.iter().map(|h| h.target.clone()).collect();
        let strict = ScanConfig {
            rate_limit: RateLimitConfig {
                max_requests: 1,
                time_window: Duration::from_secs(60),
                burst: 1,
                max_wait: Some(Duration::from_secs(1)),
            },
            ..config(50.0)
        };

        let detector = CommonWalletDetector::new(mock_chain(&histories, signer_of), &strict).unwrap();
        let outcome = detector.run(&targets).await;

        assert_eq!(outcome.wallets_by_token.get("FIRST"), Some(&[w1.to_string()][..]));
        assert!(outcome.wallets_by_token.get("SECOND").unwrap().is_empty());
        assert_eq!(outcome.report.get(&w1.to_string()), Some(&["FIRST".to_string()][..]));
    }

    #[tokio::test]
    async fn no_targets_gives_empty_outcome() {
        let detector = CommonWalletDetector::new(Arc::new(MockChainClient::new()), &config(70.0)).unwrap();
        let outcome = detector.run(&[]).await;

        assert!(outcome.report.is_empty());
        assert!(outcome.wallets_by_token.is_empty());
        assert!(outcome.updated_targets.is_empty());
        assert_eq!(outcome.required_mint_count, 0);
    }

    #[test]
    fn rejects_invalid_config() {
        let result = CommonWalletDetector::new(Arc::new(MockChainClient::new()), &config(150.0));
        assert!(matches!(result, Err(ScanError::Config(_))));
    }
}
