use std::collections::{HashMap, HashSet};

use log::debug;

use super::types::{CommonWalletsReport, WalletAddress, WalletsByToken};

/// Mints a wallet must appear in: `ceil(min_percentage% of total_mints)`.
pub fn required_mint_count(total_mints: usize, min_percentage: f64) -> usize {
    if total_mints == 0 {
        return 0;
    }
    // Multiply before dividing so whole percentages stay exact
    (min_percentage * total_mints as f64 / 100.0).ceil() as usize
}

/// Wallets seen in at least `min_percentage` of the tokens, with the tokens
/// each one appeared in (in scan order).
pub fn aggregate(wallets_by_token: &WalletsByToken, min_percentage: f64) -> CommonWalletsReport {
    let mut report = CommonWalletsReport::default();
    if wallets_by_token.is_empty() {
        return report;
    }

    let required = required_mint_count(wallets_by_token.len(), min_percentage);
    let mut tokens_by_wallet: HashMap<&WalletAddress, Vec<String>> = HashMap::new();

    for (token_name, wallets) in wallets_by_token.iter() {
        let unique: HashSet<&WalletAddress> = wallets.iter().collect();
        for wallet in unique {
            tokens_by_wallet
                .entry(wallet)
                .or_default()
                .push(token_name.to_string());
        }
    }

    debug!(
        "{} distinct wallets across {} tokens, {} tokens required",
        tokens_by_wallet.len(),
        wallets_by_token.len(),
        required
    );

    for (wallet, token_names) in tokens_by_wallet {
        if token_names.len() >= required {
            report.insert(wallet.clone(), token_names);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallets(addresses: &[&str]) -> Vec<WalletAddress> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn threshold_rounds_up() {
        assert_eq!(required_mint_count(5, 80.0), 4);
        assert_eq!(required_mint_count(5, 70.0), 4);
        assert_eq!(required_mint_count(10, 70.0), 7);
        assert_eq!(required_mint_count(3, 50.0), 2);
        assert_eq!(required_mint_count(4, 100.0), 4);
        assert_eq!(required_mint_count(4, 0.0), 0);
        assert_eq!(required_mint_count(0, 80.0), 0);
    }

    #[test]
    fn reports_wallets_meeting_threshold() {
        let by_token: WalletsByToken = vec![
            ("A", wallets(&["W1", "W2"])),
            ("B", wallets(&["W1"])),
            ("C", wallets(&["W1", "W2"])),
            ("D", wallets(&["W1", "W3"])),
            ("E", wallets(&["W4"])),
        ]
        .into_iter()
        .collect();

        let report = aggregate(&by_token, 80.0);

        assert_eq!(report.len(), 1);
        assert_eq!(report.get("W1"), Some(&wallets(&["A", "B", "C", "D"])[..]));
        assert!(!report.contains("W2"));
    }

    #[test]
    fn repeated_wallet_counts_once_per_token() {
        let by_token: WalletsByToken = vec![
            ("A", wallets(&["W1", "W1", "W1"])),
            ("B", wallets(&["W2"])),
        ]
        .into_iter()
        .collect();

        let report = aggregate(&by_token, 100.0);
        assert!(report.is_empty());

        let report = aggregate(&by_token, 50.0);
        assert_eq!(report.get("W1"), Some(&wallets(&["A"])[..]));
    }

    #[test]
    fn empty_token_lists_count_toward_total() {
        let by_token: WalletsByToken = vec![
            ("A", wallets(&["W1"])),
            ("B", wallets(&["W1"])),
            ("C", Vec::new()),
            ("D", Vec::new()),
        ]
        .into_iter()
        .collect();

        // 2 of 4 tokens is below 60%
        assert!(aggregate(&by_token, 60.0).is_empty());
        assert!(aggregate(&by_token, 50.0).contains("W1"));
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = aggregate(&WalletsByToken::new(), 70.0);
        assert!(report.is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let by_token: WalletsByToken = vec![
            ("A", wallets(&["W1", "W2", "W3"])),
            ("B", wallets(&["W2", "W1"])),
            ("C", wallets(&["W3", "W1"])),
        ]
        .into_iter()
        .collect();

        assert_eq!(aggregate(&by_token, 60.0), aggregate(&by_token, 60.0));
    }

    #[test]
    fn never_reports_a_token_the_wallet_did_not_touch() {
        let by_token: WalletsByToken = vec![
            ("A", wallets(&["W1", "W2"])),
            ("B", wallets(&["W2", "W3"])),
            ("C", wallets(&["W1", "W3"])),
            ("D", wallets(&["W1", "W2", "W3"])),
        ]
        .into_iter()
        .collect();

        let report = aggregate(&by_token, 0.0);

        for (wallet, token_names) in report.iter() {
            for token_name in token_names {
                let seen = by_token.get(token_name).unwrap();
                assert!(seen.contains(wallet), "{} reported for {}", wallet, token_name);
            }
        }
        assert_eq!(report.len(), 3);
    }
}
