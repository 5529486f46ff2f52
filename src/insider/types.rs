use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use super::config::save_mint_targets;
use super::error::ScanError;
use crate::rpc::{RpcError, SignatureRecord};

/// Base58 account address of a transaction's fee payer.
pub type WalletAddress = String;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintTarget {
    pub token_name: String,
    pub mint_address: Pubkey,
    pub before_cursor: Option<Signature>, // Resume point, oldest signature already scanned
    pub after_cursor: Option<Signature>,  // Scanning never goes past this signature
}

impl MintTarget {
    pub fn new(token_name: impl Into<String>, mint_address: Pubkey) -> Self {
        Self {
            token_name: token_name.into(),
            mint_address,
            before_cursor: None,
            after_cursor: None,
        }
    }

    pub fn with_before_cursor(&self, before_cursor: Option<Signature>) -> Self {
        Self {
            before_cursor,
            ..self.clone()
        }
    }

    pub fn with_after_cursor(&self, after_cursor: Option<Signature>) -> Self {
        Self {
            after_cursor,
            ..self.clone()
        }
    }
}

/// Signer wallets per token, in the order the mints were scanned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletsByToken {
    entries: Vec<(String, Vec<WalletAddress>)>,
}

impl WalletsByToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the wallets for a token, replacing any earlier list for it.
    pub fn insert(&mut self, token_name: impl Into<String>, wallets: Vec<WalletAddress>) {
        let token_name = token_name.into();
        match self.entries.iter_mut().find(|(name, _)| *name == token_name) {
            Some((_, existing)) => *existing = wallets,
            None => self.entries.push((token_name, wallets)),
        }
    }

    pub fn get(&self, token_name: &str) -> Option<&[WalletAddress]> {
        self.entries
            .iter()
            .find(|(name, _)| name == token_name)
            .map(|(_, wallets)| wallets.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[WalletAddress])> {
        self.entries
            .iter()
            .map(|(name, wallets)| (name.as_str(), wallets.as_slice()))
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<WalletAddress>)> for WalletsByToken {
    fn from_iter<I: IntoIterator<Item = (S, Vec<WalletAddress>)>>(iter: I) -> Self {
        let mut wallets_by_token = Self::new();
        for (token_name, wallets) in iter {
            wallets_by_token.insert(token_name, wallets);
        }
        wallets_by_token
    }
}

/// Wallets that met the threshold, each mapped to the tokens it traded.
///
/// Serializes as a flat JSON object: `{ "<wallet>": ["<token>", ...] }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommonWalletsReport {
    wallets: BTreeMap<WalletAddress, Vec<String>>,
}

impl CommonWalletsReport {
    pub(crate) fn insert(&mut self, wallet: WalletAddress, token_names: Vec<String>) {
        self.wallets.insert(wallet, token_names);
    }

    pub fn get(&self, wallet: &str) -> Option<&[String]> {
        self.wallets.get(wallet).map(Vec::as_slice)
    }

    pub fn contains(&self, wallet: &str) -> bool {
        self.wallets.contains_key(wallet)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WalletAddress, &Vec<String>)> {
        self.wallets.iter()
    }

    pub fn to_json_pretty(&self) -> Result<String, ScanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ScanError> {
        let contents = self.to_json_pretty()?;
        fs::write(path, contents).map_err(|source| ScanError::ReportIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Signatures gathered for one mint by the paginator.
#[derive(Debug)]
pub struct PageResult {
    pub signatures: Vec<SignatureRecord>,
    /// Oldest signature collected, or the starting cursor if nothing was.
    pub before_cursor: Option<Signature>,
    /// Upstream failure that cut pagination short, if any.
    pub error: Option<RpcError>,
}

impl PageResult {
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }

    /// Slots of the newest and oldest collected signatures.
    pub fn slot_range(&self) -> Option<(u64, u64)> {
        let newest = self.signatures.first()?;
        let oldest = self.signatures.last()?;
        Some((newest.slot, oldest.slot))
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub wallets_by_token: WalletsByToken,
    pub report: CommonWalletsReport,
    pub updated_targets: Vec<MintTarget>,
    pub required_mint_count: usize,
}

impl ScanOutcome {
    /// Write the report (when any wallet qualified), then the advanced cursors.
    ///
    /// Cursors are left alone if the report cannot be written, so the next
    /// run covers the same history again. Returns whether a report was written.
    pub fn persist(&self, mint_config_path: &Path, result_path: &Path) -> Result<bool, ScanError> {
        let wrote_report = !self.report.is_empty();
        if wrote_report {
            self.report.write_to(result_path)?;
        }
        save_mint_targets(mint_config_path, &self.updated_targets)?;
        Ok(wrote_report)
    }
}
