use std::sync::Arc;

use log::{debug, error, info};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use super::config::{ConfigError, MAX_PAGE_SIZE};
use super::types::PageResult;
use crate::rpc::ChainClient;

/// Walks a mint's signature history backwards, one page at a time.
pub struct SignaturePaginator {
    client: Arc<dyn ChainClient>,
    page_size: usize,
    total_cap: usize,
}

impl SignaturePaginator {
    pub fn new(client: Arc<dyn ChainClient>, page_size: usize, total_cap: usize) -> Result<Self, ConfigError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                name: "page_size".to_string(),
                value: page_size.to_string(),
            });
        }
        if total_cap == 0 {
            return Err(ConfigError::InvalidValue {
                name: "total_cap".to_string(),
                value: total_cap.to_string(),
            });
        }

        Ok(Self {
            client,
            page_size,
            total_cap,
        })
    }

    /// Collect signatures older than `before_cursor`, newest first.
    ///
    /// Stops on an empty page, just short of `after_cursor`, or once
    /// `total_cap` signatures are held (the last page is kept whole). An
    /// upstream failure ends the scan early and is returned alongside what
    /// was already gathered.
    pub async fn paginate(
        &self,
        mint_address: &Pubkey,
        before_cursor: Option<Signature>,
        after_cursor: Option<Signature>,
    ) -> PageResult {
        let mut signatures = Vec::new();
        let mut before = before_cursor;

        loop {
            let page = match self
                .client
                .signatures_for_address(mint_address, self.page_size, before)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!("Failed to fetch signatures for mint {}: {}", mint_address, e);
                    return PageResult {
                        signatures,
                        before_cursor: before,
                        error: Some(e),
                    };
                }
            };

            if page.is_empty() {
                debug!("No more signatures for mint {}", mint_address);
                break;
            }

            if let Some(boundary) = after_cursor {
                if let Some(position) = page.iter().position(|record| record.signature == boundary) {
                    let newer = &page[..position];
                    if let Some(last) = newer.last() {
                        before = Some(last.signature);
                    }
                    signatures.extend_from_slice(newer);
                    info!(
                        "Reached resume boundary {} for mint {} after {} signatures",
                        boundary,
                        mint_address,
                        signatures.len()
                    );
                    break;
                }
            }

            if let (Some(newest), Some(oldest)) = (page.first(), page.last()) {
                debug!(
                    "Page of {} signatures for mint {} spans slots {}..={}",
                    page.len(),
                    mint_address,
                    oldest.slot,
                    newest.slot
                );
            }
            before = page.last().map(|record| record.signature);
            signatures.extend(page);
            debug!("Collected {} signatures for mint {}", signatures.len(), mint_address);

            if signatures.len() >= self.total_cap {
                break;
            }
        }

        PageResult {
            signatures,
            before_cursor: before,
            error: None,
        }
    }
}
