pub mod aggregator;
pub mod config;
mod detector;
mod error;
mod extractor;
mod paginator;
mod resolver;
mod types;

pub use aggregator::{aggregate, required_mint_count};
pub use config::{ConfigError, ScanConfig};
pub use detector::CommonWalletDetector;
pub use error::ScanError;
pub use extractor::WalletExtractor;
pub use paginator::SignaturePaginator;
pub use resolver::{SignatureInput, TransactionResolver};
pub use types::{
    CommonWalletsReport,
    MintTarget,
    PageResult,
    ScanOutcome,
    WalletAddress,
    WalletsByToken,
};
