pub mod insider;
pub mod rpc;
mod solana_config;

pub use solana_config::SolanaConfig;

// Re-export key types
pub use insider::{
    CommonWalletDetector,
    CommonWalletsReport,
    MintTarget,
    ScanConfig,
    ScanError,
    ScanOutcome,
    WalletsByToken,
};

pub use rpc::{
    ChainClient,
    RpcChainClient,
    RetryHandler,
};
