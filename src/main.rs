use std::sync::Arc;

use log::info;
use dotenv::dotenv;

use insider_wallet_scanner::{
    insider::config::load_mint_targets,
    CommonWalletDetector,
    RetryHandler,
    RpcChainClient,
    ScanConfig,
    SolanaConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = load_configuration()?;
    let scan_config = &config.scan_config;

    let targets = load_mint_targets(&scan_config.mint_config_path)?;
    info!(
        "Loaded {} mints from {}",
        targets.len(),
        scan_config.mint_config_path.display()
    );

    let client = RpcChainClient::new(
        config.solana_config.create_rpc_client(),
        RetryHandler::new(scan_config.retry.clone()),
    );
    let detector = CommonWalletDetector::new(Arc::new(client), scan_config)?;

    let outcome = detector.run(&targets).await;

    let wrote_report = outcome.persist(&scan_config.mint_config_path, &scan_config.result_path)?;

    if !wrote_report {
        println!(
            "No wallets found that appear in at least {}% of tokens.",
            scan_config.min_percentage
        );
        return Ok(());
    }

    println!(
        "Wallets (appearing in at least {}% of tokens): {}",
        scan_config.min_percentage,
        outcome.report.to_json_pretty()?
    );
    info!("Report written to {}", scan_config.result_path.display());

    Ok(())
}

fn load_configuration() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig {
        solana_config: SolanaConfig::load_from_env()?,
        scan_config: ScanConfig::load_from_env()?,
    })
}

// Configuration struct to hold different component configurations
struct AppConfig {
    solana_config: SolanaConfig,
    scan_config: ScanConfig,
}
