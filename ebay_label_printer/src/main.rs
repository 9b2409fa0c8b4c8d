use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use ebay_tools::EbayApi;
use fulfillment_engine::{CupsPrinter, DocumentStore, FulfillmentOrchestrator, OrderPoller};
use log::*;
use tokio::sync::watch;

use crate::{cli::Arguments, config::AppConfig, marketplace::EbayMarketplace};

mod cli;
mod config;
mod marketplace;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    let config = match AppConfig::try_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        },
    };

    info!("🚀️ Starting eBay label printer against the {} environment", config.ebay.environment);
    match run(args, config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}

async fn run(args: Arguments, config: AppConfig) -> anyhow::Result<()> {
    let api = EbayApi::new(config.ebay.clone())?;
    let marketplace = Arc::new(EbayMarketplace::new(api));

    // An unreachable printer degrades the run to dry-run rather than aborting
    let mut dry_run = config.dry_run || args.dry_run;
    let probe = CupsPrinter::new(config.printer.clone(), dry_run);
    if let Err(e) = probe.check_printer().await {
        warn!("🖨️ Could not reach printer {}: {e}. Continuing in dry-run mode.", config.printer);
        dry_run = true;
    }
    let printer = CupsPrinter::new(config.printer.clone(), dry_run);

    let store = DocumentStore::new(config.data_dir.clone());
    let orchestrator = FulfillmentOrchestrator::new(marketplace.clone(), printer, store);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller = OrderPoller::new(marketplace, orchestrator, config.poll_interval, shutdown_rx);

    info!(
        "🚀️ Printer: {}. Polling interval: {}s. Dry run: {dry_run}",
        config.printer,
        config.poll_interval.as_secs()
    );

    if args.once {
        poller.run_once().await?;
        return Ok(());
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🚀️ Shutdown signal received. The order in flight will finish first.");
            let _ = shutdown_tx.send(true);
        }
    });
    poller.run().await?;
    Ok(())
}
