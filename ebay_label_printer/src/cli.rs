use clap::Parser;

/// Watches an eBay seller account for paid orders, buys a shipping label for
/// each, renders a packing slip, and sends both to the configured printer.
/// Credentials and targets come from environment variables: EBAY_CLIENT_ID,
/// EBAY_CLIENT_SECRET, EBAY_REFRESH_TOKEN, EBAY_ENVIRONMENT, CUPS_SERVER_URI,
/// PRINTER_NAME, POLLING_INTERVAL, DRY_RUN, DATA_DIR.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Arguments {
    /// Run a single polling pass and exit instead of looping forever
    #[arg(long)]
    pub once: bool,
    /// Log print jobs instead of submitting them, whatever DRY_RUN says
    #[arg(long)]
    pub dry_run: bool,
}
