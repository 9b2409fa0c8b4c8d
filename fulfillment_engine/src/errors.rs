use std::path::PathBuf;

use thiserror::Error;

use crate::order_types::OrderId;

/// Marketplace failures as the engine's failure policy sees them. Backends
/// map their own error types onto these variants; the orchestrator only ever
/// branches on this taxonomy.
#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("Authentication with the marketplace failed: {0}")]
    Auth(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("The marketplace rejected the order data: {0}")]
    Validation(String),
    #[error("Transient network failure: {0}")]
    TransientNetwork(String),
    #[error("Marketplace error: {0}")]
    Vendor(String),
}

impl MarketplaceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketplaceError::TransientNetwork(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, MarketplaceError::Auth(_))
    }
}

#[derive(Debug, Error)]
pub enum LabelError {
    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),
    #[error("Could not store the label document: {0}")]
    Storage(#[from] std::io::Error),
    #[error(
        "A label was already purchased for order {0}, but its document is not available locally or from the vendor. \
         Download it manually before re-running."
    )]
    DocumentMissing(OrderId),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Order {order_id} is missing address fields required for layout: {}", fields.join(", "))]
    MissingAddressFields { order_id: OrderId, fields: Vec<&'static str> },
    #[error("Could not encode the order id into a QR code: {0}")]
    Qr(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("Could not write the packing slip: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Document not found: {0}")]
    MissingDocument(PathBuf),
    #[error("Could not launch the print command: {0}")]
    Launch(#[from] std::io::Error),
    #[error("The spooler rejected the job for {document}: {detail}")]
    Rejected { document: PathBuf, detail: String },
    #[error("Printer {printer} is not reachable: {detail}")]
    PrinterUnavailable { printer: String, detail: String },
}

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("Polling halted after {0} consecutive authentication failures. Credentials need operator attention.")]
    AuthHalt(u32),
}
