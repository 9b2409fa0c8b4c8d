//! The engine's seams. The orchestrator and poller are generic over these
//! traits so the whole pipeline can run against a mock marketplace and a mock
//! printer in tests, and against eBay plus CUPS in production.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::{
    errors::{MarketplaceError, PrintError},
    order_types::{Label, Order, PrintJob, VendorLabel},
    printing::JobKind,
};

/// The remote marketplace: order listing plus the label lifecycle.
#[allow(async_fn_in_trait)]
pub trait MarketplaceApi {
    /// Orders that are paid and not yet shipped, created after `since`.
    /// Every fulfillable order appears exactly once per call; the vendor's
    /// status field keeps already-shipped orders out.
    async fn list_fulfillable_orders(&self, since: DateTime<Utc>) -> Result<Vec<Order>, MarketplaceError>;

    /// Buy a shipping label. Spends real money; the engine only calls this
    /// for orders the vendor still reports as unlabelled.
    async fn purchase_label(&self, order: &Order) -> Result<VendorLabel, MarketplaceError>;

    /// Look up a label purchased in an earlier run, if any.
    async fn fetch_label(&self, order: &Order) -> Result<Option<VendorLabel>, MarketplaceError>;

    /// Void a purchased label and refund its cost. Compensating action only.
    async fn refund_label(&self, label: &Label) -> Result<(), MarketplaceError>;
}

/// A sink for rendered documents.
#[allow(async_fn_in_trait)]
pub trait DocumentPrinter {
    async fn submit(&self, document: &Path, kind: JobKind) -> Result<PrintJob, PrintError>;
}
