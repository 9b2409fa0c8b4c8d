//! Fulfillment Engine
//!
//! The core of the eBay label printer: given a marketplace that reports paid, unshipped orders, this
//! crate purchases a shipping label per order, renders a packing slip, and dispatches both documents
//! to a printer, one order at a time.
//!
//! The crate is marketplace-agnostic. The seams are the two traits in [`mod@traits`]:
//! [`MarketplaceApi`] (order listing, label purchase/lookup/refund) and [`DocumentPrinter`]
//! (document submission). The eBay-backed implementation of the former lives in the binary crate;
//! [`CupsPrinter`] is the stock implementation of the latter.
//!
//! The vendor's own order status is the single source of truth for what has already been processed.
//! There is no local ledger of seen orders: an order that already carries a label is resumed from
//! slip generation instead of being re-purchased. Per-order failures are absorbed into a
//! [`FulfillmentOutcome`] so one bad order never stops the rest of a polling pass.

pub mod documents;
pub mod errors;
pub mod labels;
pub mod orchestrator;
pub mod order_types;
pub mod packing;
pub mod poller;
pub mod printing;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use documents::DocumentStore;
pub use labels::LabelManager;
pub use orchestrator::{FulfillmentOrchestrator, FulfillmentOutcome};
pub use packing::PackingSlipGenerator;
pub use poller::{OrderPoller, MAX_CONSECUTIVE_AUTH_FAILURES};
pub use printing::{CupsPrinter, JobKind, PrinterTarget};
pub use traits::{DocumentPrinter, MarketplaceApi};
