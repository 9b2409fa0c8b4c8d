use std::{sync::Arc, time::Duration};

use log::*;

use crate::{
    documents::DocumentStore,
    errors::LabelError,
    labels::LabelManager,
    order_types::{FailureStage, FulfillmentState, Label, Order, OrderId, OrderStatus, PackingSlip},
    packing::PackingSlipGenerator,
    printing::JobKind,
    traits::{DocumentPrinter, MarketplaceApi},
};

const MAX_PURCHASE_ATTEMPTS: u32 = 3;
const PURCHASE_BACKOFF: Duration = Duration::from_secs(2);

/// Where one pass over one order ended, with everything an operator needs to
/// follow up on a failure.
#[derive(Debug)]
pub struct FulfillmentOutcome {
    pub order_id: OrderId,
    pub state: FulfillmentState,
    pub label: Option<Label>,
    pub slip: Option<PackingSlip>,
    pub failure: Option<String>,
}

impl FulfillmentOutcome {
    pub fn is_done(&self) -> bool {
        self.state == FulfillmentState::Done
    }

    fn failed(order_id: &OrderId, stage: FailureStage, detail: String) -> Self {
        Self {
            order_id: order_id.clone(),
            state: FulfillmentState::Failed(stage),
            label: None,
            slip: None,
            failure: Some(detail),
        }
    }
}

/// Drives one order at a time through
/// `Fetched → LabelPurchased → SlipGenerated → LabelPrinted → SlipPrinted → Done`.
///
/// The vendor's reported order status is the checkpoint between runs: an
/// order already past `Paid` skips the purchase step and resumes from slip
/// generation. Failure policy per stage:
/// - label: validation and funding failures are final for the order and
///   logged for the operator; transient network failures are retried with
///   backoff a fixed number of times.
/// - slip: the label is already paid for, so the failure is logged loudly,
///   the label file is kept, and no refund happens.
/// - print: label and slip are submitted independently; failures keep the
///   documents on disk for manual reprint and trigger no refund.
pub struct FulfillmentOrchestrator<B: MarketplaceApi, P: DocumentPrinter> {
    labels: LabelManager<B>,
    slips: PackingSlipGenerator,
    printer: P,
}

impl<B: MarketplaceApi, P: DocumentPrinter> FulfillmentOrchestrator<B, P> {
    pub fn new(marketplace: Arc<B>, printer: P, store: DocumentStore) -> Self {
        Self {
            labels: LabelManager::new(marketplace, store.clone()),
            slips: PackingSlipGenerator::new(store),
            printer,
        }
    }

    pub async fn process_order(&self, order: &Order) -> FulfillmentOutcome {
        info!("📦 Processing order {} (vendor status: {})", order.id, order.status);

        let label = match self.obtain_label(order).await {
            Ok(label) => label,
            Err(e) => {
                error!("📦 Order {} failed at the label stage: {e}", order.id);
                return FulfillmentOutcome::failed(&order.id, FailureStage::Label, e.to_string());
            },
        };
        debug!("📦 Order {}: label ready, tracking {}", order.id, label.tracking_number);

        let slip = match self.slips.render(order) {
            Ok(slip) => slip,
            Err(e) => {
                error!(
                    "📦 Order {}: the label is purchased and paid for, but the packing slip failed to render: {e}. \
                     The label is kept at {}; regenerate the slip manually. No refund was issued.",
                    order.id,
                    label.document.display()
                );
                let mut outcome = FulfillmentOutcome::failed(&order.id, FailureStage::Slip, e.to_string());
                outcome.label = Some(label);
                return outcome;
            },
        };

        // Both documents are submitted regardless of each other's outcome;
        // the operator reprints whichever one failed from the retained files.
        let label_print = self.printer.submit(&label.document, JobKind::Label).await;
        let slip_print = self.printer.submit(&slip.document, JobKind::PackingSlip).await;
        let mut failures = Vec::new();
        if let Err(e) = &label_print {
            error!("📦 Order {}: label failed to print: {e}. The file remains at {}", order.id, label.document.display());
            failures.push(format!("label: {e}"));
        }
        if let Err(e) = &slip_print {
            error!("📦 Order {}: packing slip failed to print: {e}. The file remains at {}", order.id, slip.document.display());
            failures.push(format!("slip: {e}"));
        }
        if !failures.is_empty() {
            let mut outcome = FulfillmentOutcome::failed(&order.id, FailureStage::Print, failures.join("; "));
            outcome.label = Some(label);
            outcome.slip = Some(slip);
            return outcome;
        }

        info!("📦 Order {} fulfilled: label and packing slip are printed", order.id);
        FulfillmentOutcome {
            order_id: order.id.clone(),
            state: FulfillmentState::Done,
            label: Some(label),
            slip: Some(slip),
            failure: None,
        }
    }

    /// Purchase a label, or recover the one the vendor already has on
    /// record. Purchase happens only when the vendor still reports the order
    /// as `Paid`; that status check, not local memory, is what prevents a
    /// double purchase on rerun.
    async fn obtain_label(&self, order: &Order) -> Result<Label, LabelError> {
        match order.status {
            OrderStatus::Paid => self.purchase_with_retry(order).await,
            _ => {
                info!("📦 Order {} already has a label per vendor status. Skipping purchase.", order.id);
                self.labels.existing(order).await
            },
        }
    }

    async fn purchase_with_retry(&self, order: &Order) -> Result<Label, LabelError> {
        let mut attempt = 1;
        loop {
            match self.labels.purchase(order).await {
                Ok(label) => return Ok(label),
                Err(LabelError::Marketplace(e)) if e.is_retryable() && attempt < MAX_PURCHASE_ATTEMPTS => {
                    let delay = PURCHASE_BACKOFF * 2u32.pow(attempt - 1);
                    warn!(
                        "📦 Transient failure purchasing label for order {} (attempt {attempt}/{MAX_PURCHASE_ATTEMPTS}): \
                         {e}. Retrying in {}s",
                        order.id,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }
}
