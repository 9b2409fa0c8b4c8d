use std::sync::Arc;

use log::*;

use crate::{
    documents::DocumentStore,
    errors::LabelError,
    order_types::{Label, Order},
    traits::MarketplaceApi,
};

/// Purchases shipping labels and owns their on-disk documents.
///
/// At most one label exists per order. The vendor's order status, not any
/// local record, decides whether a purchase happens, so the manager never
/// issues a second purchase for an order the vendor already shows as
/// labelled; [`LabelManager::existing`] recovers those instead.
pub struct LabelManager<B: MarketplaceApi> {
    marketplace: Arc<B>,
    store: DocumentStore,
}

impl<B: MarketplaceApi> LabelManager<B> {
    pub fn new(marketplace: Arc<B>, store: DocumentStore) -> Self {
        Self { marketplace, store }
    }

    /// Purchase a label for the order and store its document under the
    /// deterministic per-order path.
    ///
    /// If the vendor purchase succeeds but the document cannot be written to
    /// disk, the label is voided again (best effort) before the error is
    /// returned.
    pub async fn purchase(&self, order: &Order) -> Result<Label, LabelError> {
        let vendor = self.marketplace.purchase_label(order).await?;
        let document = match vendor.document.as_deref() {
            Some(bytes) => bytes,
            None => {
                warn!("🏷️ Vendor returned no label document for order {}", order.id);
                return Err(LabelError::DocumentMissing(order.id.clone()));
            },
        };
        let label = Label::from_vendor(&order.id, &vendor, self.store.label_path(&order.id));
        match self.store.write_label(&order.id, document) {
            Ok(path) => {
                info!(
                    "🏷️ Purchased label for order {}. Tracking {}. Stored at {}",
                    order.id,
                    label.tracking_number,
                    path.display()
                );
                Ok(label)
            },
            Err(e) => {
                error!("🏷️ Label purchased for order {} but its document could not be stored: {e}", order.id);
                self.void_and_refund(&label).await;
                Err(LabelError::Storage(e))
            },
        }
    }

    /// Recover the label for an order the vendor already reports as
    /// labelled. Prefers the local document from the earlier run;
    /// re-downloads via the vendor when the backend can serve it.
    pub async fn existing(&self, order: &Order) -> Result<Label, LabelError> {
        let vendor = self
            .marketplace
            .fetch_label(order)
            .await?
            .ok_or_else(|| LabelError::DocumentMissing(order.id.clone()))?;
        let path = self.store.label_path(&order.id);
        if let Some(bytes) = vendor.document.as_deref() {
            self.store.write_label(&order.id, bytes)?;
        } else if !path.exists() {
            return Err(LabelError::DocumentMissing(order.id.clone()));
        }
        debug!("🏷️ Reusing existing label for order {}. Tracking {}", order.id, vendor.tracking_number);
        Ok(Label::from_vendor(&order.id, &vendor, path))
    }

    /// Best-effort compensation. Failures are logged, not escalated; by the
    /// time this runs the original failure already needs operator attention.
    pub async fn void_and_refund(&self, label: &Label) {
        match self.marketplace.refund_label(label).await {
            Ok(()) => info!("🏷️ Voided and refunded label {} for order {}", label.reference, label.order_id),
            Err(e) => warn!("🏷️ Could not void label {} for order {}: {e}", label.reference, label.order_id),
        }
    }
}
