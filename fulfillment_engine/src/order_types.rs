use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//--------------------------------------     OrderId       -----------------------------------------------------------

/// The marketplace-assigned order identifier. Unique, and the key for every
/// local artifact the pipeline produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for OrderId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------     OrderStatus       -------------------------------------------------------

/// Fulfillment status as the vendor reports it. This is the durable
/// checkpoint for the whole pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Payment received, no label purchased yet.
    #[default]
    Paid,
    /// A shipping label exists for this order on the vendor side.
    LabelPurchased,
    /// The order has been handed to the carrier.
    Shipped,
    /// The vendor reported a status this system does not recognize.
    Error,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::LabelPurchased => write!(f, "Label purchased"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Error => write!(f, "Error"),
        }
    }
}

//--------------------------------------     Address       -----------------------------------------------------------

/// Structured ship-to address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// The fields the packing-slip layout cannot do without. Blank counts as
    /// missing.
    pub fn missing_for_slip(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.street1.trim().is_empty() {
            missing.push("street1");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.postal_code.trim().is_empty() {
            missing.push("postal_code");
        }
        missing
    }
}

//--------------------------------------     LineItem / Order       --------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub address: Address,
    pub items: Vec<LineItem>,
}

//--------------------------------------     VendorLabel / Label       -----------------------------------------------

/// A label as returned by the marketplace: carrier metadata plus, when the
/// vendor serves it, the document bytes. The document is absent when the
/// label was purchased in an earlier run and only the shipment record can be
/// recovered.
#[derive(Debug, Clone, Default)]
pub struct VendorLabel {
    /// Vendor-side shipment/fulfillment identifier, used for refunds.
    pub reference: String,
    pub carrier_code: String,
    pub service_code: String,
    pub tracking_number: String,
    pub document: Option<Vec<u8>>,
    pub purchased_at: Option<DateTime<Utc>>,
}

/// A purchased label with its locally stored document. At most one exists
/// per order; the file is overwritten, never duplicated, on reprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub order_id: OrderId,
    pub reference: String,
    pub carrier_code: String,
    pub service_code: String,
    pub tracking_number: String,
    pub document: PathBuf,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl Label {
    pub fn from_vendor(order_id: &OrderId, vendor: &VendorLabel, document: PathBuf) -> Self {
        Self {
            order_id: order_id.clone(),
            reference: vendor.reference.clone(),
            carrier_code: vendor.carrier_code.clone(),
            service_code: vendor.service_code.clone(),
            tracking_number: vendor.tracking_number.clone(),
            document,
            purchased_at: vendor.purchased_at,
        }
    }
}

//--------------------------------------     PackingSlip / PrintJob       --------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingSlip {
    pub order_id: OrderId,
    pub document: PathBuf,
    pub generated_at: DateTime<Utc>,
}

/// One dispatch attempt. Ephemeral; never persisted.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub document: PathBuf,
    pub printer: String,
    pub accepted: bool,
    pub submitted_at: DateTime<Utc>,
}

//--------------------------------------     FulfillmentState       --------------------------------------------------

/// Where an order ended up after a pass through the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentState {
    Fetched,
    LabelPurchased,
    SlipGenerated,
    LabelPrinted,
    SlipPrinted,
    Done,
    Failed(FailureStage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Label,
    Slip,
    Print,
}

impl Display for FailureStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Label => write!(f, "label"),
            FailureStage::Slip => write!(f, "slip"),
            FailureStage::Print => write!(f, "print"),
        }
    }
}

impl Display for FulfillmentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentState::Fetched => write!(f, "fetched"),
            FulfillmentState::LabelPurchased => write!(f, "label purchased"),
            FulfillmentState::SlipGenerated => write!(f, "slip generated"),
            FulfillmentState::LabelPrinted => write!(f, "label printed"),
            FulfillmentState::SlipPrinted => write!(f, "slip printed"),
            FulfillmentState::Done => write!(f, "done"),
            FulfillmentState::Failed(stage) => write!(f, "failed at the {stage} stage"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_slip_fields_are_reported_by_name() {
        let address = Address {
            name: "J. Doe".to_string(),
            street1: String::new(),
            street2: None,
            city: "  ".to_string(),
            region: "IL".to_string(),
            postal_code: "62704".to_string(),
            country: "US".to_string(),
        };
        assert_eq!(address.missing_for_slip(), vec!["street1", "city"]);
    }

    #[test]
    fn complete_address_has_no_missing_fields() {
        let address = Address {
            name: "J. Doe".to_string(),
            street1: "1 Main St".to_string(),
            street2: None,
            city: "Springfield".to_string(),
            region: "IL".to_string(),
            postal_code: "62704".to_string(),
            country: "US".to_string(),
        };
        assert!(address.missing_for_slip().is_empty());
    }
}
