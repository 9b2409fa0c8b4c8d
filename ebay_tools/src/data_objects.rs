use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FULFILLMENT_NOT_STARTED: &str = "NOT_STARTED";
pub const FULFILLMENT_IN_PROGRESS: &str = "IN_PROGRESS";
pub const FULFILLMENT_FULFILLED: &str = "FULFILLED";
pub const PAYMENT_PAID: &str = "PAID";

//--------------------------------------     Orders (Sell Fulfillment API)     ----------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrdersResponse {
    pub orders: Vec<EbayOrder>,
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EbayOrder {
    pub order_id: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub order_fulfillment_status: String,
    pub order_payment_status: String,
    pub line_items: Vec<EbayLineItem>,
    pub fulfillment_start_instructions: Vec<FulfillmentStartInstruction>,
}

impl EbayOrder {
    /// Paid, and not yet handed to the carrier. Orders that eBay already
    /// reports as fulfilled never re-enter the pipeline.
    pub fn is_fulfillable(&self) -> bool {
        self.order_payment_status == PAYMENT_PAID && self.order_fulfillment_status != FULFILLMENT_FULFILLED
    }

    /// True once a label exists for the order on the eBay side.
    pub fn label_already_purchased(&self) -> bool {
        self.order_fulfillment_status == FULFILLMENT_IN_PROGRESS
    }

    pub fn ship_to(&self) -> Option<&ShipTo> {
        self.fulfillment_start_instructions.iter().find_map(|i| i.shipping_step.as_ref()).map(|s| &s.ship_to)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EbayLineItem {
    pub line_item_id: String,
    pub sku: String,
    pub title: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FulfillmentStartInstruction {
    pub fulfillment_instructions_type: String,
    pub shipping_step: Option<ShippingStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingStep {
    pub ship_to: ShipTo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShipTo {
    pub full_name: String,
    pub contact_address: Option<ContactAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactAddress {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country_code: String,
}

//--------------------------------------     Labels (Sell Logistics API)     ------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingQuote {
    pub shipping_quote_id: String,
    pub rates: Vec<ShippingRate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingRate {
    pub rate_id: String,
    pub shipping_carrier_code: String,
    pub shipping_service_code: String,
    pub base_shipping_cost: Option<Amount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Amount {
    pub currency: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shipment {
    pub shipment_id: String,
    pub shipment_tracking_number: String,
    pub label_download_url: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub rate: Option<ShippingRate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingFulfillments {
    pub fulfillments: Vec<ShippingFulfillment>,
    pub total: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingFulfillment {
    pub fulfillment_id: String,
    pub shipment_tracking_number: String,
    pub shipping_carrier_code: String,
    pub shipped_date: Option<DateTime<Utc>>,
}

//--------------------------------------     EbayLabel     ------------------------------------------------------------

/// A purchased shipping label as this crate reports it to callers. Assembled
/// from the logistics shipment response (or from a shipping-fulfillment
/// lookup when the label was purchased in an earlier run).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EbayLabel {
    pub order_id: String,
    pub shipment_id: String,
    pub carrier_code: String,
    pub service_code: String,
    pub tracking_number: String,
    pub label_download_url: String,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl EbayLabel {
    pub fn from_shipment(order_id: &str, shipment: Shipment) -> Self {
        let (carrier_code, service_code) = shipment
            .rate
            .map(|r| (r.shipping_carrier_code, r.shipping_service_code))
            .unwrap_or_default();
        Self {
            order_id: order_id.to_string(),
            shipment_id: shipment.shipment_id,
            carrier_code,
            service_code,
            tracking_number: shipment.shipment_tracking_number,
            label_download_url: shipment.label_download_url,
            purchased_at: shipment.creation_date,
        }
    }
}

//--------------------------------------     Error body     -----------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorDetail {
    pub error_id: Option<u64>,
    pub domain: String,
    pub category: String,
    pub message: String,
    pub long_message: Option<String>,
}
