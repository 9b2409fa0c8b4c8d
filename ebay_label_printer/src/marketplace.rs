use chrono::{DateTime, Utc};
use ebay_tools::{
    EbayApi,
    EbayApiError,
    EbayLabel,
    EbayOrder,
    FULFILLMENT_FULFILLED,
    FULFILLMENT_IN_PROGRESS,
    FULFILLMENT_NOT_STARTED,
};
use fulfillment_engine::{
    errors::MarketplaceError,
    order_types::{Address, Label, LineItem, Order, OrderId, OrderStatus, VendorLabel},
    MarketplaceApi,
};
use log::*;

/// The eBay-backed [`MarketplaceApi`] implementation: converts wire orders
/// into domain orders and stitches label purchase and document download into
/// the single operation the engine expects.
pub struct EbayMarketplace {
    api: EbayApi,
}

impl EbayMarketplace {
    pub fn new(api: EbayApi) -> Self {
        Self { api }
    }

    async fn vendor_label_from(&self, label: EbayLabel) -> Result<VendorLabel, MarketplaceError> {
        let document = if label.label_download_url.is_empty() {
            None
        } else {
            Some(self.api.download_document(&label.label_download_url).await.map_err(to_marketplace_error)?)
        };
        Ok(VendorLabel {
            reference: label.shipment_id,
            carrier_code: label.carrier_code,
            service_code: label.service_code,
            tracking_number: label.tracking_number,
            document,
            purchased_at: label.purchased_at,
        })
    }
}

impl MarketplaceApi for EbayMarketplace {
    async fn list_fulfillable_orders(&self, since: DateTime<Utc>) -> Result<Vec<Order>, MarketplaceError> {
        let orders = self.api.list_fulfillable_orders(since).await.map_err(to_marketplace_error)?;
        Ok(orders.iter().map(to_domain_order).collect())
    }

    async fn purchase_label(&self, order: &Order) -> Result<VendorLabel, MarketplaceError> {
        let label = self.api.purchase_label(order.id.as_str()).await.map_err(to_marketplace_error)?;
        self.vendor_label_from(label).await
    }

    async fn fetch_label(&self, order: &Order) -> Result<Option<VendorLabel>, MarketplaceError> {
        match self.api.fetch_label(order.id.as_str()).await.map_err(to_marketplace_error)? {
            Some(label) => Ok(Some(self.vendor_label_from(label).await?)),
            None => Ok(None),
        }
    }

    async fn refund_label(&self, label: &Label) -> Result<(), MarketplaceError> {
        self.api.refund_label(&label.reference).await.map_err(to_marketplace_error)
    }
}

fn to_marketplace_error(e: EbayApiError) -> MarketplaceError {
    match e {
        EbayApiError::Auth(m) => MarketplaceError::Auth(m),
        EbayApiError::InsufficientFunds(m) => MarketplaceError::InsufficientFunds(m),
        EbayApiError::Validation(m) => MarketplaceError::Validation(m),
        EbayApiError::TransientNetwork(m) => MarketplaceError::TransientNetwork(m),
        EbayApiError::Initialization(m) | EbayApiError::Json(m) => MarketplaceError::Vendor(m),
        EbayApiError::Vendor { status, message } => MarketplaceError::Vendor(format!("{status}: {message}")),
    }
}

fn to_domain_status(wire: &str, order_id: &str) -> OrderStatus {
    match wire {
        FULFILLMENT_NOT_STARTED => OrderStatus::Paid,
        FULFILLMENT_IN_PROGRESS => OrderStatus::LabelPurchased,
        FULFILLMENT_FULFILLED => OrderStatus::Shipped,
        other => {
            error!("🛒 Order {order_id} reports unknown fulfillment status '{other}'");
            OrderStatus::Error
        },
    }
}

/// Wire order → domain order. Never fails: absent address fields become
/// blanks that the slip generator rejects with a per-order render error
/// instead of poisoning the whole poll pass.
fn to_domain_order(wire: &EbayOrder) -> Order {
    let ship_to = wire.ship_to();
    let name = ship_to.map(|s| s.full_name.clone()).unwrap_or_default();
    let contact = ship_to.and_then(|s| s.contact_address.as_ref());
    let address = Address {
        name,
        street1: contact.map(|a| a.address_line1.clone()).unwrap_or_default(),
        street2: contact.and_then(|a| a.address_line2.clone()),
        city: contact.map(|a| a.city.clone()).unwrap_or_default(),
        region: contact.map(|a| a.state_or_province.clone()).unwrap_or_default(),
        postal_code: contact.map(|a| a.postal_code.clone()).unwrap_or_default(),
        country: contact.map(|a| a.country_code.clone()).unwrap_or_default(),
    };
    Order {
        id: OrderId::from(wire.order_id.as_str()),
        status: to_domain_status(&wire.order_fulfillment_status, &wire.order_id),
        created_at: wire.creation_date,
        address,
        items: wire.line_items.iter().map(|i| LineItem { sku: i.sku.clone(), quantity: i.quantity }).collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn wire_order(status: &str) -> EbayOrder {
        serde_json::from_str(&format!(
            r#"{{
                "orderId": "A-100",
                "orderFulfillmentStatus": "{status}",
                "orderPaymentStatus": "PAID",
                "lineItems": [{{ "lineItemId": "1", "sku": "WIDGET", "title": "A widget", "quantity": 2 }}],
                "fulfillmentStartInstructions": [{{
                    "fulfillmentInstructionsType": "SHIP_TO",
                    "shippingStep": {{
                        "shipTo": {{
                            "fullName": "J. Doe",
                            "contactAddress": {{
                                "addressLine1": "1 Main St",
                                "city": "Springfield",
                                "stateOrProvince": "IL",
                                "postalCode": "62704",
                                "countryCode": "US"
                            }}
                        }}
                    }}
                }}]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn wire_orders_convert_to_domain_orders() {
        let order = to_domain_order(&wire_order("NOT_STARTED"));
        assert_eq!(order.id.as_str(), "A-100");
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.address.name, "J. Doe");
        assert_eq!(order.address.city, "Springfield");
        assert_eq!(order.items, vec![LineItem { sku: "WIDGET".to_string(), quantity: 2 }]);
    }

    #[test]
    fn fulfillment_status_maps_onto_the_domain_enum() {
        assert_eq!(to_domain_order(&wire_order("NOT_STARTED")).status, OrderStatus::Paid);
        assert_eq!(to_domain_order(&wire_order("IN_PROGRESS")).status, OrderStatus::LabelPurchased);
        assert_eq!(to_domain_order(&wire_order("FULFILLED")).status, OrderStatus::Shipped);
        assert_eq!(to_domain_order(&wire_order("SOMETHING_NEW")).status, OrderStatus::Error);
    }

    #[test]
    fn orders_without_an_address_convert_to_blank_fields() {
        let mut wire = wire_order("NOT_STARTED");
        wire.fulfillment_start_instructions.clear();
        let order = to_domain_order(&wire);
        assert!(order.address.name.is_empty());
        assert_eq!(order.address.missing_for_slip(), vec!["name", "street1", "city", "postal_code"]);
    }

    #[test]
    fn error_taxonomy_survives_the_mapping() {
        assert!(matches!(
            to_marketplace_error(EbayApiError::Auth("expired".to_string())),
            MarketplaceError::Auth(_)
        ));
        assert!(matches!(
            to_marketplace_error(EbayApiError::InsufficientFunds("broke".to_string())),
            MarketplaceError::InsufficientFunds(_)
        ));
        assert!(matches!(
            to_marketplace_error(EbayApiError::Vendor { status: 500, message: "boom".to_string() }),
            MarketplaceError::Vendor(_)
        ));
    }
}
