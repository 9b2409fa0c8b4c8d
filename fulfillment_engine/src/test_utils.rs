//! Mocks and fixtures shared by the engine's unit tests.

use std::path::Path;

use chrono::{DateTime, Utc};
use mockall::mock;

use crate::{
    errors::{MarketplaceError, PrintError},
    order_types::{Address, Label, LineItem, Order, OrderId, OrderStatus, PrintJob, VendorLabel},
    printing::JobKind,
    traits::{DocumentPrinter, MarketplaceApi},
};

mock! {
    pub Marketplace {}
    impl MarketplaceApi for Marketplace {
        async fn list_fulfillable_orders(&self, since: DateTime<Utc>) -> Result<Vec<Order>, MarketplaceError>;
        async fn purchase_label(&self, order: &Order) -> Result<VendorLabel, MarketplaceError>;
        async fn fetch_label(&self, order: &Order) -> Result<Option<VendorLabel>, MarketplaceError>;
        async fn refund_label(&self, label: &Label) -> Result<(), MarketplaceError>;
    }
}

mock! {
    pub Printer {}
    impl DocumentPrinter for Printer {
        async fn submit(&self, document: &Path, kind: JobKind) -> Result<PrintJob, PrintError>;
    }
}

pub fn springfield_order(id: &str) -> Order {
    Order {
        id: OrderId::from(id),
        status: OrderStatus::Paid,
        created_at: None,
        address: Address {
            name: "J. Doe".to_string(),
            street1: "1 Main St".to_string(),
            street2: None,
            city: "Springfield".to_string(),
            region: "IL".to_string(),
            postal_code: "62704".to_string(),
            country: "US".to_string(),
        },
        items: vec![LineItem { sku: "WIDGET".to_string(), quantity: 2 }],
    }
}

pub fn vendor_label(tracking: &str) -> VendorLabel {
    VendorLabel {
        reference: "sh-1".to_string(),
        carrier_code: "USPS".to_string(),
        service_code: "USPSPriority".to_string(),
        tracking_number: tracking.to_string(),
        document: Some(b"%PDF-1.4 mock label".to_vec()),
        purchased_at: None,
    }
}

pub fn accepted_job(document: &Path) -> PrintJob {
    PrintJob {
        document: document.to_path_buf(),
        printer: "mock".to_string(),
        accepted: true,
        submitted_at: Utc::now(),
    }
}
