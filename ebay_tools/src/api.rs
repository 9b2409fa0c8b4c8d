use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    auth::TokenCache,
    config::EbayApiConfig,
    data_objects::{EbayLabel, EbayOrder, OrdersResponse, Shipment, ShippingFulfillments, ShippingQuote},
    helpers::{classify_error_response, format_filter_timestamp},
    EbayApiError,
};

const ORDERS_PATH: &str = "/sell/fulfillment/v1/order";
const SHIPPING_QUOTE_PATH: &str = "/sell/logistics/v1/shipping_quote";
const CREATE_SHIPMENT_PATH: &str = "/sell/logistics/v1/shipment/create_from_shipping_quote";
const ORDERS_PAGE_SIZE: &str = "50";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct EbayApi {
    config: EbayApiConfig,
    client: Arc<Client>,
    token: Arc<TokenCache>,
}

impl EbayApi {
    pub fn new(config: EbayApiConfig) -> Result<Self, EbayApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EbayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(TokenCache::new()) })
    }

    pub fn url(&self, path: &str) -> String {
        self.config.api_url(path)
    }

    /// Typed REST call against the eBay Sell APIs.
    ///
    /// The access token is minted lazily on the first call. A 401 triggers
    /// exactly one re-authentication attempt; a second rejection surfaces as
    /// an auth error to the caller.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, EbayApiError> {
        let url = self.url(path);
        trace!("🛒 Sending REST query: {url}");
        let mut re_authenticated = false;
        loop {
            let token = self.token.access_token(&self.client, &self.config, re_authenticated).await?;
            let mut req = self.client.request(method.clone(), &url).bearer_auth(token.reveal());
            if !params.is_empty() {
                req = req.query(params);
            }
            if let Some(body) = body.as_ref() {
                req = req.json(body);
            }
            let response = req.send().await.map_err(EbayApiError::from_reqwest)?;
            let status = response.status();
            if status.is_success() {
                trace!("🛒 REST query successful. {status}");
                return response.json::<T>().await.map_err(|e| EbayApiError::Json(e.to_string()));
            }
            let message = response.text().await.map_err(EbayApiError::from_reqwest)?;
            if status.as_u16() == 401 && !re_authenticated {
                debug!("🛒 Access token was rejected. Re-authenticating once.");
                re_authenticated = true;
                continue;
            }
            return Err(classify_error_response(status.as_u16(), &message));
        }
    }

    /// Fetch orders that are paid and not yet shipped.
    ///
    /// The server-side filter narrows to unfulfilled orders created after
    /// `since`; the payment check is re-applied client-side since the filter
    /// grammar does not cover it.
    pub async fn list_fulfillable_orders(&self, since: DateTime<Utc>) -> Result<Vec<EbayOrder>, EbayApiError> {
        // reqwest percent-encodes the brackets and pipes when it builds the query string
        let filter = format!(
            "creationdate:[{}..],orderfulfillmentstatus:{{NOT_STARTED|IN_PROGRESS}}",
            format_filter_timestamp(since)
        );
        debug!("🛒 Fetching fulfillable orders created after {since}");
        let params = [("filter", filter.as_str()), ("limit", ORDERS_PAGE_SIZE)];
        let result = self.rest_query::<OrdersResponse, ()>(Method::GET, ORDERS_PATH, &params, None).await?;
        let total = result.orders.len();
        let orders: Vec<EbayOrder> = result.orders.into_iter().filter(EbayOrder::is_fulfillable).collect();
        info!("🛒 {} of {total} fetched orders need fulfillment", orders.len());
        Ok(orders)
    }

    /// Purchase a shipping label for the order via the logistics flow:
    /// request a shipping quote, then create a shipment from the first
    /// offered rate. Rate shopping is out of scope here; sellers steer the
    /// offered services through their eBay shipping policies.
    ///
    /// This call spends real money and must not be retried blindly. Callers
    /// re-check the order's fulfillment status before invoking it again.
    pub async fn purchase_label(&self, order_id: &str) -> Result<EbayLabel, EbayApiError> {
        debug!("🛒 Requesting shipping quote for order {order_id}");
        let quote_request = serde_json::json!({
            "orders": [{ "channel": "EBAY", "orderId": order_id }],
        });
        let quote =
            self.rest_query::<ShippingQuote, _>(Method::POST, SHIPPING_QUOTE_PATH, &[], Some(quote_request)).await?;
        let rate = quote
            .rates
            .first()
            .ok_or_else(|| EbayApiError::Validation(format!("No shipping rates offered for order {order_id}")))?;
        debug!(
            "🛒 Creating shipment for order {order_id} with rate {} ({}/{})",
            rate.rate_id, rate.shipping_carrier_code, rate.shipping_service_code
        );
        let shipment_request = serde_json::json!({
            "shippingQuoteId": quote.shipping_quote_id,
            "rateId": rate.rate_id,
        });
        let shipment =
            self.rest_query::<Shipment, _>(Method::POST, CREATE_SHIPMENT_PATH, &[], Some(shipment_request)).await?;
        info!(
            "🛒 Purchased label for order {order_id}. Shipment {} tracking {}",
            shipment.shipment_id, shipment.shipment_tracking_number
        );
        Ok(EbayLabel::from_shipment(order_id, shipment))
    }

    /// Look up a shipment that was already created for the order in an
    /// earlier run. Returns `None` when eBay has no shipping fulfillment on
    /// record.
    pub async fn fetch_label(&self, order_id: &str) -> Result<Option<EbayLabel>, EbayApiError> {
        let path = format!("{ORDERS_PATH}/{order_id}/shipping_fulfillment");
        debug!("🛒 Fetching existing shipping fulfillments for order {order_id}");
        let result = self.rest_query::<ShippingFulfillments, ()>(Method::GET, &path, &[], None).await?;
        let label = result.fulfillments.into_iter().next().map(|f| EbayLabel {
            order_id: order_id.to_string(),
            shipment_id: f.fulfillment_id,
            carrier_code: f.shipping_carrier_code,
            service_code: String::new(),
            tracking_number: f.shipment_tracking_number,
            label_download_url: String::new(),
            purchased_at: f.shipped_date,
        });
        Ok(label)
    }

    /// Cancel the shipment, voiding the label and refunding its cost.
    /// Compensating action only.
    pub async fn refund_label(&self, shipment_id: &str) -> Result<(), EbayApiError> {
        if shipment_id.is_empty() {
            return Err(EbayApiError::Validation("No shipment id to cancel".to_string()));
        }
        let path = format!("/sell/logistics/v1/shipment/{shipment_id}/cancel");
        debug!("🛒 Cancelling shipment {shipment_id}");
        let _cancelled = self.rest_query::<Shipment, ()>(Method::POST, &path, &[], None).await?;
        info!("🛒 Shipment {shipment_id} cancelled and refunded");
        Ok(())
    }

    /// Download a label document. The URL comes from the shipment response
    /// and is already absolute.
    pub async fn download_document(&self, url: &str) -> Result<Vec<u8>, EbayApiError> {
        trace!("🛒 Downloading document from {url}");
        let mut re_authenticated = false;
        loop {
            let token = self.token.access_token(&self.client, &self.config, re_authenticated).await?;
            let response =
                self.client.get(url).bearer_auth(token.reveal()).send().await.map_err(EbayApiError::from_reqwest)?;
            let status = response.status();
            if status.is_success() {
                let bytes = response.bytes().await.map_err(EbayApiError::from_reqwest)?;
                debug!("🛒 Downloaded document. {} bytes", bytes.len());
                return Ok(bytes.to_vec());
            }
            let message = response.text().await.map_err(EbayApiError::from_reqwest)?;
            if status.as_u16() == 401 && !re_authenticated {
                re_authenticated = true;
                continue;
            }
            return Err(classify_error_response(status.as_u16(), &message));
        }
    }
}
