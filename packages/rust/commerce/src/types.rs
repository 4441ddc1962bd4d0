//! Typed models for the commerce order API.
//!
//! Fields mirror the admin API's order payload, restricted to the
//! projection the client requests. Everything the API may omit is
//! optional or defaulted so partial records still deserialize.

use serde::{Deserialize, Serialize};

/// Response envelope for the order listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// One customer order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub order_number: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub total_price: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

fn default_currency() -> String {
    "EUR".into()
}

/// Order customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Customer {
    /// Display name, e.g. "Max Mustermann". Empty when both parts are missing.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// One ordered product line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub variant_title: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price: String,
}

/// Shipping destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Chosen shipping method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub title: String,
}
