//! Commerce order API client.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info};

use storesync_shared::{Result, StoresyncError};

use crate::types::{Order, OrdersResponse};

/// Access-token header for admin API requests.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Field projection requested from the order listing endpoint.
const ORDER_FIELDS: &str = "id,order_number,created_at,total_price,currency,customer,line_items,\
                            shipping_address,financial_status,fulfillment_status,shipping_lines,tags";

/// Client for the commerce backend's order endpoints.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    base_url: String,
    api_version: String,
    access_token: String,
    client: Client,
}

impl OrdersClient {
    /// Create a client for `https://{shop_domain}`.
    pub fn new(shop_domain: &str, api_version: &str, access_token: &str) -> Result<Self> {
        Self::with_base_url(&format!("https://{shop_domain}"), api_version, access_token)
    }

    /// Create a client against an explicit base URL (used by tests).
    pub fn with_base_url(base_url: &str, api_version: &str, access_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoresyncError::Commerce(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            access_token: access_token.to_string(),
            client,
        })
    }

    /// Fetch orders created within the last `since_days` days, newest
    /// first as the API returns them, capped at `limit`.
    pub async fn list_orders(&self, limit: u32, since_days: i64, status: &str) -> Result<Vec<Order>> {
        info!(limit, since_days, status, "fetching orders");

        let created_at_min = (Utc::now() - chrono::Duration::days(since_days)).to_rfc3339();
        let url = format!("{}/admin/api/{}/orders.json", self.base_url, self.api_version);

        let response = self
            .client
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .query(&[
                ("limit", limit.to_string()),
                ("status", status.to_string()),
                ("created_at_min", created_at_min),
                ("fields", ORDER_FIELDS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoresyncError::Commerce(format!("order listing failed: {e}")))?;

        let status_code = response.status();
        if !status_code.is_success() {
            return Err(StoresyncError::Commerce(format!(
                "order listing returned HTTP {status_code}"
            )));
        }

        let body: OrdersResponse = response
            .json()
            .await
            .map_err(|e| StoresyncError::Commerce(format!("invalid order listing body: {e}")))?;

        debug!(count = body.orders.len(), "fetched orders");
        Ok(body.orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_orders_sends_projection_and_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/admin/api/2024-01/orders.json"))
            .and(header("X-Shopify-Access-Token", "shpat_test"))
            .and(query_param("limit", "50"))
            .and(query_param("status", "any"))
            .and(query_param_contains("fields", "order_number"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orders": [
                    {"id": 1, "order_number": 1001, "total_price": "12.00", "currency": "EUR"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OrdersClient::with_base_url(&server.uri(), "2024-01", "shpat_test").unwrap();
        let orders = client.list_orders(50, 30, "any").await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_number, 1001);
    }

    #[tokio::test]
    async fn list_orders_surfaces_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = OrdersClient::with_base_url(&server.uri(), "2024-01", "bad-token").unwrap();
        let err = client.list_orders(10, 7, "any").await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
