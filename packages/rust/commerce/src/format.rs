//! Order formatting for the knowledge-base document.
//!
//! The formatter is a lossless transform for the fields it selects: every
//! order number, customer name, and line item appears verbatim so the
//! conversational agent can answer order-status questions from the
//! published text alone.

use regex::Regex;
use tracing::info;

use crate::types::Order;

/// Format orders as one flat-text document.
pub fn format_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders available.".into();
    }

    let date_re = Regex::new(r"(\d{2}-\d{2}-\d{4})").unwrap();
    let mut out = String::from("# Customer Orders\n\n");

    for order in orders {
        let fulfillment_status = order
            .fulfillment_status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("unfulfilled");

        let delivery_status = match fulfillment_status {
            "fulfilled" => "Shipped",
            "partial" => "Partially shipped",
            _ => "Not shipped yet",
        };

        let delivery_method = order
            .shipping_lines
            .first()
            .map(|line| line.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or("Standard Shipping");

        // Scheduled delivery dates are carried as DD-MM-YYYY order tags.
        let delivery_date = date_re
            .captures(&order.tags)
            .map(|cap| cap[1].to_string())
            .unwrap_or_else(|| "Not scheduled".into());

        let (customer_name, customer_email) = match &order.customer {
            Some(c) => (
                c.display_name(),
                c.email.clone().unwrap_or_else(|| "No email provided".into()),
            ),
            None => (String::new(), "No email provided".into()),
        };

        let shipping_info = order
            .shipping_address
            .as_ref()
            .map(|addr| {
                format!(
                    "\nSHIPPING ADDRESS:\n{}\n{}\n{} {}\n{}\n",
                    addr.address1.as_deref().unwrap_or_default(),
                    addr.address2.as_deref().unwrap_or_default(),
                    addr.zip.as_deref().unwrap_or_default(),
                    addr.city.as_deref().unwrap_or_default(),
                    addr.country.as_deref().unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        let mut products_info = String::from("PRODUCTS:\n");
        for item in &order.line_items {
            let product_name = match item.variant_title.as_deref().filter(|v| !v.is_empty()) {
                Some(variant) => format!("{} - {variant}", item.title),
                None => item.title.clone(),
            };
            products_info.push_str(&format!(
                "- {}x {product_name} ({} {})\n",
                item.quantity, item.price, order.currency
            ));
        }

        out.push_str(&format!(
            "\n======================================\n\
             ORDER NUMBER: {order_number}\n\
             ID: {id}\n\
             DATE: {created_at}\n\
             CUSTOMER: {customer_name}\n\
             EMAIL: {customer_email}\n\
             PAYMENT STATUS: {financial_status}\n\
             FULFILLMENT STATUS: {fulfillment_status}\n\
             DELIVERY STATUS: {delivery_status}\n\
             DELIVERY METHOD: {delivery_method}\n\
             EXPECTED DELIVERY: {delivery_date}\n\
             TOTAL: {total_price} {currency}\n\
             {shipping_info}\n\
             {products_info}\
             ======================================\n\n",
            order_number = order.order_number,
            id = order.id,
            created_at = order.created_at,
            financial_status = order.financial_status.as_deref().unwrap_or("Unknown"),
            total_price = order.total_price,
            currency = order.currency,
        ));
    }

    info!(
        orders = orders.len(),
        words = out.split_whitespace().count(),
        "formatted orders"
    );
    out
}
