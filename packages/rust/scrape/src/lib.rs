//! Storefront fetching and content extraction.
//!
//! This crate provides:
//! - [`Fetcher`] — configured HTTP client for storefront pages
//! - [`faq`] — FAQ extraction from JSON-LD structured data
//! - [`legal`] — legal page extraction (headings + paragraphs)
//! - [`catalog`] / [`product`] — product catalog walk and product extraction
//!
//! Extractors are pure functions of fetched text; fetching lives in the
//! thin `scrape_*` wrappers so the orchestrator can drive one unit at a
//! time.

pub mod catalog;
pub mod client;
pub mod faq;
pub mod legal;
pub mod product;

pub use catalog::collect_product_urls;
pub use client::Fetcher;
pub use faq::{extract_faq, scrape_faq};
pub use legal::{extract_legal, scrape_legal};
pub use product::{
    ProductDetails, base_name, clean_price, extract_product, format_product, scrape_products,
    visible_text,
};
