//! Product catalog walking.
//!
//! The catalog is paginated (`?page=N`). Product URLs are harvested from
//! `/products/` anchors and from variant URLs embedded in analytics script
//! payloads; the walk follows the next-page link until it disappears or
//! the page cap is reached.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use storesync_shared::Result;

use crate::client::Fetcher;

/// Minimum ms between catalog page requests.
const RATE_LIMIT_MS: u64 = 500;

/// Collect all product URLs from the paginated catalog.
pub async fn collect_product_urls(
    fetcher: &Fetcher,
    catalog_url: &Url,
    max_pages: u32,
) -> Result<Vec<String>> {
    let mut urls: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for page in 1..=max_pages.max(1) {
        let mut page_url = catalog_url.clone();
        page_url.set_query(Some(&format!("page={page}")));
        info!(page, url = %page_url, "scraping catalog page");

        let html = match fetcher.fetch_text(page_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(page, error = %e, "catalog page fetch failed, stopping walk");
                break;
            }
        };

        let (page_urls, has_next) = parse_catalog_page(&html, catalog_url);
        if page_urls.is_empty() {
            warn!(page, "no products found on catalog page");
            break;
        }

        for url in page_urls {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }

        if !has_next {
            info!("no more catalog pages");
            break;
        }

        // Politeness delay between catalog pages.
        tokio::time::sleep(Duration::from_millis(RATE_LIMIT_MS)).await;
    }

    info!(count = urls.len(), "collected product URLs");
    Ok(urls)
}

/// Parse one catalog page: product URLs (in discovery order, deduplicated)
/// and whether a next-page link exists.
pub(crate) fn parse_catalog_page(html: &str, base: &Url) -> (Vec<String>, bool) {
    let doc = Html::parse_document(html);
    let mut urls: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // Plain product anchors. Links with query params are quick-view
    // duplicates of the canonical URL.
    let anchor_sel = Selector::parse("a[href]").unwrap();
    for a in doc.select(&anchor_sel) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if !href.contains("/products/") || href.contains('?') {
            continue;
        }
        if let Ok(resolved) = base.join(href) {
            let url = resolved.to_string();
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    }

    // Variant URLs embedded in the analytics payload.
    let script_sel = Selector::parse("script").unwrap();
    let variant_re = Regex::new(r#""url":"(/products/[^"]+)""#).unwrap();
    for script in doc.select(&script_sel) {
        if script.value().attr("src").is_some() {
            continue;
        }
        let text = script.inner_html();
        if !text.contains("collection_viewed") || !text.contains("productVariants") {
            continue;
        }
        for cap in variant_re.captures_iter(&text) {
            if let Ok(resolved) = base.join(&cap[1]) {
                let url = resolved.to_string();
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
        }
    }

    let next_sel = Selector::parse("a.pagination__item--next").unwrap();
    let has_next = doc.select(&next_sel).next().is_some();

    (urls, has_next)
}
